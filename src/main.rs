use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rsguess::{
    more_recent_version, ConfigManager, DocumentParser, Extractor, GlobalConfig, GuessBoard,
    GuessDebug, InMemoryStore, Persistor, ReqwestFetcher, Resource, ResourceRecord,
    ResponseCache, SignatureCompiler, SignatureLoader, SoftwareVersion, StoreLoader,
};

/// 识别生成网页的软件及其版本。
///
/// 获取目标页面，通过 generator 标签与技术签名提取候选版本，并输出排序后的猜测。
#[derive(Parser, Debug)]
#[command(name = "rsguess", version, about = "Web 软件版本识别", long_about = None)]
struct Cli {
    /// 目标 URL（缺少协议时补全为 http://）
    url: String,

    /// 证据库 JSON 文件
    #[arg(long)]
    store: PathBuf,

    /// 签名库 JSON 文件（支持 wappalyzergo 格式）
    #[arg(long)]
    signatures: PathBuf,

    /// 响应缓存目录
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// 不读取也不写入响应缓存
    #[arg(long, default_value_t = false)]
    no_cache: bool,

    /// 将成功获取的资源写入该目录
    #[arg(long)]
    persist_resources: Option<PathBuf>,

    /// HTTP 超时（秒）
    #[arg(long)]
    http_timeout: Option<u64>,

    /// 正向证据权重
    #[arg(long, allow_hyphen_values = true)]
    positive_match_weight: Option<f64>,

    /// 负向证据权重
    #[arg(long, allow_hyphen_values = true)]
    negative_match_weight: Option<f64>,

    /// 使用精确记录解析错误的解析器
    #[arg(long, default_value_t = false)]
    strict_parser: bool,

    /// 以 JSON 输出结果
    #[arg(long, default_value_t = false)]
    json: bool,

    /// 仅输出 JSON（关闭日志）
    #[arg(long, default_value_t = false)]
    json_only: bool,
}

#[derive(Serialize)]
struct Report {
    resource: ResourceRecord,
    guesses: Vec<GuessDebug>,
    more_recent_version: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_only);

    let config = build_config(&cli);
    let url = normalize_url(&cli.url);

    let store = StoreLoader::load_from_file(&cli.store)
        .with_context(|| format!("failed to load store {}", cli.store.display()))?;
    let library = SignatureLoader::load_from_file(&cli.signatures)
        .with_context(|| format!("failed to load signatures {}", cli.signatures.display()))?;
    let matcher = SignatureCompiler::compile(&library)?;

    let cache_file = ResponseCache::cache_file(&config);
    let cache = if cli.no_cache {
        ResponseCache::new()
    } else {
        ResponseCache::load_from_file(&cache_file)
            .with_context(|| format!("failed to load response cache {}", cache_file.display()))?
    };

    let fetcher = Arc::new(ReqwestFetcher::new(&config)?);
    let mut resource = Resource::new(url, fetcher).with_cache(cache.clone());

    let extractor = Extractor::new(&store, &matcher, &config);
    let candidates = match extractor.extract_information(&mut resource) {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("无法从 {} 提取信息：{}", resource, e);
            BTreeSet::new()
        }
    };
    info!("候选版本{}个", candidates.len());

    let mut board = GuessBoard::new(config.match_weights());
    board.seed(candidates);
    let guesses = board.best_guesses(&config);
    let newer = newer_release(&store, guesses.iter().map(|guess| guess.software_version()));

    let report = Report {
        resource: resource.serialize(),
        guesses: guesses.iter().map(|guess| guess.debug_serialize()).collect(),
        more_recent_version: newer.as_ref().map(ToString::to_string),
    };

    if cli.json || cli.json_only {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", serde_json::to_string(&report.resource)?);
        for guess in &guesses {
            println!("{}", guess);
        }
        if let Some(newer) = &newer {
            println!("more recent version available: {}", newer);
        }
    }

    if let Some(base) = &cli.persist_resources {
        Persistor::persist_or_warn(&resource, base);
    }

    if !cli.no_cache {
        cache
            .save_to_file(&cache_file)
            .with_context(|| format!("failed to save response cache {}", cache_file.display()))?;
    }

    Ok(())
}

fn init_logging(silent: bool) {
    let filter = if silent {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_config(cli: &Cli) -> GlobalConfig {
    let defaults = ConfigManager::get_default();
    let parser = if cli.strict_parser {
        DocumentParser::Html5everStrict
    } else {
        DocumentParser::Html5ever
    };

    ConfigManager::custom()
        .http_timeout(cli.http_timeout.unwrap_or(defaults.http_timeout))
        .positive_match_weight(cli.positive_match_weight.unwrap_or(defaults.positive_match_weight))
        .negative_match_weight(cli.negative_match_weight.unwrap_or(defaults.negative_match_weight))
        .document_parser(parser)
        .cache_dir(cli.cache_dir.clone().unwrap_or(defaults.cache_dir))
        .build()
}

fn normalize_url(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        warn!("URL {} 缺少协议，使用 http://", url);
        format!("http://{}", url)
    }
}

/// 猜测全部属于同一软件包时，查找是否有更新的版本
fn newer_release<'a>(
    store: &InMemoryStore,
    versions: impl Iterator<Item = &'a SoftwareVersion>,
) -> Option<SoftwareVersion> {
    let versions: Vec<&SoftwareVersion> = versions.collect();
    let first = versions.first()?;
    if versions.iter().any(|v| v.software_package != first.software_package) {
        return None;
    }

    match more_recent_version(store, versions.iter().copied()) {
        Ok(newer) => newer,
        Err(e) => {
            warn!("无法检查新版本：{}", e);
            None
        }
    }
}
