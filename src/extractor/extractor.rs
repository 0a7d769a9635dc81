//! 版本候选提取
//! 对已获取的资源运行两种独立策略（generator 标签启发式、签名匹配），返回候选版本的并集

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::html_extractor::{HtmlExtractor, ParsedDocument};
use crate::backend::{EvidenceStore, SoftwareVersion};
use crate::config::{DocumentParser, GlobalConfig};
use crate::error::RsgResult;
use crate::resource::{FetchedResponse, Resource};
use crate::signature::{MatchInput, SignatureMatcher};

/// 候选版本提取器
pub struct Extractor<'a> {
    store: &'a dyn EvidenceStore,
    matcher: &'a dyn SignatureMatcher,
    parser: DocumentParser,
}

impl<'a> Extractor<'a> {
    pub fn new(
        store: &'a dyn EvidenceStore,
        matcher: &'a dyn SignatureMatcher,
        config: &GlobalConfig,
    ) -> Self {
        Self {
            store,
            matcher,
            parser: config.document_parser,
        }
    }

    /// 从资源中提取候选版本
    ///
    /// 资源尚未获取时会先获取；获取失败返回 `RetrievalFailure`。
    pub fn extract_information(&self, resource: &mut Resource) -> RsgResult<BTreeSet<SoftwareVersion>> {
        let response = resource.ensure_retrieved()?;
        let document = HtmlExtractor::parse(&response.body, self.parser);

        let mut result = self.extract_generator_tag(&document)?;
        result.extend(self.extract_signature_information(response, &document)?);

        Ok(result)
    }

    /// generator 标签启发式
    ///
    /// 仅在恰好存在一个内容非空的 generator 标签时生效。第一个词用于查找软件包，
    /// 第二个词（若有）用于收窄版本；收窄后为空则保留全部版本。
    pub fn extract_generator_tag(&self, document: &ParsedDocument) -> RsgResult<BTreeSet<SoftwareVersion>> {
        let mut result = BTreeSet::new();

        let tags = document.generator_tags();
        if tags.len() != 1 {
            debug!("generator 标签数量为{}，忽略", tags.len());
            return Ok(result);
        }

        let Some(content) = tags[0].content.as_deref() else {
            return Ok(result);
        };
        let mut components = content.split_whitespace();
        let Some(package_name) = components.next() else {
            return Ok(result);
        };
        let version_hint = components.next().map(|hint| hint.trim().to_lowercase());

        for package in self.store.retrieve_packages_by_name(package_name)? {
            let versions = self.store.retrieve_versions(&package, true)?;

            let narrowed: BTreeSet<SoftwareVersion> = match &version_hint {
                Some(hint) => versions
                    .iter()
                    .filter(|version| version.name.trim().to_lowercase().contains(hint.as_str()))
                    .cloned()
                    .collect(),
                None => BTreeSet::new(),
            };

            if narrowed.is_empty() {
                result.extend(versions);
            } else {
                result.extend(narrowed);
            }
        }

        info!("generator 标签提示候选版本：{}", join_versions(&result));

        Ok(result)
    }

    /// 签名匹配：命中签名关联软件包的全部（已索引）版本
    pub fn extract_signature_information(
        &self,
        response: &FetchedResponse,
        document: &ParsedDocument,
    ) -> RsgResult<BTreeSet<SoftwareVersion>> {
        let input = MatchInput::new(response, document);
        let mut result = BTreeSet::new();
        let mut matched = Vec::new();

        for signature in self.matcher.matching_signatures(&input) {
            matched.push(signature.name().to_string());
            for package in signature.software_packages() {
                result.extend(self.store.retrieve_versions(package, true)?);
            }
        }

        info!("签名匹配提示候选软件：{}", matched.join(", "));

        Ok(result)
    }
}

fn join_versions(versions: &BTreeSet<SoftwareVersion>) -> String {
    versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
