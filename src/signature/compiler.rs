//! 签名编译器核心
//! 将原始签名编译为可执行的匹配模式（修复 Wappalyzer 正则的兼容性问题）

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use regex::Regex;
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, warn};

use super::model::{SignatureLibrary, SignatureRule};
use super::pattern::{CompiledPattern, CompiledSignature, CompiledSignatureLibrary, Matcher};
use crate::backend::SoftwarePackage;
use crate::error::{RsgResult, RsguessError};

/// 模式后缀标记（`\;version:\1`、`\;confidence:50` 等）
const SUFFIX_MARKERS: [&str; 3] = ["\\;", ";version:", ";confidence:"];

/// 签名编译器
pub struct SignatureCompiler;

impl SignatureCompiler {
    /// 编译签名库
    pub fn compile(library: &SignatureLibrary) -> RsgResult<CompiledSignatureLibrary> {
        let start = Instant::now();
        let mut stats = CompileStats::default();

        let mut signatures = Vec::with_capacity(library.signatures.len());
        for (name, rule) in &library.signatures {
            signatures.push(Self::compile_signature(name, rule, &mut stats)?);
        }

        debug!("签名编译完成，共{}条，总耗时{:?}", signatures.len(), start.elapsed());
        debug!(
            "编译统计：URL模式{}条、HTML模式{}条、Script模式{}条、Header模式{}条、Meta模式{}条、跳过{}条",
            stats.url_count,
            stats.html_count,
            stats.script_count,
            stats.header_count,
            stats.meta_count,
            stats.skipped_count
        );

        Ok(CompiledSignatureLibrary { signatures })
    }

    /// 编译单个签名
    fn compile_signature(
        name: &str,
        rule: &SignatureRule,
        stats: &mut CompileStats,
    ) -> RsgResult<CompiledSignature> {
        let url_patterns = Self::compile_pattern_list(rule.url.as_ref(), stats, "url")?;
        let html_patterns = Self::compile_pattern_list(rule.html.as_ref(), stats, "html")?;
        let script_patterns = Self::compile_script_patterns(rule, stats)?;
        let meta_patterns = Self::compile_keyed_patterns(rule.meta.as_ref(), stats, "meta")?;
        let header_patterns = Self::compile_keyed_patterns(rule.headers.as_ref(), stats, "header")?;

        let software_packages = rule
            .package_names(name)
            .into_iter()
            .map(SoftwarePackage::new)
            .collect();

        Ok(CompiledSignature {
            name: name.to_string(),
            software_packages,
            url_patterns: url_patterns.map(Arc::new),
            html_patterns: html_patterns.map(Arc::new),
            script_patterns: script_patterns.map(Arc::new),
            meta_patterns: meta_patterns.map(Arc::new),
            header_patterns: header_patterns.map(Arc::new),
        })
    }

    /// 编译列表型模式（url/html/script）
    fn compile_pattern_list(
        value: Option<&Value>,
        stats: &mut CompileStats,
        pattern_type: &str,
    ) -> RsgResult<Option<Vec<CompiledPattern>>> {
        let Some(value) = value else {
            return Ok(None);
        };

        let raw_patterns: Vec<&str> = match value {
            Value::String(s) => vec![s.as_str()],
            Value::Array(arr) => arr.iter().filter_map(Value::as_str).collect(),
            _ => {
                return Err(RsguessError::SignatureParseError(format!(
                    "{}模式类型不支持：{}",
                    pattern_type, value
                )));
            }
        };

        let mut patterns = Vec::with_capacity(raw_patterns.len());
        for raw in raw_patterns {
            match Self::compile_single_pattern(raw) {
                Ok(pattern) => {
                    patterns.push(pattern);
                    stats.update(pattern_type, 1);
                }
                Err(e) => {
                    warn!("跳过无法编译的{}模式 {:?}：{}", pattern_type, raw, e);
                    stats.skipped_count += 1;
                }
            }
        }

        if patterns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(patterns))
        }
    }

    /// 编译Script模式（合并scripts和scriptSrc）
    fn compile_script_patterns(
        rule: &SignatureRule,
        stats: &mut CompileStats,
    ) -> RsgResult<Option<Vec<CompiledPattern>>> {
        let mut patterns = Vec::new();

        for value in [rule.scripts.as_ref(), rule.script_src.as_ref()] {
            if let Some(mut compiled) = Self::compile_pattern_list(value, stats, "script")? {
                patterns.append(&mut compiled);
            }
        }

        if patterns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(patterns))
        }
    }

    /// 编译键值对型模式（meta/header），键统一小写
    fn compile_keyed_patterns(
        value: Option<&HashMap<String, Value>>,
        stats: &mut CompileStats,
        pattern_type: &str,
    ) -> RsgResult<Option<HashMap<String, Vec<CompiledPattern>>>> {
        let Some(value) = value else {
            return Ok(None);
        };

        let mut keyed_patterns = HashMap::new();
        for (key, val) in value {
            if let Some(patterns) = Self::compile_pattern_list(Some(val), stats, pattern_type)? {
                keyed_patterns.insert(key.trim().to_lowercase(), patterns);
            }
        }

        if keyed_patterns.is_empty() {
            Ok(None)
        } else {
            Ok(Some(keyed_patterns))
        }
    }

    /// 编译单个模式
    ///
    /// 空模式为存在匹配；无正则元字符的模式降级为包含/前缀匹配；其余编译为忽略大小写的正则。
    pub fn compile_single_pattern(raw_pattern: &str) -> RsgResult<CompiledPattern> {
        static LOOK_AROUND_REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\(\?<?[=!][^()]*\)").expect("look-around pattern is valid")
        });

        // 1. 去除后缀标记
        let mut cleaned = raw_pattern;
        for marker in SUFFIX_MARKERS {
            if let Some(index) = cleaned.find(marker) {
                cleaned = &cleaned[..index];
            }
        }
        let mut cleaned = cleaned.trim().to_string();

        // 2. 移除PCRE分隔符
        if cleaned.len() >= 2 && cleaned.starts_with('/') && cleaned.ends_with('/') {
            cleaned = cleaned[1..cleaned.len() - 1].to_string();
        }

        // 3. 移除环视语法、修复字符集连字符与未闭合分组
        cleaned = LOOK_AROUND_REGEX.replace_all(&cleaned, "").to_string();
        cleaned = Self::fix_charset_hyphen(&cleaned);
        cleaned = Self::fix_unbalanced_groups(&cleaned);

        // 4. 选择匹配器
        let matcher = if cleaned.is_empty() {
            Matcher::Exists
        } else if is_literal(&cleaned) {
            Matcher::Contains(cleaned.to_lowercase())
        } else if let Some(prefix) = cleaned.strip_prefix('^').filter(|p| !p.is_empty() && is_literal(p)) {
            Matcher::StartsWith(prefix.to_lowercase())
        } else {
            Matcher::Regex(Regex::new(&format!("(?i){}", cleaned))?)
        };

        Ok(CompiledPattern { matcher })
    }

    /// 修复字符集中紧邻类简写（`\w`、`\d` 等）的连字符
    fn fix_charset_hyphen(s: &str) -> String {
        let chars: Vec<char> = s.chars().collect();
        let mut result = String::with_capacity(s.len());
        let mut in_charset = false;
        let mut prev_shorthand = false;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '\\' if i + 1 < chars.len() => {
                    let next = chars[i + 1];
                    result.push(c);
                    result.push(next);
                    prev_shorthand = in_charset && is_shorthand_class(next);
                    i += 2;
                    continue;
                }
                '[' if !in_charset => {
                    in_charset = true;
                    result.push(c);
                }
                ']' if in_charset => {
                    in_charset = false;
                    result.push(c);
                }
                '-' if in_charset => {
                    let next_shorthand = chars.get(i + 1) == Some(&'\\')
                        && chars.get(i + 2).is_some_and(|n| is_shorthand_class(*n));
                    if prev_shorthand || next_shorthand {
                        result.push_str("\\-");
                    } else {
                        result.push('-');
                    }
                }
                _ => result.push(c),
            }
            prev_shorthand = false;
            i += 1;
        }

        result
    }

    /// 修复未闭合分组：丢弃多余的 `)`，移除末尾未闭合的 `(`
    fn fix_unbalanced_groups(s: &str) -> String {
        let mut chars = s.chars();
        let mut result: Vec<char> = Vec::with_capacity(s.len());
        let mut open_positions = Vec::new();
        let mut in_charset = false;

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    result.push(c);
                    if let Some(next) = chars.next() {
                        result.push(next);
                    }
                }
                '[' if !in_charset => {
                    in_charset = true;
                    result.push(c);
                }
                ']' if in_charset => {
                    in_charset = false;
                    result.push(c);
                }
                '(' if !in_charset => {
                    open_positions.push(result.len());
                    result.push(c);
                }
                ')' if !in_charset => {
                    if open_positions.pop().is_some() {
                        result.push(c);
                    }
                }
                _ => result.push(c),
            }
        }

        for position in open_positions.into_iter().rev() {
            result.remove(position);
        }

        result.into_iter().collect()
    }
}

fn is_shorthand_class(c: char) -> bool {
    matches!(c, 'd' | 'D' | 'w' | 'W' | 's' | 'S')
}

/// 不含任何正则元字符
fn is_literal(s: &str) -> bool {
    !s.chars().any(|c| "\\.+*?()[]{}^$|".contains(c))
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    url_count: usize,
    html_count: usize,
    script_count: usize,
    header_count: usize,
    meta_count: usize,
    skipped_count: usize,
}

impl CompileStats {
    fn update(&mut self, pattern_type: &str, count: usize) {
        match pattern_type {
            "url" => self.url_count += count,
            "html" => self.html_count += count,
            "script" => self.script_count += count,
            "header" => self.header_count += count,
            "meta" => self.meta_count += count,
            _ => {}
        }
    }
}
