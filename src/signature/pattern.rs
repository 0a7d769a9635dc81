//! 编译后模式模型
//! 签名编译后的可执行结构及其匹配逻辑

use std::collections::HashMap;
use std::sync::Arc;
use regex::Regex;

use super::{MatchInput, Signature, SignatureMatcher};
use crate::backend::SoftwarePackage;

#[derive(Debug, Clone)]
pub enum Matcher {
    Exists, // 存在即匹配（空模式）
    Contains(String), // 包含匹配（忽略大小写，已小写化）
    StartsWith(String), // 前缀匹配（忽略大小写，已小写化）
    Regex(Regex), // 正则匹配（忽略大小写）
}

impl Matcher {
    /// 简单匹配判断
    pub fn is_match(&self, input: &str) -> bool {
        match self {
            Matcher::Exists => true,
            Matcher::Contains(s) => input.to_lowercase().contains(s.as_str()),
            Matcher::StartsWith(s) => input.to_lowercase().starts_with(s.as_str()),
            Matcher::Regex(regex) => regex.is_match(input),
        }
    }

    pub fn is_exists(&self) -> bool {
        matches!(self, Matcher::Exists)
    }
}

/// 编译后的模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub matcher: Matcher,
}

impl CompiledPattern {
    pub fn is_match(&self, input: &str) -> bool {
        self.matcher.is_match(input)
    }
}

/// 编译后的签名
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    pub name: String,
    pub software_packages: Vec<SoftwarePackage>,
    pub url_patterns: Option<Arc<Vec<CompiledPattern>>>,
    pub html_patterns: Option<Arc<Vec<CompiledPattern>>>,
    pub script_patterns: Option<Arc<Vec<CompiledPattern>>>,
    pub meta_patterns: Option<Arc<HashMap<String, Vec<CompiledPattern>>>>,
    pub header_patterns: Option<Arc<HashMap<String, Vec<CompiledPattern>>>>,
}

impl CompiledSignature {
    fn any_match(patterns: &Option<Arc<Vec<CompiledPattern>>>, input: &str) -> bool {
        patterns
            .as_ref()
            .is_some_and(|patterns| patterns.iter().any(|p| p.is_match(input)))
    }

    fn match_url(&self, input: &MatchInput<'_>) -> bool {
        Self::any_match(&self.url_patterns, &input.response.final_url)
    }

    fn match_html(&self, input: &MatchInput<'_>) -> bool {
        Self::any_match(&self.html_patterns, &input.document.text)
    }

    fn match_scripts(&self, input: &MatchInput<'_>) -> bool {
        input
            .document
            .script_srcs
            .iter()
            .any(|src| Self::any_match(&self.script_patterns, src))
    }

    fn match_meta(&self, input: &MatchInput<'_>) -> bool {
        let Some(meta_patterns) = &self.meta_patterns else {
            return false;
        };

        meta_patterns.iter().any(|(name, patterns)| {
            input
                .document
                .meta_tags
                .iter()
                .filter(|tag| &tag.name == name)
                .any(|tag| {
                    patterns.iter().any(|p| match tag.content.as_deref() {
                        Some(content) => p.is_match(content),
                        None => p.matcher.is_exists(),
                    })
                })
        })
    }

    fn match_headers(&self, input: &MatchInput<'_>) -> bool {
        let Some(header_patterns) = &self.header_patterns else {
            return false;
        };

        header_patterns.iter().any(|(name, patterns)| {
            let Some(values) = input.response.headers.get(name) else {
                return false;
            };
            patterns.iter().any(|p| p.matcher.is_exists() || values.iter().any(|v| p.is_match(v)))
        })
    }
}

impl Signature for CompiledSignature {
    fn name(&self) -> &str {
        &self.name
    }

    fn software_packages(&self) -> &[SoftwarePackage] {
        &self.software_packages
    }

    fn matches(&self, input: &MatchInput<'_>) -> bool {
        self.match_url(input)
            || self.match_headers(input)
            || self.match_meta(input)
            || self.match_scripts(input)
            || self.match_html(input)
    }
}

/// 编译后的签名库（按名称排序）
#[derive(Debug, Clone, Default)]
pub struct CompiledSignatureLibrary {
    pub signatures: Vec<CompiledSignature>,
}

impl CompiledSignatureLibrary {
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CompiledSignature> {
        self.signatures.iter().find(|s| s.name == name)
    }
}

impl SignatureMatcher for CompiledSignatureLibrary {
    fn signatures(&self) -> Box<dyn Iterator<Item = &dyn Signature> + '_> {
        Box::new(self.signatures.iter().map(|s| s as &dyn Signature))
    }
}
