//! 签名模块：技术指纹的定义、编译与匹配
pub mod model;
pub mod pattern;
pub mod compiler;
pub mod loader;

pub use self::model::{SignatureLibrary, SignatureRule};
pub use self::pattern::{CompiledPattern, CompiledSignature, CompiledSignatureLibrary, Matcher};
pub use self::compiler::SignatureCompiler;
pub use self::loader::SignatureLoader;

use crate::backend::SoftwarePackage;
use crate::extractor::ParsedDocument;
use crate::resource::FetchedResponse;

/// 匹配输入：已获取的响应及其解析后的文档
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub response: &'a FetchedResponse,
    pub document: &'a ParsedDocument,
}

impl<'a> MatchInput<'a> {
    pub fn new(response: &'a FetchedResponse, document: &'a ParsedDocument) -> Self {
        Self { response, document }
    }
}

/// 单个技术签名
pub trait Signature: Send + Sync {
    fn name(&self) -> &str;

    /// 签名对应的软件包（零个或多个）
    fn software_packages(&self) -> &[SoftwarePackage];

    fn matches(&self, input: &MatchInput<'_>) -> bool;
}

/// 签名匹配器：提供全部已知签名
pub trait SignatureMatcher: Send + Sync {
    fn signatures(&self) -> Box<dyn Iterator<Item = &dyn Signature> + '_>;

    /// 命中输入的全部签名
    fn matching_signatures<'s>(&'s self, input: &MatchInput<'_>) -> Vec<&'s dyn Signature> {
        self.signatures()
            .filter(|signature| signature.matches(input))
            .collect()
    }
}
