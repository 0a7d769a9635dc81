//! 提取模块：HTML 分词与候选版本提取
pub mod html_extractor;
pub mod extractor;

pub use self::html_extractor::{HtmlExtractor, MetaTag, ParsedDocument, GENERATOR_META_NAME};
pub use self::extractor::Extractor;
