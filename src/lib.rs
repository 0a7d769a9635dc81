//! rsguess - 基于证据聚合的 Web 软件版本识别
//!
//! 获取远程资源，通过 generator 标签与技术签名提取候选 (软件, 版本)，
//! 再按加权证据强度对候选猜测排序。

// 导出全局错误类型
pub use self::error::{RsguessError, RsgResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, DocumentParser, GlobalConfig, MatchWeights};

// 导出证据库模块核心接口
pub use self::backend::{
    Entity, EvidenceStore, InMemoryStore, SoftwarePackage, SoftwareVersion, StoreLoader
};

// 导出签名模块核心接口
pub use self::signature::{
    CompiledSignatureLibrary, MatchInput, Signature, SignatureCompiler, SignatureLoader, SignatureMatcher
};

// 导出提取模块核心接口
pub use self::extractor::{Extractor, HtmlExtractor, ParsedDocument};

// 导出资源模块核心接口
pub use self::resource::{
    FetchedResponse, HttpFetcher, Persistor, ReqwestFetcher, Resource, ResourceRecord, ResponseCache, RetrievalState
};

// 导出分析模块核心接口
pub use self::analysis::{more_recent_version, Asset, Guess, GuessBoard, GuessDebug, GuessRecord};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod backend;
pub mod signature;
pub mod extractor;
pub mod resource;
pub mod analysis;
pub mod utils;

#[cfg(test)]
mod test_support;
