//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RsguessError {
    // 资源获取相关错误
    #[error("资源获取失败：{0}")]
    RetrievalFailure(String),
    #[error("网络请求失败：{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("网络错误：{0}")]
    NetworkError(String),

    // 证据相关错误
    #[error("证据冲突：资产 {asset} 不能同时支持和否定版本 {version}")]
    ConflictingEvidence { asset: String, version: String },
    #[error("证据库操作失败：{0}")]
    StoreError(String),

    // 签名相关错误
    #[error("签名解析失败：{0}")]
    SignatureParseError(String),
    #[error("正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("MessagePack序列化/反序列化失败：{0}")]
    MsgPackError(String),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

// 全局Result类型
pub type RsgResult<T> = Result<T, RsguessError>;
