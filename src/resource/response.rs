//! 已获取的 HTTP 响应

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// 已获取的 HTTP 响应（可序列化，用于跨运行的响应缓存）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedResponse {
    /// 请求的 URL
    pub url: String,
    /// 跳转后的最终 URL
    pub final_url: String,
    pub status_code: u16,
    /// Header 名称统一小写
    #[serde(default)]
    pub headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// 无跳转、无 Header 的响应
    pub fn new(url: impl Into<String>, status_code: u16, body: impl Into<Vec<u8>>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status_code,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_final_url(mut self, final_url: impl Into<String>) -> Self {
        self.final_url = final_url.into();
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// 获取首个非空 Header 值
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.iter().find(|v| !v.is_empty()))
            .map(String::as_str)
    }
}
