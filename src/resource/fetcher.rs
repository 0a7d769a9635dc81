//! HTTP 获取器
//! `HttpFetcher` 是网络边界，`ReqwestFetcher` 为阻塞式生产实现

use std::time::Duration;
use reqwest::blocking::Client;
use tracing::debug;

use super::response::FetchedResponse;
use crate::config::GlobalConfig;
use crate::error::RsgResult;
use crate::utils::HeaderConverter;

/// HTTP 获取接口
///
/// 任何网络层错误（连接失败、响应格式错误、编码错误）都以 `Err` 返回，
/// 由调用方转换为资源的失败状态。
pub trait HttpFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> RsgResult<FetchedResponse>;
}

/// 基于 reqwest 阻塞客户端的获取器
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// 按配置创建（超时、User-Agent）
    pub fn new(config: &GlobalConfig) -> RsgResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn fetch(&self, url: &str) -> RsgResult<FetchedResponse> {
        let response = self.client.get(url).send()?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = HeaderConverter::to_hashmap(response.headers());
        let body = response.bytes()?.to_vec();

        debug!(
            "获取完成：{} -> {}，状态码：{}，响应体：{} 字节",
            url,
            final_url,
            status_code,
            body.len()
        );

        Ok(FetchedResponse {
            url: url.to_string(),
            final_url,
            status_code,
            headers,
            body,
        })
    }
}
