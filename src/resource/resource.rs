//! 资源：可从 URL 获取的任意文件
//! 每个资源实例最多发起一次获取，结果以三态保存

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use super::cache::ResponseCache;
use super::fetcher::HttpFetcher;
use super::response::FetchedResponse;
use crate::error::{RsgResult, RsguessError};

/// 获取状态
#[derive(Debug, Clone, Default)]
pub enum RetrievalState {
    #[default]
    NotAttempted,
    Failed,
    Succeeded(Arc<FetchedResponse>),
}

impl RetrievalState {
    pub fn is_attempted(&self) -> bool {
        !matches!(self, RetrievalState::NotAttempted)
    }

    /// 获取成功且状态码为 200
    pub fn is_success(&self) -> bool {
        matches!(self, RetrievalState::Succeeded(response) if response.status_code == 200)
    }

    pub fn response(&self) -> Option<&FetchedResponse> {
        match self {
            RetrievalState::Succeeded(response) => Some(response.as_ref()),
            _ => None,
        }
    }
}

/// 资源的序列化形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub url: String,
    pub webroot_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    pub success: bool,
}

/// 资源
pub struct Resource {
    url: String,
    fetcher: Arc<dyn HttpFetcher>,
    cache: Option<ResponseCache>,
    state: RetrievalState,
}

impl Resource {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
            cache: None,
            state: RetrievalState::NotAttempted,
        }
    }

    /// 使用共享响应缓存
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 当前获取状态（不会触发获取）
    pub fn retrieval_state(&self) -> &RetrievalState {
        &self.state
    }

    pub fn is_retrieved(&self) -> bool {
        self.state.is_attempted()
    }

    /// 获取资源；已尝试过则直接返回既有结果
    pub fn retrieve(&mut self) -> &RetrievalState {
        if !self.state.is_attempted() {
            self.state = self.attempt();
        }
        &self.state
    }

    /// 确保已获取，并返回成功获取的响应
    pub fn ensure_retrieved(&mut self) -> RsgResult<&FetchedResponse> {
        self.retrieve();
        match &self.state {
            RetrievalState::Succeeded(response) => Ok(response.as_ref()),
            _ => Err(RsguessError::RetrievalFailure(self.url.clone())),
        }
    }

    /// 获取成功且状态码为 200
    pub fn success(&mut self) -> bool {
        self.retrieve().is_success()
    }

    pub fn content(&mut self) -> RsgResult<&[u8]> {
        Ok(self.ensure_retrieved()?.body.as_slice())
    }

    /// 跳转后的最终 URL
    pub fn final_url(&mut self) -> RsgResult<&str> {
        Ok(self.ensure_retrieved()?.final_url.as_str())
    }

    pub fn status_code(&mut self) -> RsgResult<u16> {
        Ok(self.ensure_retrieved()?.status_code)
    }

    /// 资源在站点根目录下的路径
    pub fn webroot_path(&self) -> String {
        Url::parse(&self.url)
            .map(|url| url.path().to_string())
            .unwrap_or_default()
    }

    pub fn serialize(&mut self) -> ResourceRecord {
        let success = self.success();
        let status_code = if success {
            self.status_code().ok()
        } else {
            None
        };
        ResourceRecord {
            url: self.url.clone(),
            webroot_path: self.webroot_path(),
            status_code,
            success,
        }
    }

    fn attempt(&self) -> RetrievalState {
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&self.url)) {
            info!("使用资源的缓存版本：{}", self.url);
            return RetrievalState::Succeeded(cached);
        }

        info!("获取资源：{}", self.url);

        match self.fetcher.fetch(&self.url) {
            Ok(response) => {
                let response = Arc::new(response);
                if let Some(cache) = &self.cache {
                    cache.insert(self.url.clone(), Arc::clone(&response));
                }
                if response.status_code != 200 {
                    info!("资源获取失败：{}，状态码：{}", self.url, response.status_code);
                }
                RetrievalState::Succeeded(response)
            }
            Err(e) => {
                info!("资源获取失败：{}，原因：{}", self.url, e);
                RetrievalState::Failed
            }
        }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url)
            .field("state", &self.state)
            .finish()
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticFetcher;

    const URL: &str = "http://example.com/wp-includes/js/jquery.js";

    #[test]
    fn test_accessors_retrieve_at_most_once() {
        let fetcher = StaticFetcher::new().with_page(URL, 200, "jQuery").shared();
        let mut resource = Resource::new(URL, fetcher.clone());

        assert!(!resource.is_retrieved());
        assert_eq!(resource.content().unwrap(), b"jQuery");
        resource.retrieve();
        assert_eq!(resource.status_code().unwrap(), 200);
        assert_eq!(resource.final_url().unwrap(), URL);
        assert!(resource.success());

        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_explicit_retrieve_then_accessors() {
        let fetcher = StaticFetcher::new().with_page(URL, 200, "jQuery").shared();
        let mut resource = Resource::new(URL, fetcher.clone());

        assert!(resource.retrieve().is_success());
        assert!(resource.retrieve().is_success());
        assert_eq!(resource.content().unwrap(), b"jQuery");
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_redirected_fetch_reports_final_url() {
        let redirected = "https://cdn.example.com/jquery.min.js";
        let fetcher = StaticFetcher::new()
            .with_response(FetchedResponse::new(URL, 200, "jQuery").with_final_url(redirected))
            .shared();
        let cache = ResponseCache::new();
        let mut resource = Resource::new(URL, fetcher).with_cache(cache.clone());

        let final_url = resource.final_url().unwrap().to_string();
        assert_eq!(final_url, redirected);
        assert_ne!(final_url, resource.url());
        assert_eq!(resource.url(), URL);
        // 缓存键与站点路径仍以请求 URL 为准
        assert!(cache.contains(URL));
        assert!(!cache.contains(redirected));
        assert_eq!(resource.serialize().webroot_path, "/wp-includes/js/jquery.js");
    }

    #[test]
    fn test_cached_response_is_adopted_without_network() {
        let fetcher = StaticFetcher::new().shared();
        let cache = ResponseCache::new();
        cache.insert(
            URL.to_string(),
            Arc::new(FetchedResponse::new(URL, 200, "cached")),
        );

        let mut resource = Resource::new(URL, fetcher.clone()).with_cache(cache);

        assert!(resource.success());
        assert_eq!(resource.content().unwrap(), b"cached");
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_successful_fetch_populates_cache() {
        let fetcher = StaticFetcher::new().with_page(URL, 200, "jQuery").shared();
        let cache = ResponseCache::new();

        let mut first = Resource::new(URL, fetcher.clone()).with_cache(cache.clone());
        assert!(first.success());
        assert!(cache.contains(URL));

        let mut second = Resource::new(URL, fetcher.clone()).with_cache(cache);
        assert!(second.success());
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_non_200_is_failure_but_cached() {
        let fetcher = StaticFetcher::new().with_page(URL, 404, "not found").shared();
        let cache = ResponseCache::new();
        let mut resource = Resource::new(URL, fetcher.clone()).with_cache(cache.clone());

        assert!(!resource.success());
        assert_eq!(resource.status_code().unwrap(), 404);
        assert!(cache.contains(URL));

        let mut again = Resource::new(URL, fetcher.clone()).with_cache(cache);
        assert!(!again.success());
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_network_error_marks_failure_and_skips_cache() {
        let fetcher = StaticFetcher::new().shared();
        let cache = ResponseCache::new();
        let mut resource = Resource::new(URL, fetcher.clone()).with_cache(cache.clone());

        assert!(!resource.success());
        assert!(matches!(resource.retrieval_state(), RetrievalState::Failed));
        assert!(matches!(
            resource.content(),
            Err(RsguessError::RetrievalFailure(_))
        ));
        assert!(matches!(
            resource.final_url(),
            Err(RsguessError::RetrievalFailure(_))
        ));
        assert!(cache.is_empty());

        // 失败同样是终态，不会自动重试
        resource.retrieve();
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_serialize_shapes() {
        let fetcher = StaticFetcher::new().with_page(URL, 200, "jQuery").shared();
        let mut ok = Resource::new(URL, fetcher.clone());
        let record = ok.serialize();
        assert_eq!(record.status_code, Some(200));
        assert!(record.success);
        assert_eq!(record.webroot_path, "/wp-includes/js/jquery.js");

        let mut failed = Resource::new("http://example.com/missing", fetcher);
        let json = serde_json::to_value(failed.serialize()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "url": "http://example.com/missing",
                "webroot_path": "/missing",
                "success": false,
            })
        );
    }

    #[test]
    fn test_equality_by_url() {
        let fetcher = StaticFetcher::new().shared();
        let a = Resource::new(URL, fetcher.clone());
        let b = Resource::new(URL, fetcher);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), URL);
    }
}
