//! 测试辅助：固定响应的获取器与常用夹具

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::backend::{EvidenceStore, InMemoryStore, SoftwarePackage, SoftwareVersion};
use crate::error::{RsgResult, RsguessError};
use crate::resource::{FetchedResponse, HttpFetcher};

/// 返回预设响应的获取器，记录调用次数；未预设的 URL 视为网络错误
#[derive(Debug, Default)]
pub(crate) struct StaticFetcher {
    responses: HashMap<String, FetchedResponse>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_response(mut self, response: FetchedResponse) -> Self {
        self.responses.insert(response.url.clone(), response);
        self
    }

    pub(crate) fn with_page(self, url: &str, status_code: u16, body: &str) -> Self {
        self.with_response(FetchedResponse::new(url, status_code, body))
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl HttpFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> RsgResult<FetchedResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| RsguessError::NetworkError(format!("连接失败：{}", url)))
    }
}

/// 包含 WordPress 5.4/5.5（已索引）与 Drupal 9.1 的证据库
pub(crate) fn sample_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    let wordpress = SoftwarePackage::new("WordPress");
    for name in ["5.4", "5.5"] {
        store
            .store(SoftwareVersion::indexed(wordpress.clone(), name).into())
            .unwrap();
    }
    store
        .store(SoftwareVersion::indexed(SoftwarePackage::new("Drupal"), "9.1").into())
        .unwrap();
    store
}

pub(crate) fn version(package: &str, name: &str) -> SoftwareVersion {
    SoftwareVersion::indexed(SoftwarePackage::new(package), name)
}
