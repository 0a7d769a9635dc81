//! 响应缓存
//! URL -> 响应 的共享键值存储，同一键后写覆盖先写；
//! 支持以 MessagePack 格式在多次运行之间落盘

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use rmp_serde::{Serializer, from_slice};
use serde::Serialize;
use tracing::debug;

use super::response::FetchedResponse;
use crate::config::GlobalConfig;
use crate::error::{RsgResult, RsguessError};

/// 缓存文件名
const CACHE_FILE_NAME: &str = "responses.mp";

/// 共享响应缓存，克隆后指向同一份数据
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, Arc<FetchedResponse>>>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 缓存文件路径
    pub fn cache_file(config: &GlobalConfig) -> PathBuf {
        config.cache_dir.join(CACHE_FILE_NAME)
    }

    pub fn get(&self, url: &str) -> Option<Arc<FetchedResponse>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn insert(&self, url: String, response: Arc<FetchedResponse>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, response);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 从本地缓存文件加载，文件不存在时返回空缓存
    pub fn load_from_file(path: &Path) -> RsgResult<Self> {
        if !path.exists() {
            debug!("响应缓存文件不存在，使用空缓存：{}", path.display());
            return Ok(Self::new());
        }

        let cache_data = std::fs::read(path)?;
        let entries: HashMap<String, FetchedResponse> = from_slice(&cache_data)
            .map_err(|e| RsguessError::MsgPackError(format!("反序列化失败：{}", e)))?;

        debug!("响应缓存反序列化成功，条目数：{}", entries.len());

        let entries = entries
            .into_iter()
            .map(|(url, response)| (url, Arc::new(response)))
            .collect();
        Ok(Self {
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// 将缓存写入本地文件
    pub fn save_to_file(&self, path: &Path) -> RsgResult<()> {
        let snapshot: HashMap<String, FetchedResponse> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(url, response)| (url.clone(), response.as_ref().clone()))
            .collect();

        let mut cache_data = Vec::new();
        snapshot
            .serialize(&mut Serializer::new(&mut cache_data))
            .map_err(|e| RsguessError::MsgPackError(format!("序列化失败：{}", e)))?;

        debug!("响应缓存序列化成功，序列化后数据大小：{} 字节", cache_data.len());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, cache_data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let cache = ResponseCache::new();
        let shared = cache.clone();

        shared.insert(
            "http://example.com/".to_string(),
            Arc::new(FetchedResponse::new("http://example.com/", 200, "hello")),
        );

        assert!(cache.contains("http://example.com/"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let cache = ResponseCache::new();
        let url = "http://example.com/a.js".to_string();
        cache.insert(url.clone(), Arc::new(FetchedResponse::new(&url, 404, "")));
        cache.insert(url.clone(), Arc::new(FetchedResponse::new(&url, 200, "ok")));

        assert_eq!(cache.get(&url).unwrap().status_code, 200);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = GlobalConfig {
            cache_dir: dir.path().join("cache"),
            ..GlobalConfig::default()
        };
        let path = ResponseCache::cache_file(&config);

        let cache = ResponseCache::new();
        let response = FetchedResponse::new("http://example.com/", 200, "<html></html>")
            .with_final_url("https://example.com/")
            .with_header("Server", "nginx");
        cache.insert(response.url.clone(), Arc::new(response.clone()));
        cache.save_to_file(&path).unwrap();

        let loaded = ResponseCache::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("http://example.com/").unwrap().as_ref(), &response);
    }

    #[test]
    fn test_missing_file_gives_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::load_from_file(&dir.path().join("absent.mp")).unwrap();
        assert!(cache.is_empty());
    }
}
