//! 资源落盘
//! 将成功获取的资源内容写入 `<base>/<scheme>_<host>/<清理后的路径>`

use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use super::resource::Resource;
use crate::error::RsgResult;
use crate::utils::derive_file_name;

/// 资源落盘工具
pub struct Persistor;

impl Persistor {
    /// 持久化资源，返回写入路径；未（成功）获取的资源跳过并返回 `None`
    ///
    /// 不会触发获取：只有已经成功获取（状态码 200）的资源才会被写入。
    pub fn persist(resource: &Resource, base_path: &Path) -> RsgResult<Option<PathBuf>> {
        let state = resource.retrieval_state();
        let response = match state.response() {
            Some(response) if state.is_success() => response,
            _ => {
                info!("跳过未（成功）获取的资源：{}", resource.url());
                return Ok(None);
            }
        };

        let path = Self::storage_path(resource.url(), base_path)?;
        info!("持久化资源 {} 到 {}", resource.url(), path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &response.body)?;

        Ok(Some(path))
    }

    /// 持久化资源，写入失败只记录警告
    pub fn persist_or_warn(resource: &Resource, base_path: &Path) -> Option<PathBuf> {
        match Self::persist(resource, base_path) {
            Ok(path) => path,
            Err(e) => {
                warn!("无法持久化资源 {} 到 {}：{}", resource.url(), base_path.display(), e);
                None
            }
        }
    }

    /// 计算资源的存储路径
    pub fn storage_path(url: &str, base_path: &Path) -> RsgResult<PathBuf> {
        let parsed = Url::parse(url)?;

        let mut netloc = parsed.host_str().unwrap_or_default().to_string();
        if let Some(port) = parsed.port() {
            netloc.push_str(&format!(":{}", port));
        }

        let path = parsed.path();
        let file_name = derive_file_name(path.strip_prefix('/').unwrap_or(path));

        Ok(base_path
            .join(format!("{}_{}", parsed.scheme(), netloc))
            .join(file_name))
    }
}
