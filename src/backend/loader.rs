//! 证据库加载器
//! 负责从 JSON 快照文件加载内存证据库，或将其写回

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::memory::InMemoryStore;
use super::model::{SoftwarePackage, SoftwareVersion};
use super::EvidenceStore;
use crate::error::RsgResult;

/// 快照中的版本条目
#[derive(Debug, Clone, Deserialize, Serialize)]
struct VersionEntry {
    name: String,
    #[serde(default)]
    indexed: bool,
}

/// 快照中的软件包条目
#[derive(Debug, Clone, Deserialize, Serialize)]
struct PackageEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(default)]
    versions: Vec<VersionEntry>,
}

/// 证据库快照
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct StoreSnapshot {
    #[serde(default)]
    packages: Vec<PackageEntry>,
}

/// 证据库加载器
pub struct StoreLoader;

impl StoreLoader {
    /// 从 JSON 文件加载
    pub fn load_from_file(path: &Path) -> RsgResult<InMemoryStore> {
        let data = std::fs::read_to_string(path)?;
        Self::load_from_str(&data)
    }

    /// 从 JSON 字符串加载
    pub fn load_from_str(data: &str) -> RsgResult<InMemoryStore> {
        let snapshot: StoreSnapshot = serde_json::from_str(data)?;
        let store = InMemoryStore::new();
        let mut version_count = 0;

        for entry in snapshot.packages {
            let package = SoftwarePackage {
                name: entry.name,
                vendor: entry.vendor,
            };
            store.store(package.clone().into())?;

            for version in entry.versions {
                let mut software_version = SoftwareVersion::new(package.clone(), version.name);
                software_version.indexed = version.indexed;
                store.store(software_version.into())?;
                version_count += 1;
            }
        }

        debug!(
            "证据库加载完成，软件包数：{}，版本数：{}",
            store.package_count()?,
            version_count
        );

        Ok(store)
    }

    /// 将证据库写回 JSON 文件
    pub fn save_to_file(store: &InMemoryStore, path: &Path) -> RsgResult<()> {
        let mut snapshot = StoreSnapshot::default();
        for package in store.packages()? {
            let versions = store
                .retrieve_versions(&package, false)?
                .into_iter()
                .map(|version| VersionEntry {
                    name: version.name,
                    indexed: version.indexed,
                })
                .collect();
            snapshot.packages.push(PackageEntry {
                name: package.name,
                vendor: package.vendor,
                versions,
            });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(&snapshot)?)?;
        Ok(())
    }
}
