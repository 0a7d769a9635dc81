//! 内存证据库
//! 以有序映射保存软件包与版本，读写锁保护，可在多线程间共享

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::model::{Entity, SoftwarePackage, SoftwareVersion};
use super::EvidenceStore;
use crate::error::{RsgResult, RsguessError};

#[derive(Debug, Clone)]
struct PackageEntry {
    package: SoftwarePackage,
    versions: BTreeMap<String, SoftwareVersion>,
}

impl PackageEntry {
    fn new(package: SoftwarePackage) -> Self {
        Self {
            package,
            versions: BTreeMap::new(),
        }
    }
}

/// 内存证据库
#[derive(Debug, Default)]
pub struct InMemoryStore {
    packages: RwLock<BTreeMap<String, PackageEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已知软件包数量
    pub fn package_count(&self) -> RsgResult<usize> {
        Ok(self.read()?.len())
    }

    /// 全部软件包（按名称排序）
    pub fn packages(&self) -> RsgResult<Vec<SoftwarePackage>> {
        Ok(self.read()?.values().map(|entry| entry.package.clone()).collect())
    }

    fn read(&self) -> RsgResult<RwLockReadGuard<'_, BTreeMap<String, PackageEntry>>> {
        self.packages
            .read()
            .map_err(|e| RsguessError::StoreError(format!("读锁获取失败：{}", e)))
    }

    fn write(&self) -> RsgResult<RwLockWriteGuard<'_, BTreeMap<String, PackageEntry>>> {
        self.packages
            .write()
            .map_err(|e| RsguessError::StoreError(format!("写锁获取失败：{}", e)))
    }

    fn store_package(
        packages: &mut BTreeMap<String, PackageEntry>,
        package: SoftwarePackage,
    ) -> bool {
        match packages.get_mut(&package.name) {
            Some(entry) if entry.package.vendor == package.vendor => false,
            Some(entry) => {
                entry.package = package;
                true
            }
            None => {
                packages.insert(package.name.clone(), PackageEntry::new(package));
                true
            }
        }
    }

    fn store_version(
        packages: &mut BTreeMap<String, PackageEntry>,
        version: SoftwareVersion,
    ) -> bool {
        let mut changed = false;
        let entry = packages
            .entry(version.software_package.name.clone())
            .or_insert_with(|| {
                changed = true;
                PackageEntry::new(version.software_package.clone())
            });

        match entry.versions.get_mut(&version.name) {
            Some(existing) if existing.indexed == version.indexed => changed,
            Some(existing) => {
                existing.indexed = version.indexed;
                true
            }
            None => {
                entry.versions.insert(version.name.clone(), version);
                true
            }
        }
    }
}

impl EvidenceStore for InMemoryStore {
    fn mark_indexed(&self, version: &SoftwareVersion, indexed: bool) -> RsgResult<bool> {
        let mut packages = self.write()?;
        let Some(existing) = packages
            .get_mut(&version.software_package.name)
            .and_then(|entry| entry.versions.get_mut(&version.name))
        else {
            debug!("标记索引状态时未找到版本：{}", version);
            return Ok(false);
        };

        if existing.indexed == indexed {
            return Ok(false);
        }
        existing.indexed = indexed;
        Ok(true)
    }

    fn retrieve_versions(
        &self,
        package: &SoftwarePackage,
        indexed_only: bool,
    ) -> RsgResult<BTreeSet<SoftwareVersion>> {
        let packages = self.read()?;
        let Some(entry) = packages.get(&package.name) else {
            return Ok(BTreeSet::new());
        };

        Ok(entry
            .versions
            .values()
            .filter(|version| !indexed_only || version.indexed)
            .cloned()
            .collect())
    }

    fn retrieve_packages_by_name(&self, name: &str) -> RsgResult<BTreeSet<SoftwarePackage>> {
        let name = name.trim().to_lowercase();
        Ok(self
            .read()?
            .values()
            .filter(|entry| entry.package.name.to_lowercase() == name)
            .map(|entry| entry.package.clone())
            .collect())
    }

    fn store(&self, entity: Entity) -> RsgResult<bool> {
        let mut packages = self.write()?;
        let changed = match entity {
            Entity::Package(package) => Self::store_package(&mut packages, package),
            Entity::Version(version) => Self::store_version(&mut packages, version),
        };
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wordpress() -> SoftwarePackage {
        SoftwarePackage::new("WordPress")
    }

    #[test]
    fn test_store_reports_changes() {
        let store = InMemoryStore::new();

        assert!(store.store(wordpress().into()).unwrap());
        assert!(!store.store(wordpress().into()).unwrap());

        let version = SoftwareVersion::new(wordpress(), "5.4");
        assert!(store.store(version.clone().into()).unwrap());
        assert!(!store.store(version.into()).unwrap());

        // 同一版本，索引标记改变
        assert!(store.store(SoftwareVersion::indexed(wordpress(), "5.4").into()).unwrap());
    }

    #[test]
    fn test_storing_version_registers_package() {
        let store = InMemoryStore::new();
        let version = SoftwareVersion::indexed(SoftwarePackage::new("Joomla"), "4.0");

        assert!(store.store(version.into()).unwrap());
        assert_eq!(store.package_count().unwrap(), 1);
        assert_eq!(store.retrieve_packages_by_name("joomla").unwrap().len(), 1);
    }

    #[test]
    fn test_retrieve_versions_indexed_only() {
        let store = InMemoryStore::new();
        store.store(SoftwareVersion::indexed(wordpress(), "5.4").into()).unwrap();
        store.store(SoftwareVersion::new(wordpress(), "5.5").into()).unwrap();

        let indexed = store.retrieve_versions(&wordpress(), true).unwrap();
        let all = store.retrieve_versions(&wordpress(), false).unwrap();

        assert_eq!(indexed.len(), 1);
        assert_eq!(all.len(), 2);
        assert!(store
            .retrieve_versions(&SoftwarePackage::new("Ghost"), false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_mark_indexed() {
        let store = InMemoryStore::new();
        let version = SoftwareVersion::new(wordpress(), "5.5");
        store.store(version.clone().into()).unwrap();

        assert!(store.mark_indexed(&version, true).unwrap());
        assert!(!store.mark_indexed(&version, true).unwrap());
        assert_eq!(store.retrieve_versions(&wordpress(), true).unwrap().len(), 1);

        let unknown = SoftwareVersion::new(wordpress(), "0.1");
        assert!(!store.mark_indexed(&unknown, true).unwrap());
    }

    #[test]
    fn test_packages_by_name_is_case_insensitive() {
        let store = InMemoryStore::new();
        store.store(wordpress().into()).unwrap();

        assert_eq!(store.retrieve_packages_by_name("WORDPRESS").unwrap().len(), 1);
        assert!(store.retrieve_packages_by_name("Word").unwrap().is_empty());
    }
}
