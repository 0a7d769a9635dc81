//! 证据库数据模型
//! 软件包与软件版本，身份只由名称决定

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

/// 软件包（如某个 CMS 或前端库）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwarePackage {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
}

impl SoftwarePackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vendor: None,
        }
    }
}

impl PartialEq for SoftwarePackage {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SoftwarePackage {}

impl Hash for SoftwarePackage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for SoftwarePackage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SoftwarePackage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for SoftwarePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// 软件版本
/// `indexed` 是状态而非身份：只有 (软件包, 版本名) 参与比较和哈希
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftwareVersion {
    pub software_package: SoftwarePackage,
    pub name: String,
    #[serde(default)]
    pub indexed: bool,
}

impl SoftwareVersion {
    pub fn new(software_package: SoftwarePackage, name: impl Into<String>) -> Self {
        Self {
            software_package,
            name: name.into(),
            indexed: false,
        }
    }

    /// 构造已索引版本
    pub fn indexed(software_package: SoftwarePackage, name: impl Into<String>) -> Self {
        Self {
            indexed: true,
            ..Self::new(software_package, name)
        }
    }
}

impl PartialEq for SoftwareVersion {
    fn eq(&self, other: &Self) -> bool {
        self.software_package == other.software_package && self.name == other.name
    }
}

impl Eq for SoftwareVersion {}

impl Hash for SoftwareVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.software_package.hash(state);
        self.name.hash(state);
    }
}

impl PartialOrd for SoftwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SoftwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.software_package
            .cmp(&other.software_package)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for SoftwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.software_package.name, self.name)
    }
}

/// 可写入证据库的实体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Package(SoftwarePackage),
    Version(SoftwareVersion),
}

impl From<SoftwarePackage> for Entity {
    fn from(package: SoftwarePackage) -> Self {
        Entity::Package(package)
    }
}

impl From<SoftwareVersion> for Entity {
    fn from(version: SoftwareVersion) -> Self {
        Entity::Version(version)
    }
}
