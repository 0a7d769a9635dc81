//! 证据资产

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use serde::{Deserialize, Serialize};

/// 一条原子证据，携带区分度权重（越罕见权重越高）
///
/// 身份仅由 `identifier` 决定。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub identifier: String,
    pub idf_weight: f64,
}

impl Asset {
    pub fn new(identifier: impl Into<String>, idf_weight: f64) -> Self {
        Self {
            identifier: identifier.into(),
            idf_weight,
        }
    }
}

impl PartialEq for Asset {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Asset {}

impl Hash for Asset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identifier.hash(state);
    }
}

impl PartialOrd for Asset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Asset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identifier.cmp(&other.identifier)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
