//! 候选版本猜测
//! 累积单个候选版本的正向/负向证据并计算强度

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use crate::backend::SoftwareVersion;
use crate::config::MatchWeights;
use crate::error::{RsgResult, RsguessError};

/// 单个候选版本的猜测
///
/// 同一资产不能同时出现在正向与负向证据中。证据只增不减。
/// 非线程安全的累积器，并行提取的结果需在外部汇总后再折叠。
#[derive(Debug, Clone)]
pub struct Guess {
    software_version: SoftwareVersion,
    positive_matches: BTreeSet<Arc<Asset>>,
    negative_matches: BTreeSet<Arc<Asset>>,
    weights: MatchWeights,
}

/// 猜测的持久化形式（版本身份 + 两组证据）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessRecord {
    pub software_version: SoftwareVersion,
    pub positive_matches: BTreeSet<Asset>,
    pub negative_matches: BTreeSet<Asset>,
}

/// 猜测的诊断形式（名称、计数与强度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessDebug {
    pub software_version: String,
    pub software_package: String,
    pub positive_matches: usize,
    pub positive_strength: f64,
    pub negative_matches: usize,
    pub negative_strength: f64,
}

impl Guess {
    pub fn new(software_version: SoftwareVersion, weights: MatchWeights) -> Self {
        Self {
            software_version,
            positive_matches: BTreeSet::new(),
            negative_matches: BTreeSet::new(),
            weights,
        }
    }

    /// 从持久化形式重建
    pub fn from_record(record: GuessRecord, weights: MatchWeights) -> RsgResult<Self> {
        let mut guess = Self::new(record.software_version, weights);
        for asset in record.positive_matches {
            guess.add_positive(Arc::new(asset))?;
        }
        for asset in record.negative_matches {
            guess.add_negative(Arc::new(asset))?;
        }
        Ok(guess)
    }

    pub fn software_version(&self) -> &SoftwareVersion {
        &self.software_version
    }

    pub fn positive_matches(&self) -> &BTreeSet<Arc<Asset>> {
        &self.positive_matches
    }

    pub fn negative_matches(&self) -> &BTreeSet<Arc<Asset>> {
        &self.negative_matches
    }

    /// 添加正向证据，返回是否为新证据
    pub fn add_positive(&mut self, asset: Arc<Asset>) -> RsgResult<bool> {
        if self.negative_matches.contains(&asset) {
            return Err(self.conflict(&asset));
        }
        Ok(self.positive_matches.insert(asset))
    }

    /// 添加负向证据，返回是否为新证据
    pub fn add_negative(&mut self, asset: Arc<Asset>) -> RsgResult<bool> {
        if self.positive_matches.contains(&asset) {
            return Err(self.conflict(&asset));
        }
        Ok(self.negative_matches.insert(asset))
    }

    pub fn positive_strength(&self) -> f64 {
        self.positive_matches.iter().map(|asset| asset.idf_weight).sum()
    }

    pub fn negative_strength(&self) -> f64 {
        self.negative_matches.iter().map(|asset| asset.idf_weight).sum()
    }

    /// 加权强度：`positive × 正向强度 + negative × 负向强度`
    pub fn strength(&self) -> f64 {
        self.weights.positive * self.positive_strength()
            + self.weights.negative * self.negative_strength()
    }

    /// 仅按强度比较；强度相同即视为相等
    pub fn by_strength(a: &Guess, b: &Guess) -> Ordering {
        a.strength()
            .partial_cmp(&b.strength())
            .unwrap_or(Ordering::Equal)
    }

    pub fn serialize(&self) -> GuessRecord {
        GuessRecord {
            software_version: self.software_version.clone(),
            positive_matches: self.positive_matches.iter().map(|a| Asset::clone(a)).collect(),
            negative_matches: self.negative_matches.iter().map(|a| Asset::clone(a)).collect(),
        }
    }

    pub fn debug_serialize(&self) -> GuessDebug {
        GuessDebug {
            software_version: self.software_version.name.clone(),
            software_package: self.software_version.software_package.name.clone(),
            positive_matches: self.positive_matches.len(),
            positive_strength: self.positive_strength(),
            negative_matches: self.negative_matches.len(),
            negative_strength: self.negative_strength(),
        }
    }

    fn conflict(&self, asset: &Asset) -> RsguessError {
        RsguessError::ConflictingEvidence {
            asset: asset.identifier.clone(),
            version: self.software_version.to_string(),
        }
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (+{}[{}]-{}[{}])",
            self.software_version,
            self.positive_matches.len(),
            self.positive_strength(),
            self.negative_matches.len(),
            self.negative_strength()
        )
    }
}
