//! 猜测汇总
//! 将证据折叠到各候选版本的猜测上，并筛选最佳猜测

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use super::asset::Asset;
use super::guess::Guess;
use crate::backend::SoftwareVersion;
use crate::config::{GlobalConfig, MatchWeights};
use crate::error::RsgResult;

/// 所有候选版本的猜测集合
#[derive(Debug, Clone)]
pub struct GuessBoard {
    weights: MatchWeights,
    guesses: BTreeMap<SoftwareVersion, Guess>,
    assets: BTreeSet<Arc<Asset>>,
}

impl GuessBoard {
    pub fn new(weights: MatchWeights) -> Self {
        Self {
            weights,
            guesses: BTreeMap::new(),
            assets: BTreeSet::new(),
        }
    }

    /// 为候选版本创建（空）猜测
    pub fn seed<I>(&mut self, versions: I)
    where
        I: IntoIterator<Item = SoftwareVersion>,
    {
        for version in versions {
            self.entry(version);
        }
    }

    /// 折叠一条证据：`using` 中的版本得到正向证据，`expected` 中其余版本得到负向证据
    pub fn fold_asset(
        &mut self,
        asset: Arc<Asset>,
        using: &BTreeSet<SoftwareVersion>,
        expected: &BTreeSet<SoftwareVersion>,
    ) -> RsgResult<()> {
        for version in using {
            self.entry(version.clone()).add_positive(Arc::clone(&asset))?;
        }
        for version in expected.difference(using) {
            self.entry(version.clone()).add_negative(Arc::clone(&asset))?;
        }

        debug!(
            "折叠证据 {}：正向{}个版本，负向{}个版本",
            asset,
            using.len(),
            expected.difference(using).count()
        );
        self.assets.insert(asset);

        Ok(())
    }

    pub fn guess(&self, version: &SoftwareVersion) -> Option<&Guess> {
        self.guesses.get(version)
    }

    pub fn len(&self) -> usize {
        self.guesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guesses.is_empty()
    }

    /// 已折叠的不同证据数
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// 按强度降序排列的猜测（强度相同按版本顺序）
    pub fn ranked(&self) -> Vec<&Guess> {
        let mut guesses: Vec<&Guess> = self.guesses.values().collect();
        guesses.sort_by(|a, b| Guess::by_strength(b, a));
        guesses
    }

    /// 最佳猜测：最多 `guess_limit` 个，丢弃强度距最佳猜测过远的猜测
    ///
    /// 最佳猜测的正向强度低于 `guess_ignore_min_positive` 时不丢弃任何猜测。
    pub fn best_guesses(&self, config: &GlobalConfig) -> Vec<&Guess> {
        let ranked = self.ranked();
        let Some(best) = ranked.first() else {
            return ranked;
        };

        let best_strength = best.strength();
        let min_strength = if best.positive_strength() < config.guess_ignore_min_positive {
            f64::NEG_INFINITY
        } else {
            f64::min(
                (1.0 - config.guess_relative_ignore_distance) * best_strength,
                best_strength - config.guess_ignore_distance,
            )
        };

        ranked
            .into_iter()
            .take(config.guess_limit)
            .filter(|guess| guess.strength() >= min_strength)
            .collect()
    }

    /// 支持度：并列最佳的猜测，以及 `最佳强度 / 证据数`（无证据时为 0）
    pub fn support(&self) -> (Vec<&Guess>, f64) {
        let ranked = self.ranked();
        let Some(best_strength) = ranked.first().map(|guess| guess.strength()) else {
            return (ranked, 0.0);
        };

        let support = if self.assets.is_empty() {
            0.0
        } else {
            best_strength / self.assets.len() as f64
        };
        let best = ranked
            .into_iter()
            .take_while(|guess| guess.strength() == best_strength)
            .collect();

        (best, support)
    }

    /// 最佳猜测的支持度是否足够
    pub fn has_enough_support(&self, config: &GlobalConfig) -> bool {
        let (best, support) = self.support();
        best.first().is_some_and(|guess| {
            support >= config.min_support && guess.strength() >= config.min_absolute_support
        })
    }

    fn entry(&mut self, version: SoftwareVersion) -> &mut Guess {
        let weights = self.weights;
        self.guesses
            .entry(version)
            .or_insert_with_key(|version| Guess::new(version.clone(), weights))
    }
}
