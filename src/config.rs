//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

/// 文档解析器选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentParser {
    /// html5ever 分词器，容错解析
    #[default]
    Html5ever,
    /// html5ever 分词器，精确记录解析错误
    Html5everStrict,
}

/// 证据权重（正向/负向）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub positive: f64,
    pub negative: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            positive: 1.0,
            negative: -1.0,
        }
    }
}

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    // 请求 User-Agent
    pub user_agent: String,
    // 正向证据权重
    pub positive_match_weight: f64,
    // 负向证据权重（通常为负数）
    pub negative_match_weight: f64,
    // 文档解析器
    pub document_parser: DocumentParser,
    // 响应缓存目录
    pub cache_dir: PathBuf,
    // 最佳猜测筛选参数
    pub guess_limit: usize,
    pub guess_relative_ignore_distance: f64,
    pub guess_ignore_distance: f64,
    pub guess_ignore_min_positive: f64,
    // 支持度阈值
    pub min_support: f64,
    pub min_absolute_support: f64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let weights = MatchWeights::default();
        Self {
            http_timeout: 10,
            user_agent: "Rsguess/0.1.0".to_string(),
            positive_match_weight: weights.positive,
            negative_match_weight: weights.negative,
            document_parser: DocumentParser::default(),
            cache_dir: PathBuf::from(".rsguess_cache"),
            guess_limit: 10,
            guess_relative_ignore_distance: 0.5,
            guess_ignore_distance: 5.0,
            guess_ignore_min_positive: 3.0,
            min_support: 0.1,
            min_absolute_support: 1.0,
        }
    }
}

impl GlobalConfig {
    /// 当前配置对应的证据权重
    pub fn match_weights(&self) -> MatchWeights {
        MatchWeights {
            positive: self.positive_match_weight,
            negative: self.negative_match_weight,
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn positive_match_weight(mut self, weight: f64) -> Self {
        self.config.positive_match_weight = weight;
        self
    }

    pub fn negative_match_weight(mut self, weight: f64) -> Self {
        self.config.negative_match_weight = weight;
        self
    }

    pub fn document_parser(mut self, parser: DocumentParser) -> Self {
        self.config.document_parser = parser;
        self
    }

    pub fn cache_dir(mut self, path: PathBuf) -> Self {
        self.config.cache_dir = path;
        self
    }

    pub fn guess_limit(mut self, limit: usize) -> Self {
        self.config.guess_limit = limit;
        self
    }

    pub fn guess_relative_ignore_distance(mut self, distance: f64) -> Self {
        self.config.guess_relative_ignore_distance = distance;
        self
    }

    pub fn guess_ignore_distance(mut self, distance: f64) -> Self {
        self.config.guess_ignore_distance = distance;
        self
    }

    pub fn guess_ignore_min_positive(mut self, strength: f64) -> Self {
        self.config.guess_ignore_min_positive = strength;
        self
    }

    pub fn min_support(mut self, support: f64) -> Self {
        self.config.min_support = support;
        self
    }

    pub fn min_absolute_support(mut self, support: f64) -> Self {
        self.config.min_absolute_support = support;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_weights() {
        let config = ConfigManager::custom()
            .positive_match_weight(2.0)
            .negative_match_weight(-0.25)
            .http_timeout(3)
            .build();

        assert_eq!(config.http_timeout, 3);
        assert_eq!(
            config.match_weights(),
            MatchWeights { positive: 2.0, negative: -0.25 }
        );
        assert_eq!(config.document_parser, DocumentParser::Html5ever);
    }
}
