//! 签名定义数据模型
//! 仅存储签名数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::{BTreeMap, HashMap};
use serde::{Deserialize, Serialize};

/// 技术签名定义（兼容 Wappalyzer / wappalyzergo 的 JSON 字段）
///
/// 模式值可以是字符串或字符串数组。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignatureRule {
    /// 关联的软件包名称；缺省时为与签名同名的软件包，空列表表示不关联任何软件包
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,

    // 检测规则
    #[serde(default)]
    pub url: Option<serde_json::Value>,
    #[serde(default)]
    pub html: Option<serde_json::Value>,
    #[serde(default)]
    pub scripts: Option<serde_json::Value>,
    // 兼容：wappalyzergo 的 scriptSrc 字段
    #[serde(rename = "scriptSrc", default)]
    pub script_src: Option<serde_json::Value>,
    #[serde(default)]
    pub meta: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub headers: Option<HashMap<String, serde_json::Value>>,
}

impl SignatureRule {
    /// 该签名关联的软件包名称
    pub fn package_names(&self, signature_name: &str) -> Vec<String> {
        match &self.packages {
            Some(names) => names.clone(),
            None => vec![signature_name.to_string()],
        }
    }
}

/// 签名库（按名称有序）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SignatureLibrary {
    pub signatures: BTreeMap<String, SignatureRule>,
}
