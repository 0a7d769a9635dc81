//! 签名库加载
//! 支持两种 JSON 格式：`{名称: 签名}` 与 wappalyzergo 的 `{"apps": {名称: 签名}}`

use std::collections::BTreeMap;
use std::path::Path;
use serde_json::Value;
use tracing::debug;

use super::model::{SignatureLibrary, SignatureRule};
use crate::error::{RsgResult, RsguessError};

/// 签名加载器
pub struct SignatureLoader;

impl SignatureLoader {
    /// 从文件加载签名库
    pub fn load_from_file(path: &Path) -> RsgResult<SignatureLibrary> {
        let data = std::fs::read_to_string(path)?;
        let library = Self::load_from_str(&data)?;
        debug!("从 {} 加载签名{}条", path.display(), library.signatures.len());
        Ok(library)
    }

    /// 从 JSON 字符串加载签名库
    pub fn load_from_str(data: &str) -> RsgResult<SignatureLibrary> {
        let mut root: Value = serde_json::from_str(data)?;

        // wappalyzergo 格式：签名位于 apps 字段下
        let wrapped = root.get("apps").is_some_and(Value::is_object);
        let apps = if wrapped { root["apps"].take() } else { root };

        if !apps.is_object() {
            return Err(RsguessError::SignatureParseError(
                "签名库根节点必须为对象".to_string(),
            ));
        }

        let signatures: BTreeMap<String, SignatureRule> = serde_json::from_value(apps)
            .map_err(|e| RsguessError::SignatureParseError(format!("签名格式错误：{}", e)))?;

        Ok(SignatureLibrary { signatures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_plain_format() {
        let library = SignatureLoader::load_from_str(
            r#"{"WordPress": {"packages": ["WordPress"], "meta": {"generator": "^WordPress"}, "website": "https://wordpress.org"}}"#,
        )
        .unwrap();

        let rule = &library.signatures["WordPress"];
        assert_eq!(rule.packages.as_deref(), Some(&["WordPress".to_string()][..]));
        assert!(rule.meta.as_ref().is_some_and(|meta| meta.contains_key("generator")));
    }

    #[test]
    fn test_load_wappalyzergo_format() {
        let library = SignatureLoader::load_from_str(
            r#"{"apps": {
                "Nginx": {"cats": [22], "headers": {"Server": "nginx(?:/([\\d.]+))?\\;version:\\1"}},
                "jQuery": {"scriptSrc": ["jquery.*\\.js"], "icon": "jQuery.svg"}
            }}"#,
        )
        .unwrap();

        assert_eq!(
            library.signatures.keys().collect::<Vec<_>>(),
            vec!["Nginx", "jQuery"]
        );
        assert!(library.signatures["Nginx"].packages.is_none());
        assert!(library.signatures["jQuery"].script_src.is_some());
    }

    #[test]
    fn test_invalid_library_is_rejected() {
        assert!(matches!(
            SignatureLoader::load_from_str("[1, 2]"),
            Err(RsguessError::SignatureParseError(_))
        ));
        assert!(matches!(
            SignatureLoader::load_from_str(r#"{"X": {"packages": "not-a-list"}}"#),
            Err(RsguessError::SignatureParseError(_))
        ));
        assert!(matches!(
            SignatureLoader::load_from_str("{not json"),
            Err(RsguessError::JsonError(_))
        ));
    }
}
