//! 文件名清理工具
//! 将 URL 路径转换为文件系统安全的相对文件名

use sha2::{Digest, Sha256};

/// 除 ASCII 字母和数字外允许保留的字符
pub const VALID_NAME_CHARS: &str = "-_.()=[]{}\\";

/// 文件名最大长度，超出后压缩
pub const MAX_NAME_LENGTH: usize = 200;

/// 压缩时保留的首尾字符数
const KEPT_EDGE_LENGTH: usize = 50;

/// 空路径对应的文件名
pub const INDEX_NAME: &str = "index";

/// 将不在安全字符集内的字符替换为 `_`
pub fn clean_path_name(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || VALID_NAME_CHARS.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 超长文件名压缩为 `<前50字符>...<完整名称哈希>...<后50字符>`
pub fn shorten_path_name(name: String) -> String {
    if name.len() <= MAX_NAME_LENGTH {
        return name;
    }

    let checksum = hex::encode(Sha256::digest(name.as_bytes()));
    format!(
        "{}...{}...{}",
        &name[..KEPT_EDGE_LENGTH],
        checksum,
        &name[name.len() - KEPT_EDGE_LENGTH..]
    )
}

/// 由 URL 路径（不含开头的 `/`）得到最终文件名
pub fn derive_file_name(path: &str) -> String {
    let cleaned = clean_path_name(path);
    if cleaned.is_empty() {
        return INDEX_NAME.to_string();
    }
    shorten_path_name(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path_name() {
        assert_eq!(clean_path_name("wp-content/themes/style.css"), "wp-content_themes_style.css");
        assert_eq!(clean_path_name("a b?c=(1)"), "a_b_c=(1)");
        assert_eq!(clean_path_name("ünï"), "_n_");
    }

    #[test]
    fn test_empty_path_maps_to_index() {
        assert_eq!(derive_file_name(""), "index");
    }

    #[test]
    fn test_long_name_is_shortened() {
        let path: String = (0..300).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let name = derive_file_name(&path);

        assert!(name.len() <= MAX_NAME_LENGTH + 64);
        assert!(name.starts_with(&path[..50]));
        assert!(name.ends_with(&path[250..]));
        assert_eq!(name.len(), 50 + 3 + 64 + 3 + 50);
    }

    #[test]
    fn test_name_at_limit_is_kept() {
        let path = "x".repeat(MAX_NAME_LENGTH);
        assert_eq!(derive_file_name(&path), path);
    }
}
