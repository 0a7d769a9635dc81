//! Header格式转换工具
//! 不同Header格式之间的转换

use std::collections::HashMap;
use reqwest::header::HeaderMap;
use tracing::{debug, warn};
use std::time::Instant;

/// 单个响应允许的最大Header条数
const MAX_HEADER_ENTRIES: usize = 1000;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为HashMap<String, Vec<String>>（名称小写）
    pub fn to_hashmap(header_map: &HeaderMap) -> HashMap<String, Vec<String>> {
        let start = Instant::now();
        let mut map = HashMap::new();

        for (iter_count, (key, value)) in header_map.iter().enumerate() {
            if iter_count >= MAX_HEADER_ENTRIES {
                warn!("Header条数超过{}，忽略剩余部分", MAX_HEADER_ENTRIES);
                break;
            }

            let key_str = key.as_str().to_lowercase();
            let value_str = String::from_utf8_lossy(value.as_bytes()).into_owned();

            map.entry(key_str)
                .or_insert_with(Vec::new)
                .push(value_str);
        }

        debug!(
            "Header转换完成，耗时{:?}，生成{}条记录",
            start.elapsed(),
            map.len()
        );

        map
    }
}
