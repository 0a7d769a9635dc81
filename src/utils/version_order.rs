//! 版本号排序工具
//! 按数字/字母分段比较版本名，数字段按数值比较

use std::cmp::Ordering;

#[derive(Debug)]
enum Segment<'a> {
    Number(u64),
    Text(&'a str),
}

fn compare_segments(a: &Segment<'_>, b: &Segment<'_>) -> Ordering {
    match (a, b) {
        (Segment::Number(a), Segment::Number(b)) => a.cmp(b),
        // 数字段视为比文本段更新
        (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
        (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
        (Segment::Text(a), Segment::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

fn segments(version: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    // (起始位置, 是否数字段)
    let mut current: Option<(usize, bool)> = None;

    for (i, c) in version.char_indices() {
        let kind = c.is_alphanumeric().then(|| c.is_ascii_digit());
        match (current, kind) {
            (Some((_, numeric)), Some(is_digit)) if numeric == is_digit => {}
            (Some((start, numeric)), _) => {
                result.push(segment(&version[start..i], numeric));
                current = kind.map(|is_digit| (i, is_digit));
            }
            (None, _) => current = kind.map(|is_digit| (i, is_digit)),
        }
    }
    if let Some((start, numeric)) = current {
        result.push(segment(&version[start..], numeric));
    }
    result
}

fn segment(text: &str, numeric: bool) -> Segment<'_> {
    if numeric {
        text.parse().map(Segment::Number).unwrap_or(Segment::Text(text))
    } else {
        Segment::Text(text)
    }
}

/// 比较两个版本名
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);

    for (l, r) in left.iter().zip(right.iter()) {
        match compare_segments(l, r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    // 前缀相同：后续为文本段（预发布）视为更旧，为数字段视为更新
    match left.len().cmp(&right.len()) {
        Ordering::Equal => Ordering::Equal,
        Ordering::Greater => match left[right.len()] {
            Segment::Number(_) => Ordering::Greater,
            Segment::Text(_) => Ordering::Less,
        },
        Ordering::Less => match right[left.len()] {
            Segment::Number(_) => Ordering::Less,
            Segment::Text(_) => Ordering::Greater,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_segments() {
        assert_eq!(compare_versions("5.10", "5.9"), Ordering::Greater);
        assert_eq!(compare_versions("5.4", "5.4"), Ordering::Equal);
        assert_eq!(compare_versions("5.4.1", "5.4"), Ordering::Greater);
    }

    #[test]
    fn test_prerelease_is_older() {
        assert_eq!(compare_versions("1.0-beta", "1.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0", "1.0rc1"), Ordering::Greater);
        assert_eq!(compare_versions("1.0-alpha", "1.0-beta"), Ordering::Less);
    }
}
