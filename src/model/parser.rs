//! 容错解析器：严格JSON优先，失败后尝试一次有界的启发式修复
//!
//! 只识别一种畸形形态：数组字面量内直接写裸 `"key": value` 对
//! （用户漏掉了对象花括号）。修复是保守的全有或全无：某个数组片段
//! 只要有一段不符合 `"key": value` 形态，整个片段保持原样。
//! 注意修复是有损的：同名键合并时只保留最后一次出现的值。

use serde_json::Value;

use crate::model::data_core::AppError;

/// 解析结果：值 + 是否应用过修复 + 修复后的文本
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub value: Value,
    pub was_sanitized: bool,
    /// 仅在 `was_sanitized` 为真时存在，供调用方选择采纳
    pub sanitized_text: Option<String>,
}

/// 解析输入文本，必要时尝试启发式修复
///
/// 严格解析失败且修复无效时，返回的始终是最初的严格解析错误，
/// 修复自身的二次失败不会掩盖根本原因。
pub fn parse(text: &str) -> Result<ParseOutcome, AppError> {
    let original_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            return Ok(ParseOutcome {
                value,
                was_sanitized: false,
                sanitized_text: None,
            });
        }
        Err(e) => e,
    };

    let repaired = sanitize(text);
    if repaired == text {
        // 没有可修复的片段，直接上报原始错误
        return Err(AppError::Parse(original_err));
    }

    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => {
            tracing::info!("启发式修复已生效，重写后文本 {} 字节", repaired.len());
            Ok(ParseOutcome {
                value,
                was_sanitized: true,
                sanitized_text: Some(repaired),
            })
        }
        Err(second) => {
            tracing::warn!("修复后的文本仍无法解析: {}", second);
            Err(AppError::Parse(original_err))
        }
    }
}

/// 扫描并重写畸形数组片段；无可修复片段时返回与输入相同的文本
///
/// 扫描器对括号深度与字符串字面量敏感，不使用正则。
/// 对严格合法的JSON输入恒为恒等变换。
pub fn sanitize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '"' => {
                // 字符串字面量整体照抄，内部的括号不参与结构扫描
                let end = scan_string(&chars, i);
                out.extend(&chars[i..end]);
                i = end;
            }
            '[' => {
                if let Some(close) = matching_bracket(&chars, i) {
                    if let Some(pairs) = qualify_span(&chars[i + 1..close]) {
                        out.push_str(&rewrite_span(&pairs));
                        i = close + 1;
                        continue;
                    }
                }
                // 不合格的片段保持原样，但继续扫描其内部
                out.push('[');
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

/// 从 `start` 处的开引号扫到闭引号之后，返回闭引号后的下标
///
/// 未闭合的字符串返回 `chars.len()`。
fn scan_string(chars: &[char], start: usize) -> usize {
    debug_assert_eq!(chars[start], '"');
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// 寻找 `start` 处 `[` 的配对 `]`，跳过字符串内容
fn matching_bracket(chars: &[char], start: usize) -> Option<usize> {
    debug_assert_eq!(chars[start], '[');
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '"' => {
                i = scan_string(chars, i);
                continue;
            }
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// 检查一个数组片段的内容是否全部由裸 `"key": value` 对组成
///
/// 返回按出现顺序排列的 (带引号键, 值文本) 列表；
/// 任意一段不符合形态、或片段为空时返回 None（整段不动）。
fn qualify_span(inner: &[char]) -> Option<Vec<(String, String)>> {
    let segments = split_top_level(inner);
    if segments.is_empty() {
        return None;
    }

    let mut pairs: Vec<(String, String)> = Vec::with_capacity(segments.len());
    for seg in segments {
        let (key, value) = parse_bare_pair(&seg)?;
        // 同名键合并：保留首次出现的位置，值取最后一次出现
        if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            pairs.push((key, value));
        }
    }
    Some(pairs)
}

/// 按顶层逗号切分片段内容，括号与字符串内部的逗号不算
fn split_top_level(inner: &[char]) -> Vec<Vec<char>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0i32;
    let mut i = 0;

    while i < inner.len() {
        match inner[i] {
            '"' => {
                let end = scan_string(inner, i);
                current.extend(&inner[i..end]);
                i = end;
                continue;
            }
            '[' | '{' => {
                depth += 1;
                current.push(inner[i]);
            }
            ']' | '}' => {
                depth -= 1;
                current.push(inner[i]);
            }
            ',' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
                i += 1;
                continue;
            }
            c => current.push(c),
        }
        i += 1;
    }

    // 纯空白片段不构成候选
    if current.iter().any(|c| !c.is_whitespace()) || !segments.is_empty() {
        segments.push(current);
    }
    segments
}

/// 尝试按 `"key": value` 形态解析一个片段
///
/// 返回 (含引号的键字面量, 冒号后的值文本)；不符合形态返回 None。
fn parse_bare_pair(seg: &[char]) -> Option<(String, String)> {
    let mut i = 0;
    while i < seg.len() && seg[i].is_whitespace() {
        i += 1;
    }
    if i >= seg.len() || seg[i] != '"' {
        return None;
    }
    let key_end = scan_string(seg, i);
    if key_end > seg.len() || seg.get(key_end.wrapping_sub(1)) != Some(&'"') || key_end == i + 1 {
        return None;
    }
    let key: String = seg[i..key_end].iter().collect();

    let mut j = key_end;
    while j < seg.len() && seg[j].is_whitespace() {
        j += 1;
    }
    if j >= seg.len() || seg[j] != ':' {
        return None;
    }
    let value: String = seg[j + 1..].iter().collect();
    let value = value.trim().to_string();
    if value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// 将合格片段的键值对重写为 `[{...}]`：一对数组括号包一个对象
fn rewrite_span(pairs: &[(String, String)]) -> String {
    let mut out = String::from("[{");
    for (idx, (key, value)) in pairs.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&repair_value(value));
    }
    out.push_str("}]");
    out
}

/// 值侧修复：已是字符串/可识别字面量/对象/数组的保持原样，
/// 其余一律重新引号化为JSON字符串
fn repair_value(value: &str) -> String {
    if is_complete_string(value)
        || matches!(value, "true" | "false" | "null")
        || is_json_number(value)
        || value.starts_with('{')
        || value.starts_with('[')
    {
        return value.to_string();
    }
    requote(value)
}

/// 整体恰好是一个带引号字符串字面量
fn is_complete_string(value: &str) -> bool {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 2 || chars[0] != '"' {
        return false;
    }
    scan_string(&chars, 0) == chars.len()
}

/// 严格JSON数字语法：`-? (0|[1-9][0-9]*) (.[0-9]+)? ([eE][+-]?[0-9]+)?`
fn is_json_number(value: &str) -> bool {
    let bytes = value.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while matches!(bytes.get(i), Some(b'0'..=b'9')) {
                i += 1;
            }
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return false;
        }
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if !matches!(bytes.get(i), Some(b'0'..=b'9')) {
            return false;
        }
        while matches!(bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
    }
    i == bytes.len()
}

/// 把裸文本包装为合法的JSON字符串，转义内部的引号与反斜杠
fn requote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json_passes_through() {
        let outcome = parse(r#"{"a": {"b": 1}}"#).expect("严格JSON应该解析成功");
        assert!(!outcome.was_sanitized, "严格JSON不应触发修复");
        assert!(outcome.sanitized_text.is_none());
        assert_eq!(outcome.value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_sanitize_is_identity_on_valid_json() {
        let cases = [
            r#"{"a": 1}"#,
            r#"[1, 2, 3]"#,
            r#"{"items": [{"name": "x"}, {"name": "y"}]}"#,
            r#"["a", "b"]"#,
            r#"[]"#,
            r#""[not an array]""#,
        ];
        for text in cases {
            assert_eq!(sanitize(text), text, "合法JSON应保持原样: {}", text);
        }
    }

    #[test]
    fn test_repair_bare_pairs_in_array() {
        let outcome = parse(r#"["name": "item1", "count": 3]"#).expect("修复后应解析成功");
        assert!(outcome.was_sanitized, "应该标记为已修复");
        assert_eq!(
            outcome.sanitized_text.as_deref(),
            Some(r#"[{"name": "item1", "count": 3}]"#)
        );
        assert_eq!(outcome.value, json!([{"name": "item1", "count": 3}]));
    }

    #[test]
    fn test_repair_duplicate_keys_last_wins() {
        // 有损行为：同名键只保留最后一次出现的值
        let outcome = parse(r#"["name": "item1", "name": "item2"]"#).expect("修复后应解析成功");
        assert_eq!(
            outcome.sanitized_text.as_deref(),
            Some(r#"[{"name": "item2"}]"#)
        );
        assert_eq!(outcome.value, json!([{"name": "item2"}]));
    }

    #[test]
    fn test_repair_requotes_bare_values() {
        let outcome = parse(r#"["name": hello world, "n": 3, "ok": true]"#)
            .expect("裸值应被引号化后解析成功");
        assert_eq!(
            outcome.sanitized_text.as_deref(),
            Some(r#"[{"name": "hello world", "n": 3, "ok": true}]"#)
        );
    }

    #[test]
    fn test_repair_keeps_nested_values() {
        let outcome =
            parse(r#"["conf": {"x": 1}, "tags": [1, 2]]"#).expect("嵌套值应原样保留");
        assert_eq!(
            outcome.sanitized_text.as_deref(),
            Some(r#"[{"conf": {"x": 1}, "tags": [1, 2]}]"#)
        );
    }

    #[test]
    fn test_repair_inside_larger_document() {
        let outcome = parse(r#"{"list": ["a": 1, "b": 2], "other": [3, 4]}"#)
            .expect("嵌入式畸形数组应被修复");
        assert_eq!(
            outcome.sanitized_text.as_deref(),
            Some(r#"{"list": [{"a": 1, "b": 2}], "other": [3, 4]}"#)
        );
    }

    #[test]
    fn test_all_or_nothing_per_span() {
        // 有一段不符合 "key": value 形态，整个片段不做改写
        let err = parse(r#"["a": 1, 2]"#).unwrap_err();
        assert!(
            matches!(err, AppError::Parse(_)),
            "不合格片段应上报原始解析错误"
        );
    }

    #[test]
    fn test_original_error_survives_failed_repair() {
        // 值侧保留的对象本身非法，改写后的文本二次解析失败，应返回最初的错误
        let text = r#"["a": {broken]"#;
        let original = serde_json::from_str::<Value>(text).unwrap_err();
        assert_ne!(sanitize(text), text, "该输入应触发一次改写");
        match parse(text).unwrap_err() {
            AppError::Parse(e) => {
                assert_eq!(e.to_string(), original.to_string(), "应保留原始诊断信息")
            }
            other => panic!("意外的错误类型: {:?}", other),
        }
    }

    #[test]
    fn test_no_candidate_surfaces_original_error() {
        // 值缺失导致片段不合格，修复是空操作，立即上报原始错误
        let text = r#"["a": ]"#;
        assert_eq!(sanitize(text), text);
        let original = serde_json::from_str::<Value>(text).unwrap_err();
        match parse(text).unwrap_err() {
            AppError::Parse(e) => assert_eq!(e.to_string(), original.to_string()),
            other => panic!("意外的错误类型: {:?}", other),
        }
    }

    #[test]
    fn test_unrepairable_garbage_fails() {
        assert!(parse("not json at all").is_err());
        assert!(parse("").is_err());
        assert!(parse("{").is_err());
    }

    #[test]
    fn test_bracket_inside_string_is_ignored() {
        let text = r#"{"a": "[\"k\": 1]", "b": 2}"#;
        assert_eq!(sanitize(text), text, "字符串内部的括号不应触发扫描");
    }

    #[test]
    fn test_is_json_number() {
        for ok in ["0", "-1", "42", "3.14", "-0.5", "1e5", "2E-3", "10.0e+2"] {
            assert!(is_json_number(ok), "应识别为数字: {}", ok);
        }
        for bad in ["01", ".5", "1.", "e5", "--1", "1e", "abc", ""] {
            assert!(!is_json_number(bad), "不应识别为数字: {}", bad);
        }
    }
}
