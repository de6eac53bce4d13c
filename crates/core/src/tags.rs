//! # タグ正規化
//!
//! 2種類の入力形状を (name, value) の順序付きリストに変換する。
//!
//! - リスト形式: 入力配列の順序をそのまま保持する
//! - マッピング形式: タグ名のバイト順（昇順）。JSONオブジェクトには順序が無いため、
//!   この順序は保証対象外。順序が必要な呼び出し元はリスト形式を使う。
//!
//! 文字列以外の値、`name` / `value` が欠けた要素はエラーにせずスキップする。
//!
//! 空文字列の名前・値はここでは弾かずにそのまま通す。署名ライブラリは
//! 空のタグを受け付けないため、その場合は呼び出し全体が
//! `failed to create and sign data item: invalid tags: ...` で失敗する。

use ans104_types::{Tag, TagsParam};
use serde_json::Value;

/// 入力タグを正規化する。
pub fn normalize_tags(tags: Option<&TagsParam>) -> Vec<Tag> {
    match tags {
        None => Vec::new(),
        Some(TagsParam::Mapping(map)) => map
            .iter()
            .filter_map(|(name, value)| match value.as_str() {
                Some(value) => Some(Tag {
                    name: name.clone(),
                    value: value.to_string(),
                }),
                None => {
                    tracing::warn!(tag = %name, "文字列以外のタグ値をスキップします");
                    None
                }
            })
            .collect(),
        Some(TagsParam::List(entries)) => entries.iter().filter_map(list_entry).collect(),
        Some(TagsParam::Unrecognized(value)) => {
            tracing::warn!(kind = json_kind(value), "未対応のタグ形式のため無視します");
            Vec::new()
        }
    }
}

fn list_entry(entry: &Value) -> Option<Tag> {
    let name = entry.get("name").and_then(Value::as_str);
    let value = entry.get("value").and_then(Value::as_str);
    match (name, value) {
        (Some(name), Some(value)) => Some(Tag {
            name: name.to_string(),
            value: value.to_string(),
        }),
        _ => {
            tracing::warn!(entry = %entry, "name/valueが揃っていないタグをスキップします");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<TagsParam> {
        serde_json::from_str(json).unwrap()
    }

    fn pairs(tags: &[Tag]) -> Vec<(&str, &str)> {
        tags.iter().map(|t| (t.name.as_str(), t.value.as_str())).collect()
    }

    #[test]
    fn test_mapping_one_pair_per_entry() {
        let tags = normalize_tags(parse(r#"{"App-Name":"Test","Content-Type":"text/plain"}"#).as_ref());
        assert_eq!(pairs(&tags), vec![("App-Name", "Test"), ("Content-Type", "text/plain")]);
    }

    /// マッピング形式はタグ名の昇順になる
    #[test]
    fn test_mapping_sorted_by_name() {
        let tags = normalize_tags(parse(r#"{"b":"2","a":"1","C":"3"}"#).as_ref());
        assert_eq!(pairs(&tags), vec![("C", "3"), ("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_mapping_skips_non_string_values() {
        let tags = normalize_tags(
            parse(r#"{"a":"1","n":2,"b":true,"o":{"x":"y"},"l":["z"],"z":null}"#).as_ref(),
        );
        assert_eq!(pairs(&tags), vec![("a", "1")]);
    }

    #[test]
    fn test_list_preserves_order_and_duplicates() {
        let tags = normalize_tags(
            parse(r#"[{"name":"A","value":"1"},{"name":"Z","value":"0"},{"name":"A","value":"2"}]"#)
                .as_ref(),
        );
        assert_eq!(pairs(&tags), vec![("A", "1"), ("Z", "0"), ("A", "2")]);
    }

    #[test]
    fn test_list_skips_incomplete_entries() {
        let tags = normalize_tags(
            parse(
                r#"[
                    {"name":"keep","value":"1"},
                    {"name":"no-value"},
                    {"value":"no-name"},
                    {"name":1,"value":"x"},
                    {"name":"x","value":2},
                    "bare",
                    ["A","1"],
                    null,
                    {"name":"also-keep","value":"2","extra":true}
                ]"#,
            )
            .as_ref(),
        );
        assert_eq!(pairs(&tags), vec![("keep", "1"), ("also-keep", "2")]);
    }

    #[test]
    fn test_unrecognized_shape_degrades_to_empty() {
        for json in [r#""App-Name""#, "42", "true"] {
            let param = parse(json);
            assert!(matches!(param, Some(TagsParam::Unrecognized(_))), "{json}");
            assert!(normalize_tags(param.as_ref()).is_empty());
        }
    }

    #[test]
    fn test_absent_and_null_are_empty() {
        assert!(normalize_tags(None).is_empty());
        assert!(parse("null").is_none());
        assert!(normalize_tags(parse("{}").as_ref()).is_empty());
        assert!(normalize_tags(parse("[]").as_ref()).is_empty());
    }

    #[test]
    fn test_empty_strings_pass_through() {
        let tags = normalize_tags(parse(r#"{"Empty":""}"#).as_ref());
        assert_eq!(pairs(&tags), vec![("Empty", "")]);

        let tags = normalize_tags(parse(r#"[{"name":"","value":"v"}]"#).as_ref());
        assert_eq!(pairs(&tags), vec![("", "v")]);
    }
}
