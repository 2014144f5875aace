//! Helpers around `tf_provider::Value`.

use crate::domain::model::MetadataDetailed;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tf_provider::Value;

pub type TfString = Value<String>;
pub type TfNumber = Value<i64>;
pub type TfBool = Value<bool>;
/// 清單屬性與巢狀區塊
pub type TfList<T> = Value<Vec<Value<T>>>;
pub type TfMap = Value<BTreeMap<String, Value<String>>>;

pub trait ValueExt<T> {
    fn known_ref(&self) -> Option<&T>;
    fn into_known(self) -> Option<T>;
    /// 非 null（已知或未知）
    fn is_set(&self) -> bool;
    fn is_pending(&self) -> bool;
    /// plan 階段把 null 的 computed 欄位轉為 unknown
    fn null_as_unknown(self) -> Self;
}

impl<T> ValueExt<T> for Value<T> {
    fn known_ref(&self) -> Option<&T> {
        match self {
            Value::Value(v) => Some(v),
            _ => None,
        }
    }

    fn into_known(self) -> Option<T> {
        match self {
            Value::Value(v) => Some(v),
            _ => None,
        }
    }

    fn is_set(&self) -> bool {
        !matches!(self, Value::Null)
    }

    fn is_pending(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    fn null_as_unknown(self) -> Self {
        match self {
            Value::Null => Value::Unknown,
            other => other,
        }
    }
}

pub fn known<T>(value: T) -> Value<T> {
    Value::Value(value)
}

pub fn from_option<T>(value: Option<T>) -> Value<T> {
    value.map(Value::Value).unwrap_or(Value::Null)
}

/// API 沒回傳時保留已設定的空字串
pub fn keep_empty(current: &TfString, value: Option<String>) -> TfString {
    match (value, current) {
        (None, Value::Value(s)) if s.is_empty() => current.clone(),
        (value, _) => from_option(value),
    }
}

/// API 沒回傳時保留已知的設定值
pub fn or_configured<T: Clone>(current: &Value<T>, value: Option<T>) -> Value<T> {
    match (value, current) {
        (Some(value), _) => Value::Value(value),
        (None, Value::Value(_)) => current.clone(),
        (None, _) => Value::Null,
    }
}

/// 空字串視為未設定
pub fn non_empty(value: &TfString) -> Option<String> {
    value.known_ref().filter(|s| !s.is_empty()).cloned()
}

pub fn string_or_null(value: impl Into<String>) -> TfString {
    let value = value.into();
    if value.is_empty() {
        Value::Null
    } else {
        Value::Value(value)
    }
}

/// 已知的清單元素；null 與 unknown 元素略過
pub fn list_items<T: Clone>(list: &TfList<T>) -> Vec<T> {
    list.known_ref()
        .map(|items| items.iter().filter_map(|i| i.known_ref().cloned()).collect())
        .unwrap_or_default()
}

pub fn to_list<T>(items: Vec<T>) -> TfList<T> {
    Value::Value(items.into_iter().map(Value::Value).collect())
}

pub fn map_entries(map: &TfMap) -> BTreeMap<String, String> {
    map.known_ref()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(k, v)| v.known_ref().map(|v| (k.clone(), v.clone())))
                .collect()
        })
        .unwrap_or_default()
}

pub fn to_map(entries: BTreeMap<String, String>) -> TfMap {
    Value::Value(
        entries
            .into_iter()
            .map(|(k, v)| (k, Value::Value(v)))
            .collect(),
    )
}

/// 對已知的清單元素逐一套用 `f`
pub fn map_list<T, F>(list: TfList<T>, mut f: F) -> TfList<T>
where
    F: FnMut(T) -> T,
{
    match list {
        Value::Value(items) => Value::Value(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Value(v) => Value::Value(f(v)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

/// `metadata_read_only` 的一個項目
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: TfString,
    pub value: TfString,
    pub read_only: TfBool,
}

pub fn metadata_read_only(items: &[MetadataDetailed]) -> TfList<MetadataItem> {
    to_list(
        crate::cloud::metadata_read_only(items)
            .into_iter()
            .map(|md| MetadataItem {
                key: known(md.key),
                value: known(md.value),
                read_only: known(md.read_only),
            })
            .collect(),
    )
}

/// 使用者可修改的 metadata（排除唯讀項目）
pub fn metadata_map(items: &[MetadataDetailed]) -> TfMap {
    to_map(
        items
            .iter()
            .filter(|md| !md.read_only)
            .map(|md| (md.key.clone(), md.value.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_as_unknown_keeps_known_values() {
        assert!(TfString::Null.null_as_unknown().is_pending());
        assert_eq!(known("a".to_string()).null_as_unknown(), known("a".to_string()));
    }

    #[test]
    fn test_list_items_skips_unknown() {
        let list: TfList<String> = Value::Value(vec![known("a".to_string()), Value::Unknown]);
        assert_eq!(list_items(&list), vec!["a".to_string()]);
        assert!(list_items::<String>(&Value::Null).is_empty());
    }

    #[test]
    fn test_map_round_trip() {
        let mut entries = BTreeMap::new();
        entries.insert("env".to_string(), "prod".to_string());
        assert_eq!(map_entries(&to_map(entries.clone())), entries);
    }

    #[test]
    fn test_metadata_map_skips_read_only() {
        let items = vec![
            MetadataDetailed {
                key: "task_id".to_string(),
                value: "t-1".to_string(),
                read_only: true,
            },
            MetadataDetailed {
                key: "env".to_string(),
                value: "prod".to_string(),
                read_only: false,
            },
        ];
        let entries = map_entries(&metadata_map(&items));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["env"], "prod");

        let read_only = list_items(&metadata_read_only(&items));
        assert_eq!(read_only[0].key, known("env".to_string()));
        assert_eq!(read_only[1].read_only, known(true));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&known(String::new())), None);
        assert_eq!(non_empty(&known("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(&Value::Unknown), None);
    }
}
