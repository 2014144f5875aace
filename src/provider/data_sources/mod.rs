pub mod floatingip;
pub mod image;
pub mod secret;
pub mod volume;

pub use floatingip::FloatingIpDataSource;
pub use image::ImageDataSource;
pub use secret::SecretDataSource;
pub use volume::VolumeDataSource;

use crate::cloud::MetadataFilter;
use crate::provider::schema::{optional, string_map};
use crate::provider::value::{map_entries, non_empty, TfMap, TfString};
use tf_provider::{Attribute, AttributeType};

/// 列表查詢的 metadata 篩選欄位
pub(crate) fn filter_attributes() -> Vec<(&'static str, Attribute)> {
    vec![
        ("metadata_k", optional(AttributeType::String, "Filtration query opts (only key).")),
        (
            "metadata_kv",
            optional(
                string_map(),
                "Filtration query opts, for example, {offset = \"10\", limit = \"10\"}.",
            ),
        ),
    ]
}

pub(crate) fn metadata_filter(metadata_k: &TfString, metadata_kv: &TfMap) -> MetadataFilter {
    MetadataFilter {
        metadata_k: non_empty(metadata_k),
        metadata_kv: map_entries(metadata_kv),
    }
}

/// 依名稱精確比對，找不到時回傳 `<kind> with <field> <value> not found`
pub(crate) fn find_exact<'a, T>(
    items: &'a [T],
    kind: &str,
    field: &str,
    value: &str,
    key: impl Fn(&T) -> Option<&str>,
) -> crate::utils::error::Result<&'a T> {
    items
        .iter()
        .find(|item| key(*item) == Some(value))
        .ok_or_else(|| {
            crate::utils::error::EdgeError::processing(format!(
                "{} with {} {} not found",
                kind, field, value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::value::{known, to_map};
    use std::collections::BTreeMap;

    #[test]
    fn test_metadata_filter_from_state() {
        let mut kv = BTreeMap::new();
        kv.insert("env".to_string(), "prod".to_string());
        let filter = metadata_filter(&known(String::new()), &to_map(kv));
        assert_eq!(filter.metadata_k, None);
        assert_eq!(filter.metadata_kv["env"], "prod");
    }

    #[test]
    fn test_find_exact() {
        let names = vec!["data".to_string(), "data-2".to_string()];
        let hit = find_exact(&names, "volume", "name", "data-2", |n| Some(n.as_str())).unwrap();
        assert_eq!(hit, "data-2");

        let err = find_exact(&names, "volume", "name", "dat", |n| Some(n.as_str())).unwrap_err();
        assert!(err.to_string().contains("volume with name dat not found"));
    }
}
