//! Typed calls against the EdgeCenter cloud API, one module per service.

pub mod floatingips;
pub mod images;
pub mod instances;
pub mod lbpools;
pub mod routers;
pub mod secrets;
pub mod volumes;

use crate::domain::model::MetadataDetailed;
use std::collections::BTreeMap;
use std::time::Duration;

pub const VERSION_POINT_V1: &str = "v1";
pub const VERSION_POINT_V2: &str = "v2";

pub const LBPOOLS_POINT: &str = "lbpools";
pub const ROUTERS_POINT: &str = "routers";
pub const INSTANCES_POINT: &str = "instances";
pub const BMINSTANCES_POINT: &str = "bminstances";
pub const IMAGES_POINT: &str = "images";
pub const BMIMAGES_POINT: &str = "bmimages";
pub const FLOATINGIPS_POINT: &str = "floatingips";
pub const VOLUMES_POINT: &str = "volumes";
pub const SECRETS_POINT: &str = "secrets";

pub const LBPOOLS_CREATE_TIMEOUT: Duration = Duration::from_secs(2400);
pub const ROUTER_CREATING_TIMEOUT: Duration = Duration::from_secs(1200);
pub const ROUTER_DELETING_TIMEOUT: Duration = Duration::from_secs(1200);
pub const BM_INSTANCE_CREATING_TIMEOUT: Duration = Duration::from_secs(3600);
pub const BM_INSTANCE_DELETING_TIMEOUT: Duration = Duration::from_secs(1200);
pub const INSTANCE_CREATING_TIMEOUT: Duration = Duration::from_secs(1200);
pub const FLOATINGIP_TIMEOUT: Duration = Duration::from_secs(1200);
pub const VOLUME_TIMEOUT: Duration = Duration::from_secs(1200);
pub const SECRET_TIMEOUT: Duration = Duration::from_secs(1200);

/// 列表端點共用的 metadata 篩選條件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub metadata_k: Option<String>,
    pub metadata_kv: BTreeMap<String, String>,
}

impl MetadataFilter {
    pub fn to_query(&self) -> crate::utils::error::Result<Vec<(String, String)>> {
        let mut query = Vec::new();
        if let Some(key) = &self.metadata_k {
            query.push(("metadata_k".to_string(), key.clone()));
        }
        if !self.metadata_kv.is_empty() {
            query.push((
                "metadata_kv".to_string(),
                serde_json::to_string(&self.metadata_kv)?,
            ));
        }
        Ok(query)
    }
}

/// 轉成 Terraform `metadata_read_only` 使用的 (key, value, read_only) 列表
pub fn metadata_read_only(items: &[MetadataDetailed]) -> Vec<MetadataDetailed> {
    let mut items = items.to_vec();
    items.sort_by(|a, b| a.key.cmp(&b.key));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_filter_query() {
        let mut filter = MetadataFilter {
            metadata_k: Some("os".to_string()),
            ..Default::default()
        };
        filter.metadata_kv.insert("limit".to_string(), "10".to_string());

        let query = filter.to_query().unwrap();
        assert_eq!(query[0], ("metadata_k".to_string(), "os".to_string()));
        assert_eq!(query[1], ("metadata_kv".to_string(), r#"{"limit":"10"}"#.to_string()));
    }

    #[test]
    fn test_empty_filter_has_no_query() {
        assert!(MetadataFilter::default().to_query().unwrap().is_empty());
    }
}
