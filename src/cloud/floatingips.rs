use crate::cloud::MetadataFilter;
use crate::core::client::ServiceClient;
use crate::core::tasks::TaskResults;
use crate::domain::model::{ListResponse, MetadataDetailed};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignOpts {
    pub port_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    #[serde(default)]
    pub floating_ip_address: Option<String>,
    #[serde(default)]
    pub fixed_ip_address: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub router_id: Option<String>,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub metadata: Vec<MetadataDetailed>,
}

pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<TaskResults> {
    client.post(&[], opts).await
}

pub async fn get(client: &ServiceClient, id: &str) -> Result<FloatingIp> {
    client.get(&[id]).await
}

pub async fn list(client: &ServiceClient, filter: &MetadataFilter) -> Result<Vec<FloatingIp>> {
    let ips: ListResponse<FloatingIp> = client.get_with_query(&[], &filter.to_query()?).await?;
    Ok(ips.results)
}

pub async fn delete(client: &ServiceClient, id: &str) -> Result<TaskResults> {
    client.delete(&[id], &[]).await
}

pub async fn assign(client: &ServiceClient, id: &str, opts: &AssignOpts) -> Result<FloatingIp> {
    client.post(&[id, "assign"], opts).await
}

pub async fn unassign(client: &ServiceClient, id: &str) -> Result<FloatingIp> {
    client
        .post(&[id, "unassign"], &serde_json::json!({}))
        .await
}

/// 以新的 metadata 取代全部既有值
pub async fn metadata_replace(
    client: &ServiceClient,
    id: &str,
    metadata: &BTreeMap<String, String>,
) -> Result<()> {
    let _: serde_json::Value = client.put(&[id, "metadata"], metadata).await?;
    Ok(())
}
