use crate::cloud::MetadataFilter;
use crate::core::client::ServiceClient;
use crate::core::tasks::TaskResults;
use crate::domain::model::{ListResponse, MetadataDetailed, VolumeSource};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOpts {
    pub source: VolumeSource,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub size: i64,
    #[serde(default, rename = "volume_type")]
    pub type_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub metadata_detailed: Vec<MetadataDetailed>,
}

#[derive(Debug, Serialize)]
struct RenameOpts<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct ExtendOpts {
    size: i64,
}

#[derive(Debug, Serialize)]
struct RetypeOpts<'a> {
    volume_type: &'a str,
}

pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<TaskResults> {
    client.post(&[], opts).await
}

pub async fn get(client: &ServiceClient, id: &str) -> Result<Volume> {
    client.get(&[id]).await
}

pub async fn list(client: &ServiceClient, filter: &MetadataFilter) -> Result<Vec<Volume>> {
    let volumes: ListResponse<Volume> = client.get_with_query(&[], &filter.to_query()?).await?;
    Ok(volumes.results)
}

pub async fn delete(client: &ServiceClient, id: &str) -> Result<TaskResults> {
    client.delete(&[id], &[]).await
}

pub async fn rename(client: &ServiceClient, id: &str, name: &str) -> Result<Volume> {
    client.patch(&[id], &RenameOpts { name }).await
}

pub async fn extend(client: &ServiceClient, id: &str, size: i64) -> Result<TaskResults> {
    client.post(&[id, "extend"], &ExtendOpts { size }).await
}

pub async fn retype(client: &ServiceClient, id: &str, volume_type: &str) -> Result<Volume> {
    client
        .post(&[id, "retype"], &RetypeOpts { volume_type })
        .await
}

pub async fn metadata_replace(
    client: &ServiceClient,
    id: &str,
    metadata: &BTreeMap<String, String>,
) -> Result<()> {
    let _: serde_json::Value = client.put(&[id, "metadata"], metadata).await?;
    Ok(())
}
