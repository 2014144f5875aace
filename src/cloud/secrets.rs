//! Certificate secrets. Creation uses API v2, everything else v1.

use crate::core::client::ServiceClient;
use crate::core::tasks::TaskResults;
use crate::domain::model::ListResponse;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadOpts {
    pub certificate: String,
    pub certificate_chain: String,
    pub private_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateOpts {
    pub name: String,
    pub payload: PayloadOpts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Secret {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub bit_length: Option<i64>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub content_types: BTreeMap<String, String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
}

/// `client` 必須是 v2 的服務客戶端
pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<TaskResults> {
    client.post(&[], opts).await
}

pub async fn get(client: &ServiceClient, id: &str) -> Result<Secret> {
    client.get(&[id]).await
}

pub async fn list(client: &ServiceClient) -> Result<Vec<Secret>> {
    let secrets: ListResponse<Secret> = client.get(&[]).await?;
    Ok(secrets.results)
}

pub async fn delete(client: &ServiceClient, id: &str) -> Result<TaskResults> {
    client.delete(&[id], &[]).await
}
