use crate::core::client::ServiceClient;
use crate::core::tasks::TaskResults;
use crate::domain::model::{HealthMonitorType, IdRef, LbAlgorithm, LbProtocol};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateHealthMonitorOpts {
    #[serde(rename = "type")]
    pub monitor_type: HealthMonitorType,
    pub delay: i64,
    pub max_retries: i64,
    pub timeout: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries_down: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_codes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSessionPersistenceOpts {
    #[serde(rename = "type")]
    pub persistence_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookie_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_granularity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_timeout: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePoolMemberOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub address: IpAddr,
    pub protocol_port: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOpts {
    pub name: String,
    pub protocol: LbProtocol,
    pub lb_algorithm: LbAlgorithm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loadbalancer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listener_id: Option<String>,
    #[serde(rename = "healthmonitor", skip_serializing_if = "Option::is_none")]
    pub health_monitor: Option<CreateHealthMonitorOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_persistence: Option<CreateSessionPersistenceOpts>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateOpts {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lb_algorithm: Option<LbAlgorithm>,
    #[serde(rename = "healthmonitor", skip_serializing_if = "Option::is_none")]
    pub health_monitor: Option<CreateHealthMonitorOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_persistence: Option<CreateSessionPersistenceOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<CreatePoolMemberOpts>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthMonitor {
    pub id: String,
    #[serde(rename = "type")]
    pub monitor_type: String,
    pub delay: i64,
    pub timeout: i64,
    pub max_retries: i64,
    #[serde(default)]
    pub max_retries_down: Option<i64>,
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub expected_codes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionPersistence {
    #[serde(rename = "type")]
    pub persistence_type: String,
    #[serde(default)]
    pub cookie_name: Option<String>,
    #[serde(default)]
    pub persistence_granularity: Option<String>,
    #[serde(default)]
    pub persistence_timeout: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolMember {
    pub id: String,
    pub address: IpAddr,
    pub protocol_port: i64,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub operating_status: Option<String>,
}

impl PoolMember {
    /// 更新 pool 時原樣保留的成員
    pub fn to_opts(&self) -> CreatePoolMemberOpts {
        CreatePoolMemberOpts {
            id: Some(self.id.clone()),
            address: self.address,
            protocol_port: self.protocol_port,
            weight: Some(self.weight),
            subnet_id: self.subnet_id.clone(),
            instance_id: self.instance_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pool {
    pub id: String,
    pub name: String,
    pub lb_algorithm: String,
    pub protocol: String,
    #[serde(default)]
    pub loadbalancers: Vec<IdRef>,
    #[serde(default)]
    pub listeners: Vec<IdRef>,
    #[serde(rename = "healthmonitor", default)]
    pub health_monitor: Option<HealthMonitor>,
    #[serde(default)]
    pub session_persistence: Option<SessionPersistence>,
    #[serde(default)]
    pub members: Vec<PoolMember>,
    #[serde(default)]
    pub operating_status: Option<String>,
    #[serde(default)]
    pub provisioning_status: Option<String>,
}

pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<TaskResults> {
    client.post(&[], opts).await
}

pub async fn get(client: &ServiceClient, pool_id: &str) -> Result<Pool> {
    client.get(&[pool_id]).await
}

pub async fn update(client: &ServiceClient, pool_id: &str, opts: &UpdateOpts) -> Result<TaskResults> {
    client.patch(&[pool_id], opts).await
}

pub async fn delete(client: &ServiceClient, pool_id: &str) -> Result<TaskResults> {
    client.delete(&[pool_id], &[]).await
}

pub async fn create_member(
    client: &ServiceClient,
    pool_id: &str,
    opts: &CreatePoolMemberOpts,
) -> Result<TaskResults> {
    client.post(&[pool_id, "member"], opts).await
}

pub async fn delete_member(
    client: &ServiceClient,
    pool_id: &str,
    member_id: &str,
) -> Result<TaskResults> {
    client.delete(&[pool_id, "member", member_id], &[]).await
}
