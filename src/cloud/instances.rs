//! Baremetal instances.
//!
//! Creation goes through the `bminstances` point, everything after that through the
//! regular `instances` point.

use crate::core::client::ServiceClient;
use crate::core::tasks::TaskResults;
use crate::domain::model::{FloatingIpSource, InterfaceType, MetadataDetailed};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceFloatingIpOpts {
    pub source: FloatingIpSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_floating_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceOpts {
    #[serde(rename = "type")]
    pub interface_type: InterfaceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floating_ip: Option<InterfaceFloatingIpOpts>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateOpts {
    pub flavor: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub name_templates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apptemplate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypair_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_config: Option<BTreeMap<String, String>>,
    pub interfaces: Vec<InterfaceOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetachInterfaceOpts {
    pub port_id: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Flavor {
    pub flavor_id: String,
    #[serde(default)]
    pub flavor_name: String,
    #[serde(default)]
    pub ram: i64,
    #[serde(default)]
    pub vcpus: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceAddress {
    pub addr: String,
    #[serde(rename = "type")]
    pub address_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Instance {
    #[serde(rename = "instance_id")]
    pub id: String,
    #[serde(rename = "instance_name")]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub vm_state: String,
    pub flavor: Flavor,
    #[serde(default)]
    pub addresses: BTreeMap<String, Vec<InstanceAddress>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortIp {
    pub ip_address: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubPort {
    pub port_id: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub ip_assignments: Vec<PortIp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceInterface {
    pub port_id: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub ip_assignments: Vec<PortIp>,
    #[serde(default)]
    pub sub_ports: Vec<SubPort>,
}

#[derive(Debug, Serialize)]
struct RenameOpts<'a> {
    name: &'a str,
}

/// `bminstances` 端點
pub async fn create_baremetal(client: &ServiceClient, opts: &CreateOpts) -> Result<TaskResults> {
    client.post(&[], opts).await
}

pub async fn get(client: &ServiceClient, instance_id: &str) -> Result<Instance> {
    client.get(&[instance_id]).await
}

pub async fn list_interfaces(
    client: &ServiceClient,
    instance_id: &str,
) -> Result<Vec<InstanceInterface>> {
    client.get(&[instance_id, "interfaces"]).await
}

pub async fn rename(client: &ServiceClient, instance_id: &str, name: &str) -> Result<Instance> {
    client.patch(&[instance_id], &RenameOpts { name }).await
}

pub async fn metadata_get(
    client: &ServiceClient,
    instance_id: &str,
    key: &str,
) -> Result<MetadataDetailed> {
    client.get(&[instance_id, "metadata", key]).await
}

pub async fn metadata_create(
    client: &ServiceClient,
    instance_id: &str,
    metadata: &BTreeMap<String, String>,
) -> Result<()> {
    client
        .post_no_content(&[instance_id, "metadata"], metadata)
        .await
}

pub async fn metadata_delete(client: &ServiceClient, instance_id: &str, key: &str) -> Result<()> {
    client
        .delete_no_content(&[instance_id, "metadata", key])
        .await
}

pub async fn attach_interface(
    client: &ServiceClient,
    instance_id: &str,
    opts: &InterfaceOpts,
) -> Result<TaskResults> {
    client.post(&[instance_id, "attach_interface"], opts).await
}

pub async fn detach_interface(
    client: &ServiceClient,
    instance_id: &str,
    opts: &DetachInterfaceOpts,
) -> Result<TaskResults> {
    client.post(&[instance_id, "detach_interface"], opts).await
}

/// 連同綁定的 floating IP 一起刪除
pub async fn delete(client: &ServiceClient, instance_id: &str) -> Result<TaskResults> {
    client
        .delete(
            &[instance_id],
            &[("delete_floatings".to_string(), "true".to_string())],
        )
        .await
}
