use crate::core::client::ServiceClient;
use crate::core::tasks::TaskResults;
use crate::domain::model::GatewayType;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayInfoOpts {
    #[serde(rename = "type")]
    pub gateway_type: GatewayType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_snat: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceOpts {
    #[serde(rename = "type")]
    pub interface_type: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRoute {
    pub destination: String,
    pub nexthop: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOpts {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_gateway_info: Option<GatewayInfoOpts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceOpts>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<HostRoute>,
}

/// `routes` 為 `Some(vec![])` 時清空所有路由
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_gateway_info: Option<GatewayInfoOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<HostRoute>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IpAssignment {
    pub ip_address: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalGatewayInfo {
    #[serde(default)]
    pub enable_snat: bool,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub external_fixed_ips: Vec<IpAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterInterface {
    pub port_id: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub ip_assignments: Vec<IpAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Router {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub external_gateway_info: Option<ExternalGatewayInfo>,
    #[serde(default)]
    pub interfaces: Vec<RouterInterface>,
    #[serde(default)]
    pub routes: Vec<HostRoute>,
}

#[derive(Debug, Serialize)]
struct SubnetOpts<'a> {
    subnet_id: &'a str,
}

pub async fn create(client: &ServiceClient, opts: &CreateOpts) -> Result<TaskResults> {
    client.post(&[], opts).await
}

pub async fn get(client: &ServiceClient, router_id: &str) -> Result<Router> {
    client.get(&[router_id]).await
}

pub async fn update(client: &ServiceClient, router_id: &str, opts: &UpdateOpts) -> Result<Router> {
    client.patch(&[router_id], opts).await
}

pub async fn delete(client: &ServiceClient, router_id: &str) -> Result<TaskResults> {
    client.delete(&[router_id], &[]).await
}

pub async fn attach(client: &ServiceClient, router_id: &str, subnet_id: &str) -> Result<Router> {
    client
        .post(&[router_id, "attach"], &SubnetOpts { subnet_id })
        .await
}

pub async fn detach(client: &ServiceClient, router_id: &str, subnet_id: &str) -> Result<Router> {
    client
        .post(&[router_id, "detach"], &SubnetOpts { subnet_id })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_opts_clears_routes() {
        let opts = UpdateOpts {
            routes: Some(Vec::new()),
            ..Default::default()
        };
        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json, serde_json::json!({"routes": []}));
    }

    #[test]
    fn test_router_without_gateway() {
        let router: Router = serde_json::from_value(serde_json::json!({
            "id": "r-1",
            "name": "router",
            "external_gateway_info": null,
            "interfaces": [{
                "port_id": "p-1",
                "network_id": "n-1",
                "mac_address": "fa:16:3e:00:00:01",
                "ip_assignments": [{"ip_address": "10.0.0.1", "subnet_id": "s-1"}]
            }]
        }))
        .unwrap();

        assert!(router.external_gateway_info.is_none());
        assert_eq!(router.interfaces[0].ip_assignments[0].subnet_id, "s-1");
        assert!(router.routes.is_empty());
    }
}
