use crate::cloud::routers::{
    self, CreateOpts, GatewayInfoOpts, HostRoute, InterfaceOpts, Router, UpdateOpts,
};
use crate::cloud::{ROUTERS_POINT, ROUTER_CREATING_TIMEOUT, ROUTER_DELETING_TIMEOUT, VERSION_POINT_V1};
use crate::core::client::{EdgeCloud, ServiceClient};
use crate::core::tasks::{self, wait_task_and_return_result};
use crate::domain::model::GatewayType;
use crate::domain::ports::ManagedResource;
use crate::provider::schema::{
    block, computed, last_updated, object, optional_computed, required, scoped_schema,
};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    known, list_items, map_list, non_empty, to_list, TfBool, TfList, TfNumber, TfString, ValueExt,
};
use crate::utils::error::{found, EdgeError, Result};
use crate::utils::last_updated_stamp;
use crate::utils::validation::{validate_cidr, validate_ip, validate_one_of};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tf_provider::{AttributeType, NestedBlock, Schema, Value};

pub const SUBNET_INTERFACE_TYPE: &str = "subnet";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedIpState {
    pub ip_address: TfString,
    pub subnet_id: TfString,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayState {
    #[serde(rename = "type")]
    pub gateway_type: TfString,
    pub enable_snat: TfBool,
    pub network_id: TfString,
    pub external_fixed_ips: TfList<FixedIpState>,
}

impl GatewayState {
    fn with_unknown_computed(self) -> Self {
        Self {
            gateway_type: self.gateway_type.null_as_unknown(),
            enable_snat: self.enable_snat.null_as_unknown(),
            network_id: self.network_id.null_as_unknown(),
            external_fixed_ips: self.external_fixed_ips.null_as_unknown(),
        }
    }

    fn to_opts(&self) -> Result<GatewayInfoOpts> {
        let gateway_type = match self.gateway_type.known_ref() {
            Some(t) => GatewayType::parse("external_gateway_info.type", t)?,
            None => GatewayType::Default,
        };
        Ok(GatewayInfoOpts {
            gateway_type,
            enable_snat: self.enable_snat.known_ref().copied(),
            network_id: non_empty(&self.network_id),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterInterfaceState {
    #[serde(rename = "type")]
    pub interface_type: TfString,
    pub subnet_id: TfString,
    pub port_id: TfString,
    pub network_id: TfString,
    pub mac_address: TfString,
    pub ip_address: TfString,
}

impl RouterInterfaceState {
    fn with_unknown_computed(self) -> Self {
        Self {
            port_id: self.port_id.null_as_unknown(),
            network_id: self.network_id.null_as_unknown(),
            mac_address: self.mac_address.null_as_unknown(),
            ip_address: self.ip_address.null_as_unknown(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteState {
    pub destination: TfString,
    pub nexthop: TfString,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouterState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub name: TfString,
    pub external_gateway_info: TfList<GatewayState>,
    pub interfaces: TfList<RouterInterfaceState>,
    pub routes: TfList<RouteState>,
    pub last_updated: TfString,
}

impl_scoped!(RouterState);

/// set 元素的識別鍵
pub fn interface_key(iface: &RouterInterfaceState) -> (String, String) {
    (
        iface.interface_type.known_ref().cloned().unwrap_or_default(),
        iface.subnet_id.known_ref().cloned().unwrap_or_default(),
    )
}

/// 依 subnet_id 比對新舊介面，回傳 (要掛載, 要卸載)
pub fn interface_changes(
    old: &[RouterInterfaceState],
    new: &[RouterInterfaceState],
) -> (Vec<String>, Vec<String>) {
    let subnets = |ifaces: &[RouterInterfaceState]| -> BTreeSet<String> {
        ifaces
            .iter()
            .filter_map(|i| i.subnet_id.known_ref().cloned())
            .collect()
    };
    let old = subnets(old);
    let new = subnets(new);
    (
        new.difference(&old).cloned().collect(),
        old.difference(&new).cloned().collect(),
    )
}

impl RouterState {
    fn routes_opts(&self) -> Vec<HostRoute> {
        list_items(&self.routes)
            .into_iter()
            .map(|r| HostRoute {
                destination: r.destination.known_ref().cloned().unwrap_or_default(),
                nexthop: r.nexthop.known_ref().cloned().unwrap_or_default(),
            })
            .collect()
    }

    fn gateway_opts(&self) -> Result<Option<GatewayInfoOpts>> {
        list_items(&self.external_gateway_info)
            .first()
            .map(GatewayState::to_opts)
            .transpose()
    }

    fn apply(mut self, router: &Router) -> Self {
        self.id = known(router.id.clone());
        self.name = known(router.name.clone());

        let configured = list_items(&self.external_gateway_info);
        if let Some(gateway) = configured.first() {
            let api = router
                .external_gateway_info
                .as_ref()
                .filter(|g| !g.external_fixed_ips.is_empty());
            let state = match api {
                Some(api) => GatewayState {
                    gateway_type: gateway.gateway_type.known_ref().cloned().map(known).unwrap_or_default(),
                    enable_snat: known(api.enable_snat),
                    network_id: known(api.network_id.clone()),
                    external_fixed_ips: to_list(
                        api.external_fixed_ips
                            .iter()
                            .map(|ip| FixedIpState {
                                ip_address: known(ip.ip_address.clone()),
                                subnet_id: known(ip.subnet_id.clone()),
                            })
                            .collect(),
                    ),
                },
                None => GatewayState {
                    gateway_type: resolved(&gateway.gateway_type),
                    enable_snat: resolved(&gateway.enable_snat),
                    network_id: resolved(&gateway.network_id),
                    external_fixed_ips: to_list(Vec::new()),
                },
            };
            self.external_gateway_info = to_list(vec![state]);
        }

        let mut interfaces: Vec<RouterInterfaceState> = router
            .interfaces
            .iter()
            .flat_map(|iface| {
                iface.ip_assignments.iter().map(move |ip| RouterInterfaceState {
                    interface_type: known(SUBNET_INTERFACE_TYPE.to_string()),
                    subnet_id: known(ip.subnet_id.clone()),
                    port_id: known(iface.port_id.clone()),
                    network_id: known(iface.network_id.clone()),
                    mac_address: known(iface.mac_address.clone()),
                    ip_address: known(ip.ip_address.clone()),
                })
            })
            .collect();
        interfaces.sort_by_key(interface_key);
        self.interfaces = to_list(interfaces);

        self.routes = to_list(
            router
                .routes
                .iter()
                .map(|r| RouteState {
                    destination: known(r.destination.clone()),
                    nexthop: known(r.nexthop.clone()),
                })
                .collect(),
        );
        self
    }
}

/// unknown 轉為 null，已知值保留
fn resolved<T: Clone>(value: &Value<T>) -> Value<T> {
    value.known_ref().cloned().map(known).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RouterResource;

impl RouterResource {
    async fn client(&self, cloud: &EdgeCloud, state: &RouterState) -> Result<ServiceClient> {
        let scope = resolve(cloud, state).await?;
        Ok(cloud.service(ROUTERS_POINT, VERSION_POINT_V1, scope))
    }

    fn router_id(state: &RouterState) -> Result<String> {
        state
            .id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("router id is not known"))
    }
}

#[async_trait]
impl ManagedResource for RouterResource {
    type State = RouterState;

    fn schema(&self) -> Schema {
        let gateway = NestedBlock::List(block(
            "Information related to the external gateway.",
            vec![
                ("type", optional_computed(AttributeType::String, "Must be 'manual' or 'default'")),
                ("enable_snat", optional_computed(AttributeType::Bool, "")),
                ("network_id", optional_computed(AttributeType::String, "Id of the external network")),
                (
                    "external_fixed_ips",
                    computed(
                        AttributeType::List(Box::new(object(&[
                            ("ip_address", AttributeType::String),
                            ("subnet_id", AttributeType::String),
                        ]))),
                        "",
                    ),
                ),
            ],
            vec![],
        ));
        let interfaces = NestedBlock::Set(block(
            "Set of interfaces associated with the router.",
            vec![
                ("type", required(AttributeType::String, "must be 'subnet'")),
                ("subnet_id", required(AttributeType::String, "Subnet for router interface must have a gateway IP")),
                ("port_id", computed(AttributeType::String, "")),
                ("network_id", computed(AttributeType::String, "")),
                ("mac_address", computed(AttributeType::String, "")),
                ("ip_address", computed(AttributeType::String, "")),
            ],
            vec![],
        ));
        let routes = NestedBlock::List(block(
            "List of static routes to be applied to the router.",
            vec![
                ("destination", required(AttributeType::String, "")),
                (
                    "nexthop",
                    required(
                        AttributeType::String,
                        "IPv4 address to forward traffic to if it's destination IP matches 'destination' CIDR",
                    ),
                ),
            ],
            vec![],
        ));

        scoped_schema(
            "Represent router. Router enables you to dynamically exchange routes between networks",
            vec![
                ("name", required(AttributeType::String, "The name of the router.")),
                ("last_updated", last_updated()),
            ],
            vec![
                ("external_gateway_info", gateway),
                ("interfaces", interfaces),
                ("routes", routes),
            ],
        )
    }

    fn validate(&self, config: &RouterState) -> Result<()> {
        config.validate_scope()?;
        let gateways = list_items(&config.external_gateway_info);
        if gateways.len() > 1 {
            return Err(EdgeError::validation("only one external_gateway_info block is allowed"));
        }
        for gateway in &gateways {
            if let Some(t) = gateway.gateway_type.known_ref() {
                GatewayType::parse("external_gateway_info.type", t)?;
            }
        }
        for iface in list_items(&config.interfaces) {
            if let Some(t) = iface.interface_type.known_ref() {
                validate_one_of("interfaces.type", t, &[SUBNET_INTERFACE_TYPE])?;
            }
        }
        for route in list_items(&config.routes) {
            if let Some(destination) = route.destination.known_ref() {
                validate_cidr("routes.destination", destination)?;
            }
            if let Some(nexthop) = route.nexthop.known_ref() {
                validate_ip("routes.nexthop", nexthop)?;
            }
        }
        Ok(())
    }

    fn plan_create(&self, proposed: RouterState) -> RouterState {
        RouterState {
            id: proposed.id.null_as_unknown(),
            external_gateway_info: map_list(
                proposed.external_gateway_info,
                GatewayState::with_unknown_computed,
            ),
            interfaces: map_list(proposed.interfaces, RouterInterfaceState::with_unknown_computed),
            ..proposed
        }
    }

    fn plan_update(&self, prior: &RouterState, proposed: RouterState) -> (RouterState, Vec<&'static str>) {
        let replace = prior.scope_changes(&proposed);
        if *prior == proposed {
            return (proposed, replace);
        }

        let external_gateway_info =
            if list_items(&prior.external_gateway_info) == list_items(&proposed.external_gateway_info) {
                proposed.external_gateway_info.clone()
            } else {
                map_list(
                    proposed.external_gateway_info.clone(),
                    GatewayState::with_unknown_computed,
                )
            };

        let planned = RouterState {
            external_gateway_info,
            interfaces: map_list(
                proposed.interfaces.clone(),
                RouterInterfaceState::with_unknown_computed,
            ),
            last_updated: TfString::Unknown,
            ..proposed
        };
        (planned, replace)
    }

    async fn create(&self, cloud: &EdgeCloud, planned: RouterState) -> Result<RouterState> {
        tracing::debug!("Start router creating");
        let client = self.client(cloud, &planned).await?;

        let opts = CreateOpts {
            name: planned.name.known_ref().cloned().unwrap_or_default(),
            external_gateway_info: planned.gateway_opts()?,
            interfaces: list_items(&planned.interfaces)
                .into_iter()
                .map(|i| InterfaceOpts {
                    interface_type: SUBNET_INTERFACE_TYPE.to_string(),
                    subnet_id: i.subnet_id.known_ref().cloned().unwrap_or_default(),
                })
                .collect(),
            routes: planned.routes_opts(),
        };

        let results = routers::create(&client, &opts).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let router_id = wait_task_and_return_result(
            cloud,
            task_id,
            true,
            ROUTER_CREATING_TIMEOUT,
            |task| async move { task.created_resource_id("routers") },
        )
        .await?;
        tracing::debug!("Router id ({})", router_id);

        let router = routers::get(&client, &router_id).await?;
        tracing::debug!("Finish router creating ({})", router_id);
        Ok(planned.apply(&router))
    }

    async fn read(&self, cloud: &EdgeCloud, state: RouterState) -> Result<Option<RouterState>> {
        tracing::debug!("Start router reading");
        let client = self.client(cloud, &state).await?;
        let router_id = Self::router_id(&state)?;
        tracing::debug!("Router id = {}", router_id);

        let Some(router) = found(routers::get(&client, &router_id).await)? else {
            tracing::warn!("Router {} not found, removing from state", router_id);
            return Ok(None);
        };

        tracing::debug!("Finish router reading");
        Ok(Some(state.apply(&router)))
    }

    async fn update(
        &self,
        cloud: &EdgeCloud,
        prior: RouterState,
        planned: RouterState,
    ) -> Result<RouterState> {
        tracing::debug!("Start router updating");
        let client = self.client(cloud, &planned).await?;
        let router_id = Self::router_id(&prior)?;

        let mut opts = UpdateOpts::default();
        if prior.name != planned.name {
            opts.name = planned.name.known_ref().cloned();
        }

        // manual 類型的 gateway 才能更新
        if list_items(&prior.external_gateway_info) != list_items(&planned.external_gateway_info) {
            if let Some(gateway) = planned.gateway_opts()? {
                if gateway.gateway_type == GatewayType::Manual {
                    opts.external_gateway_info = Some(gateway);
                }
            }
        }

        let (attach, detach) = interface_changes(
            &list_items(&prior.interfaces),
            &list_items(&planned.interfaces),
        );
        for subnet_id in &attach {
            tracing::debug!("Attach subnet {} to router {}", subnet_id, router_id);
            routers::attach(&client, &router_id, subnet_id).await?;
        }
        for subnet_id in &detach {
            tracing::debug!("Detach subnet {} from router {}", subnet_id, router_id);
            routers::detach(&client, &router_id, subnet_id).await?;
        }

        if list_items(&prior.routes) != list_items(&planned.routes) {
            opts.routes = Some(planned.routes_opts());
        }

        if opts != UpdateOpts::default() {
            routers::update(&client, &router_id, &opts).await?;
        }

        let router = routers::get(&client, &router_id).await?;
        let state = RouterState {
            id: prior.id.clone(),
            last_updated: known(last_updated_stamp()),
            ..planned
        };
        tracing::debug!("Finish router updating");
        Ok(state.apply(&router))
    }

    async fn delete(&self, cloud: &EdgeCloud, state: RouterState) -> Result<()> {
        tracing::debug!("Start router deleting");
        let client = self.client(cloud, &state).await?;
        let router_id = Self::router_id(&state)?;

        let results = routers::delete(&client, &router_id).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let (client, router_id) = (&client, router_id.as_str());
        wait_task_and_return_result(cloud, task_id, true, ROUTER_DELETING_TIMEOUT, |_| {
            tasks::confirm_deleted("router", router_id, routers::get(client, router_id))
        })
        .await?;

        tracing::debug!("Finish of router deleting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iface(subnet: &str) -> RouterInterfaceState {
        RouterInterfaceState {
            interface_type: known(SUBNET_INTERFACE_TYPE.to_string()),
            subnet_id: known(subnet.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_interface_changes() {
        let old = vec![iface("s-1"), iface("s-2")];
        let new = vec![iface("s-2"), iface("s-3")];

        let (attach, detach) = interface_changes(&old, &new);
        assert_eq!(attach, vec!["s-3".to_string()]);
        assert_eq!(detach, vec!["s-1".to_string()]);
    }

    #[test]
    fn test_interface_key_ignores_computed_fields() {
        let mut a = iface("s-1");
        let b = iface("s-1");
        a.port_id = known("p-1".to_string());
        a.ip_address = known("10.0.0.1".to_string());
        assert_eq!(interface_key(&a), interface_key(&b));
        assert_ne!(interface_key(&a), interface_key(&iface("s-2")));
    }

    #[test]
    fn test_validate_routes() {
        let mut state = RouterState {
            project_id: known(1),
            region_name: known("Luxembourg".to_string()),
            name: known("router".to_string()),
            routes: to_list(vec![RouteState {
                destination: known("10.0.3.0/24".to_string()),
                nexthop: known("10.0.0.13".to_string()),
            }]),
            ..Default::default()
        };
        assert!(RouterResource.validate(&state).is_ok());

        state.routes = to_list(vec![RouteState {
            destination: known("10.0.3.0".to_string()),
            nexthop: known("10.0.0.13".to_string()),
        }]);
        assert!(RouterResource.validate(&state).is_err());
    }

    #[test]
    fn test_apply_flattens_ip_assignments() {
        let router: Router = serde_json::from_value(serde_json::json!({
            "id": "r-1",
            "name": "router",
            "interfaces": [{
                "port_id": "p-1",
                "network_id": "n-1",
                "mac_address": "fa:16:3e:00:00:01",
                "ip_assignments": [
                    {"ip_address": "10.0.1.1", "subnet_id": "s-2"},
                    {"ip_address": "10.0.0.1", "subnet_id": "s-1"}
                ]
            }],
            "routes": [{"destination": "10.0.3.0/24", "nexthop": "10.0.0.13"}]
        }))
        .unwrap();

        let state = RouterState::default().apply(&router);
        let interfaces = list_items(&state.interfaces);
        assert_eq!(interfaces.len(), 2);
        assert_eq!(interfaces[0].subnet_id, known("s-1".to_string()));
        assert_eq!(interfaces[1].port_id, known("p-1".to_string()));
        assert_eq!(list_items(&state.routes).len(), 1);
        assert!(list_items(&state.external_gateway_info).is_empty());
    }
}
