use crate::cloud::instances::{
    self, CreateOpts, DetachInterfaceOpts, Instance, InstanceInterface, InterfaceFloatingIpOpts,
    InterfaceOpts,
};
use crate::cloud::{
    BMINSTANCES_POINT, BM_INSTANCE_CREATING_TIMEOUT, BM_INSTANCE_DELETING_TIMEOUT,
    INSTANCES_POINT, INSTANCE_CREATING_TIMEOUT, VERSION_POINT_V1,
};
use crate::core::client::{EdgeCloud, ServiceClient};
use crate::core::tasks::{self, wait_task_and_return_result};
use crate::domain::model::{FloatingIpSource, InterfaceType, Scope};
use crate::domain::ports::ManagedResource;
use crate::provider::schema::{
    block, computed, deprecated, last_updated, object, optional, optional_computed, required,
    scoped_schema, sensitive, string_list, string_map,
};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    known, list_items, map_entries, map_list, non_empty, to_list, to_map, TfBool,
    TfList, TfMap, TfNumber, TfString, ValueExt,
};
use crate::utils::error::{found, EdgeError, Result};
use crate::utils::last_updated_stamp;
use crate::utils::validation::{validate_conflicts, validate_exactly_one};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tf_provider::{AttributeType, NestedBlock, Schema, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BmInterfaceState {
    #[serde(rename = "type")]
    pub interface_type: TfString,
    pub is_parent: TfBool,
    pub order: TfNumber,
    pub network_id: TfString,
    pub subnet_id: TfString,
    pub port_id: TfString,
    pub fip_source: TfString,
    pub existing_fip_id: TfString,
    pub ip_address: TfString,
}

impl BmInterfaceState {
    fn with_unknown_computed(self) -> Self {
        Self {
            is_parent: self.is_parent.null_as_unknown(),
            network_id: self.network_id.null_as_unknown(),
            subnet_id: self.subnet_id.null_as_unknown(),
            port_id: self.port_id.null_as_unknown(),
            ip_address: self.ip_address.null_as_unknown(),
            ..self
        }
    }

    fn kind(&self) -> Result<InterfaceType> {
        let value = self
            .interface_type
            .known_ref()
            .ok_or_else(|| EdgeError::validation("interface.type must be known"))?;
        InterfaceType::parse("interface.type", value)
    }

    /// 判斷兩個介面是否為同一個設定，依類型比對對應的識別欄位
    fn same_interface(&self, other: &Self) -> bool {
        if self.interface_type != other.interface_type {
            return false;
        }
        match self.kind() {
            Ok(InterfaceType::Subnet) => self.subnet_id == other.subnet_id,
            Ok(InterfaceType::AnySubnet) => self.network_id == other.network_id,
            Ok(InterfaceType::ReservedFixedIp) => self.port_id == other.port_id,
            Ok(InterfaceType::External) => true,
            Err(_) => false,
        }
    }

    fn matches(&self, entry: &BmInterfaceState) -> bool {
        let same = |a: &TfString, b: &TfString| match (a.known_ref(), b.known_ref()) {
            (Some(a), Some(b)) => !a.is_empty() && a == b,
            _ => false,
        };
        same(&self.subnet_id, &entry.subnet_id)
            || same(&self.ip_address, &entry.ip_address)
            || same(&self.port_id, &entry.port_id)
    }

    fn to_opts(&self) -> Result<InterfaceOpts> {
        let floating_ip = non_empty(&self.fip_source)
            .map(|source| -> Result<InterfaceFloatingIpOpts> {
                Ok(InterfaceFloatingIpOpts {
                    source: FloatingIpSource::parse("interface.fip_source", &source)?,
                    existing_floating_id: non_empty(&self.existing_fip_id),
                })
            })
            .transpose()?;
        Ok(InterfaceOpts {
            interface_type: self.kind()?,
            network_id: non_empty(&self.network_id),
            subnet_id: non_empty(&self.subnet_id),
            port_id: non_empty(&self.port_id),
            floating_ip,
        })
    }

    /// attach 只送出該類型需要的欄位
    fn to_attach_opts(&self) -> Result<InterfaceOpts> {
        let kind = self.kind()?;
        let mut opts = InterfaceOpts {
            interface_type: kind,
            network_id: None,
            subnet_id: None,
            port_id: None,
            floating_ip: None,
        };
        match kind {
            InterfaceType::Subnet => opts.subnet_id = non_empty(&self.subnet_id),
            InterfaceType::AnySubnet => opts.network_id = non_empty(&self.network_id),
            InterfaceType::ReservedFixedIp => opts.port_id = non_empty(&self.port_id),
            InterfaceType::External => {}
        }
        Ok(opts)
    }

    fn is_attached(&self, current: &[InstanceInterface]) -> bool {
        let on_subnet = |subnet: &String, ips: &[instances::PortIp]| {
            ips.iter().any(|ip| &ip.subnet_id == subnet)
        };
        match self.kind() {
            Ok(InterfaceType::Subnet) => self.subnet_id.known_ref().is_some_and(|subnet| {
                current.iter().any(|i| {
                    on_subnet(subnet, &i.ip_assignments)
                        || i.sub_ports.iter().any(|sp| on_subnet(subnet, &sp.ip_assignments))
                })
            }),
            Ok(InterfaceType::AnySubnet) => self
                .network_id
                .known_ref()
                .is_some_and(|network| current.iter().any(|i| &i.network_id == network)),
            Ok(InterfaceType::ReservedFixedIp) => self
                .port_id
                .known_ref()
                .is_some_and(|port| current.iter().any(|i| &i.port_id == port)),
            _ => false,
        }
    }
}

/// trunk 介面排在最前面，其餘依 order 排序
pub fn sort_interfaces(interfaces: &mut [BmInterfaceState]) {
    interfaces.sort_by_key(|i| {
        (
            !i.is_parent.known_ref().copied().unwrap_or(false),
            i.order.known_ref().copied().unwrap_or(0),
        )
    });
}

/// API 回傳的介面與子埠展開成一筆一個 IP，並帶回設定中相符介面的輸入欄位
pub fn interfaces_from_api(
    configured: &[BmInterfaceState],
    api: &[InstanceInterface],
) -> Vec<BmInterfaceState> {
    let mut entries = Vec::new();
    for iface in api {
        for ip in &iface.ip_assignments {
            entries.push(BmInterfaceState {
                is_parent: known(true),
                network_id: known(iface.network_id.clone()),
                subnet_id: known(ip.subnet_id.clone()),
                port_id: known(iface.port_id.clone()),
                ip_address: known(ip.ip_address.clone()),
                ..Default::default()
            });
        }
        for sub_port in &iface.sub_ports {
            for ip in &sub_port.ip_assignments {
                entries.push(BmInterfaceState {
                    is_parent: known(false),
                    network_id: known(sub_port.network_id.clone()),
                    subnet_id: known(ip.subnet_id.clone()),
                    port_id: known(sub_port.port_id.clone()),
                    ip_address: known(ip.ip_address.clone()),
                    ..Default::default()
                });
            }
        }
    }

    entries
        .into_iter()
        .map(|mut entry| {
            match configured.iter().find(|c| c.matches(&entry)) {
                Some(c) => {
                    entry.interface_type = c.interface_type.clone();
                    entry.order = c.order.clone();
                    entry.fip_source = c.fip_source.clone();
                    entry.existing_fip_id = c.existing_fip_id.clone();
                }
                None => entry.interface_type = known(InterfaceType::Subnet.as_str().to_string()),
            }
            entry
        })
        .collect()
}

/// 只補上計畫中仍是 unknown 的欄位，已知值保持不變
fn fill_interfaces(planned: &[BmInterfaceState], api: &[BmInterfaceState]) -> Vec<BmInterfaceState> {
    let mut used = BTreeSet::new();
    planned
        .iter()
        .map(|iface| {
            let hit = api
                .iter()
                .enumerate()
                .find(|(i, entry)| !used.contains(i) && iface.matches(entry))
                .or_else(|| api.iter().enumerate().find(|(i, _)| !used.contains(i)));
            let Some((index, entry)) = hit else {
                return resolve_unknown(iface.clone(), &BmInterfaceState::default());
            };
            used.insert(index);
            resolve_unknown(iface.clone(), entry)
        })
        .collect()
}

fn resolve_unknown(iface: BmInterfaceState, entry: &BmInterfaceState) -> BmInterfaceState {
    fn pick<T: Clone>(planned: Value<T>, actual: &Value<T>) -> Value<T> {
        match planned {
            Value::Unknown => actual.clone(),
            other => other,
        }
    }
    BmInterfaceState {
        is_parent: pick(iface.is_parent, &entry.is_parent),
        network_id: pick(iface.network_id, &entry.network_id),
        subnet_id: pick(iface.subnet_id, &entry.subnet_id),
        port_id: pick(iface.port_id, &entry.port_id),
        ip_address: pick(iface.ip_address, &entry.ip_address),
        ..iface
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataItemState {
    pub key: TfString,
    pub value: TfString,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressState {
    pub addr: TfString,
    #[serde(rename = "type")]
    pub address_type: TfString,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressesState {
    pub net: TfList<AddressState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaremetalState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub flavor_id: TfString,
    pub interface: TfList<BmInterfaceState>,
    pub name: TfString,
    pub name_templates: TfList<String>,
    pub name_template: TfString,
    pub image_id: TfString,
    pub apptemplate_id: TfString,
    pub keypair_name: TfString,
    pub password: TfString,
    pub username: TfString,
    pub metadata: TfList<MetadataItemState>,
    pub metadata_map: TfMap,
    pub app_config: TfMap,
    pub user_data: TfString,
    pub flavor: TfMap,
    pub status: TfString,
    pub vm_state: TfString,
    pub addresses: TfList<AddressesState>,
    pub last_updated: TfString,
}

impl_scoped!(BaremetalState);

impl BaremetalState {
    fn instance_id(&self) -> Result<String> {
        self.id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("instance id is not known"))
    }

    fn has_templates(&self) -> bool {
        !list_items(&self.name_templates).is_empty() || non_empty(&self.name_template).is_some()
    }

    /// 已設定的 metadata；舊的 `metadata` 清單優先
    fn metadata_entries(&self) -> BTreeMap<String, String> {
        let items = list_items(&self.metadata);
        if !items.is_empty() {
            return items
                .into_iter()
                .filter_map(|item| Some((item.key.into_known()?, item.value.into_known()?)))
                .collect();
        }
        map_entries(&self.metadata_map)
    }

    fn sorted_interfaces(&self) -> Vec<BmInterfaceState> {
        let mut interfaces = list_items(&self.interface);
        sort_interfaces(&mut interfaces);
        interfaces
    }

    fn create_opts(&self) -> Result<CreateOpts> {
        let interfaces = self
            .sorted_interfaces()
            .iter()
            .map(BmInterfaceState::to_opts)
            .collect::<Result<Vec<_>>>()?;

        let name_templates = match list_items(&self.name_templates) {
            templates if !templates.is_empty() => templates,
            _ => non_empty(&self.name_template).into_iter().collect(),
        };
        let metadata = self.metadata_entries();
        let app_config = map_entries(&self.app_config);

        Ok(CreateOpts {
            flavor: self.flavor_id.known_ref().cloned().unwrap_or_default(),
            names: non_empty(&self.name).into_iter().collect(),
            name_templates,
            image_id: non_empty(&self.image_id),
            apptemplate_id: non_empty(&self.apptemplate_id),
            keypair_name: non_empty(&self.keypair_name),
            password: non_empty(&self.password),
            username: non_empty(&self.username),
            user_data: non_empty(&self.user_data),
            app_config: (!app_config.is_empty()).then_some(app_config),
            interfaces,
            metadata: (!metadata.is_empty()).then_some(metadata),
        })
    }

    fn apply_instance(&mut self, instance: &Instance) {
        self.id = known(instance.id.clone());
        self.name = known(instance.name.clone());
        self.flavor_id = known(instance.flavor.flavor_id.clone());
        self.status = known(instance.status.clone());
        self.vm_state = known(instance.vm_state.clone());

        let mut flavor = BTreeMap::new();
        flavor.insert("flavor_id".to_string(), instance.flavor.flavor_id.clone());
        flavor.insert("flavor_name".to_string(), instance.flavor.flavor_name.clone());
        flavor.insert("ram".to_string(), instance.flavor.ram.to_string());
        flavor.insert("vcpus".to_string(), instance.flavor.vcpus.to_string());
        self.flavor = to_map(flavor);

        self.addresses = to_list(
            instance
                .addresses
                .values()
                .map(|addrs| AddressesState {
                    net: to_list(
                        addrs
                            .iter()
                            .map(|a| AddressState {
                                addr: known(a.addr.clone()),
                                address_type: known(a.address_type.clone()),
                            })
                            .collect(),
                    ),
                })
                .collect(),
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BaremetalResource;

impl BaremetalResource {
    async fn scope(&self, cloud: &EdgeCloud, state: &BaremetalState) -> Result<Scope> {
        resolve(cloud, state).await
    }

    /// 讀取實例、介面與已設定鍵的 metadata
    ///
    /// `refresh` 為 true 時介面清單完全以 API 為準，否則只補齊計畫中的 unknown 欄位。
    async fn load(
        client: &ServiceClient,
        instance_id: &str,
        mut state: BaremetalState,
        refresh: bool,
    ) -> Result<BaremetalState> {
        let instance = instances::get(client, instance_id).await.map_err(|e| {
            EdgeError::processing(format!(
                "cannot get instance with ID: {}. Error: {}",
                instance_id, e
            ))
        })?;
        state.apply_instance(&instance);

        let api_interfaces = instances::list_interfaces(client, instance_id).await?;
        if api_interfaces.is_empty() {
            return Err(EdgeError::processing("interface not found"));
        }
        let configured = state.sorted_interfaces();
        let entries = interfaces_from_api(&configured, &api_interfaces);
        let interfaces = if refresh {
            entries
        } else {
            fill_interfaces(&list_items(&state.interface), &entries)
        };
        state.interface = to_list(interfaces);

        let read_value = |key: String| async move {
            instances::metadata_get(client, instance_id, &key)
                .await
                .map(|md| (md.key, md.value))
                .map_err(|e| {
                    EdgeError::processing(format!(
                        "cannot get metadata with key: {}. Error: {}",
                        key, e
                    ))
                })
        };
        let items = list_items(&state.metadata);
        if !items.is_empty() {
            let mut refreshed = Vec::with_capacity(items.len());
            for item in items {
                let Some(key) = item.key.into_known() else { continue };
                let (key, value) = read_value(key).await?;
                refreshed.push(MetadataItemState {
                    key: known(key),
                    value: known(value),
                });
            }
            state.metadata = to_list(refreshed);
        } else if state.metadata_map.is_set() {
            let mut refreshed = BTreeMap::new();
            for key in map_entries(&state.metadata_map).into_keys() {
                let (_, value) = read_value(key.clone()).await?;
                refreshed.insert(key, value);
            }
            state.metadata_map = to_map(refreshed);
        }

        Ok(state)
    }

    async fn wait_interface_task(
        cloud: &EdgeCloud,
        results: tasks::TaskResults,
    ) -> Result<()> {
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);
        wait_task_and_return_result(cloud, task_id, true, INSTANCE_CREATING_TIMEOUT, |_| async {
            Ok(())
        })
        .await
    }

    async fn replace_metadata(
        client: &ServiceClient,
        instance_id: &str,
        old: &BTreeMap<String, String>,
        new: &BTreeMap<String, String>,
    ) -> Result<()> {
        for key in old.keys() {
            instances::metadata_delete(client, instance_id, key)
                .await
                .map_err(|e| {
                    EdgeError::processing(format!(
                        "cannot delete metadata key: {}. Error: {}",
                        key, e
                    ))
                })?;
        }
        if !new.is_empty() {
            instances::metadata_create(client, instance_id, new)
                .await
                .map_err(|e| EdgeError::processing(format!("cannot create metadata. Error: {}", e)))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ManagedResource for BaremetalResource {
    type State = BaremetalState;

    fn schema(&self) -> Schema {
        let interface = NestedBlock::List(block(
            "Network interfaces of the instance.",
            vec![
                (
                    "type",
                    required(
                        AttributeType::String,
                        "Available value is 'subnet', 'any_subnet', 'external', 'reserved_fixed_ip'",
                    ),
                ),
                (
                    "is_parent",
                    optional_computed(
                        AttributeType::Bool,
                        "If not set will be calculated after creation. Trunk interface always attached first. Can't detach interface if is_parent true. Fields affect only on creation",
                    ),
                ),
                (
                    "order",
                    optional(
                        AttributeType::Number,
                        "Order of attaching interface. Trunk interface always attached first, fields affect only on creation",
                    ),
                ),
                ("network_id", optional_computed(AttributeType::String, "required if type is 'subnet' or 'any_subnet'")),
                ("subnet_id", optional_computed(AttributeType::String, "required if type is 'subnet'")),
                ("port_id", optional_computed(AttributeType::String, "required if type is  'reserved_fixed_ip'")),
                ("fip_source", optional(AttributeType::String, "")),
                ("existing_fip_id", optional(AttributeType::String, "")),
                ("ip_address", optional_computed(AttributeType::String, "")),
            ],
            vec![],
        ));
        let metadata = NestedBlock::List(block(
            "Deprecated, use metadata_map instead.",
            vec![
                ("key", required(AttributeType::String, "")),
                ("value", required(AttributeType::String, "")),
            ],
            vec![],
        ));
        let addresses = AttributeType::List(Box::new(object(&[(
            "net",
            AttributeType::List(Box::new(object(&[
                ("addr", AttributeType::String),
                ("type", AttributeType::String),
            ]))),
        )])));

        scoped_schema(
            "Represent baremetal instance",
            vec![
                ("flavor_id", required(AttributeType::String, "")),
                ("name", optional_computed(AttributeType::String, "The name of the baremetal instance.")),
                ("name_templates", deprecated(optional(string_list(), "Use name_template instead"))),
                ("name_template", optional(AttributeType::String, "")),
                ("image_id", optional(AttributeType::String, "")),
                ("apptemplate_id", optional(AttributeType::String, "")),
                ("keypair_name", optional(AttributeType::String, "")),
                ("password", sensitive(optional(AttributeType::String, ""))),
                ("username", optional(AttributeType::String, "")),
                ("metadata_map", optional(string_map(), "A map containing metadata, for example tags.")),
                ("app_config", optional(string_map(), "")),
                ("user_data", optional(AttributeType::String, "")),
                ("flavor", computed(string_map(), "")),
                ("status", computed(AttributeType::String, "")),
                ("vm_state", computed(AttributeType::String, "")),
                ("addresses", computed(addresses, "")),
                ("last_updated", last_updated()),
            ],
            vec![("interface", interface), ("metadata", metadata)],
        )
    }

    fn validate(&self, config: &BaremetalState) -> Result<()> {
        config.validate_scope()?;
        validate_conflicts(
            ("name_templates", config.name_templates.is_set()),
            ("name_template", config.name_template.is_set()),
        )?;
        validate_conflicts(
            ("metadata", !list_items(&config.metadata).is_empty()),
            ("metadata_map", config.metadata_map.is_set()),
        )?;
        validate_exactly_one(
            ("image_id", config.image_id.is_set()),
            ("apptemplate_id", config.apptemplate_id.is_set()),
        )?;

        let interfaces = list_items(&config.interface);
        if config.interface.known_ref().is_some() && interfaces.is_empty() {
            return Err(EdgeError::validation("at least one interface block is required"));
        }
        for iface in &interfaces {
            if iface.interface_type.is_pending() {
                continue;
            }
            iface.kind()?;
            if let Some(source) = iface.fip_source.known_ref() {
                FloatingIpSource::parse("interface.fip_source", source)?;
            }
        }
        Ok(())
    }

    fn plan_create(&self, proposed: BaremetalState) -> BaremetalState {
        BaremetalState {
            id: proposed.id.null_as_unknown(),
            name: proposed.name.null_as_unknown(),
            interface: map_list(proposed.interface, BmInterfaceState::with_unknown_computed),
            flavor: proposed.flavor.null_as_unknown(),
            status: proposed.status.null_as_unknown(),
            vm_state: proposed.vm_state.null_as_unknown(),
            addresses: proposed.addresses.null_as_unknown(),
            ..proposed
        }
    }

    fn plan_update(
        &self,
        prior: &BaremetalState,
        proposed: BaremetalState,
    ) -> (BaremetalState, Vec<&'static str>) {
        let mut replace = prior.scope_changes(&proposed);
        let create_only: [(&'static str, bool); 8] = [
            ("flavor_id", prior.flavor_id != proposed.flavor_id),
            ("image_id", prior.image_id != proposed.image_id),
            ("apptemplate_id", prior.apptemplate_id != proposed.apptemplate_id),
            ("keypair_name", prior.keypair_name != proposed.keypair_name),
            ("password", prior.password != proposed.password),
            ("username", prior.username != proposed.username),
            ("user_data", prior.user_data != proposed.user_data),
            ("app_config", prior.app_config != proposed.app_config),
        ];
        replace.extend(create_only.iter().filter(|(_, changed)| *changed).map(|(name, _)| *name));
        if *prior == proposed {
            return (proposed, replace);
        }

        let planned = BaremetalState {
            name: proposed.name.clone().null_as_unknown(),
            interface: map_list(proposed.interface.clone(), BmInterfaceState::with_unknown_computed),
            status: TfString::Unknown,
            vm_state: TfString::Unknown,
            addresses: Value::Unknown,
            last_updated: TfString::Unknown,
            ..proposed
        };
        (planned, replace)
    }

    async fn create(&self, cloud: &EdgeCloud, planned: BaremetalState) -> Result<BaremetalState> {
        tracing::debug!("Start BaremetalInstance creating");
        let scope = self.scope(cloud, &planned).await?;
        let bm_client = cloud.service(BMINSTANCES_POINT, VERSION_POINT_V1, scope);

        let opts = planned.create_opts()?;
        tracing::debug!("Baremetal interfaces: {:?}", opts.interfaces);
        let results = instances::create_baremetal(&bm_client, &opts).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let instance_id = wait_task_and_return_result(
            cloud,
            task_id,
            true,
            BM_INSTANCE_CREATING_TIMEOUT,
            |task| async move { task.created_resource_id("instances") },
        )
        .await?;
        tracing::debug!("Baremetal Instance id ({})", instance_id);

        let client = cloud.service(INSTANCES_POINT, VERSION_POINT_V1, scope);
        let state = Self::load(&client, &instance_id, planned, false).await?;
        tracing::debug!("Finish Baremetal Instance creating ({})", instance_id);
        Ok(state)
    }

    async fn read(&self, cloud: &EdgeCloud, state: BaremetalState) -> Result<Option<BaremetalState>> {
        tracing::debug!("Start Baremetal Instance reading");
        let scope = self.scope(cloud, &state).await?;
        let client = cloud.service(INSTANCES_POINT, VERSION_POINT_V1, scope);
        let instance_id = state.instance_id()?;
        tracing::debug!("Instance id = {}", instance_id);

        if found(instances::get(&client, &instance_id).await)?.is_none() {
            tracing::warn!("Instance {} not found, removing from state", instance_id);
            return Ok(None);
        }
        let state = Self::load(&client, &instance_id, state, true).await?;
        tracing::debug!("Finish Instance reading");
        Ok(Some(state))
    }

    async fn update(
        &self,
        cloud: &EdgeCloud,
        prior: BaremetalState,
        planned: BaremetalState,
    ) -> Result<BaremetalState> {
        tracing::debug!("Start Baremetal Instance updating");
        let scope = self.scope(cloud, &planned).await?;
        let client = cloud.service(INSTANCES_POINT, VERSION_POINT_V1, scope);
        let instance_id = prior.instance_id()?;
        tracing::debug!("Instance id = {}", instance_id);

        if prior.name != planned.name && !planned.has_templates() {
            if let Some(name) = non_empty(&planned.name) {
                instances::rename(&client, &instance_id, &name).await?;
            }
        }

        if prior.metadata != planned.metadata || prior.metadata_map != planned.metadata_map {
            Self::replace_metadata(
                &client,
                &instance_id,
                &prior.metadata_entries(),
                &planned.metadata_entries(),
            )
            .await?;
        }

        if prior.interface != planned.interface {
            let old = list_items(&prior.interface);
            let new = planned.sorted_interfaces();

            for iface in &old {
                if new.iter().any(|n| n.same_interface(iface)) {
                    tracing::debug!("Skipped, dont need detach");
                    continue;
                }
                if iface.is_parent.known_ref().copied().unwrap_or(false) {
                    return Err(EdgeError::processing("could not detach trunk interface"));
                }
                let opts = DetachInterfaceOpts {
                    port_id: iface.port_id.known_ref().cloned().unwrap_or_default(),
                    ip_address: iface.ip_address.known_ref().cloned().unwrap_or_default(),
                };
                tracing::debug!("detach interface: {:?}", opts);
                let results = instances::detach_interface(&client, &instance_id, &opts).await?;
                Self::wait_interface_task(cloud, results).await?;
            }

            let current = instances::list_interfaces(&client, &instance_id).await?;
            for iface in &new {
                if old.iter().any(|o| o.same_interface(iface)) {
                    tracing::debug!("Skipped, dont need attach");
                    continue;
                }
                if iface.is_attached(&current) {
                    continue;
                }
                let opts = iface.to_attach_opts()?;
                tracing::debug!("attach interface: {:?}", opts);
                let results = instances::attach_interface(&client, &instance_id, &opts)
                    .await
                    .map_err(|e| {
                        EdgeError::processing(format!(
                            "cannot attach interface: {}. Error: {}",
                            opts.interface_type.as_str(),
                            e
                        ))
                    })?;
                Self::wait_interface_task(cloud, results).await?;
            }
        }

        let state = BaremetalState {
            id: prior.id.clone(),
            last_updated: known(last_updated_stamp()),
            ..planned
        };
        let state = Self::load(&client, &instance_id, state, false).await?;
        tracing::debug!("Finish Instance updating");
        Ok(state)
    }

    async fn delete(&self, cloud: &EdgeCloud, state: BaremetalState) -> Result<()> {
        tracing::debug!("Start Baremetal Instance deleting");
        let scope = self.scope(cloud, &state).await?;
        let client = cloud.service(INSTANCES_POINT, VERSION_POINT_V1, scope);
        let instance_id = state.instance_id()?;
        tracing::debug!("Instance id = {}", instance_id);

        let results = instances::delete(&client, &instance_id).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let (client, instance_id) = (&client, instance_id.as_str());
        wait_task_and_return_result(cloud, task_id, true, BM_INSTANCE_DELETING_TIMEOUT, |_| {
            tasks::confirm_deleted("instance", instance_id, instances::get(client, instance_id))
        })
        .await?;

        tracing::debug!("Finish of Instance deleting");
        Ok(())
    }
}
