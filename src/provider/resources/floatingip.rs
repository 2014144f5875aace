use crate::cloud::floatingips::{self, AssignOpts, CreateOpts, FloatingIp};
use crate::cloud::{FLOATINGIPS_POINT, FLOATINGIP_TIMEOUT, VERSION_POINT_V1};
use crate::core::client::{EdgeCloud, ServiceClient};
use crate::core::tasks::{self, wait_task_and_return_result};
use crate::domain::ports::ManagedResource;
use crate::provider::schema::{
    computed, last_updated, metadata_read_only, optional, optional_computed, scoped_schema,
    string_map,
};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    self, from_option, keep_empty, known, map_entries, non_empty, MetadataItem, TfList, TfMap, TfNumber,
    TfString, ValueExt,
};
use crate::utils::error::{found, EdgeError, Result};
use crate::utils::last_updated_stamp;
use crate::utils::validation::validate_ip;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatingIpState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub fixed_ip_address: TfString,
    pub port_id: TfString,
    pub metadata_map: TfMap,
    pub metadata_read_only: TfList<MetadataItem>,
    pub floating_ip_address: TfString,
    pub status: TfString,
    pub router_id: TfString,
    pub subnet_id: TfString,
    pub created_at: TfString,
    pub updated_at: TfString,
    pub last_updated: TfString,
}

impl_scoped!(FloatingIpState);

impl FloatingIpState {
    pub(crate) fn apply(mut self, ip: &FloatingIp) -> Self {
        self.id = known(ip.id.clone());
        self.floating_ip_address = from_option(ip.floating_ip_address.clone());
        self.fixed_ip_address = keep_empty(&self.fixed_ip_address, ip.fixed_ip_address.clone());
        self.port_id = keep_empty(&self.port_id, ip.port_id.clone());
        self.router_id = from_option(ip.router_id.clone());
        self.subnet_id = from_option(ip.subnet_id.clone());
        self.status = known(ip.status.clone());
        self.created_at = from_option(ip.created_at.clone());
        self.updated_at = from_option(ip.updated_at.clone());
        self.metadata_read_only = value::metadata_read_only(&ip.metadata);
        if self.metadata_map.is_set() {
            self.metadata_map = value::metadata_map(&ip.metadata);
        }
        self
    }

    fn floating_ip_id(&self) -> Result<String> {
        self.id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("floating ip id is not known"))
    }
}

/// resource 與 data source 共用的 computed 欄位
pub(crate) fn floating_ip_attributes() -> Vec<(&'static str, tf_provider::Attribute)> {
    vec![
        ("floating_ip_address", computed(AttributeType::String, "The floating IP address.")),
        ("status", computed(AttributeType::String, "")),
        ("router_id", computed(AttributeType::String, "")),
        ("subnet_id", computed(AttributeType::String, "")),
        ("created_at", computed(AttributeType::String, "")),
        ("updated_at", computed(AttributeType::String, "")),
        ("metadata_read_only", metadata_read_only()),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatingIpResource;

impl FloatingIpResource {
    async fn client(&self, cloud: &EdgeCloud, state: &FloatingIpState) -> Result<ServiceClient> {
        let scope = resolve(cloud, state).await?;
        Ok(cloud.service(FLOATINGIPS_POINT, VERSION_POINT_V1, scope))
    }
}

#[async_trait]
impl ManagedResource for FloatingIpResource {
    type State = FloatingIpState;

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            (
                "fixed_ip_address",
                optional_computed(AttributeType::String, "The fixed IP address bound to the floating IP."),
            ),
            (
                "port_id",
                optional_computed(AttributeType::String, "The port the floating IP is assigned to."),
            ),
            ("metadata_map", optional(string_map(), "A map containing metadata, for example tags.")),
            ("last_updated", last_updated()),
        ];
        attributes.extend(floating_ip_attributes());
        scoped_schema("Represent floating IP", attributes, vec![])
    }

    fn validate(&self, config: &FloatingIpState) -> Result<()> {
        config.validate_scope()?;
        if let Some(ip) = non_empty(&config.fixed_ip_address) {
            validate_ip("fixed_ip_address", &ip)?;
        }
        Ok(())
    }

    fn plan_create(&self, proposed: FloatingIpState) -> FloatingIpState {
        FloatingIpState {
            id: proposed.id.null_as_unknown(),
            fixed_ip_address: proposed.fixed_ip_address.null_as_unknown(),
            port_id: proposed.port_id.null_as_unknown(),
            metadata_read_only: proposed.metadata_read_only.null_as_unknown(),
            floating_ip_address: proposed.floating_ip_address.null_as_unknown(),
            status: proposed.status.null_as_unknown(),
            router_id: proposed.router_id.null_as_unknown(),
            subnet_id: proposed.subnet_id.null_as_unknown(),
            created_at: proposed.created_at.null_as_unknown(),
            updated_at: proposed.updated_at.null_as_unknown(),
            ..proposed
        }
    }

    fn plan_update(
        &self,
        prior: &FloatingIpState,
        proposed: FloatingIpState,
    ) -> (FloatingIpState, Vec<&'static str>) {
        let replace = prior.scope_changes(&proposed);
        if *prior == proposed {
            return (proposed, replace);
        }
        let port_changed = prior.port_id != proposed.port_id;
        let planned = FloatingIpState {
            fixed_ip_address: if port_changed && prior.fixed_ip_address == proposed.fixed_ip_address {
                TfString::Unknown
            } else {
                proposed.fixed_ip_address.clone()
            },
            metadata_read_only: Value::Unknown,
            status: TfString::Unknown,
            router_id: TfString::Unknown,
            subnet_id: TfString::Unknown,
            updated_at: TfString::Unknown,
            last_updated: TfString::Unknown,
            ..proposed
        };
        (planned, replace)
    }

    async fn create(&self, cloud: &EdgeCloud, planned: FloatingIpState) -> Result<FloatingIpState> {
        tracing::debug!("Start FloatingIP creating");
        let client = self.client(cloud, &planned).await?;

        let opts = CreateOpts {
            port_id: non_empty(&planned.port_id),
            fixed_ip_address: non_empty(&planned.fixed_ip_address),
            metadata: map_entries(&planned.metadata_map),
        };
        let results = floatingips::create(&client, &opts).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let floating_ip_id = wait_task_and_return_result(
            cloud,
            task_id,
            true,
            FLOATINGIP_TIMEOUT,
            |task| async move { task.created_resource_id("floatingips") },
        )
        .await?;
        tracing::debug!("FloatingIP id ({})", floating_ip_id);

        let ip = floatingips::get(&client, &floating_ip_id).await?;
        tracing::debug!("Finish FloatingIP creating ({})", floating_ip_id);
        Ok(planned.apply(&ip))
    }

    async fn read(&self, cloud: &EdgeCloud, state: FloatingIpState) -> Result<Option<FloatingIpState>> {
        tracing::debug!("Start FloatingIP reading");
        let client = self.client(cloud, &state).await?;
        let floating_ip_id = state.floating_ip_id()?;

        let Some(ip) = found(floatingips::get(&client, &floating_ip_id).await)? else {
            tracing::warn!("FloatingIP {} not found, removing from state", floating_ip_id);
            return Ok(None);
        };
        tracing::debug!("Finish FloatingIP reading");
        Ok(Some(state.apply(&ip)))
    }

    async fn update(
        &self,
        cloud: &EdgeCloud,
        prior: FloatingIpState,
        planned: FloatingIpState,
    ) -> Result<FloatingIpState> {
        tracing::debug!("Start FloatingIP updating");
        let client = self.client(cloud, &planned).await?;
        let floating_ip_id = prior.floating_ip_id()?;

        if prior.port_id != planned.port_id || prior.fixed_ip_address != planned.fixed_ip_address {
            match non_empty(&planned.port_id) {
                Some(port_id) => {
                    let opts = AssignOpts {
                        port_id,
                        fixed_ip_address: non_empty(&planned.fixed_ip_address),
                    };
                    tracing::debug!("Assign FloatingIP {}: {:?}", floating_ip_id, opts);
                    floatingips::assign(&client, &floating_ip_id, &opts).await?;
                }
                None => {
                    tracing::debug!("Unassign FloatingIP {}", floating_ip_id);
                    floatingips::unassign(&client, &floating_ip_id).await?;
                }
            }
        }

        if prior.metadata_map != planned.metadata_map {
            floatingips::metadata_replace(&client, &floating_ip_id, &map_entries(&planned.metadata_map))
                .await?;
        }

        let ip = floatingips::get(&client, &floating_ip_id).await?;
        let state = FloatingIpState {
            id: prior.id.clone(),
            last_updated: known(last_updated_stamp()),
            ..planned
        };
        tracing::debug!("Finish FloatingIP updating");
        Ok(state.apply(&ip))
    }

    async fn delete(&self, cloud: &EdgeCloud, state: FloatingIpState) -> Result<()> {
        tracing::debug!("Start FloatingIP deleting");
        let client = self.client(cloud, &state).await?;
        let floating_ip_id = state.floating_ip_id()?;

        let results = floatingips::delete(&client, &floating_ip_id).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let (client, floating_ip_id) = (&client, floating_ip_id.as_str());
        wait_task_and_return_result(cloud, task_id, true, FLOATINGIP_TIMEOUT, |_| {
            tasks::confirm_deleted(
                "floating ip",
                floating_ip_id,
                floatingips::get(client, floating_ip_id),
            )
        })
        .await?;

        tracing::debug!("Finish of FloatingIP deleting");
        Ok(())
    }
}
