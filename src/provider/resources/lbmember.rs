use crate::cloud::lbpools::{self, CreatePoolMemberOpts, PoolMember, UpdateOpts};
use crate::cloud::{LBPOOLS_CREATE_TIMEOUT, LBPOOLS_POINT, VERSION_POINT_V1};
use crate::core::client::{EdgeCloud, ServiceClient};
use crate::core::tasks::wait_task_and_return_result;
use crate::domain::ports::ManagedResource;
use crate::provider::schema::{computed, last_updated, optional, optional_computed, required, scoped_schema};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{from_option, known, non_empty, or_configured, TfNumber, TfString, ValueExt};
use crate::utils::error::{found, EdgeError, Result};
use crate::utils::last_updated_stamp;
use crate::utils::validation::{validate_ip, validate_range};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema};

pub const MIN_WEIGHT: i64 = 0;
pub const MAX_WEIGHT: i64 = 256;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbMemberState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub pool_id: TfString,
    pub address: TfString,
    pub protocol_port: TfNumber,
    pub weight: TfNumber,
    pub subnet_id: TfString,
    pub instance_id: TfString,
    pub operating_status: TfString,
    pub last_updated: TfString,
}

impl_scoped!(LbMemberState);

impl LbMemberState {
    fn to_opts(&self, id: Option<String>) -> Result<CreatePoolMemberOpts> {
        let address = self
            .address
            .known_ref()
            .ok_or_else(|| EdgeError::validation("address must be known"))?;
        Ok(CreatePoolMemberOpts {
            id,
            address: validate_ip("address", address)?,
            protocol_port: self.protocol_port.known_ref().copied().unwrap_or_default(),
            weight: self.weight.known_ref().copied(),
            subnet_id: non_empty(&self.subnet_id),
            instance_id: non_empty(&self.instance_id),
        })
    }

    fn apply(mut self, member: &PoolMember) -> Self {
        self.id = known(member.id.clone());
        self.address = known(member.address.to_string());
        self.protocol_port = known(member.protocol_port);
        self.weight = known(member.weight);
        self.subnet_id = or_configured(&self.subnet_id, member.subnet_id.clone());
        if self.instance_id.is_set() || member.instance_id.is_some() {
            self.instance_id = from_option(member.instance_id.clone());
        }
        self.operating_status = from_option(member.operating_status.clone());
        self
    }

    fn pool_id(&self) -> Result<String> {
        self.pool_id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("pool_id is not known"))
    }

    fn member_id(&self) -> Result<String> {
        self.id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("lb member id is not known"))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LbMemberResource;

impl LbMemberResource {
    async fn client(&self, cloud: &EdgeCloud, state: &LbMemberState) -> Result<ServiceClient> {
        let scope = resolve(cloud, state).await?;
        Ok(cloud.service(LBPOOLS_POINT, VERSION_POINT_V1, scope))
    }

    async fn find_member(
        client: &ServiceClient,
        pool_id: &str,
        member_id: &str,
    ) -> Result<Option<PoolMember>> {
        let Some(pool) = found(lbpools::get(client, pool_id).await)? else {
            return Ok(None);
        };
        Ok(pool.members.into_iter().find(|m| m.id == member_id))
    }
}

#[async_trait]
impl ManagedResource for LbMemberResource {
    type State = LbMemberState;

    fn schema(&self) -> Schema {
        scoped_schema(
            "Represent load balancer member",
            vec![
                ("pool_id", required(AttributeType::String, "The uuid of the load balancer pool.")),
                ("address", required(AttributeType::String, "The IP address of the load balancer pool member.")),
                ("protocol_port", required(AttributeType::Number, "The port on which the member listens for requests.")),
                (
                    "weight",
                    optional_computed(
                        AttributeType::Number,
                        "A weight value between 0 and 256, determining the distribution of requests among the members of the pool.",
                    ),
                ),
                (
                    "subnet_id",
                    optional_computed(AttributeType::String, "The uuid of the subnet in which the pool member is located."),
                ),
                (
                    "instance_id",
                    optional(AttributeType::String, "The uuid of the instance (amphora) associated with the pool member."),
                ),
                ("operating_status", computed(AttributeType::String, "The current operating status of the pool member.")),
                ("last_updated", last_updated()),
            ],
            vec![],
        )
    }

    fn validate(&self, config: &LbMemberState) -> Result<()> {
        config.validate_scope()?;
        if let Some(address) = config.address.known_ref() {
            validate_ip("address", address)?;
        }
        if let Some(weight) = config.weight.known_ref() {
            validate_range("weight", *weight, MIN_WEIGHT, MAX_WEIGHT)?;
        }
        Ok(())
    }

    fn plan_create(&self, proposed: LbMemberState) -> LbMemberState {
        LbMemberState {
            id: proposed.id.null_as_unknown(),
            weight: proposed.weight.null_as_unknown(),
            subnet_id: proposed.subnet_id.null_as_unknown(),
            operating_status: proposed.operating_status.null_as_unknown(),
            ..proposed
        }
    }

    fn plan_update(
        &self,
        prior: &LbMemberState,
        proposed: LbMemberState,
    ) -> (LbMemberState, Vec<&'static str>) {
        let mut replace = prior.scope_changes(&proposed);
        if prior.pool_id != proposed.pool_id {
            replace.push("pool_id");
        }
        if *prior == proposed {
            return (proposed, replace);
        }
        let planned = LbMemberState {
            operating_status: TfString::Unknown,
            last_updated: TfString::Unknown,
            ..proposed
        };
        (planned, replace)
    }

    async fn create(&self, cloud: &EdgeCloud, planned: LbMemberState) -> Result<LbMemberState> {
        tracing::debug!("Start LBMember creating");
        let client = self.client(cloud, &planned).await?;
        let pool_id = planned.pool_id()?;

        let opts = planned.to_opts(None)?;
        let results = lbpools::create_member(&client, &pool_id, &opts).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let member_id = wait_task_and_return_result(
            cloud,
            task_id,
            true,
            LBPOOLS_CREATE_TIMEOUT,
            |task| async move { task.created_resource_id("members") },
        )
        .await?;

        let member = Self::find_member(&client, &pool_id, &member_id)
            .await?
            .ok_or_else(|| {
                EdgeError::processing(format!(
                    "pool member {} not found in pool {} after creation",
                    member_id, pool_id
                ))
            })?;

        tracing::debug!("Finish LBMember creating ({})", member_id);
        Ok(planned.apply(&member))
    }

    async fn read(&self, cloud: &EdgeCloud, state: LbMemberState) -> Result<Option<LbMemberState>> {
        tracing::debug!("Start LBMember reading");
        let client = self.client(cloud, &state).await?;
        let pool_id = state.pool_id()?;
        let member_id = state.member_id()?;

        let Some(member) = Self::find_member(&client, &pool_id, &member_id).await? else {
            tracing::warn!("LBMember {} not found in pool {}", member_id, pool_id);
            return Ok(None);
        };

        tracing::debug!("Finish LBMember reading");
        Ok(Some(state.apply(&member)))
    }

    /// 以完整成員清單更新 pool，其餘成員原樣保留
    async fn update(
        &self,
        cloud: &EdgeCloud,
        prior: LbMemberState,
        planned: LbMemberState,
    ) -> Result<LbMemberState> {
        tracing::debug!("Start LBMember updating");
        let client = self.client(cloud, &planned).await?;
        let pool_id = planned.pool_id()?;
        let member_id = prior.member_id()?;

        let pool = lbpools::get(&client, &pool_id).await?;
        let members = pool
            .members
            .iter()
            .map(|pm| {
                if pm.id == member_id {
                    planned.to_opts(Some(member_id.clone()))
                } else {
                    Ok(pm.to_opts())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let opts = UpdateOpts {
            name: pool.name.clone(),
            members: Some(members),
            ..Default::default()
        };
        let results = lbpools::update(&client, &pool.id, &opts).await?;
        let task_id = results.first()?;
        wait_task_and_return_result(cloud, task_id, true, LBPOOLS_CREATE_TIMEOUT, |_| async {
            Ok(())
        })
        .await?;

        let member = Self::find_member(&client, &pool_id, &member_id)
            .await?
            .ok_or_else(|| {
                EdgeError::processing(format!("pool member {} disappeared during update", member_id))
            })?;

        let state = LbMemberState {
            id: prior.id.clone(),
            last_updated: known(last_updated_stamp()),
            ..planned
        };
        tracing::debug!("Finish LBMember updating");
        Ok(state.apply(&member))
    }

    async fn delete(&self, cloud: &EdgeCloud, state: LbMemberState) -> Result<()> {
        tracing::debug!("Start LBMember deleting");
        let client = self.client(cloud, &state).await?;
        let pool_id = state.pool_id()?;
        let member_id = state.member_id()?;

        let Some(results) = found(lbpools::delete_member(&client, &pool_id, &member_id).await)? else {
            tracing::debug!("Finish of LBMember deleting");
            return Ok(());
        };
        let task_id = results.first()?;
        let (client, pool_id, member_id) = (&client, pool_id.as_str(), member_id.as_str());
        wait_task_and_return_result(cloud, task_id, true, LBPOOLS_CREATE_TIMEOUT, |_| async move {
            let pool = lbpools::get(client, pool_id)
                .await
                .map_err(|e| EdgeError::processing(format!("extracting LBPool resource error: {}", e)))?;
            if pool.members.iter().any(|pm| pm.id == member_id) {
                return Err(EdgeError::processing(format!("pool member {} still exist", member_id)));
            }
            Ok(())
        })
        .await?;

        tracing::debug!("Finish of LBMember deleting");
        Ok(())
    }
}
