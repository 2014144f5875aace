use crate::cloud::lbpools::{
    self, CreateHealthMonitorOpts, CreateOpts, CreateSessionPersistenceOpts, Pool, UpdateOpts,
};
use crate::cloud::{LBPOOLS_CREATE_TIMEOUT, LBPOOLS_POINT, VERSION_POINT_V1};
use crate::core::client::{EdgeCloud, ServiceClient};
use crate::core::tasks::{self, wait_task_and_return_result};
use crate::domain::model::{HealthMonitorType, LbAlgorithm, LbProtocol};
use crate::domain::ports::ManagedResource;
use crate::provider::schema::{
    block, last_updated, optional, optional_computed, required, scoped_schema,
};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    from_option, known, list_items, map_list, non_empty, to_list, TfList, TfNumber, TfString,
    ValueExt,
};
use crate::utils::error::{found, EdgeError, Result};
use crate::utils::last_updated_stamp;
use crate::utils::validation::validate_expected_codes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, NestedBlock, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthMonitorState {
    pub id: TfString,
    #[serde(rename = "type")]
    pub monitor_type: TfString,
    pub delay: TfNumber,
    pub max_retries: TfNumber,
    pub timeout: TfNumber,
    pub max_retries_down: TfNumber,
    pub http_method: TfString,
    pub url_path: TfString,
    pub expected_codes: TfString,
}

impl HealthMonitorState {
    fn with_unknown_computed(self) -> Self {
        Self {
            id: self.id.null_as_unknown(),
            max_retries_down: self.max_retries_down.null_as_unknown(),
            http_method: self.http_method.null_as_unknown(),
            url_path: self.url_path.null_as_unknown(),
            expected_codes: self.expected_codes.null_as_unknown(),
            ..self
        }
    }

    fn to_opts(&self) -> Result<CreateHealthMonitorOpts> {
        let monitor_type = self
            .monitor_type
            .known_ref()
            .ok_or_else(|| EdgeError::validation("health_monitor.type must be known"))?;
        Ok(CreateHealthMonitorOpts {
            monitor_type: HealthMonitorType::parse("health_monitor.type", monitor_type)?,
            delay: self.delay.known_ref().copied().unwrap_or_default(),
            max_retries: self.max_retries.known_ref().copied().unwrap_or_default(),
            timeout: self.timeout.known_ref().copied().unwrap_or_default(),
            max_retries_down: self.max_retries_down.known_ref().copied(),
            http_method: non_empty(&self.http_method),
            url_path: non_empty(&self.url_path),
            expected_codes: non_empty(&self.expected_codes),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionPersistenceState {
    #[serde(rename = "type")]
    pub persistence_type: TfString,
    pub cookie_name: TfString,
    pub persistence_granularity: TfString,
    pub persistence_timeout: TfNumber,
}

impl SessionPersistenceState {
    fn with_unknown_computed(self) -> Self {
        Self {
            cookie_name: self.cookie_name.null_as_unknown(),
            persistence_granularity: self.persistence_granularity.null_as_unknown(),
            persistence_timeout: self.persistence_timeout.null_as_unknown(),
            ..self
        }
    }

    fn to_opts(&self) -> CreateSessionPersistenceOpts {
        CreateSessionPersistenceOpts {
            persistence_type: self.persistence_type.known_ref().cloned().unwrap_or_default(),
            cookie_name: non_empty(&self.cookie_name),
            persistence_granularity: non_empty(&self.persistence_granularity),
            persistence_timeout: self.persistence_timeout.known_ref().copied(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LbPoolState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub name: TfString,
    pub lb_algorithm: TfString,
    pub protocol: TfString,
    pub loadbalancer_id: TfString,
    pub listener_id: TfString,
    pub health_monitor: TfList<HealthMonitorState>,
    pub session_persistence: TfList<SessionPersistenceState>,
    pub last_updated: TfString,
}

impl_scoped!(LbPoolState);

impl LbPoolState {
    fn health_monitor_opts(&self) -> Result<Option<CreateHealthMonitorOpts>> {
        list_items(&self.health_monitor)
            .first()
            .map(HealthMonitorState::to_opts)
            .transpose()
    }

    fn session_persistence_opts(&self) -> Option<CreateSessionPersistenceOpts> {
        list_items(&self.session_persistence)
            .first()
            .map(SessionPersistenceState::to_opts)
    }

    /// API 回傳的 pool 寫回狀態；巢狀區塊只在設定中存在時才更新
    fn apply(mut self, pool: &Pool) -> Self {
        self.id = known(pool.id.clone());
        self.name = known(pool.name.clone());
        self.lb_algorithm = known(pool.lb_algorithm.clone());
        self.protocol = known(pool.protocol.clone());

        if self.loadbalancer_id.is_set() {
            if let Some(lb) = pool.loadbalancers.first() {
                self.loadbalancer_id = known(lb.id.clone());
            }
        }
        if self.listener_id.is_set() {
            if let Some(listener) = pool.listeners.first() {
                self.listener_id = known(listener.id.clone());
            }
        }

        if !list_items(&self.health_monitor).is_empty() {
            self.health_monitor = match &pool.health_monitor {
                Some(hm) => to_list(vec![HealthMonitorState {
                    id: known(hm.id.clone()),
                    monitor_type: known(hm.monitor_type.clone()),
                    delay: known(hm.delay),
                    max_retries: known(hm.max_retries),
                    timeout: known(hm.timeout),
                    max_retries_down: from_option(hm.max_retries_down),
                    http_method: from_option(hm.http_method.clone()),
                    url_path: from_option(hm.url_path.clone()),
                    expected_codes: from_option(hm.expected_codes.clone()),
                }]),
                None => to_list(Vec::new()),
            };
        }

        if !list_items(&self.session_persistence).is_empty() {
            self.session_persistence = match &pool.session_persistence {
                Some(sp) => to_list(vec![SessionPersistenceState {
                    persistence_type: known(sp.persistence_type.clone()),
                    cookie_name: from_option(sp.cookie_name.clone()),
                    persistence_granularity: from_option(sp.persistence_granularity.clone()),
                    persistence_timeout: from_option(sp.persistence_timeout),
                }]),
                None => to_list(Vec::new()),
            };
        }

        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LbPoolResource;

impl LbPoolResource {
    async fn client(&self, cloud: &EdgeCloud, state: &LbPoolState) -> Result<ServiceClient> {
        let scope = resolve(cloud, state).await?;
        Ok(cloud.service(LBPOOLS_POINT, VERSION_POINT_V1, scope))
    }

    fn pool_id(state: &LbPoolState) -> Result<String> {
        state
            .id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("lbpool id is not known"))
    }
}

fn health_monitor_block() -> NestedBlock {
    NestedBlock::List(block(
        "Configuration for health checks to test the health and state of the backend members.",
        vec![
            ("id", optional_computed(AttributeType::String, "Health monitor id.")),
            (
                "type",
                required(
                    AttributeType::String,
                    "Available values is 'HTTP', 'HTTPS', 'PING', 'TCP', 'TLS-HELLO', 'UDP-CONNECT'",
                ),
            ),
            ("delay", required(AttributeType::Number, "")),
            ("max_retries", required(AttributeType::Number, "")),
            ("timeout", required(AttributeType::Number, "")),
            ("max_retries_down", optional_computed(AttributeType::Number, "")),
            ("http_method", optional_computed(AttributeType::String, "")),
            ("url_path", optional_computed(AttributeType::String, "")),
            ("expected_codes", optional_computed(AttributeType::String, "")),
        ],
        vec![],
    ))
}

fn session_persistence_block() -> NestedBlock {
    NestedBlock::List(block(
        "Binds a user's session to a specific backend member.",
        vec![
            ("type", required(AttributeType::String, "")),
            ("cookie_name", optional_computed(AttributeType::String, "")),
            ("persistence_granularity", optional_computed(AttributeType::String, "")),
            ("persistence_timeout", optional_computed(AttributeType::Number, "")),
        ],
        vec![],
    ))
}

#[async_trait]
impl ManagedResource for LbPoolResource {
    type State = LbPoolState;

    fn schema(&self) -> Schema {
        scoped_schema(
            "Represent load balancer listener pool. A pool is a list of virtual machines to which the listener will redirect incoming traffic",
            vec![
                ("name", required(AttributeType::String, "The name of the load balancer listener pool.")),
                (
                    "lb_algorithm",
                    required(
                        AttributeType::String,
                        "Available values is 'ROUND_ROBIN', 'LEAST_CONNECTIONS', 'SOURCE_IP', 'SOURCE_IP_PORT'",
                    ),
                ),
                (
                    "protocol",
                    required(AttributeType::String, "Available values is 'HTTP', 'HTTPS', 'TCP', 'UDP'"),
                ),
                ("loadbalancer_id", optional(AttributeType::String, "The uuid for the load balancer.")),
                ("listener_id", optional(AttributeType::String, "The uuid for the load balancer listener.")),
                ("last_updated", last_updated()),
            ],
            vec![
                ("health_monitor", health_monitor_block()),
                ("session_persistence", session_persistence_block()),
            ],
        )
    }

    fn validate(&self, config: &LbPoolState) -> Result<()> {
        config.validate_scope()?;
        if let Some(algorithm) = config.lb_algorithm.known_ref() {
            LbAlgorithm::parse("lb_algorithm", algorithm)?;
        }
        if let Some(protocol) = config.protocol.known_ref() {
            LbProtocol::parse_within("protocol", protocol, LbProtocol::POOL_VALUES)?;
        }
        for hm in list_items(&config.health_monitor) {
            if let Some(monitor_type) = hm.monitor_type.known_ref() {
                HealthMonitorType::parse("health_monitor.type", monitor_type)?;
            }
            if let Some(codes) = hm.expected_codes.known_ref() {
                validate_expected_codes("health_monitor.expected_codes", codes)?;
            }
        }
        if list_items(&config.health_monitor).len() > 1 {
            return Err(EdgeError::validation("only one health_monitor block is allowed"));
        }
        if list_items(&config.session_persistence).len() > 1 {
            return Err(EdgeError::validation("only one session_persistence block is allowed"));
        }
        Ok(())
    }

    fn plan_create(&self, proposed: LbPoolState) -> LbPoolState {
        LbPoolState {
            id: proposed.id.null_as_unknown(),
            health_monitor: map_list(proposed.health_monitor, HealthMonitorState::with_unknown_computed),
            session_persistence: map_list(
                proposed.session_persistence,
                SessionPersistenceState::with_unknown_computed,
            ),
            ..proposed
        }
    }

    fn plan_update(&self, prior: &LbPoolState, proposed: LbPoolState) -> (LbPoolState, Vec<&'static str>) {
        let mut replace = prior.scope_changes(&proposed);
        if prior.protocol != proposed.protocol {
            replace.push("protocol");
        }
        if prior.loadbalancer_id != proposed.loadbalancer_id {
            replace.push("loadbalancer_id");
        }
        if prior.listener_id != proposed.listener_id {
            replace.push("listener_id");
        }

        if *prior == proposed {
            return (proposed, replace);
        }

        let health_monitor = if list_items(&prior.health_monitor) == list_items(&proposed.health_monitor) {
            proposed.health_monitor.clone()
        } else {
            map_list(proposed.health_monitor.clone(), HealthMonitorState::with_unknown_computed)
        };
        let session_persistence =
            if list_items(&prior.session_persistence) == list_items(&proposed.session_persistence) {
                proposed.session_persistence.clone()
            } else {
                map_list(
                    proposed.session_persistence.clone(),
                    SessionPersistenceState::with_unknown_computed,
                )
            };

        let planned = LbPoolState {
            last_updated: TfString::Unknown,
            health_monitor,
            session_persistence,
            ..proposed
        };
        (planned, replace)
    }

    async fn create(&self, cloud: &EdgeCloud, planned: LbPoolState) -> Result<LbPoolState> {
        tracing::debug!("Start LBPool creating");
        let client = self.client(cloud, &planned).await?;

        let protocol = planned.protocol.known_ref().cloned().unwrap_or_default();
        let algorithm = planned.lb_algorithm.known_ref().cloned().unwrap_or_default();
        let opts = CreateOpts {
            name: planned.name.known_ref().cloned().unwrap_or_default(),
            protocol: LbProtocol::parse_within("protocol", &protocol, LbProtocol::POOL_VALUES)?,
            lb_algorithm: LbAlgorithm::parse("lb_algorithm", &algorithm)?,
            loadbalancer_id: non_empty(&planned.loadbalancer_id),
            listener_id: non_empty(&planned.listener_id),
            health_monitor: planned.health_monitor_opts()?,
            session_persistence: planned.session_persistence_opts(),
        };

        let results = lbpools::create(&client, &opts).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let pool_id = wait_task_and_return_result(
            cloud,
            task_id,
            true,
            LBPOOLS_CREATE_TIMEOUT,
            |task| async move { task.created_resource_id("pools") },
        )
        .await?;

        let pool = lbpools::get(&client, &pool_id).await?;
        let state = planned.apply(&pool);

        tracing::debug!("Finish LBPool creating ({})", pool_id);
        Ok(state)
    }

    async fn read(&self, cloud: &EdgeCloud, state: LbPoolState) -> Result<Option<LbPoolState>> {
        tracing::debug!("Start LBPool reading");
        let client = self.client(cloud, &state).await?;
        let pool_id = Self::pool_id(&state)?;

        let Some(pool) = found(lbpools::get(&client, &pool_id).await)? else {
            tracing::warn!("LBPool {} not found, removing from state", pool_id);
            return Ok(None);
        };

        tracing::debug!("Finish LBPool reading");
        Ok(Some(state.apply(&pool)))
    }

    async fn update(
        &self,
        cloud: &EdgeCloud,
        prior: LbPoolState,
        planned: LbPoolState,
    ) -> Result<LbPoolState> {
        tracing::debug!("Start LBPool updating");
        let client = self.client(cloud, &planned).await?;
        let pool_id = Self::pool_id(&prior)?;

        let mut opts = UpdateOpts {
            name: planned.name.known_ref().cloned().unwrap_or_default(),
            ..Default::default()
        };
        let mut changed = prior.name != planned.name;

        if prior.lb_algorithm != planned.lb_algorithm {
            let algorithm = planned.lb_algorithm.known_ref().cloned().unwrap_or_default();
            opts.lb_algorithm = Some(LbAlgorithm::parse("lb_algorithm", &algorithm)?);
            changed = true;
        }
        if list_items(&prior.health_monitor) != list_items(&planned.health_monitor) {
            opts.health_monitor = planned.health_monitor_opts()?;
            changed = true;
        }
        if list_items(&prior.session_persistence) != list_items(&planned.session_persistence) {
            opts.session_persistence = planned.session_persistence_opts();
            changed = true;
        }

        let mut state = LbPoolState {
            id: prior.id.clone(),
            last_updated: prior.last_updated.clone(),
            ..planned
        };

        if changed {
            let results = lbpools::update(&client, &pool_id, &opts).await?;
            let task_id = results.first()?;
            wait_task_and_return_result(cloud, task_id, true, LBPOOLS_CREATE_TIMEOUT, |_| async {
                Ok(())
            })
            .await?;
            state.last_updated = known(last_updated_stamp());
        }

        let pool = lbpools::get(&client, &pool_id).await?;
        tracing::debug!("Finish LBPool updating");
        Ok(state.apply(&pool))
    }

    async fn delete(&self, cloud: &EdgeCloud, state: LbPoolState) -> Result<()> {
        tracing::debug!("Start LBPool deleting");
        let client = self.client(cloud, &state).await?;
        let pool_id = Self::pool_id(&state)?;

        let Some(results) = found(lbpools::delete(&client, &pool_id).await)? else {
            tracing::debug!("LBPool {} already deleted", pool_id);
            return Ok(());
        };
        let task_id = results.first()?;
        let (client, pool_id) = (&client, pool_id.as_str());
        wait_task_and_return_result(cloud, task_id, true, LBPOOLS_CREATE_TIMEOUT, |_| {
            tasks::confirm_deleted("LBPool", pool_id, lbpools::get(client, pool_id))
        })
        .await?;

        tracing::debug!("Finish of LBPool deleting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tf_provider::Value;

    fn config() -> LbPoolState {
        LbPoolState {
            project_id: known(1),
            region_id: known(1),
            name: known("pool".to_string()),
            lb_algorithm: known("ROUND_ROBIN".to_string()),
            protocol: known("HTTP".to_string()),
            loadbalancer_id: known("lb-1".to_string()),
            health_monitor: to_list(vec![HealthMonitorState {
                monitor_type: known("PING".to_string()),
                delay: known(60),
                max_retries: known(5),
                timeout: known(10),
                ..Default::default()
            }]),
            session_persistence: to_list(Vec::new()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_listener_protocols() {
        let mut state = config();
        assert!(LbPoolResource.validate(&state).is_ok());

        state.protocol = known("TERMINATED_HTTPS".to_string());
        assert!(LbPoolResource.validate(&state).is_err());
    }

    #[test]
    fn test_validate_requires_one_project_reference() {
        let mut state = config();
        state.project_name = known("default".to_string());
        assert!(LbPoolResource.validate(&state).is_err());
    }

    #[test]
    fn test_plan_create_marks_computed_unknown() {
        let planned = LbPoolResource.plan_create(config());
        assert!(planned.id.is_pending());
        let hm = list_items(&planned.health_monitor);
        assert!(hm[0].id.is_pending());
        assert!(hm[0].http_method.is_pending());
        assert_eq!(hm[0].delay, known(60));
        assert_eq!(planned.last_updated, Value::Null);
    }

    #[test]
    fn test_plan_update_replaces_on_protocol_change() {
        let prior = config();
        let mut proposed = config();
        proposed.protocol = known("TCP".to_string());

        let (planned, replace) = LbPoolResource.plan_update(&prior, proposed);
        assert_eq!(replace, vec!["protocol"]);
        assert!(planned.last_updated.is_pending());
    }

    #[test]
    fn test_plan_update_without_changes_is_noop() {
        let prior = config();
        let (planned, replace) = LbPoolResource.plan_update(&prior, config());
        assert!(replace.is_empty());
        assert_eq!(planned, prior);
    }
}
