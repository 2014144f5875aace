use super::{filter_attributes, find_exact, metadata_filter};
use crate::cloud::floatingips::{self, FloatingIp};
use crate::cloud::{FLOATINGIPS_POINT, VERSION_POINT_V1};
use crate::core::client::EdgeCloud;
use crate::domain::ports::LookupSource;
use crate::provider::resources::floatingip::floating_ip_attributes;
use crate::provider::schema::{computed, required, scoped_schema};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    self, from_option, known, MetadataItem, TfList, TfMap, TfNumber, TfString, ValueExt,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatingIpLookup {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub floating_ip_address: TfString,
    pub metadata_k: TfString,
    pub metadata_kv: TfMap,
    pub fixed_ip_address: TfString,
    pub port_id: TfString,
    pub status: TfString,
    pub router_id: TfString,
    pub subnet_id: TfString,
    pub created_at: TfString,
    pub updated_at: TfString,
    pub metadata_read_only: TfList<MetadataItem>,
}

impl_scoped!(FloatingIpLookup);

impl FloatingIpLookup {
    fn apply(mut self, ip: &FloatingIp) -> Self {
        self.id = known(ip.id.clone());
        self.fixed_ip_address = from_option(ip.fixed_ip_address.clone());
        self.port_id = from_option(ip.port_id.clone());
        self.status = known(ip.status.clone());
        self.router_id = from_option(ip.router_id.clone());
        self.subnet_id = from_option(ip.subnet_id.clone());
        self.created_at = from_option(ip.created_at.clone());
        self.updated_at = from_option(ip.updated_at.clone());
        self.metadata_read_only = value::metadata_read_only(&ip.metadata);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatingIpDataSource;

#[async_trait]
impl LookupSource for FloatingIpDataSource {
    type State = FloatingIpLookup;

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            ("floating_ip_address", required(AttributeType::String, "The floating IP address.")),
            ("fixed_ip_address", computed(AttributeType::String, "")),
            ("port_id", computed(AttributeType::String, "")),
        ];
        attributes.extend(
            floating_ip_attributes()
                .into_iter()
                .filter(|(name, _)| *name != "floating_ip_address"),
        );
        attributes.extend(filter_attributes());
        scoped_schema("Represent floating IP", attributes, vec![])
    }

    fn validate(&self, config: &FloatingIpLookup) -> Result<()> {
        config.validate_scope()
    }

    async fn read(&self, cloud: &EdgeCloud, config: FloatingIpLookup) -> Result<FloatingIpLookup> {
        tracing::debug!("Start FloatingIP reading");
        let scope = resolve(cloud, &config).await?;
        let client = cloud.service(FLOATINGIPS_POINT, VERSION_POINT_V1, scope);
        let address = config.floating_ip_address.known_ref().cloned().unwrap_or_default();

        let filter = metadata_filter(&config.metadata_k, &config.metadata_kv);
        let ips = floatingips::list(&client, &filter).await?;
        let ip = find_exact(&ips, "floating ip", "address", &address, |ip| {
            ip.floating_ip_address.as_deref()
        })?;

        let state = config.apply(ip);
        tracing::debug!("Finish FloatingIP reading");
        Ok(state)
    }
}
