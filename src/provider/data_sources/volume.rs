use super::{filter_attributes, find_exact, metadata_filter};
use crate::cloud::volumes::{self, Volume};
use crate::cloud::{VERSION_POINT_V1, VOLUMES_POINT};
use crate::core::client::EdgeCloud;
use crate::domain::ports::LookupSource;
use crate::provider::schema::{computed, metadata_read_only, required, scoped_schema};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    self, known, MetadataItem, TfList, TfMap, TfNumber, TfString, ValueExt,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeLookup {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub name: TfString,
    pub metadata_k: TfString,
    pub metadata_kv: TfMap,
    pub size: TfNumber,
    pub type_name: TfString,
    pub status: TfString,
    pub metadata_read_only: TfList<MetadataItem>,
}

impl_scoped!(VolumeLookup);

impl VolumeLookup {
    fn apply(mut self, volume: &Volume) -> Self {
        self.id = known(volume.id.clone());
        self.size = known(volume.size);
        self.type_name = known(volume.type_name.clone());
        self.status = known(volume.status.clone());
        self.metadata_read_only = value::metadata_read_only(&volume.metadata_detailed);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeDataSource;

#[async_trait]
impl LookupSource for VolumeDataSource {
    type State = VolumeLookup;

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            ("name", required(AttributeType::String, "")),
            ("size", computed(AttributeType::Number, "")),
            ("type_name", computed(AttributeType::String, "")),
            ("status", computed(AttributeType::String, "")),
            ("metadata_read_only", metadata_read_only()),
        ];
        attributes.extend(filter_attributes());
        scoped_schema("Represent volume", attributes, vec![])
    }

    fn validate(&self, config: &VolumeLookup) -> Result<()> {
        config.validate_scope()
    }

    async fn read(&self, cloud: &EdgeCloud, config: VolumeLookup) -> Result<VolumeLookup> {
        tracing::debug!("Start Volume reading");
        let scope = resolve(cloud, &config).await?;
        let client = cloud.service(VOLUMES_POINT, VERSION_POINT_V1, scope);
        let name = config.name.known_ref().cloned().unwrap_or_default();

        let filter = metadata_filter(&config.metadata_k, &config.metadata_kv);
        let all_volumes = volumes::list(&client, &filter).await?;
        let volume = find_exact(&all_volumes, "volume", "name", &name, |v| Some(v.name.as_str()))?;

        let state = config.apply(volume);
        tracing::debug!("Finish Volume reading");
        Ok(state)
    }
}
