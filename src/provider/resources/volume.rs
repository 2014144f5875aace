use crate::cloud::volumes::{self, CreateOpts, Volume};
use crate::cloud::{VERSION_POINT_V1, VOLUMES_POINT, VOLUME_TIMEOUT};
use crate::core::client::{EdgeCloud, ServiceClient};
use crate::core::tasks::{self, wait_task_and_return_result};
use crate::domain::model::VolumeSource;
use crate::domain::ports::ManagedResource;
use crate::provider::schema::{
    computed, last_updated, metadata_read_only, optional, optional_computed, required,
    scoped_schema, string_map,
};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    self, known, map_entries, non_empty, MetadataItem, TfList, TfMap, TfNumber, TfString,
    ValueExt,
};
use crate::utils::error::{found, EdgeError, Result};
use crate::utils::last_updated_stamp;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub name: TfString,
    pub source: TfString,
    pub size: TfNumber,
    pub type_name: TfString,
    pub image_id: TfString,
    pub snapshot_id: TfString,
    pub metadata_map: TfMap,
    pub metadata_read_only: TfList<MetadataItem>,
    pub status: TfString,
    pub last_updated: TfString,
}

impl_scoped!(VolumeState);

impl VolumeState {
    fn apply(mut self, volume: &Volume) -> Self {
        self.id = known(volume.id.clone());
        self.name = known(volume.name.clone());
        self.size = known(volume.size);
        self.type_name = known(volume.type_name.clone());
        self.status = known(volume.status.clone());
        self.metadata_read_only = value::metadata_read_only(&volume.metadata_detailed);
        if self.metadata_map.is_set() {
            self.metadata_map = value::metadata_map(&volume.metadata_detailed);
        }
        self
    }

    fn volume_id(&self) -> Result<String> {
        self.id
            .known_ref()
            .cloned()
            .ok_or_else(|| EdgeError::processing("volume id is not known"))
    }

    fn source(&self) -> Result<VolumeSource> {
        let source = self
            .source
            .known_ref()
            .ok_or_else(|| EdgeError::validation("source must be known"))?;
        VolumeSource::parse("source", source)
    }
}

/// 新的大小只能大於等於目前大小
pub fn check_resize(current: i64, requested: i64) -> Result<bool> {
    if requested < current {
        return Err(EdgeError::validation(format!(
            "volume size can only be extended: current {} GB, requested {} GB",
            current, requested
        )));
    }
    Ok(requested > current)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeResource;

impl VolumeResource {
    async fn client(&self, cloud: &EdgeCloud, state: &VolumeState) -> Result<ServiceClient> {
        let scope = resolve(cloud, state).await?;
        Ok(cloud.service(VOLUMES_POINT, VERSION_POINT_V1, scope))
    }
}

#[async_trait]
impl ManagedResource for VolumeResource {
    type State = VolumeState;

    fn schema(&self) -> Schema {
        scoped_schema(
            "Represent volume. A volume is a file storage which is similar to SSD and HDD hard disks",
            vec![
                ("name", required(AttributeType::String, "")),
                (
                    "source",
                    required(
                        AttributeType::String,
                        "Currently available only value 'new-volume', 'image' or 'snapshot'",
                    ),
                ),
                ("size", optional_computed(AttributeType::Number, "Volume size in GB")),
                (
                    "type_name",
                    optional_computed(
                        AttributeType::String,
                        "Available value is 'standard', 'ssd_hiiops', 'cold', 'ultra'. Defaults to standard",
                    ),
                ),
                ("image_id", optional(AttributeType::String, "Mandatory if volume is created from image")),
                ("snapshot_id", optional(AttributeType::String, "Mandatory if volume is created from a snapshot")),
                ("metadata_map", optional(string_map(), "A map containing metadata, for example tags.")),
                ("metadata_read_only", metadata_read_only()),
                ("status", computed(AttributeType::String, "")),
                ("last_updated", last_updated()),
            ],
            vec![],
        )
    }

    fn validate(&self, config: &VolumeState) -> Result<()> {
        config.validate_scope()?;
        if config.source.is_pending() {
            return Ok(());
        }
        match config.source()? {
            VolumeSource::Image if !config.image_id.is_set() => {
                Err(EdgeError::validation("image_id is required when source is 'image'"))
            }
            VolumeSource::Snapshot if !config.snapshot_id.is_set() => {
                Err(EdgeError::validation("snapshot_id is required when source is 'snapshot'"))
            }
            VolumeSource::NewVolume if !config.size.is_set() => {
                Err(EdgeError::validation("size is required when source is 'new-volume'"))
            }
            _ => Ok(()),
        }
    }

    fn plan_create(&self, proposed: VolumeState) -> VolumeState {
        VolumeState {
            id: proposed.id.null_as_unknown(),
            size: proposed.size.null_as_unknown(),
            type_name: proposed.type_name.null_as_unknown(),
            metadata_read_only: proposed.metadata_read_only.null_as_unknown(),
            status: proposed.status.null_as_unknown(),
            ..proposed
        }
    }

    fn plan_update(&self, prior: &VolumeState, proposed: VolumeState) -> (VolumeState, Vec<&'static str>) {
        let mut replace = prior.scope_changes(&proposed);
        if prior.source != proposed.source {
            replace.push("source");
        }
        if prior.image_id != proposed.image_id {
            replace.push("image_id");
        }
        if prior.snapshot_id != proposed.snapshot_id {
            replace.push("snapshot_id");
        }
        if *prior == proposed {
            return (proposed, replace);
        }
        let planned = VolumeState {
            metadata_read_only: Value::Unknown,
            status: TfString::Unknown,
            last_updated: TfString::Unknown,
            ..proposed
        };
        (planned, replace)
    }

    async fn create(&self, cloud: &EdgeCloud, planned: VolumeState) -> Result<VolumeState> {
        tracing::debug!("Start volume creating");
        let client = self.client(cloud, &planned).await?;

        let opts = CreateOpts {
            source: planned.source()?,
            name: planned.name.known_ref().cloned().unwrap_or_default(),
            size: planned.size.known_ref().copied(),
            type_name: non_empty(&planned.type_name),
            image_id: non_empty(&planned.image_id),
            snapshot_id: non_empty(&planned.snapshot_id),
            metadata: map_entries(&planned.metadata_map),
        };
        let results = volumes::create(&client, &opts).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let volume_id = wait_task_and_return_result(
            cloud,
            task_id,
            true,
            VOLUME_TIMEOUT,
            |task| async move { task.created_resource_id("volumes") },
        )
        .await?;
        tracing::debug!("Volume id ({})", volume_id);

        let volume = volumes::get(&client, &volume_id).await?;
        tracing::debug!("Finish volume creating ({})", volume_id);
        Ok(planned.apply(&volume))
    }

    async fn read(&self, cloud: &EdgeCloud, state: VolumeState) -> Result<Option<VolumeState>> {
        tracing::debug!("Start volume reading");
        let client = self.client(cloud, &state).await?;
        let volume_id = state.volume_id()?;

        let Some(volume) = found(volumes::get(&client, &volume_id).await)? else {
            tracing::warn!("Volume {} not found, removing from state", volume_id);
            return Ok(None);
        };
        tracing::debug!("Finish volume reading");
        Ok(Some(state.apply(&volume)))
    }

    async fn update(&self, cloud: &EdgeCloud, prior: VolumeState, planned: VolumeState) -> Result<VolumeState> {
        tracing::debug!("Start volume updating");
        let client = self.client(cloud, &planned).await?;
        let volume_id = prior.volume_id()?;
        let extend_to = match (prior.size.known_ref(), planned.size.known_ref()) {
            (Some(current), Some(requested)) if check_resize(*current, *requested)? => Some(*requested),
            _ => None,
        };

        if prior.name != planned.name {
            if let Some(name) = non_empty(&planned.name) {
                volumes::rename(&client, &volume_id, &name).await?;
            }
        }

        if let Some(requested) = extend_to {
            tracing::debug!("Extend volume {} to {} GB", volume_id, requested);
            let results = volumes::extend(&client, &volume_id, requested).await?;
            let task_id = results.first()?;
            wait_task_and_return_result(cloud, task_id, true, VOLUME_TIMEOUT, |_| async {
                Ok(())
            })
            .await?;
        }

        if prior.type_name != planned.type_name {
            if let Some(type_name) = non_empty(&planned.type_name) {
                volumes::retype(&client, &volume_id, &type_name).await?;
            }
        }

        if prior.metadata_map != planned.metadata_map {
            volumes::metadata_replace(&client, &volume_id, &map_entries(&planned.metadata_map)).await?;
        }

        let volume = volumes::get(&client, &volume_id).await?;
        let state = VolumeState {
            id: prior.id.clone(),
            last_updated: known(last_updated_stamp()),
            ..planned
        };
        tracing::debug!("Finish volume updating");
        Ok(state.apply(&volume))
    }

    async fn delete(&self, cloud: &EdgeCloud, state: VolumeState) -> Result<()> {
        tracing::debug!("Start volume deleting");
        let client = self.client(cloud, &state).await?;
        let volume_id = state.volume_id()?;

        let results = volumes::delete(&client, &volume_id).await?;
        let task_id = results.first()?;
        tracing::debug!("Task id ({})", task_id);

        let (client, volume_id) = (&client, volume_id.as_str());
        wait_task_and_return_result(cloud, task_id, true, VOLUME_TIMEOUT, |_| {
            tasks::confirm_deleted("volume", volume_id, volumes::get(client, volume_id))
        })
        .await?;

        tracing::debug!("Finish of volume deleting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(source: &str) -> VolumeState {
        VolumeState {
            project_id: known(1),
            region_id: known(1),
            name: known("data".to_string()),
            source: known(source.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_resize() {
        assert!(!check_resize(10, 10).unwrap());
        assert!(check_resize(10, 20).unwrap());
        let err = check_resize(20, 10).unwrap_err();
        assert!(err.to_string().contains("can only be extended"));
    }

    #[test]
    fn test_validate_source_requirements() {
        assert!(VolumeResource.validate(&config("image")).is_err());
        assert!(VolumeResource.validate(&config("snapshot")).is_err());
        assert!(VolumeResource.validate(&config("new-volume")).is_err());
        assert!(VolumeResource.validate(&config("backup")).is_err());

        let mut state = config("image");
        state.image_id = known("img-1".to_string());
        assert!(VolumeResource.validate(&state).is_ok());
    }

    #[test]
    fn test_plan_update_source_forces_replacement() {
        let prior = config("new-volume");
        let mut proposed = config("image");
        proposed.image_id = known("img-1".to_string());
        let (_, replace) = VolumeResource.plan_update(&prior, proposed);
        assert_eq!(replace, vec!["source", "image_id"]);
    }
}
