use super::{filter_attributes, metadata_filter};
use crate::cloud::images::{self, Image};
use crate::cloud::{BMIMAGES_POINT, IMAGES_POINT, VERSION_POINT_V1};
use crate::core::client::EdgeCloud;
use crate::domain::ports::LookupSource;
use crate::provider::schema::{computed, metadata_read_only, optional, required, scoped_schema};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{
    self, from_option, known, MetadataItem, TfBool, TfList, TfMap, TfNumber, TfString, ValueExt,
};
use crate::utils::error::{EdgeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageState {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub name: TfString,
    pub is_baremetal: TfBool,
    pub metadata_k: TfString,
    pub metadata_kv: TfMap,
    pub min_disk: TfNumber,
    pub min_ram: TfNumber,
    pub os_distro: TfString,
    pub os_version: TfString,
    pub description: TfString,
    pub metadata_read_only: TfList<MetadataItem>,
}

impl_scoped!(ImageState);

impl ImageState {
    fn apply(mut self, image: &Image) -> Self {
        self.id = known(image.id.clone());
        self.min_disk = known(image.min_disk);
        self.min_ram = known(image.min_ram);
        self.os_distro = known(image.os_distro.clone());
        self.os_version = known(image.os_version.clone());
        self.description = from_option(image.description.clone());
        self.metadata_read_only = value::metadata_read_only(&image.metadata_detailed);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDataSource;

#[async_trait]
impl LookupSource for ImageDataSource {
    type State = ImageState;

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            (
                "name",
                required(
                    AttributeType::String,
                    "The name of the image. Use 'os-version', for example 'ubuntu-20.04'.",
                ),
            ),
            (
                "is_baremetal",
                optional(AttributeType::Bool, "Set to true if need to get the baremetal image."),
            ),
            (
                "min_disk",
                computed(
                    AttributeType::Number,
                    "Minimum disk space (in GB) required to launch an instance using this image.",
                ),
            ),
            (
                "min_ram",
                computed(
                    AttributeType::Number,
                    "Minimum VM RAM (in MB) required to launch an instance using this image.",
                ),
            ),
            (
                "os_distro",
                computed(
                    AttributeType::String,
                    "The distribution of the OS present in the image, e.g. Debian, CentOS, Ubuntu etc.",
                ),
            ),
            (
                "os_version",
                computed(
                    AttributeType::String,
                    "The version of the OS present in the image. e.g. 19.04 (for Ubuntu) or 9.4 for Debian.",
                ),
            ),
            ("description", computed(AttributeType::String, "A detailed description of the image.")),
            ("metadata_read_only", metadata_read_only()),
        ];
        attributes.extend(filter_attributes());
        scoped_schema(
            "A cloud image is a pre-configured virtual machine template that you can use to create new instances.",
            attributes,
            vec![],
        )
    }

    fn validate(&self, config: &ImageState) -> Result<()> {
        config.validate_scope()
    }

    async fn read(&self, cloud: &EdgeCloud, config: ImageState) -> Result<ImageState> {
        tracing::debug!("Start Image reading");
        let name = config.name.known_ref().cloned().unwrap_or_default();

        let point = if config.is_baremetal.known_ref().copied().unwrap_or(false) {
            BMIMAGES_POINT
        } else {
            IMAGES_POINT
        };
        let scope = resolve(cloud, &config).await?;
        let client = cloud.service(point, VERSION_POINT_V1, scope);

        let filter = metadata_filter(&config.metadata_k, &config.metadata_kv);
        let all_images = images::list(&client, &filter).await?;
        let image = images::find_by_name_prefix(&all_images, &name)
            .ok_or_else(|| EdgeError::processing(format!("image with name {} not found", name)))?;

        let state = config.apply(image);
        tracing::debug!("Finish Image reading");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_image() {
        let image: Image = serde_json::from_value(serde_json::json!({
            "id": "img-1",
            "name": "ubuntu-20.04-x64",
            "min_disk": 5,
            "min_ram": 512,
            "os_distro": "ubuntu",
            "os_version": "20.04",
            "metadata_detailed": [{"key": "os", "value": "linux", "read_only": true}]
        }))
        .unwrap();

        let state = ImageState {
            name: known("ubuntu-20".to_string()),
            ..Default::default()
        }
        .apply(&image);
        assert_eq!(state.id, known("img-1".to_string()));
        assert_eq!(state.min_ram, known(512));
        assert!(!state.description.is_set());
        assert_eq!(value::list_items(&state.metadata_read_only).len(), 1);
        assert_eq!(state.name, known("ubuntu-20".to_string()));
    }
}
