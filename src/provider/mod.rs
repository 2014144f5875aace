//! Terraform surface of the plugin: provider configuration plus the resource and
//! data source tables.

pub mod adapter;
pub mod data_sources;
pub mod resources;
pub mod schema;
pub mod scope;
pub mod value;

use crate::config::ProviderConfig;
use crate::core::client::EdgeCloud;
use crate::utils::validation::Validate;
use adapter::{report, SharedCloud, TerraformDataSource, TerraformResource};
use async_trait::async_trait;
use data_sources::{FloatingIpDataSource, ImageDataSource, SecretDataSource, VolumeDataSource};
use resources::{
    BaremetalResource, FloatingIpResource, LbMemberResource, LbPoolResource, RouterResource,
    SecretResource, VolumeResource,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tf_provider::{map, AttributeType, Diagnostics, Provider, Schema, Value, ValueEmpty};
use value::{TfString, ValueExt};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    pub api_key: TfString,
    pub edgecenter_cloud_api: TfString,
}

impl ProviderState {
    pub fn to_config(&self, terraform_version: &str) -> ProviderConfig {
        ProviderConfig::resolve(
            self.api_key.known_ref().cloned(),
            self.edgecenter_cloud_api.known_ref().cloned(),
            terraform_version,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeCenterProvider {
    cloud: SharedCloud,
}

impl EdgeCenterProvider {
    pub fn cloud(&self) -> &SharedCloud {
        &self.cloud
    }
}

#[async_trait]
impl Provider for EdgeCenterProvider {
    type Config<'a> = Value<ProviderState>;
    type MetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(Schema {
            version: 1,
            block: schema::block(
                "EdgeCenter cloud provider",
                vec![
                    (
                        "api_key",
                        schema::sensitive(schema::optional(
                            AttributeType::String,
                            "A permanent API token. Defaults to EC_PERMANENT_TOKEN or API_KEY.",
                        )),
                    ),
                    (
                        "edgecenter_cloud_api",
                        schema::optional(
                            AttributeType::String,
                            "A cloud API endpoint. Defaults to EC_CLOUD_API.",
                        ),
                    ),
                ],
                vec![],
            ),
        })
    }

    async fn validate<'a>(&self, _diags: &mut Diagnostics, _config: Self::Config<'a>) -> Option<()> {
        // api_key 可能來自環境變數，要到 configure 才能檢查
        Some(())
    }

    async fn configure<'a>(
        &self,
        diags: &mut Diagnostics,
        terraform_version: String,
        config: Self::Config<'a>,
    ) -> Option<()> {
        tracing::debug!("Start provider configuring");
        let state = match config {
            Value::Value(state) => state,
            _ => ProviderState::default(),
        };
        let config = state.to_config(&terraform_version);
        report(diags, config.validate())?;
        let cloud = report(diags, EdgeCloud::new(&config))?;
        self.cloud.set(cloud);
        tracing::debug!("Finish provider configuring ({})", config.cloud_api_url);
        Some(())
    }

    fn get_resources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn tf_provider::resource::DynamicResource>>> {
        let cloud = &self.cloud;
        Some(map! {
            "edgecenter_baremetal" => TerraformResource::new(BaremetalResource, cloud.clone()),
            "edgecenter_floatingip" => TerraformResource::new(FloatingIpResource, cloud.clone()),
            "edgecenter_lb_member" => TerraformResource::new(LbMemberResource, cloud.clone()),
            "edgecenter_lbpool" => TerraformResource::new(LbPoolResource, cloud.clone()),
            "edgecenter_router" => TerraformResource::new(RouterResource, cloud.clone()),
            "edgecenter_secret" => TerraformResource::new(SecretResource, cloud.clone()),
            "edgecenter_volume" => TerraformResource::new(VolumeResource, cloud.clone()),
        })
    }

    fn get_data_sources(
        &self,
        _diags: &mut Diagnostics,
    ) -> Option<HashMap<String, Box<dyn tf_provider::data_source::DynamicDataSource>>> {
        let cloud = &self.cloud;
        Some(map! {
            "edgecenter_floatingip" => TerraformDataSource::new(FloatingIpDataSource, cloud.clone()),
            "edgecenter_image" => TerraformDataSource::new(ImageDataSource, cloud.clone()),
            "edgecenter_secret" => TerraformDataSource::new(SecretDataSource, cloud.clone()),
            "edgecenter_volume" => TerraformDataSource::new(VolumeDataSource, cloud.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use value::known;

    #[test]
    fn test_provider_state_prefers_explicit_values() {
        let state = ProviderState {
            api_key: known("token".to_string()),
            edgecenter_cloud_api: known("https://cloud.example.com".to_string()),
        };
        let config = state.to_config("");
        assert_eq!(config.api_key, "token");
        assert_eq!(config.cloud_api_url, "https://cloud.example.com");
        assert_eq!(config.terraform_version, crate::config::DEFAULT_TERRAFORM_VERSION);
    }

    #[test]
    fn test_provider_schema_marks_api_key_sensitive() {
        let mut diags = Diagnostics::default();
        let schema = EdgeCenterProvider::default().schema(&mut diags).unwrap();
        assert!(schema.block.attributes["api_key"].sensitive);
        assert!(!schema.block.attributes["edgecenter_cloud_api"].sensitive);
    }

    #[test]
    fn test_resource_tables() {
        let provider = EdgeCenterProvider::default();
        let mut diags = Diagnostics::default();
        let resources = provider.get_resources(&mut diags).unwrap();
        assert_eq!(resources.len(), 7);
        assert!(resources.contains_key("edgecenter_lb_member"));
        let data_sources = provider.get_data_sources(&mut diags).unwrap();
        assert!(data_sources.contains_key("edgecenter_image"));
    }
}
