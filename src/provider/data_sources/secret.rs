use super::find_exact;
use crate::cloud::secrets::{self, Secret};
use crate::cloud::{SECRETS_POINT, VERSION_POINT_V1};
use crate::core::client::EdgeCloud;
use crate::domain::ports::LookupSource;
use crate::provider::resources::secret::secret_attributes;
use crate::provider::schema::{computed, required, scoped_schema};
use crate::provider::scope::{impl_scoped, resolve, Scoped};
use crate::provider::value::{from_option, known, to_map, TfMap, TfNumber, TfString, ValueExt};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tf_provider::{AttributeType, Schema};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretLookup {
    pub id: TfString,
    pub project_id: TfNumber,
    pub project_name: TfString,
    pub region_id: TfNumber,
    pub region_name: TfString,
    pub name: TfString,
    pub expiration: TfString,
    pub algorithm: TfString,
    pub bit_length: TfNumber,
    pub mode: TfString,
    pub status: TfString,
    pub content_types: TfMap,
    pub created: TfString,
}

impl_scoped!(SecretLookup);

impl SecretLookup {
    fn apply(mut self, secret: &Secret) -> Self {
        self.id = known(secret.id.clone());
        self.expiration = from_option(secret.expiration.clone());
        self.algorithm = from_option(secret.algorithm.clone());
        self.bit_length = from_option(secret.bit_length);
        self.mode = from_option(secret.mode.clone());
        self.status = known(secret.status.clone());
        self.content_types = to_map(secret.content_types.clone());
        self.created = from_option(secret.created.clone());
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SecretDataSource;

#[async_trait]
impl LookupSource for SecretDataSource {
    type State = SecretLookup;

    fn schema(&self) -> Schema {
        let mut attributes = vec![
            ("name", required(AttributeType::String, "")),
            ("expiration", computed(AttributeType::String, "Datetime when the secret will expire.")),
        ];
        attributes.extend(secret_attributes());
        scoped_schema("Represent secret", attributes, vec![])
    }

    fn validate(&self, config: &SecretLookup) -> Result<()> {
        config.validate_scope()
    }

    async fn read(&self, cloud: &EdgeCloud, config: SecretLookup) -> Result<SecretLookup> {
        tracing::debug!("Start Secret reading");
        let scope = resolve(cloud, &config).await?;
        let client = cloud.service(SECRETS_POINT, VERSION_POINT_V1, scope);
        let name = config.name.known_ref().cloned().unwrap_or_default();

        let all_secrets = secrets::list(&client).await?;
        let secret = find_exact(&all_secrets, "secret", "name", &name, |s| Some(s.name.as_str()))?;

        let state = config.apply(secret);
        tracing::debug!("Finish Secret reading");
        Ok(state)
    }
}
