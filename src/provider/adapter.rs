//! Bridges the crate's `ManagedResource` / `LookupSource` ports onto the
//! `tf_provider` traits.
//!
//! The Terraform-facing state is `Value<S>`: a null value is how a read reports that
//! the remote object is gone, which makes Terraform drop it from state.

use crate::core::client::EdgeCloud;
use crate::domain::ports::{LookupSource, ManagedResource};
use crate::utils::error::{EdgeError, Result};
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use tf_provider::{Value, ValueEmpty};
use tf_provider::{AttributePath, DataSource, Diagnostics, Resource, Schema};

/// Provider 與各資源共用的已設定客戶端
#[derive(Debug, Clone, Default)]
pub struct SharedCloud(Arc<RwLock<Option<EdgeCloud>>>);

impl SharedCloud {
    pub fn set(&self, cloud: EdgeCloud) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(cloud);
    }

    pub fn get(&self) -> Result<EdgeCloud> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| EdgeError::ConfigError {
                message: "provider is not configured".to_string(),
            })
    }
}

/// 錯誤轉為 Terraform 診斷訊息
pub fn report<T>(diags: &mut Diagnostics, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!("{}: {}", e.summary(), e);
            diags.root_error(e.summary().to_string(), e.to_string());
            None
        }
    }
}

pub struct TerraformResource<R> {
    inner: R,
    cloud: SharedCloud,
}

impl<R> TerraformResource<R> {
    pub fn new(inner: R, cloud: SharedCloud) -> Self {
        Self { inner, cloud }
    }
}

#[async_trait]
impl<R: ManagedResource + 'static> Resource for TerraformResource<R> {
    type State<'a> = Value<R::State>;
    type PrivateState<'a> = ValueEmpty;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(self.inner.schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        match config {
            Value::Value(config) => report(diags, self.inner.validate(&config)),
            _ => Some(()),
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        state: Self::State<'a>,
        private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(state) = state else {
            return Some((state, private_state));
        };
        let cloud = report(diags, self.cloud.get())?;
        let refreshed = report(diags, self.inner.read(&cloud, state).await)?;
        let refreshed = match refreshed {
            Some(state) => Value::Value(state),
            None => Value::Null,
        };
        Some((refreshed, private_state))
    }

    async fn plan_create<'a>(
        &self,
        _diags: &mut Diagnostics,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let planned = match proposed_state {
            Value::Value(proposed) => Value::Value(self.inner.plan_create(proposed)),
            other => other,
        };
        Some((planned, ValueEmpty::default()))
    }

    async fn plan_update<'a>(
        &self,
        _diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        proposed_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>, Vec<AttributePath>)> {
        match (prior_state, proposed_state) {
            (Value::Value(prior), Value::Value(proposed)) => {
                let (planned, replace) = self.inner.plan_update(&prior, proposed);
                let replace = replace.into_iter().map(AttributePath::new).collect();
                Some((Value::Value(planned), prior_private_state, replace))
            }
            (_, proposed) => Some((proposed, prior_private_state, Vec::new())),
        }
    }

    async fn plan_destroy<'a>(
        &self,
        _diags: &mut Diagnostics,
        _prior_state: Self::State<'a>,
        _prior_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        Some(())
    }

    async fn create<'a>(
        &self,
        diags: &mut Diagnostics,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let Value::Value(planned) = planned_state else {
            diags.root_error_short("cannot create a resource from an unknown plan".to_string());
            return None;
        };
        let cloud = report(diags, self.cloud.get())?;
        let state = report(diags, self.inner.create(&cloud, planned).await)?;
        Some((Value::Value(state), planned_private_state))
    }

    async fn update<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        planned_state: Self::State<'a>,
        _config_state: Self::State<'a>,
        planned_private_state: Self::PrivateState<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<(Self::State<'a>, Self::PrivateState<'a>)> {
        let (Value::Value(prior), Value::Value(planned)) = (prior_state, planned_state) else {
            diags.root_error_short("cannot update a resource without a known state".to_string());
            return None;
        };
        let cloud = report(diags, self.cloud.get())?;
        let state = report(diags, self.inner.update(&cloud, prior, planned).await)?;
        Some((Value::Value(state), planned_private_state))
    }

    async fn destroy<'a>(
        &self,
        diags: &mut Diagnostics,
        prior_state: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<()> {
        let Value::Value(prior) = prior_state else {
            return Some(());
        };
        let cloud = report(diags, self.cloud.get())?;
        report(diags, self.inner.delete(&cloud, prior).await)
    }
}

pub struct TerraformDataSource<D> {
    inner: D,
    cloud: SharedCloud,
}

impl<D> TerraformDataSource<D> {
    pub fn new(inner: D, cloud: SharedCloud) -> Self {
        Self { inner, cloud }
    }
}

#[async_trait]
impl<D: LookupSource + 'static> DataSource for TerraformDataSource<D> {
    type State<'a> = Value<D::State>;
    type ProviderMetaState<'a> = ValueEmpty;

    fn schema(&self, _diags: &mut Diagnostics) -> Option<Schema> {
        Some(self.inner.schema())
    }

    async fn validate<'a>(&self, diags: &mut Diagnostics, config: Self::State<'a>) -> Option<()> {
        match config {
            Value::Value(config) => report(diags, self.inner.validate(&config)),
            _ => Some(()),
        }
    }

    async fn read<'a>(
        &self,
        diags: &mut Diagnostics,
        config: Self::State<'a>,
        _provider_meta_state: Self::ProviderMetaState<'a>,
    ) -> Option<Self::State<'a>> {
        let Value::Value(config) = config else {
            diags.root_error_short("data source configuration is not known yet".to_string());
            return None;
        };
        let cloud = report(diags, self.cloud.get())?;
        let state = report(diags, self.inner.read(&cloud, config).await)?;
        Some(Value::Value(state))
    }
}
