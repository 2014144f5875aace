use crate::core::client::EdgeCloud;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tf_provider::Schema;

/// 一個 Terraform 受管資源的生命週期
///
/// `State` 同時代表設定、計畫與狀態，未知值以 `Value::Unknown` 表示。
#[async_trait]
pub trait ManagedResource: Send + Sync {
    type State: Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync;

    fn schema(&self) -> Schema;

    fn validate(&self, config: &Self::State) -> Result<()>;

    /// 建立前的計畫，未設定的 computed 欄位轉為 unknown
    fn plan_create(&self, proposed: Self::State) -> Self::State;

    /// 回傳計畫狀態與需要重建資源的欄位名稱
    fn plan_update(
        &self,
        prior: &Self::State,
        proposed: Self::State,
    ) -> (Self::State, Vec<&'static str>);

    async fn create(&self, cloud: &EdgeCloud, planned: Self::State) -> Result<Self::State>;

    /// 資源已不存在時回傳 `None`
    async fn read(&self, cloud: &EdgeCloud, state: Self::State) -> Result<Option<Self::State>>;

    async fn update(
        &self,
        cloud: &EdgeCloud,
        prior: Self::State,
        planned: Self::State,
    ) -> Result<Self::State>;

    async fn delete(&self, cloud: &EdgeCloud, state: Self::State) -> Result<()>;
}

/// 唯讀的 Terraform data source
#[async_trait]
pub trait LookupSource: Send + Sync {
    type State: Serialize + DeserializeOwned + Clone + Debug + Send + Sync;

    fn schema(&self) -> Schema;

    fn validate(&self, config: &Self::State) -> Result<()>;

    async fn read(&self, cloud: &EdgeCloud, config: Self::State) -> Result<Self::State>;
}
