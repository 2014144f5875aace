use crate::core::client::EdgeCloud;
use crate::core::scope::ScopeRef;
use crate::domain::model::Scope;
use crate::provider::value::{TfNumber, TfString, ValueExt};
use crate::utils::error::Result;
use crate::utils::validation::validate_exactly_one;

/// 帶 project / region 欄位的 Terraform 狀態
pub trait Scoped {
    fn project_id(&self) -> &TfNumber;
    fn project_name(&self) -> &TfString;
    fn region_id(&self) -> &TfNumber;
    fn region_name(&self) -> &TfString;

    /// 設定階段的檢查，unknown 視為已設定
    fn validate_scope(&self) -> Result<()> {
        validate_exactly_one(
            ("project_id", self.project_id().is_set()),
            ("project_name", self.project_name().is_set()),
        )?;
        validate_exactly_one(
            ("region_id", self.region_id().is_set()),
            ("region_name", self.region_name().is_set()),
        )
    }

    fn scope_ref(&self) -> ScopeRef {
        ScopeRef {
            project_id: self.project_id().known_ref().copied(),
            project_name: self.project_name().known_ref().cloned(),
            region_id: self.region_id().known_ref().copied(),
            region_name: self.region_name().known_ref().cloned(),
        }
    }

    fn scope_changes(&self, other: &Self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.project_id() != other.project_id() {
            changed.push("project_id");
        }
        if self.project_name() != other.project_name() {
            changed.push("project_name");
        }
        if self.region_id() != other.region_id() {
            changed.push("region_id");
        }
        if self.region_name() != other.region_name() {
            changed.push("region_name");
        }
        changed
    }
}

pub async fn resolve<S: Scoped>(cloud: &EdgeCloud, state: &S) -> Result<Scope> {
    state.scope_ref().resolve(cloud).await
}

macro_rules! impl_scoped {
    ($($state:ty),+ $(,)?) => {
        $(
            impl $crate::provider::scope::Scoped for $state {
                fn project_id(&self) -> &$crate::provider::value::TfNumber {
                    &self.project_id
                }
                fn project_name(&self) -> &$crate::provider::value::TfString {
                    &self.project_name
                }
                fn region_id(&self) -> &$crate::provider::value::TfNumber {
                    &self.region_id
                }
                fn region_name(&self) -> &$crate::provider::value::TfString {
                    &self.region_name
                }
            }
        )+
    };
}

pub(crate) use impl_scoped;
