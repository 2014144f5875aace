use crate::core::client::EdgeCloud;
use crate::domain::model::{ListResponse, Scope};
use crate::utils::error::{EdgeError, Result};
use crate::utils::validation::validate_exactly_one;
use serde::Deserialize;

pub const PROJECTS_POINT: &str = "projects";
pub const REGIONS_POINT: &str = "regions";

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub id: i64,
    pub display_name: String,
}

/// Terraform 設定中的 project / region 參照（id 或名稱）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeRef {
    pub project_id: Option<i64>,
    pub project_name: Option<String>,
    pub region_id: Option<i64>,
    pub region_name: Option<String>,
}

impl ScopeRef {
    pub fn validate(&self) -> Result<()> {
        validate_exactly_one(
            ("project_id", self.project_id.is_some()),
            ("project_name", self.project_name.is_some()),
        )?;
        validate_exactly_one(
            ("region_id", self.region_id.is_some()),
            ("region_name", self.region_name.is_some()),
        )
    }

    pub async fn resolve(&self, cloud: &EdgeCloud) -> Result<Scope> {
        self.validate()?;

        let project_id = match self.project_id {
            Some(id) => id,
            None => find_project(cloud, self.project_name.as_deref().unwrap_or_default()).await?,
        };
        let region_id = match self.region_id {
            Some(id) => id,
            None => find_region(cloud, self.region_name.as_deref().unwrap_or_default()).await?,
        };

        Ok(Scope {
            project_id,
            region_id,
        })
    }
}

async fn find_project(cloud: &EdgeCloud, name: &str) -> Result<i64> {
    let projects: ListResponse<Project> = cloud
        .global_service(PROJECTS_POINT, "v1")
        .get(&[])
        .await?;

    projects
        .results
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.id)
        .ok_or_else(|| EdgeError::validation(format!("project with name {} does not exist", name)))
}

async fn find_region(cloud: &EdgeCloud, name: &str) -> Result<i64> {
    let regions: ListResponse<Region> = cloud
        .global_service(REGIONS_POINT, "v1")
        .get(&[])
        .await?;

    regions
        .results
        .into_iter()
        .find(|r| r.display_name == name)
        .map(|r| r.id)
        .ok_or_else(|| EdgeError::validation(format!("region with name {} does not exist", name)))
}
