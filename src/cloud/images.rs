use crate::cloud::MetadataFilter;
use crate::core::client::ServiceClient;
use crate::domain::model::{ListResponse, MetadataDetailed};
use crate::utils::error::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub min_disk: i64,
    #[serde(default)]
    pub min_ram: i64,
    #[serde(default)]
    pub os_distro: String,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata_detailed: Vec<MetadataDetailed>,
}

pub async fn list(client: &ServiceClient, filter: &MetadataFilter) -> Result<Vec<Image>> {
    let images: ListResponse<Image> = client.get_with_query(&[], &filter.to_query()?).await?;
    Ok(images.results)
}

/// 名稱前綴比對（不分大小寫），回傳第一個符合的映像
pub fn find_by_name_prefix<'a>(images: &'a [Image], name: &str) -> Option<&'a Image> {
    let prefix = name.to_lowercase();
    images
        .iter()
        .find(|image| image.name.to_lowercase().starts_with(&prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(id: &str, name: &str) -> Image {
        serde_json::from_value(serde_json::json!({"id": id, "name": name})).unwrap()
    }

    #[test]
    fn test_find_by_name_prefix() {
        let images = vec![
            image("1", "centos-7"),
            image("2", "Ubuntu-20.04-x64"),
            image("3", "ubuntu-22.04-x64"),
        ];

        assert_eq!(find_by_name_prefix(&images, "ubuntu").unwrap().id, "2");
        assert_eq!(find_by_name_prefix(&images, "UBUNTU-22").unwrap().id, "3");
        assert!(find_by_name_prefix(&images, "debian").is_none());
    }
}
