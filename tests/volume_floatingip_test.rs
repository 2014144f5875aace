mod common;

use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use terraform_provider_edgecenter::core::ManagedResource;
use terraform_provider_edgecenter::provider::resources::floatingip::FloatingIpState;
use terraform_provider_edgecenter::provider::resources::volume::VolumeState;
use terraform_provider_edgecenter::provider::resources::{FloatingIpResource, VolumeResource};
use terraform_provider_edgecenter::provider::value::{known, list_items, map_entries, to_map, ValueExt};
use tf_provider::Value;

fn metadata(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn volume_config() -> VolumeState {
    VolumeState {
        project_id: known(1),
        region_id: known(1),
        name: known("data".to_string()),
        source: known("new-volume".to_string()),
        size: known(10),
        type_name: known("standard".to_string()),
        metadata_map: to_map(metadata(&[("env", "dev")])),
        ..Default::default()
    }
}

fn volume_body(size: i64, type_name: &str) -> serde_json::Value {
    json!({
        "id": "vol-1",
        "name": "data",
        "size": size,
        "volume_type": type_name,
        "status": "available",
        "metadata_detailed": [
            {"key": "env", "value": "dev", "read_only": false},
            {"key": "task_id", "value": "t-1", "read_only": true}
        ]
    })
}

#[tokio::test]
async fn test_create_volume() -> Result<()> {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/volumes/1/1").json_body(json!({
                "source": "new-volume",
                "name": "data",
                "size": 10,
                "type_name": "standard",
                "metadata": {"env": "dev"}
            }));
            then.status(200).json_body(common::tasks("task-1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-1");
            then.status(200)
                .json_body(common::finished_task("task-1", json!({"volumes": ["vol-1"]})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/volumes/1/1/vol-1");
            then.status(200).json_body(volume_body(10, "standard"));
        })
        .await;

    let cloud = common::cloud(&server);
    let planned = VolumeResource.plan_create(volume_config());
    let state = VolumeResource.create(&cloud, planned).await?;

    create.assert_async().await;
    assert_eq!(state.id, known("vol-1".to_string()));
    assert_eq!(state.status, known("available".to_string()));
    assert_eq!(map_entries(&state.metadata_map), metadata(&[("env", "dev")]));
    assert_eq!(list_items(&state.metadata_read_only).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_update_volume_extends_and_retypes() -> Result<()> {
    let server = MockServer::start_async().await;
    let extend = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/volumes/1/1/vol-1/extend")
                .json_body(json!({"size": 20}));
            then.status(200).json_body(common::tasks("task-2"));
        })
        .await;
    let task = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-2");
            then.status(200).json_body(common::finished_task("task-2", json!({})));
        })
        .await;
    let retype = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/volumes/1/1/vol-1/retype")
                .json_body(json!({"volume_type": "ssd_hiiops"}));
            then.status(200).json_body(volume_body(20, "ssd_hiiops"));
        })
        .await;
    let metadata_put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/v1/volumes/1/1/vol-1/metadata")
                .json_body(json!({"env": "prod"}));
            then.status(200).json_body(json!({}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/volumes/1/1/vol-1");
            then.status(200).json_body(volume_body(20, "ssd_hiiops"));
        })
        .await;

    let cloud = common::cloud(&server);
    let prior = VolumeState {
        id: known("vol-1".to_string()),
        ..volume_config()
    };
    let proposed = VolumeState {
        size: known(20),
        type_name: known("ssd_hiiops".to_string()),
        metadata_map: to_map(metadata(&[("env", "prod")])),
        ..prior.clone()
    };
    let (planned, replace) = VolumeResource.plan_update(&prior, proposed);
    assert!(replace.is_empty());

    let state = VolumeResource.update(&cloud, prior, planned).await?;

    extend.assert_async().await;
    task.assert_async().await;
    retype.assert_async().await;
    metadata_put.assert_async().await;
    assert_eq!(state.size, known(20));
    assert_eq!(state.type_name, known("ssd_hiiops".to_string()));
    assert!(state.last_updated.is_set());
    Ok(())
}

#[tokio::test]
async fn test_update_volume_refuses_to_shrink() -> Result<()> {
    let server = MockServer::start_async().await;
    let rename = server
        .mock_async(|when, then| {
            when.method("PATCH").path("/v1/volumes/1/1/vol-1");
            then.status(200).json_body(volume_body(20, "standard"));
        })
        .await;
    let extend = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/volumes/1/1/vol-1/extend");
            then.status(200).json_body(common::tasks("task-3"));
        })
        .await;

    let cloud = common::cloud(&server);
    let prior = VolumeState {
        id: known("vol-1".to_string()),
        ..volume_config()
    };
    let planned = VolumeState {
        name: known("renamed".to_string()),
        size: known(5),
        ..prior.clone()
    };
    let err = VolumeResource.update(&cloud, prior, planned).await.unwrap_err();

    assert!(err.to_string().contains("volume size can only be extended"));
    assert_eq!(rename.hits_async().await, 0);
    assert_eq!(extend.hits_async().await, 0);
    Ok(())
}

fn fip_body(port_id: Option<&str>) -> serde_json::Value {
    let status = if port_id.is_some() { "ACTIVE" } else { "DOWN" };
    json!({
        "id": "fip-1",
        "floating_ip_address": "203.0.113.10",
        "fixed_ip_address": port_id.map(|_| "10.0.0.5"),
        "port_id": port_id,
        "router_id": "r-1",
        "status": status,
        "metadata": []
    })
}

fn fip_config() -> FloatingIpState {
    FloatingIpState {
        project_id: known(1),
        region_id: known(1),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_floating_ip_without_port() -> Result<()> {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/floatingips/1/1").json_body(json!({}));
            then.status(200).json_body(common::tasks("task-4"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-4");
            then.status(200)
                .json_body(common::finished_task("task-4", json!({"floatingips": ["fip-1"]})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/floatingips/1/1/fip-1");
            then.status(200).json_body(fip_body(None));
        })
        .await;

    let cloud = common::cloud(&server);
    let planned = FloatingIpResource.plan_create(fip_config());
    let state = FloatingIpResource.create(&cloud, planned).await?;

    create.assert_async().await;
    assert_eq!(state.id, known("fip-1".to_string()));
    assert_eq!(state.floating_ip_address, known("203.0.113.10".to_string()));
    assert_eq!(state.port_id, Value::Null);
    assert_eq!(state.status, known("DOWN".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_update_floating_ip_assigns_port() -> Result<()> {
    let server = MockServer::start_async().await;
    let assign = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/floatingips/1/1/fip-1/assign")
                .json_body(json!({"port_id": "port-1", "fixed_ip_address": "10.0.0.5"}));
            then.status(200).json_body(fip_body(Some("port-1")));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/floatingips/1/1/fip-1");
            then.status(200).json_body(fip_body(Some("port-1")));
        })
        .await;

    let cloud = common::cloud(&server);
    let prior = FloatingIpState {
        id: known("fip-1".to_string()),
        ..fip_config()
    };
    let planned = FloatingIpState {
        port_id: known("port-1".to_string()),
        fixed_ip_address: known("10.0.0.5".to_string()),
        ..prior.clone()
    };
    let state = FloatingIpResource.update(&cloud, prior, planned).await?;

    assign.assert_async().await;
    assert_eq!(state.port_id, known("port-1".to_string()));
    assert_eq!(state.status, known("ACTIVE".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_update_floating_ip_unassigns_on_empty_port() -> Result<()> {
    let server = MockServer::start_async().await;
    let unassign = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/floatingips/1/1/fip-1/unassign");
            then.status(200).json_body(fip_body(None));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/floatingips/1/1/fip-1");
            then.status(200).json_body(fip_body(None));
        })
        .await;

    let cloud = common::cloud(&server);
    let prior = FloatingIpState {
        id: known("fip-1".to_string()),
        port_id: known("port-1".to_string()),
        fixed_ip_address: known("10.0.0.5".to_string()),
        ..fip_config()
    };
    let proposed = FloatingIpState {
        port_id: known(String::new()),
        fixed_ip_address: known(String::new()),
        ..prior.clone()
    };
    let (planned, replace) = FloatingIpResource.plan_update(&prior, proposed);
    assert!(replace.is_empty());
    let state = FloatingIpResource.update(&cloud, prior, planned.clone()).await?;

    unassign.assert_async().await;
    assert_eq!(state.port_id, planned.port_id);
    assert_eq!(state.fixed_ip_address, planned.fixed_ip_address);
    assert_eq!(state.port_id, known(String::new()));
    Ok(())
}
