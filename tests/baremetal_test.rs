mod common;

use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::collections::BTreeMap;
use terraform_provider_edgecenter::core::ManagedResource;
use terraform_provider_edgecenter::provider::resources::baremetal::{BaremetalState, BmInterfaceState};
use terraform_provider_edgecenter::provider::resources::BaremetalResource;
use terraform_provider_edgecenter::provider::value::{known, list_items, map_entries, to_list, to_map};

fn subnet_interface(network: &str, subnet: &str) -> BmInterfaceState {
    BmInterfaceState {
        interface_type: known("subnet".to_string()),
        network_id: known(network.to_string()),
        subnet_id: known(subnet.to_string()),
        ..Default::default()
    }
}

fn config() -> BaremetalState {
    let mut metadata = BTreeMap::new();
    metadata.insert("env".to_string(), "dev".to_string());
    BaremetalState {
        project_id: known(1),
        region_id: known(1),
        flavor_id: known("bm1-infrastructure-small".to_string()),
        name: known("bm-1".to_string()),
        image_id: known("img-1".to_string()),
        interface: to_list(vec![subnet_interface("net-1", "sub-1")]),
        metadata_map: to_map(metadata),
        ..Default::default()
    }
}

async fn mock_instance(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/instances/1/1/inst-1");
            then.status(200).json_body(json!({
                "instance_id": "inst-1",
                "instance_name": "bm-1",
                "status": "ACTIVE",
                "vm_state": "active",
                "flavor": {
                    "flavor_id": "bm1-infrastructure-small",
                    "flavor_name": "bm1-infrastructure-small",
                    "ram": 32768,
                    "vcpus": 8
                },
                "addresses": {"net-1": [{"addr": "10.0.0.5", "type": "fixed"}]}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/instances/1/1/inst-1/interfaces");
            then.status(200).json_body(json!([{
                "port_id": "p-1",
                "network_id": "net-1",
                "mac_address": "fa:16:3e:00:00:01",
                "ip_assignments": [{"ip_address": "10.0.0.5", "subnet_id": "sub-1"}],
                "sub_ports": []
            }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/instances/1/1/inst-1/metadata/env");
            then.status(200).json_body(json!({"key": "env", "value": "dev"}));
        })
        .await;
}

#[tokio::test]
async fn test_create_baremetal_fills_interface_details() -> Result<()> {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/bminstances/1/1").json_body_partial(
                json!({
                    "flavor": "bm1-infrastructure-small",
                    "names": ["bm-1"],
                    "image_id": "img-1",
                    "interfaces": [{"type": "subnet", "network_id": "net-1", "subnet_id": "sub-1"}],
                    "metadata": {"env": "dev"}
                })
                .to_string(),
            );
            then.status(200).json_body(common::tasks("task-1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-1");
            then.status(200)
                .json_body(common::finished_task("task-1", json!({"instances": ["inst-1"]})));
        })
        .await;
    mock_instance(&server).await;

    let cloud = common::cloud(&server);
    let planned = BaremetalResource.plan_create(config());
    let state = BaremetalResource.create(&cloud, planned).await?;

    create.assert_async().await;
    assert_eq!(state.id, known("inst-1".to_string()));
    assert_eq!(state.status, known("ACTIVE".to_string()));

    let interfaces = list_items(&state.interface);
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].port_id, known("p-1".to_string()));
    assert_eq!(interfaces[0].ip_address, known("10.0.0.5".to_string()));
    assert_eq!(interfaces[0].is_parent, known(true));

    let flavor = map_entries(&state.flavor);
    assert_eq!(flavor["vcpus"], "8");
    assert_eq!(map_entries(&state.metadata_map)["env"], "dev");
    assert_eq!(list_items(&state.addresses).len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_update_refuses_to_detach_trunk_interface() -> Result<()> {
    let server = MockServer::start_async().await;
    let detach = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/instances/1/1/inst-1/detach_interface");
            then.status(200).json_body(common::tasks("task-2"));
        })
        .await;

    let cloud = common::cloud(&server);
    let mut trunk = subnet_interface("net-1", "sub-1");
    trunk.is_parent = known(true);
    trunk.port_id = known("p-1".to_string());
    trunk.ip_address = known("10.0.0.5".to_string());
    let prior = BaremetalState {
        id: known("inst-1".to_string()),
        interface: to_list(vec![trunk]),
        ..config()
    };
    let planned = BaremetalState {
        interface: to_list(vec![subnet_interface("net-2", "sub-2")]),
        ..prior.clone()
    };

    let err = BaremetalResource.update(&cloud, prior, planned).await.unwrap_err();
    assert!(err.to_string().contains("could not detach trunk interface"));
    assert_eq!(detach.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_read_drops_missing_instance() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/instances/1/1/inst-gone");
            then.status(404);
        })
        .await;

    let cloud = common::cloud(&server);
    let state = BaremetalState {
        id: known("inst-gone".to_string()),
        ..config()
    };
    assert!(BaremetalResource.read(&cloud, state).await?.is_none());
    Ok(())
}
