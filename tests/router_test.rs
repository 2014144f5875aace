mod common;

use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use terraform_provider_edgecenter::core::ManagedResource;
use terraform_provider_edgecenter::provider::resources::router::{
    GatewayState, RouteState, RouterInterfaceState, RouterState,
};
use terraform_provider_edgecenter::provider::resources::RouterResource;
use terraform_provider_edgecenter::provider::value::{known, list_items, to_list, ValueExt};

fn iface(subnet: &str) -> RouterInterfaceState {
    RouterInterfaceState {
        interface_type: known("subnet".to_string()),
        subnet_id: known(subnet.to_string()),
        ..Default::default()
    }
}

fn router_body(subnet: &str) -> serde_json::Value {
    json!({
        "id": "r-1",
        "name": "edge-router",
        "status": "ACTIVE",
        "external_gateway_info": {
            "enable_snat": true,
            "network_id": "ext-net",
            "external_fixed_ips": [{"ip_address": "203.0.113.10", "subnet_id": "ext-sub"}]
        },
        "interfaces": [{
            "port_id": "p-1",
            "network_id": "net-1",
            "mac_address": "fa:16:3e:00:00:01",
            "ip_assignments": [{"ip_address": "10.0.0.1", "subnet_id": subnet}]
        }],
        "routes": []
    })
}

fn config() -> RouterState {
    RouterState {
        project_id: known(1),
        region_name: known("Luxembourg".to_string()),
        name: known("edge-router".to_string()),
        external_gateway_info: to_list(vec![GatewayState {
            gateway_type: known("default".to_string()),
            ..Default::default()
        }]),
        interfaces: to_list(vec![iface("s-1")]),
        routes: to_list(Vec::new()),
        ..Default::default()
    }
}

async fn mock_region(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/regions");
            then.status(200).json_body(json!({
                "results": [{"id": 3, "display_name": "Luxembourg"}]
            }));
        })
        .await;
}

#[tokio::test]
async fn test_create_router_resolves_region_and_fills_computed() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_region(&server).await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/routers/1/3").json_body(json!({
                "name": "edge-router",
                "external_gateway_info": {"type": "default"},
                "interfaces": [{"type": "subnet", "subnet_id": "s-1"}]
            }));
            then.status(200).json_body(common::tasks("task-1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-1");
            then.status(200)
                .json_body(common::finished_task("task-1", json!({"routers": ["r-1"]})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/routers/1/3/r-1");
            then.status(200).json_body(router_body("s-1"));
        })
        .await;

    let cloud = common::cloud(&server);
    let planned = RouterResource.plan_create(config());
    let state = RouterResource.create(&cloud, planned).await?;

    create.assert_async().await;
    assert_eq!(state.id, known("r-1".to_string()));

    let gateway = list_items(&state.external_gateway_info);
    assert_eq!(gateway[0].gateway_type, known("default".to_string()));
    assert_eq!(gateway[0].network_id, known("ext-net".to_string()));
    assert_eq!(gateway[0].enable_snat, known(true));
    assert_eq!(list_items(&gateway[0].external_fixed_ips).len(), 1);

    let interfaces = list_items(&state.interfaces);
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].port_id, known("p-1".to_string()));
    assert_eq!(interfaces[0].ip_address, known("10.0.0.1".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_update_router_swaps_interfaces_and_clears_routes() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_region(&server).await;
    let attach = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/routers/1/3/r-1/attach")
                .json_body(json!({"subnet_id": "s-2"}));
            then.status(200).json_body(router_body("s-2"));
        })
        .await;
    let detach = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/routers/1/3/r-1/detach")
                .json_body(json!({"subnet_id": "s-1"}));
            then.status(200).json_body(router_body("s-2"));
        })
        .await;
    let patch = server
        .mock_async(|when, then| {
            when.method("PATCH")
                .path("/v1/routers/1/3/r-1")
                .json_body(json!({"routes": []}));
            then.status(200).json_body(router_body("s-2"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/routers/1/3/r-1");
            then.status(200).json_body(router_body("s-2"));
        })
        .await;

    let cloud = common::cloud(&server);
    let prior = RouterState {
        id: known("r-1".to_string()),
        routes: to_list(vec![RouteState {
            destination: known("10.0.3.0/24".to_string()),
            nexthop: known("10.0.0.13".to_string()),
        }]),
        ..config()
    };
    let proposed = RouterState {
        interfaces: to_list(vec![iface("s-2")]),
        routes: to_list(Vec::new()),
        ..prior.clone()
    };

    let (planned, replace) = RouterResource.plan_update(&prior, proposed);
    assert!(replace.is_empty());
    assert!(planned.last_updated.is_pending());

    let state = RouterResource.update(&cloud, prior, planned).await?;

    attach.assert_async().await;
    detach.assert_async().await;
    patch.assert_async().await;
    assert!(state.last_updated.is_set());
    let interfaces = list_items(&state.interfaces);
    assert_eq!(interfaces[0].subnet_id, known("s-2".to_string()));
    assert!(list_items(&state.routes).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_update_router_default_gateway_is_not_sent() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_region(&server).await;
    let patch = server
        .mock_async(|when, then| {
            when.method("PATCH").path("/v1/routers/1/3/r-1");
            then.status(200).json_body(router_body("s-1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/routers/1/3/r-1");
            then.status(200).json_body(router_body("s-1"));
        })
        .await;

    let cloud = common::cloud(&server);
    let prior = RouterState {
        id: known("r-1".to_string()),
        ..config()
    };
    let planned = RouterState {
        external_gateway_info: to_list(vec![GatewayState {
            gateway_type: known("default".to_string()),
            enable_snat: known(false),
            ..Default::default()
        }]),
        ..prior.clone()
    };
    RouterResource.update(&cloud, prior, planned).await?;

    assert_eq!(patch.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_delete_router_waits_until_gone() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_region(&server).await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/v1/routers/1/3/r-1");
            then.status(200).json_body(common::tasks("task-9"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-9");
            then.status(200).json_body(common::finished_task("task-9", json!({})));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/routers/1/3/r-1");
            then.status(404);
        })
        .await;

    let cloud = common::cloud(&server);
    let state = RouterState {
        id: known("r-1".to_string()),
        ..config()
    };
    RouterResource.delete(&cloud, state).await?;

    delete.assert_async().await;
    Ok(())
}
