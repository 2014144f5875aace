#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::{json, Value};
use std::time::Duration;
use terraform_provider_edgecenter::{EdgeCloud, ProviderConfig};

pub const API_KEY: &str = "test-token";

/// 指向 mock server 的客戶端，輪詢間隔縮短為 10ms
pub fn cloud(server: &MockServer) -> EdgeCloud {
    let config = ProviderConfig::resolve_with(
        Some(API_KEY.to_string()),
        Some(server.base_url()),
        "",
        |_| None,
    )
    .with_poll_interval(Duration::from_millis(10));
    EdgeCloud::new(&config).expect("client should build")
}

pub fn tasks(id: &str) -> Value {
    json!({ "tasks": [id] })
}

pub fn finished_task(id: &str, created: Value) -> Value {
    json!({
        "id": id,
        "state": "FINISHED",
        "created_resources": created
    })
}
