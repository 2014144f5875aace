mod common;

use anyhow::Result;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use terraform_provider_edgecenter::core::tasks::{wait_task_and_return_result, TaskState};
use terraform_provider_edgecenter::EdgeError;

#[tokio::test]
async fn test_finished_task_returns_created_resource() -> Result<()> {
    let server = MockServer::start_async().await;
    let task_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/tasks/task-1")
                .header("Authorization", format!("APIKey {}", common::API_KEY));
            then.status(200)
                .json_body(common::finished_task("task-1", json!({"routers": ["r-1"]})));
        })
        .await;

    let cloud = common::cloud(&server);
    let id = wait_task_and_return_result(&cloud, "task-1", true, Duration::from_secs(5), |task| async move {
        task.created_resource_id("routers")
    })
    .await?;

    assert_eq!(id, "r-1");
    task_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_error_task_stops_waiting() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-2");
            then.status(200).json_body(json!({
                "id": "task-2",
                "state": "ERROR",
                "error": "quota exceeded"
            }));
        })
        .await;

    let cloud = common::cloud(&server);
    let result = wait_task_and_return_result(&cloud, "task-2", true, Duration::from_secs(5), |_| async {
        Ok(())
    })
    .await;

    match result {
        Err(EdgeError::TaskFailed { task_id, message }) => {
            assert_eq!(task_id, "task-2");
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("expected task failure, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_error_task_can_be_tolerated() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-3");
            then.status(200).json_body(json!({"id": "task-3", "state": "ERROR"}));
        })
        .await;

    let cloud = common::cloud(&server);
    let state = wait_task_and_return_result(&cloud, "task-3", false, Duration::from_secs(5), |task| async move {
        Ok(task.state)
    })
    .await?;

    assert_eq!(state, TaskState::Error);
    Ok(())
}

#[tokio::test]
async fn test_running_task_times_out() -> Result<()> {
    let server = MockServer::start_async().await;
    let task_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-4");
            then.status(200).json_body(json!({"id": "task-4", "state": "RUNNING"}));
        })
        .await;

    let cloud = common::cloud(&server);
    let result = wait_task_and_return_result(&cloud, "task-4", true, Duration::from_millis(100), |_| async {
        Ok(())
    })
    .await;

    assert!(matches!(result, Err(EdgeError::TaskTimeout { .. })));
    assert!(task_mock.hits_async().await > 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_task_is_processing_error() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/task-5");
            then.status(404);
        })
        .await;

    let cloud = common::cloud(&server);
    let err = wait_task_and_return_result(&cloud, "task-5", true, Duration::from_secs(5), |_| async {
        Ok(())
    })
    .await
    .unwrap_err();

    assert!(err.to_string().contains("cannot get task with ID: task-5"));
    Ok(())
}
