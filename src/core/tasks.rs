//! Task polling.
//!
//! Asynchronous EdgeCenter operations answer with `{"tasks": [...]}`. The caller polls
//! `GET /v1/tasks/{id}` at a fixed interval until the task reaches a terminal state and
//! then runs a retriever that turns the finished task into a result (usually the id of
//! the created resource, or a confirmation that the resource is gone).

use crate::core::client::EdgeCloud;
use crate::utils::error::{EdgeError, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const TASKS_POINT: &str = "tasks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TaskState {
    #[serde(rename = "NEW")]
    New,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "FINISHED")]
    Finished,
    #[serde(rename = "ERROR")]
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub id: String,
    pub state: TaskState,
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub created_resources: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Task {
    /// `created_resources[kind]` 的第一個 id
    pub fn created_resource_id(&self, kind: &str) -> Result<String> {
        let ids = self
            .created_resources
            .as_ref()
            .and_then(|resources| resources.get(kind))
            .and_then(|ids| ids.as_array())
            .ok_or_else(|| {
                EdgeError::processing(format!(
                    "task {} has no created resources of kind '{}'",
                    self.id, kind
                ))
            })?;

        ids.first()
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                EdgeError::processing(format!(
                    "task {} created no '{}' resources",
                    self.id, kind
                ))
            })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResults {
    #[serde(default)]
    pub tasks: Vec<String>,
}

impl TaskResults {
    pub fn first(&self) -> Result<&str> {
        self.tasks
            .first()
            .map(String::as_str)
            .ok_or_else(|| EdgeError::processing("API response contains no task id"))
    }
}

pub async fn get(cloud: &EdgeCloud, task_id: &str) -> Result<Task> {
    cloud
        .global_service(TASKS_POINT, "v1")
        .get(&[task_id])
        .await
}

/// 等待 task 結束後呼叫 `retriever` 取得結果
pub async fn wait_task_and_return_result<T, F, Fut>(
    cloud: &EdgeCloud,
    task_id: &str,
    stop_on_task_error: bool,
    timeout: Duration,
    retriever: F,
) -> Result<T>
where
    F: FnOnce(Task) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    tracing::debug!("Waiting for task {} (timeout {:?})", task_id, timeout);
    let deadline = Instant::now() + timeout;

    let task = loop {
        let task = get(cloud, task_id).await.map_err(|e| match e {
            EdgeError::NotFound { .. } | EdgeError::Api { .. } | EdgeError::RequestError(_) => {
                EdgeError::processing(format!("cannot get task with ID: {}. Error: {}", task_id, e))
            }
            other => other,
        })?;

        match task.state {
            TaskState::Finished => break task,
            TaskState::Error if stop_on_task_error => {
                return Err(EdgeError::TaskFailed {
                    task_id: task_id.to_string(),
                    message: task
                        .error
                        .clone()
                        .unwrap_or_else(|| "task finished in ERROR state".to_string()),
                });
            }
            TaskState::Error => {
                tracing::warn!("Task {} finished with error, continuing", task_id);
                break task;
            }
            TaskState::New | TaskState::Running => {}
        }

        if Instant::now() + cloud.poll_interval() > deadline {
            return Err(EdgeError::TaskTimeout {
                task_id: task_id.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        tokio::time::sleep(cloud.poll_interval()).await;
    };

    tracing::debug!("Task {} reached state {:?}", task_id, task.state);
    retriever(task).await
}

/// 刪除 task 結束後確認資源已查不到（404）
pub async fn confirm_deleted<T, Fut>(kind: &str, id: &str, lookup: Fut) -> Result<()>
where
    Fut: Future<Output = Result<T>>,
{
    match lookup.await {
        Ok(_) => Err(EdgeError::processing(format!(
            "cannot delete {} with ID: {}",
            kind, id
        ))),
        Err(e) if e.is_not_found() => Ok(()),
        Err(e) => Err(EdgeError::processing(format!(
            "extracting {} resource error: {}",
            kind, e
        ))),
    }
}
