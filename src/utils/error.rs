use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgeError {
    #[error("API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("resource not found: {url}")]
    NotFound { url: String },

    #[error("API error {status} from {url}: {body}")]
    Api {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    #[error("timed out after {seconds}s waiting for task {task_id}")]
    TaskTimeout { task_id: String, seconds: u64 },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl EdgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    /// 對應雲端 API 的 404 錯誤
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Terraform 診斷訊息的標題
    pub fn summary(&self) -> &'static str {
        match self {
            Self::RequestError(_) => "EdgeCenter API request failed",
            Self::SerializationError(_) => "Malformed EdgeCenter API payload",
            Self::NotFound { .. } => "EdgeCenter resource not found",
            Self::Api { .. } => "EdgeCenter API error",
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => "Invalid provider configuration",
            Self::ValidationError { .. } => "Invalid resource configuration",
            Self::TaskFailed { .. } => "EdgeCenter task failed",
            Self::TaskTimeout { .. } => "EdgeCenter task timed out",
            Self::ProcessingError { .. } => "EdgeCenter response processing failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, EdgeError>;

/// 404 轉為 `None`，其他錯誤照常回傳
pub fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
