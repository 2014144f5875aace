#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{EdgeError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub const DEFAULT_CLOUD_API_URL: &str = "https://api.edgecenter.ru/cloud";
pub const DEFAULT_TERRAFORM_VERSION: &str = "0.12+compatible";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// API token 依序讀取的環境變數
pub const API_KEY_ENV_VARS: [&str; 2] = ["EC_PERMANENT_TOKEN", "API_KEY"];
pub const CLOUD_API_ENV_VAR: &str = "EC_CLOUD_API";

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub cloud_api_url: String,
    pub terraform_version: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    /// 合併 Terraform 設定、環境變數與內建預設值
    pub fn resolve(
        api_key: Option<String>,
        cloud_api_url: Option<String>,
        terraform_version: &str,
    ) -> Self {
        Self::resolve_with(api_key, cloud_api_url, terraform_version, |name| {
            std::env::var(name).ok()
        })
    }

    pub fn resolve_with<F>(
        api_key: Option<String>,
        cloud_api_url: Option<String>,
        terraform_version: &str,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

        let api_key = non_empty(api_key)
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|name| non_empty(env(name)))
            })
            .unwrap_or_default();

        let cloud_api_url = non_empty(cloud_api_url)
            .or_else(|| non_empty(env(CLOUD_API_ENV_VAR)))
            .unwrap_or_else(|| DEFAULT_CLOUD_API_URL.to_string());

        let terraform_version = if terraform_version.is_empty() {
            DEFAULT_TERRAFORM_VERSION.to_string()
        } else {
            terraform_version.to_string()
        };

        Self {
            api_key,
            cloud_api_url,
            terraform_version,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn user_agent(&self) -> String {
        format!(
            "terraform-provider-edgecenter/{} terraform/{}",
            env!("CARGO_PKG_VERSION"),
            self.terraform_version
        )
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(EdgeError::MissingConfigError {
                field: format!("api_key (or {})", API_KEY_ENV_VARS.join(" / ")),
            });
        }
        validation::validate_url("edgecenter_cloud_api", &self.cloud_api_url)?;
        if self.poll_interval.is_zero() {
            return Err(EdgeError::ConfigError {
                message: "task poll interval must be positive".to_string(),
            });
        }
        Ok(())
    }
}
