use crate::config::ProviderConfig;
use crate::domain::model::Scope;
use crate::utils::error::{EdgeError, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// 已設定好認證與端點的 EdgeCenter 雲端 API 客戶端
#[derive(Debug, Clone)]
pub struct EdgeCloud {
    http: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl EdgeCloud {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.cloud_api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: config.poll_interval,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// 以 `{base}/{version}/{point}/{project}/{region}` 為根的服務客戶端
    pub fn service(&self, point: &str, version: &str, scope: Scope) -> ServiceClient {
        ServiceClient {
            cloud: self.clone(),
            root: format!(
                "{}/{}/{}/{}/{}",
                self.base_url, version, point, scope.project_id, scope.region_id
            ),
        }
    }

    /// 不帶 project/region 的端點，例如 tasks、projects、regions
    pub fn global_service(&self, point: &str, version: &str) -> ServiceClient {
        ServiceClient {
            cloud: self.clone(),
            root: format!("{}/{}/{}", self.base_url, version, point),
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Authorization", format!("APIKey {}", self.api_key))
    }
}

#[derive(Debug, Clone)]
pub struct ServiceClient {
    cloud: EdgeCloud,
    root: String,
}

impl ServiceClient {
    pub fn cloud(&self) -> &EdgeCloud {
        &self.cloud
    }

    pub fn url(&self, segments: &[&str]) -> String {
        let mut url = self.root.clone();
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.get_with_query(segments, &[]).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
    ) -> Result<T> {
        let url = self.url(segments);
        let request = self.cloud.request(Method::GET, &url).query(query);
        decode(send(request, &url).await?).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::POST, segments, body).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::PUT, segments, body).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::PATCH, segments, body).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
    ) -> Result<T> {
        let url = self.url(segments);
        let request = self.cloud.request(Method::DELETE, &url).query(query);
        decode(send(request, &url).await?).await
    }

    /// 不需要回應內容的請求（例如刪除 metadata）
    pub async fn delete_no_content(&self, segments: &[&str]) -> Result<()> {
        let url = self.url(segments);
        let request = self.cloud.request(Method::DELETE, &url);
        send(request, &url).await?;
        Ok(())
    }

    pub async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<()> {
        let url = self.url(segments);
        let request = self.cloud.request(Method::POST, &url).json(body);
        send(request, &url).await?;
        Ok(())
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.url(segments);
        let request = self.cloud.request(method, &url).json(body);
        decode(send(request, &url).await?).await
    }
}

async fn send(request: RequestBuilder, url: &str) -> Result<Response> {
    tracing::debug!("EdgeCenter API request: {}", url);
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("EdgeCenter API response status: {}", status);

    if status.is_success() {
        return Ok(response);
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(EdgeError::NotFound {
            url: url.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(EdgeError::Api {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    // 部分端點成功時回傳空內容
    if bytes.is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
