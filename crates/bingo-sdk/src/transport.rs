use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::ClientError;

/// Status and best-effort body text of a completed HTTP exchange.
/// `body` is `None` when the body could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: Some(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, ClientError>;

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: String,
    ) -> Result<HttpResponse, ClientError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self { client })
    }

    async fn finish(response: reqwest::Response) -> HttpResponse {
        let status = response.status().as_u16();
        let body = response.text().await.ok();
        HttpResponse { status, body }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, ClientError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self::finish(response).await)
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: String,
    ) -> Result<HttpResponse, ClientError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;
        Ok(Self::finish(response).await)
    }
}
