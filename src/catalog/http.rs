use super::{CatalogError, HttpClient, HttpResponse};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;

/// [`HttpClient`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse, CatalogError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        debug!("Response {}: {} bytes", status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, CatalogError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn put(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, CatalogError> {
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Self::read(response).await
    }
}
