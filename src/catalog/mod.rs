mod client;
mod http;
pub mod routes;
mod settle;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{CatalogClient, Upsert};
pub use http::ReqwestHttpClient;
pub use settle::SettleStrategy;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<serde_json::Value, CatalogError> {
        serde_json::from_str(&self.body).map_err(|e| CatalogError::InvalidJson(e.to_string()))
    }
}

/// Minimal HTTP transport used by [`CatalogClient`].
///
/// Implementations only move bytes: any status code is returned as an
/// [`HttpResponse`], and only failures to obtain a response are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, CatalogError>;

    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, CatalogError>;

    async fn put(&self, url: &str, body: &serde_json::Value)
        -> Result<HttpResponse, CatalogError>;
}

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Unexpected status {status} for {method} {url}: {body}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}
