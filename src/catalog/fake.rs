//! In-memory catalog used by tests.

use super::{CatalogError, HttpClient, HttpResponse, Method};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct State {
    resources: BTreeMap<String, serde_json::Value>,
    failures: BTreeMap<(Method, String), u16>,
    requests: Vec<RecordedRequest>,
}

/// Stores posted documents under `{collection}/{extension.resource_id}` and
/// put documents under their URL, so a later probe sees them.
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<State>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resource(self, url: &str, document: serde_json::Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .resources
            .insert(url.to_string(), document);
        self
    }

    pub fn with_failure(self, method: Method, url: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method, url.to_string()), status);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn writes(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::Get)
            .collect()
    }

    fn handle(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> HttpResponse {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        if let Some(status) = state.failures.get(&(method, url.to_string())) {
            return HttpResponse::new(*status, "{\"detail\": \"rejected\"}");
        }
        match (method, body) {
            (Method::Get, _) => match state.resources.get(url) {
                Some(document) => HttpResponse::new(200, document.to_string()),
                None => HttpResponse::new(404, "{\"detail\": \"not found\"}"),
            },
            (Method::Post, Some(body)) => {
                let resource_id = body["extension"]["resource_id"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                state
                    .resources
                    .insert(format!("{}/{}", url, resource_id), body.clone());
                HttpResponse::new(201, body.to_string())
            }
            (_, body) => {
                let body = body.cloned().unwrap_or_default();
                state.resources.insert(url.to_string(), body.clone());
                HttpResponse::new(200, body.to_string())
            }
        }
    }
}

#[async_trait]
impl HttpClient for FakeCatalog {
    async fn get(&self, url: &str) -> Result<HttpResponse, CatalogError> {
        Ok(self.handle(Method::Get, url, None))
    }

    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, CatalogError> {
        Ok(self.handle(Method::Post, url, Some(body)))
    }

    async fn put(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, CatalogError> {
        Ok(self.handle(Method::Put, url, Some(body)))
    }
}
