use super::routes;
use super::settle::SettleStrategy;
use super::{CatalogError, HttpClient, HttpResponse, Method};
use crate::document::{
    build_schema_document, build_workspace_document, DimensionDocument, MeasureDocument,
    SchemaLayout,
};
use chrono::Local;
use log::{debug, info, warn};
use serde::Serialize;

/// What an upsert call did on the remote side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
    /// The resource exists and is create-once.
    Unchanged,
    /// The resource does not exist and this path never creates it.
    Missing,
}

enum Probe {
    Present(HttpResponse),
    Absent,
}

/// Create-or-update access to a remote catalog.
///
/// Every call issues one existence probe followed by at most one write, and
/// fails on any status other than the ones the protocol expects.
pub struct CatalogClient<H> {
    http: H,
    api_base: String,
    settle: SettleStrategy,
}

impl<H: HttpClient> CatalogClient<H> {
    pub fn new(http: H, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            settle: SettleStrategy::default(),
        }
    }

    pub fn with_settle(mut self, settle: SettleStrategy) -> Self {
        self.settle = settle;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    /// Overwrites an existing workspace collection document.
    ///
    /// A workspace that does not exist yet is left absent: the catalog offers
    /// no creation endpoint on this path.
    pub async fn upsert_workspace(
        &self,
        id: &str,
        label: &str,
        source: Option<&str>,
        note: Option<&[String]>,
    ) -> Result<Upsert, CatalogError> {
        let document = build_workspace_document(id, label, source, note, Local::now().date_naive());
        let url = routes::workspace_url(&self.api_base, id);
        info!("Workspace document: {}", to_log(&document));

        match self.probe(&url).await? {
            Probe::Present(_) => {
                self.write(Method::Put, &url, &document).await?;
                Ok(Upsert::Updated)
            }
            Probe::Absent => {
                warn!("Workspace {} does not exist and was not created", id);
                Ok(Upsert::Missing)
            }
        }
    }

    /// Creates the dimension, or replaces it while keeping the references
    /// other resources hold on it.
    pub async fn upsert_dimension(
        &self,
        workspace_id: &str,
        dimension_id: &str,
        mut document: DimensionDocument,
    ) -> Result<Upsert, CatalogError> {
        let url = routes::dimension_url(&self.api_base, workspace_id, dimension_id);

        match self.probe(&url).await? {
            Probe::Absent => {
                document.extension.referenced = false;
                document.extension.referenced_by = Vec::new();
                info!("Dimension document: {}", to_log(&document));
                let collection = routes::dimensions_url(&self.api_base, workspace_id);
                self.write(Method::Post, &collection, &document).await?;
                Ok(Upsert::Created)
            }
            Probe::Present(existing) => {
                let references = existing_references(&existing)?;
                if !references.is_empty() {
                    debug!(
                        "Dimension {}/{} is referenced by {:?}",
                        workspace_id, dimension_id, references
                    );
                    document.extension.referenced = true;
                    document.extension.referenced_by = references;
                }
                info!("Dimension document: {}", to_log(&document));
                self.write(Method::Put, &url, &document).await?;
                Ok(Upsert::Updated)
            }
        }
    }

    /// Creates the measure unless it already exists. Measures are never
    /// updated.
    pub async fn upsert_measure(
        &self,
        workspace_id: &str,
        measure_id: &str,
        document: &MeasureDocument,
    ) -> Result<Upsert, CatalogError> {
        let url = routes::measure_url(&self.api_base, workspace_id, measure_id);
        if let Probe::Present(_) = self.probe(&url).await? {
            info!("Measure {}/{} already exists", workspace_id, measure_id);
            return Ok(Upsert::Unchanged);
        }

        info!("Measure document: {}", to_log(document));
        let collection = routes::measures_url(&self.api_base, workspace_id);
        self.write(Method::Post, &collection, document).await?;
        Ok(Upsert::Created)
    }

    /// Creates the schema unless it already exists. Schemas are never updated.
    pub async fn upsert_schema(
        &self,
        workspace_id: &str,
        layout: &SchemaLayout,
    ) -> Result<Upsert, CatalogError> {
        let url = routes::schema_url(&self.api_base, workspace_id, &layout.id);
        if let Probe::Present(_) = self.probe(&url).await? {
            info!("Schema {}/{} already exists", workspace_id, layout.id);
            return Ok(Upsert::Unchanged);
        }

        let document = build_schema_document(&self.api_base, workspace_id, layout);
        info!("Schema document: {}", to_log(&document));
        let collection = routes::schemas_url(&self.api_base, workspace_id);
        self.write(Method::Post, &collection, &document).await?;
        Ok(Upsert::Created)
    }

    /// `true` on 200, `false` on any other status.
    pub async fn exists(&self, url: &str) -> Result<bool, CatalogError> {
        Ok(self.http.get(url).await?.status == 200)
    }

    /// Waits until `urls` can be expected to resolve, following the
    /// configured [`SettleStrategy`].
    pub async fn settle(&self, urls: &[String]) -> Result<(), CatalogError> {
        match &self.settle {
            SettleStrategy::Skip => Ok(()),
            SettleStrategy::Fixed(delay) => {
                debug!("Waiting {:?} for the catalog to settle", delay);
                tokio::time::sleep(*delay).await;
                Ok(())
            }
            SettleStrategy::Poll {
                interval,
                max_attempts,
            } => {
                for attempt in 1..=*max_attempts {
                    let mut pending = 0;
                    for url in urls {
                        if !self.exists(url).await? {
                            pending += 1;
                        }
                    }
                    if pending == 0 {
                        debug!("Catalog settled after {} attempt(s)", attempt);
                        return Ok(());
                    }
                    debug!(
                        "{} resource(s) not visible yet, attempt {}/{}",
                        pending, attempt, max_attempts
                    );
                    if attempt < *max_attempts {
                        tokio::time::sleep(*interval).await;
                    }
                }
                warn!(
                    "Catalog did not settle after {} attempt(s), continuing",
                    max_attempts
                );
                Ok(())
            }
        }
    }

    async fn probe(&self, url: &str) -> Result<Probe, CatalogError> {
        debug!("Probing {}", url);
        let response = self.http.get(url).await?;
        match response.status {
            200 => Ok(Probe::Present(response)),
            404 => Ok(Probe::Absent),
            status => Err(CatalogError::UnexpectedStatus {
                method: Method::Get,
                url: url.to_string(),
                status,
                body: response.body,
            }),
        }
    }

    async fn write<T: Serialize>(
        &self,
        method: Method,
        url: &str,
        document: &T,
    ) -> Result<HttpResponse, CatalogError> {
        let body =
            serde_json::to_value(document).map_err(|e| CatalogError::InvalidJson(e.to_string()))?;
        let response = if method == Method::Put {
            self.http.put(url, &body).await?
        } else {
            self.http.post(url, &body).await?
        };
        if !response.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                method,
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}

/// `extension.references` of a remote dimension document.
fn existing_references(existing: &HttpResponse) -> Result<Vec<String>, CatalogError> {
    let document = existing.json()?;
    Ok(document
        .get("extension")
        .and_then(|extension| extension.get("references"))
        .and_then(|references| references.as_array())
        .map(|references| {
            references
                .iter()
                .filter_map(|r| r.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

fn to_log<T: Serialize>(document: &T) -> String {
    serde_json::to_string(document).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
