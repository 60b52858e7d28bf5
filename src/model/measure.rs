use super::ModelError;
use crate::catalog::{CatalogClient, HttpClient, Upsert};
use crate::document::{build_measure_document, MeasureDocument};
use crate::error::PublishError;
use crate::table::Series;
use log::info;

pub const DEFAULT_AGGREGATOR: &str = "SUM";

/// Metadata of a numeric quantity. Carries no values itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    id: String,
    label: Option<String>,
    unit: Option<String>,
    precision: Option<u32>,
    min: Option<f64>,
    max: Option<f64>,
    nodata: Option<f64>,
    aggregator: String,
}

impl Measure {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            unit: None,
            precision: None,
            min: None,
            max: None,
            nodata: None,
            aggregator: DEFAULT_AGGREGATOR.to_string(),
        }
    }

    /// Measure named after a series.
    pub fn from_series(series: &Series) -> Result<Self, ModelError> {
        match series.name().as_str() {
            "" => Err(ModelError::MissingMeasureId),
            name => Ok(Self::new(name)),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn with_aggregator(mut self, aggregator: impl Into<String>) -> Self {
        self.aggregator = aggregator.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Falls back to the id.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn aggregator(&self) -> &str {
        &self.aggregator
    }

    pub fn document(&self) -> MeasureDocument {
        build_measure_document(self)
    }

    pub async fn publish<H: HttpClient>(
        &self,
        client: &CatalogClient<H>,
        workspace_id: &str,
    ) -> Result<Upsert, PublishError> {
        let outcome = client
            .upsert_measure(workspace_id, &self.id, &self.document())
            .await?;
        info!("Measure {}/{}: {:?}", workspace_id, self.id, outcome);
        Ok(outcome)
    }
}
