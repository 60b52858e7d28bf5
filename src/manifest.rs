//! JSON description of a workspace and the tables behind it.
//!
//! ```json
//! {
//!   "id": "fao",
//!   "label": "FAO statistics",
//!   "source": "FAOSTAT",
//!   "tables": {
//!     "trade": {"records": [{"year": 2020, "reporter": "ITA", "value": 1.5}]},
//!     "countries": {"records": [{"iso3": "ITA", "name": "Italy"}]}
//!   },
//!   "schemas": [{
//!     "id": "trade",
//!     "table": "trade",
//!     "dimensions": [
//!       {"column": "year", "role": "time"},
//!       {"table": "countries", "id": "reporter", "index_column": "iso3", "labels_column": "name"}
//!     ],
//!     "measures": [{"id": "value", "unit": "USD"}]
//!   }]
//! }
//! ```

use crate::model::{Dimension, Measure, ModelError, Role, Schema, Workspace};
use crate::table::{frame_from_records, AnyValue, Column, DataFrame, Table, TableError};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Model(#[from] ModelError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Table '{0}' is not defined in the manifest")]
    UnknownTable(String),

    #[error("A dimension outside a schema must name its table")]
    MissingTable,

    #[error("Column '{column}' holds '{value}', which is not a valid {expected}")]
    InvalidDate {
        column: String,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub note: Option<Vec<String>>,
    #[serde(default)]
    pub tables: BTreeMap<String, TableSpec>,
    #[serde(default)]
    pub dimensions: Vec<DimensionSpec>,
    #[serde(default)]
    pub measures: Vec<MeasureSpec>,
    #[serde(default)]
    pub schemas: Vec<SchemaSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
    /// Columns holding `YYYY-MM-DD` strings.
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub datetimes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DimensionSpec {
    /// Source table; defaults to the schema's table.
    #[serde(default)]
    pub table: Option<String>,
    /// Plain column dimension. Ignored when `index_column` is set.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub index_column: Option<String>,
    #[serde(default)]
    pub labels_column: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeasureSpec {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub precision: Option<u32>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub nodata: Option<f64>,
    #[serde(default)]
    pub aggregator: Option<String>,
}

/// A column name or a full definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DimensionEntry {
    Column(String),
    Inline(DimensionSpec),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MeasureEntry {
    Column(String),
    Inline(MeasureSpec),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaSpec {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub table: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionEntry>,
    #[serde(default)]
    pub measures: Vec<MeasureEntry>,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Read manifest {} ({} bytes)", path.display(), content.len());
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Materializes tables and entities into a [`Workspace`] ready to publish.
    pub fn into_workspace(self) -> Result<Workspace, ManifestError> {
        let tables = self
            .tables
            .iter()
            .map(|(name, spec)| Ok((name.clone(), spec.to_frame()?)))
            .collect::<Result<BTreeMap<_, _>, ManifestError>>()?;

        let mut workspace = Workspace::new(self.id, self.label);
        if let Some(source) = self.source {
            workspace = workspace.with_source(source);
        }
        if let Some(note) = self.note {
            workspace = workspace.with_note(note);
        }

        for spec in &self.dimensions {
            let table = spec.table.as_deref().ok_or(ManifestError::MissingTable)?;
            workspace.add_dimension(spec.build(lookup(&tables, table)?)?);
        }
        for spec in &self.measures {
            workspace.add_measure(spec.build());
        }

        for spec in self.schemas {
            let table = lookup(&tables, &spec.table)?;
            let mut schema = Schema::new(table.clone(), spec.id.clone());
            if let Some(label) = &spec.label {
                schema = schema.with_label(label.clone());
            }
            for entry in &spec.dimensions {
                match entry {
                    DimensionEntry::Column(column) => {
                        schema.add_dimensions([column.as_str()])?;
                    }
                    DimensionEntry::Inline(dimension) => {
                        let source = match &dimension.table {
                            Some(name) => lookup(&tables, name)?,
                            None => table,
                        };
                        schema.add_dimensions([dimension.build(source)?])?;
                    }
                }
            }
            for entry in &spec.measures {
                match entry {
                    MeasureEntry::Column(column) => schema.add_measures([column.as_str()])?,
                    MeasureEntry::Inline(measure) => schema.add_measures([measure.build()])?,
                };
            }
            workspace.add_schema(schema);
        }

        info!(
            "Manifest describes {} table(s), {} schema(s) in workspace {}",
            tables.len(),
            workspace.schemas().len(),
            workspace.id()
        );
        Ok(workspace)
    }
}

fn lookup<'a>(
    tables: &'a BTreeMap<String, DataFrame>,
    name: &str,
) -> Result<&'a DataFrame, ManifestError> {
    tables
        .get(name)
        .ok_or_else(|| ManifestError::UnknownTable(name.to_string()))
}

impl TableSpec {
    fn to_frame(&self) -> Result<DataFrame, ManifestError> {
        let mut frame = frame_from_records(&self.records)?;
        for column in &self.dates {
            let values = parse_column(&frame, column, "date", |s| {
                NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
            })?;
            frame
                .with_column(Column::new(column.as_str().into(), values))
                .map_err(TableError::from)?;
        }
        for column in &self.datetimes {
            let values = parse_column(&frame, column, "datetime", |s| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
            })?;
            frame
                .with_column(Column::new(column.as_str().into(), values))
                .map_err(TableError::from)?;
        }
        Ok(frame)
    }
}

/// Parses the string cells of `column` into temporal values. Missing cells
/// stay missing.
fn parse_column<T, F>(
    frame: &DataFrame,
    column: &str,
    expected: &'static str,
    parse: F,
) -> Result<Vec<Option<T>>, ManifestError>
where
    F: Fn(&str) -> Option<T>,
{
    frame
        .cells(column)?
        .iter()
        .map(|value| {
            let parsed = match value {
                AnyValue::Null => return Ok(None),
                AnyValue::String(s) => parse(s),
                _ => None,
            };
            parsed.map(Some).ok_or_else(|| ManifestError::InvalidDate {
                column: column.to_string(),
                value: match value {
                    AnyValue::String(s) => s.to_string(),
                    other => other.to_string(),
                },
                expected,
            })
        })
        .collect()
}

impl DimensionSpec {
    fn build(&self, table: &DataFrame) -> Result<Dimension, ModelError> {
        let mut builder = match (&self.index_column, &self.column) {
            (Some(index_column), _) => {
                let mut builder = Dimension::builder(table.clone()).index_column(index_column);
                if let Some(labels_column) = &self.labels_column {
                    builder = builder.labels_column(labels_column);
                }
                builder
            }
            (None, Some(column)) => {
                let series = table
                    .column(column)
                    .map_err(|_| ModelError::ColumnNotFound {
                        kind: "Dimension",
                        column: column.clone(),
                    })?
                    .as_materialized_series()
                    .clone();
                Dimension::builder(series)
            }
            (None, None) => return Err(ModelError::MissingIndexColumn),
        };
        if let Some(id) = &self.id {
            builder = builder.id(id);
        }
        if let Some(label) = &self.label {
            builder = builder.label(label);
        }
        if let Some(role) = self.role {
            builder = builder.role(role);
        }
        builder.build()
    }
}

impl MeasureSpec {
    fn build(&self) -> Measure {
        let mut measure = Measure::new(&self.id);
        if let Some(label) = &self.label {
            measure = measure.with_label(label);
        }
        if let Some(unit) = &self.unit {
            measure = measure.with_unit(unit);
        }
        if let Some(precision) = self.precision {
            measure = measure.with_precision(precision);
        }
        if let Some(min) = self.min {
            measure = measure.with_min(min);
        }
        if let Some(max) = self.max {
            measure = measure.with_max(max);
        }
        if let Some(nodata) = self.nodata {
            measure = measure.with_nodata(nodata);
        }
        if let Some(aggregator) = &self.aggregator {
            measure = measure.with_aggregator(aggregator);
        }
        measure
    }
}
