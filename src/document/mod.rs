//! JSON-stat documents exchanged with the catalog.
//!
//! Builders in this module are pure: they never touch the network and never
//! fail, all validation happens before a document is assembled.

mod dimension;
mod measure;
mod schema;
mod workspace;

pub use dimension::{build_dimension_document, CategoryTable};
pub use measure::build_measure_document;
pub use schema::{build_schema_document, SchemaLayout, MEASURES_DIMENSION};
pub use workspace::build_workspace_document;

use crate::model::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const JSONSTAT_VERSION: &str = "2.0";

type Json = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    pub version: String,
    pub class: String,
    pub label: String,
    pub updated: String,
    pub source: Option<String>,
    pub note: Option<Vec<String>>,
    pub extension: ResourceExtension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceExtension {
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDocument {
    pub version: String,
    pub class: String,
    pub label: String,
    pub category: DimensionCategory,
    pub extension: DimensionExtension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionCategory {
    pub index: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<BTreeMap<String, Json>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionExtension {
    pub resource_id: String,
    pub referenced: bool,
    pub referenced_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub additional_bq_fields: BTreeMap<String, BTreeMap<String, Json>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureDocument {
    pub version: String,
    pub class: String,
    pub category: MeasureCategory,
    pub extension: MeasureExtension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureCategory {
    pub label: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<BTreeMap<String, MeasureUnit>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureUnit {
    pub label: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureExtension {
    pub constraints: BTreeMap<String, MeasureConstraints>,
    pub aggregator: BTreeMap<String, String>,
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureConstraints {
    pub precision: Option<u32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub nodata: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub version: String,
    pub class: String,
    pub label: String,
    pub id: Vec<String>,
    pub size: Vec<u32>,
    pub role: SchemaRoles,
    pub value: Vec<Json>,
    pub dimension: BTreeMap<String, Href>,
    pub extension: SchemaExtension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRoles {
    pub time: Vec<String>,
    pub geo: Vec<String>,
    pub metric: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaExtension {
    pub resource_id: String,
    pub additional_bq_fields: BTreeMap<String, BTreeMap<String, Json>>,
}
