mod dimension;
mod measure;
mod registry;
mod schema;
mod workspace;

pub use dimension::{Dimension, DimensionBuilder, DimensionData};
pub use measure::Measure;
pub use registry::Registry;
pub use schema::{DimensionRef, MeasureRef, Schema};
pub use workspace::Workspace;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Special meaning of a dimension inside a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Time,
    Geo,
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time" => Ok(Role::Time),
            "geo" => Ok(Role::Geo),
            other => Err(ModelError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Time => write!(f, "time"),
            Role::Geo => write!(f, "geo"),
        }
    }
}

/// Missing or contradictory identifiers in the entity model.
#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Dimension id cannot be determined: {0}")]
    MissingDimensionId(String),

    #[error("Measure id cannot be determined: the series has no name")]
    MissingMeasureId,

    #[error("index_column must be provided when a dimension is backed by a table")]
    MissingIndexColumn,

    #[error("Role must be 'time', 'geo' or none, got '{0}'")]
    InvalidRole(String),

    #[error("Labels column '{0}' cannot also be the index column")]
    LabelsColumnIsIndex(String),

    #[error("{kind} column '{column}' does not exist in the provided table")]
    ColumnNotFound { kind: &'static str, column: String },

    #[error("Id '{0}' is reserved")]
    ReservedId(String),

    #[error("{kind} '{id}' is not registered")]
    NotRegistered { kind: &'static str, id: String },
}
