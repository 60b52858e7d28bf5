mod canonical;
mod dependency;

pub use canonical::canonicalize;
pub use dependency::validate_functional_dependency;

use crate::table::TableError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Columns {columns:?} do not fully depend on index column '{index_column}'")]
    FunctionalDependency {
        index_column: String,
        columns: Vec<String>,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Table(#[from] TableError),
}
