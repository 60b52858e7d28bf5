use crate::catalog::CatalogError;
use crate::model::ModelError;
use crate::table::TableError;
use crate::validate::ValidationError;
use thiserror::Error;

/// Any failure while building or publishing an entity.
#[derive(Error, Debug, PartialEq)]
pub enum PublishError {
    #[error("Configuration error: {0}")]
    Model(#[from] ModelError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Remote state error: {0}")]
    Catalog(#[from] CatalogError),
}
