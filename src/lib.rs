pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod manifest;
pub mod model;
pub mod table;
pub mod validate;

pub use error::PublishError;
