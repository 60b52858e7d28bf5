use super::{DimensionCategory, DimensionDocument, DimensionExtension, Json, JSONSTAT_VERSION};
use crate::model::Role;
use std::collections::BTreeMap;

const DIMENSION_ID_PREFIX: &str = "dim_";

/// Validated and canonicalized content of a dimension.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryTable {
    /// Category keys in publish order.
    pub index: Vec<String>,
    /// Key to human-readable label.
    pub labels: Option<BTreeMap<String, Json>>,
    /// Column name to a key-to-value mapping for every other column.
    pub attributes: BTreeMap<String, BTreeMap<String, Json>>,
}

pub fn build_dimension_document(
    id: &str,
    label: &str,
    role: Option<Role>,
    categories: CategoryTable,
) -> DimensionDocument {
    DimensionDocument {
        version: JSONSTAT_VERSION.to_string(),
        class: "dimension".to_string(),
        label: label.to_string(),
        category: DimensionCategory {
            index: categories.index,
            label: categories.labels,
        },
        extension: DimensionExtension {
            resource_id: resource_id(id).to_string(),
            referenced: false,
            referenced_by: Vec::new(),
            role,
            additional_bq_fields: categories.attributes,
        },
    }
}

fn resource_id(dimension_id: &str) -> &str {
    dimension_id
        .strip_prefix(DIMENSION_ID_PREFIX)
        .unwrap_or(dimension_id)
}
