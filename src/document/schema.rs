use super::{Href, SchemaDocument, SchemaExtension, SchemaRoles, JSONSTAT_VERSION};
use crate::catalog::routes;
use std::collections::BTreeMap;

/// Id of the synthetic dimension that carries a dataset's measures.
pub const MEASURES_DIMENSION: &str = "measures";

/// Dataset-level shape of a schema, by id only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaLayout {
    pub id: String,
    pub label: String,
    pub dimension_ids: Vec<String>,
    pub measure_ids: Vec<String>,
    pub time_dimensions: Vec<String>,
    pub geo_dimensions: Vec<String>,
    /// Source columns claimed by neither a dimension nor a measure.
    pub additional_fields: Vec<String>,
}

pub fn build_schema_document(
    api_base: &str,
    workspace_id: &str,
    layout: &SchemaLayout,
) -> SchemaDocument {
    let mut id = layout.dimension_ids.clone();
    id.push(MEASURES_DIMENSION.to_string());

    let mut dimension: BTreeMap<String, Href> = layout
        .dimension_ids
        .iter()
        .map(|dim_id| {
            (
                dim_id.clone(),
                Href {
                    href: routes::dimension_url(api_base, workspace_id, dim_id),
                },
            )
        })
        .collect();
    dimension.insert(
        MEASURES_DIMENSION.to_string(),
        Href {
            href: routes::combined_measures_url(api_base, workspace_id, &layout.measure_ids),
        },
    );

    SchemaDocument {
        version: JSONSTAT_VERSION.to_string(),
        class: "dataset".to_string(),
        label: layout.label.clone(),
        size: vec![1; id.len()],
        id,
        role: SchemaRoles {
            time: layout.time_dimensions.clone(),
            geo: layout.geo_dimensions.clone(),
            metric: vec![MEASURES_DIMENSION.to_string()],
        },
        value: Vec::new(),
        dimension,
        extension: SchemaExtension {
            resource_id: layout.id.clone(),
            additional_bq_fields: layout
                .additional_fields
                .iter()
                .map(|column| (column.clone(), BTreeMap::new()))
                .collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    const API: &str = "http://catalog.test/api";

    #[fixture]
    fn trade_layout() -> SchemaLayout {
        SchemaLayout {
            id: "trade".to_string(),
            label: "Trade flows".to_string(),
            dimension_ids: vec!["year".to_string(), "dim_country".to_string()],
            measure_ids: vec!["value".to_string(), "qty".to_string()],
            time_dimensions: vec!["year".to_string()],
            geo_dimensions: vec!["dim_country".to_string()],
            additional_fields: vec!["flag".to_string()],
        }
    }

    #[rstest]
    fn test_schema_document(trade_layout: SchemaLayout) {
        let doc = build_schema_document(API, "fao", &trade_layout);
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            json!({
                "version": "2.0",
                "class": "dataset",
                "label": "Trade flows",
                "id": ["year", "dim_country", "measures"],
                "size": [1, 1, 1],
                "role": {"time": ["year"], "geo": ["dim_country"], "metric": ["measures"]},
                "value": [],
                "dimension": {
                    "year": {"href": "http://catalog.test/api/workspaces/fao/dimensions/year"},
                    "dim_country": {"href": "http://catalog.test/api/workspaces/fao/dimensions/dim_country"},
                    "measures": {"href": "http://catalog.test/api/workspaces/fao/measures:combine?measure_ids=value&measure_ids=qty"}
                },
                "extension": {
                    "resource_id": "trade",
                    "additional_bq_fields": {"flag": {}}
                }
            })
        );
    }

    #[test]
    fn test_schema_without_dimensions() {
        let layout = SchemaLayout {
            id: "totals".to_string(),
            label: "totals".to_string(),
            measure_ids: vec!["value".to_string()],
            ..Default::default()
        };
        let doc = build_schema_document(API, "fao", &layout);
        assert_eq!(doc.id, vec!["measures".to_string()]);
        assert_eq!(doc.size, vec![1]);
    }
}
