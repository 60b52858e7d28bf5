use super::{
    MeasureCategory, MeasureConstraints, MeasureDocument, MeasureExtension, MeasureUnit,
    JSONSTAT_VERSION,
};
use crate::model::Measure;
use std::collections::BTreeMap;

const UNIT_DECIMALS: u32 = 1;

pub fn build_measure_document(measure: &Measure) -> MeasureDocument {
    let id = measure.id().to_string();
    let unit = measure.unit().map(|unit| {
        BTreeMap::from([(
            id.clone(),
            MeasureUnit {
                label: unit.to_string(),
                decimals: UNIT_DECIMALS,
            },
        )])
    });

    MeasureDocument {
        version: JSONSTAT_VERSION.to_string(),
        class: "dimension".to_string(),
        category: MeasureCategory {
            label: BTreeMap::from([(id.clone(), measure.label().to_string())]),
            unit,
        },
        extension: MeasureExtension {
            constraints: BTreeMap::from([(
                id.clone(),
                MeasureConstraints {
                    precision: measure.precision(),
                    min: measure.min(),
                    max: measure.max(),
                    nodata: measure.nodata(),
                },
            )]),
            aggregator: BTreeMap::from([(id.clone(), measure.aggregator().to_string())]),
            resource_id: id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_measure_document() {
        let measure = Measure::new("value")
            .with_label("Trade value")
            .with_unit("USD")
            .with_precision(2)
            .with_min(0.0)
            .with_nodata(-1.0);
        assert_eq!(
            serde_json::to_value(build_measure_document(&measure)).unwrap(),
            json!({
                "version": "2.0",
                "class": "dimension",
                "category": {
                    "label": {"value": "Trade value"},
                    "unit": {"value": {"label": "USD", "decimals": 1}}
                },
                "extension": {
                    "constraints": {
                        "value": {"precision": 2, "min": 0.0, "max": null, "nodata": -1.0}
                    },
                    "aggregator": {"value": "SUM"},
                    "resource_id": "value"
                }
            })
        );
    }

    #[test]
    fn test_unit_is_omitted_when_unset() {
        let doc = build_measure_document(&Measure::new("count").with_aggregator("AVG"));
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value["category"].get("unit").is_none());
        assert_eq!(value["category"]["label"]["count"], "count");
        assert_eq!(value["extension"]["aggregator"]["count"], "AVG");
    }
}
