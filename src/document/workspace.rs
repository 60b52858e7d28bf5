use super::{ResourceExtension, WorkspaceDocument, JSONSTAT_VERSION};
use chrono::NaiveDate;

pub fn build_workspace_document(
    id: &str,
    label: &str,
    source: Option<&str>,
    note: Option<&[String]>,
    updated: NaiveDate,
) -> WorkspaceDocument {
    WorkspaceDocument {
        version: JSONSTAT_VERSION.to_string(),
        class: "collection".to_string(),
        label: label.to_string(),
        updated: updated.format("%Y-%m-%d").to_string(),
        source: source.map(str::to_string),
        note: note.map(<[String]>::to_vec),
        extension: ResourceExtension {
            resource_id: id.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_workspace_document() {
        let updated = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let note = vec!["Provisional".to_string()];
        let doc = build_workspace_document("fao", "FAO", None, Some(&note), updated);
        assert_eq!(
            serde_json::to_value(doc).unwrap(),
            json!({
                "version": "2.0",
                "class": "collection",
                "label": "FAO",
                "updated": "2024-03-05",
                "source": null,
                "note": ["Provisional"],
                "extension": {"resource_id": "fao"}
            })
        );
    }
}
