//! Catalog endpoint URLs.

pub fn workspace_url(api_base: &str, workspace_id: &str) -> String {
    format!("{}/workspaces/{}", api_base, workspace_id)
}

pub fn dimensions_url(api_base: &str, workspace_id: &str) -> String {
    format!("{}/dimensions", workspace_url(api_base, workspace_id))
}

pub fn dimension_url(api_base: &str, workspace_id: &str, dimension_id: &str) -> String {
    format!("{}/{}", dimensions_url(api_base, workspace_id), dimension_id)
}

pub fn measures_url(api_base: &str, workspace_id: &str) -> String {
    format!("{}/measures", workspace_url(api_base, workspace_id))
}

pub fn measure_url(api_base: &str, workspace_id: &str, measure_id: &str) -> String {
    format!("{}/{}", measures_url(api_base, workspace_id), measure_id)
}

/// Virtual resource combining several measures into one dimension.
pub fn combined_measures_url(api_base: &str, workspace_id: &str, measure_ids: &[String]) -> String {
    let query = measure_ids
        .iter()
        .map(|id| format!("measure_ids={}", id))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}:combine?{}", measures_url(api_base, workspace_id), query)
}

pub fn schemas_url(api_base: &str, workspace_id: &str) -> String {
    format!("{}/schemas", workspace_url(api_base, workspace_id))
}

pub fn schema_url(api_base: &str, workspace_id: &str, schema_id: &str) -> String {
    format!("{}/{}", schemas_url(api_base, workspace_id), schema_id)
}
