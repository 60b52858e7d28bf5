use super::TableError;
use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use serde_json::{Map, Value as Json};
use std::collections::HashSet;

/// Builds a frame from JSON records.
///
/// Columns appear in first-seen order across the records. A key absent from a
/// record is a null cell. Each column takes the narrowest type holding all of
/// its non-null cells: boolean, integer, float or string. A column with no
/// non-null cell is a float column of nulls.
pub fn frame_from_records(records: &[Map<String, Json>]) -> Result<DataFrame, TableError> {
    let mut names: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                names.push(key);
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells: Vec<&Json> = records
                .iter()
                .map(|record| record.get(name).unwrap_or(&Json::Null))
                .collect();
            build_column(name, &cells)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, cells: &[&Json]) -> Result<Column, TableError> {
    let present = || cells.iter().filter(|cell| !cell.is_null());
    let series = if present().all(|cell| cell.is_boolean()) && present().next().is_some() {
        let values: Vec<Option<bool>> = cells.iter().map(|cell| cell.as_bool()).collect();
        Series::new(name.into(), values)
    } else if present().all(|cell| cell.is_i64()) && present().next().is_some() {
        let values: Vec<Option<i64>> = cells.iter().map(|cell| cell.as_i64()).collect();
        Series::new(name.into(), values)
    } else if present().all(|cell| cell.is_number()) {
        let values: Vec<Option<f64>> = cells.iter().map(|cell| cell.as_f64()).collect();
        Series::new(name.into(), values)
    } else if present().all(|cell| cell.is_string()) {
        let values: Vec<Option<&str>> = cells.iter().map(|cell| cell.as_str()).collect();
        Series::new(name.into(), values)
    } else {
        return Err(TableError::MixedTypes(name.to_string()));
    };
    Ok(series.into())
}
