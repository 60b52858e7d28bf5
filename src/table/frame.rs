use super::{is_missing, ColumnKind, Table, TableError};
use polars::prelude::{
    col, AnyValue, BooleanChunked, Column, DataFrame, DataType, IntoLazy, NamedFrom,
    NewChunkedArray, Series, SortMultipleOptions,
};
use std::collections::HashSet;

const DISTINCT_COUNT: &str = "__distinct_count";

/// Wraps a series into a one-column frame under `name`.
pub fn single_column(series: &Series, name: &str) -> Result<DataFrame, TableError> {
    Ok(DataFrame::new(vec![series
        .clone()
        .with_name(name.into())
        .into()])?)
}

fn column_ref<'a>(frame: &'a DataFrame, name: &str) -> Result<&'a Column, TableError> {
    frame
        .column(name)
        .map_err(|_| TableError::ColumnNotFound(name.to_string()))
}

/// Float NaNs become nulls so that grouping treats both as missing.
fn nan_as_null(column: &Column) -> Result<Column, TableError> {
    if !matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
        return Ok(column.clone());
    }
    let floats = column
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = floats
        .f64()?
        .into_iter()
        .map(|value| value.filter(|v| !v.is_nan()))
        .collect();
    Ok(Series::new(column.name().clone(), values).into())
}

/// Hashable identity of a cell. Missing cells share one key.
fn cell_key(value: &AnyValue) -> String {
    if is_missing(value) {
        String::new()
    } else {
        format!("{:?}", value)
    }
}

impl Table for DataFrame {
    fn column_names(&self) -> Vec<String> {
        self.get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect()
    }

    fn num_rows(&self) -> usize {
        self.height()
    }

    fn cells(&self, name: &str) -> Result<Vec<AnyValue<'_>>, TableError> {
        let column = column_ref(self, name)?;
        (0..column.len())
            .map(|idx| column.get(idx).map_err(TableError::from))
            .collect()
    }

    fn column_kind(&self, name: &str) -> Result<ColumnKind, TableError> {
        Ok(ColumnKind::of(column_ref(self, name)?))
    }

    fn distinct(&self) -> Result<DataFrame, TableError> {
        let columns = self.get_columns();
        let mut seen = HashSet::new();
        let mut keep = Vec::with_capacity(self.height());
        for idx in 0..self.height() {
            let row = columns
                .iter()
                .map(|column| column.get(idx).map(|value| cell_key(&value)))
                .collect::<Result<Vec<_>, _>>()?;
            keep.push(seen.insert(row));
        }
        let mask = BooleanChunked::from_slice("distinct".into(), &keep);
        Ok(self.filter(&mask)?)
    }

    fn sorted_by(&self, column: &str) -> Result<DataFrame, TableError> {
        column_ref(self, column)?;
        let options = SortMultipleOptions::default()
            .with_maintain_order(true)
            .with_nulls_last(true);
        Ok(self.sort([column], options)?)
    }

    fn distinct_counts(&self, by: &str, column: &str) -> Result<Vec<usize>, TableError> {
        let pair = DataFrame::new(vec![
            nan_as_null(column_ref(self, by)?)?,
            nan_as_null(column_ref(self, column)?)?,
        ])?;
        let counts = pair
            .lazy()
            .filter(col(by).is_not_null())
            .group_by([col(by)])
            .agg([col(column).drop_nulls().n_unique().alias(DISTINCT_COUNT)])
            .collect()?;
        let counts = column_ref(&counts, DISTINCT_COUNT)?;
        (0..counts.len())
            .map(|idx| Ok(counts.get(idx)?.extract::<usize>().unwrap_or(0)))
            .collect()
    }
}
