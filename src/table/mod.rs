mod frame;
mod records;

pub use frame::single_column;
pub use polars::prelude::{AnyValue, Column, DataFrame, Series};
pub use records::frame_from_records;

use polars::prelude::{DataType, PolarsError};
use thiserror::Error;

/// `Null` and `NaN` floats are both missing values.
pub fn is_missing(value: &AnyValue) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float32(f) => f.is_nan(),
        AnyValue::Float64(f) => f.is_nan(),
        _ => false,
    }
}

/// JSON form used for pass-through (numeric and boolean) columns.
pub fn to_json(value: &AnyValue) -> serde_json::Value {
    if is_missing(value) {
        return serde_json::Value::Null;
    }
    match value {
        AnyValue::Boolean(b) => serde_json::Value::Bool(*b),
        AnyValue::Int8(n) => (*n).into(),
        AnyValue::Int16(n) => (*n).into(),
        AnyValue::Int32(n) => (*n).into(),
        AnyValue::Int64(n) => (*n).into(),
        AnyValue::UInt8(n) => (*n).into(),
        AnyValue::UInt16(n) => (*n).into(),
        AnyValue::UInt32(n) => (*n).into(),
        AnyValue::UInt64(n) => (*n).into(),
        AnyValue::Float32(n) => float_to_json(f64::from(*n)),
        AnyValue::Float64(n) => float_to_json(*n),
        AnyValue::String(s) => serde_json::Value::String(s.to_string()),
        AnyValue::StringOwned(s) => serde_json::Value::String(s.to_string()),
        other => serde_json::Value::String(other.to_string()),
    }
}

fn float_to_json(value: f64) -> serde_json::Value {
    serde_json::Number::from_f64(value)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// Broad type of a column, decided from its dtype. A column without a single
/// non-missing cell is `Empty` whatever its dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Temporal,
    Text,
    Other,
    Empty,
}

impl ColumnKind {
    pub fn of(column: &Column) -> Self {
        let present = (0..column.len())
            .filter_map(|idx| column.get(idx).ok())
            .any(|value| !is_missing(&value));
        if !present {
            return ColumnKind::Empty;
        }
        match column.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ColumnKind::Numeric,
            DataType::Boolean => ColumnKind::Boolean,
            DataType::Date | DataType::Datetime(_, _) => ColumnKind::Temporal,
            DataType::String => ColumnKind::Text,
            _ => ColumnKind::Other,
        }
    }

    /// Pass-through columns keep their JSON type instead of being canonicalized.
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            ColumnKind::Numeric | ColumnKind::Boolean | ColumnKind::Empty
        )
    }
}

/// Read and reshape access to a source table.
///
/// Reshaping operations return a fresh [`DataFrame`] and never modify `self`.
pub trait Table {
    fn column_names(&self) -> Vec<String>;

    fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|n| n == name)
    }

    fn num_rows(&self) -> usize;

    /// Every cell of `name`, in row order.
    fn cells(&self, name: &str) -> Result<Vec<AnyValue<'_>>, TableError>;

    fn column_kind(&self, name: &str) -> Result<ColumnKind, TableError>;

    /// Drops repeated rows, keeping the first occurrence.
    fn distinct(&self) -> Result<DataFrame, TableError>;

    /// Stable sort on a single column; missing values go last.
    fn sorted_by(&self, column: &str) -> Result<DataFrame, TableError>;

    /// Number of distinct non-missing `column` values for each non-missing
    /// value of `by`, one entry per group.
    fn distinct_counts(&self, by: &str, column: &str) -> Result<Vec<usize>, TableError>;
}

#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column {0} mixes values of incompatible types")]
    MixedTypes(String),

    #[error("Dataframe error: {0}")]
    Polars(String),
}

impl From<PolarsError> for TableError {
    fn from(err: PolarsError) -> Self {
        TableError::Polars(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polars::prelude::NamedFrom;
    use rstest::rstest;

    #[test]
    fn test_nan_is_missing() {
        assert!(is_missing(&AnyValue::Float64(f64::NAN)));
        assert!(is_missing(&AnyValue::Null));
        assert!(!is_missing(&AnyValue::Float64(0.0)));
        assert!(!is_missing(&AnyValue::String("")));
    }

    #[rstest]
    #[case::ints(Series::new("c".into(), &[Some(1i64), None]), ColumnKind::Numeric)]
    #[case::floats(Series::new("c".into(), &[1.5f64, f64::NAN]), ColumnKind::Numeric)]
    #[case::boolean(Series::new("c".into(), &[Some(true), None]), ColumnKind::Boolean)]
    #[case::text(Series::new("c".into(), &[Some("a"), None]), ColumnKind::Text)]
    #[case::dates(
        Series::new("c".into(), &[NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]),
        ColumnKind::Temporal
    )]
    #[case::all_nan(Series::new("c".into(), &[f64::NAN, f64::NAN]), ColumnKind::Empty)]
    #[case::all_null(Series::new("c".into(), &[None::<&str>, None]), ColumnKind::Empty)]
    fn test_column_kind(#[case] series: Series, #[case] expected: ColumnKind) {
        assert_eq!(ColumnKind::of(&Column::from(series)), expected);
    }

    #[test]
    fn test_json_conversion() {
        assert_eq!(to_json(&AnyValue::Int64(3)), serde_json::json!(3));
        assert_eq!(to_json(&AnyValue::Float64(1.5)), serde_json::json!(1.5));
        assert_eq!(to_json(&AnyValue::Float64(f64::NAN)), serde_json::Value::Null);
        assert_eq!(to_json(&AnyValue::Boolean(false)), serde_json::json!(false));
        assert_eq!(to_json(&AnyValue::Null), serde_json::Value::Null);
    }

    #[test]
    fn test_polars_errors_keep_their_message() {
        let err: TableError = PolarsError::ComputeError("boom".into()).into();
        assert!(matches!(err, TableError::Polars(message) if message.contains("boom")));
    }
}
