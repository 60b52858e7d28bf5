use super::ValidationError;
use crate::table::Table;
use log::debug;

/// Checks that every column of `table` other than `index_column` holds at most
/// one distinct value per index value.
///
/// All columns are inspected before failing so the error names every offending
/// column at once.
pub fn validate_functional_dependency(
    table: &dyn Table,
    index_column: &str,
) -> Result<(), ValidationError> {
    let mut dependent_violations = Vec::new();
    for column in table.column_names() {
        if column == index_column {
            continue;
        }
        let counts = table.distinct_counts(index_column, &column)?;
        if counts.iter().any(|&n| n > 1) {
            debug!(
                "Column '{}' has several values for some '{}' keys",
                column, index_column
            );
            dependent_violations.push(column);
        }
    }

    if dependent_violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::FunctionalDependency {
            index_column: index_column.to_string(),
            columns: dependent_violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, DataFrame, TableError};
    use rstest::*;

    #[fixture]
    fn regions() -> DataFrame {
        DataFrame::new(vec![
            Column::new("code".into(), &["IT", "IT", "FR"]),
            Column::new("name".into(), &["Italy", "Italia", "France"]),
            Column::new("continent".into(), &["EU", "EU", "EU"]),
            Column::new("population".into(), &[59i64, 60, 68]),
        ])
        .unwrap()
    }

    #[rstest]
    fn test_reports_every_violating_column(regions: DataFrame) {
        let err = validate_functional_dependency(&regions, "code").unwrap_err();
        assert_eq!(
            err,
            ValidationError::FunctionalDependency {
                index_column: "code".to_string(),
                columns: vec!["name".to_string(), "population".to_string()],
            }
        );
    }

    #[rstest]
    fn test_unknown_index_column(regions: DataFrame) {
        let err = validate_functional_dependency(&regions, "iso").unwrap_err();
        assert_eq!(
            err,
            ValidationError::Table(TableError::ColumnNotFound("iso".to_string()))
        );
    }

    #[test]
    fn test_lookup_table_passes() {
        let frame = DataFrame::new(vec![
            Column::new("code".into(), &["IT", "FR"]),
            Column::new("name".into(), &[Some("Italy"), None]),
        ])
        .unwrap();
        assert!(validate_functional_dependency(&frame, "code").is_ok());
    }

    #[test]
    fn test_missing_values_do_not_count_as_distinct() {
        let frame = DataFrame::new(vec![
            Column::new("code".into(), &["IT", "IT"]),
            Column::new("area".into(), &[f64::NAN, 301.3]),
        ])
        .unwrap();
        assert!(validate_functional_dependency(&frame, "code").is_ok());
    }
}
