use super::{Dimension, Measure, ModelError, Role};
use crate::catalog::{CatalogClient, HttpClient, Upsert};
use crate::document::{SchemaLayout, MEASURES_DIMENSION};
use crate::error::PublishError;
use crate::table::{DataFrame, Series, Table};
use log::info;
use std::sync::Arc;

/// A dimension given either as a column of the schema's table or as a
/// ready-made entity.
#[derive(Debug, Clone)]
pub enum DimensionRef {
    Column(String),
    Dimension(Arc<Dimension>),
}

impl From<&str> for DimensionRef {
    fn from(column: &str) -> Self {
        DimensionRef::Column(column.to_string())
    }
}

impl From<String> for DimensionRef {
    fn from(column: String) -> Self {
        DimensionRef::Column(column)
    }
}

impl From<Dimension> for DimensionRef {
    fn from(dimension: Dimension) -> Self {
        DimensionRef::Dimension(Arc::new(dimension))
    }
}

impl From<Arc<Dimension>> for DimensionRef {
    fn from(dimension: Arc<Dimension>) -> Self {
        DimensionRef::Dimension(dimension)
    }
}

#[derive(Debug, Clone)]
pub enum MeasureRef {
    Column(String),
    Measure(Arc<Measure>),
}

impl From<&str> for MeasureRef {
    fn from(column: &str) -> Self {
        MeasureRef::Column(column.to_string())
    }
}

impl From<String> for MeasureRef {
    fn from(column: String) -> Self {
        MeasureRef::Column(column)
    }
}

impl From<Measure> for MeasureRef {
    fn from(measure: Measure) -> Self {
        MeasureRef::Measure(Arc::new(measure))
    }
}

impl From<Arc<Measure>> for MeasureRef {
    fn from(measure: Arc<Measure>) -> Self {
        MeasureRef::Measure(measure)
    }
}

/// Dataset definition over one source table.
///
/// Dimensions and measures are shared handles: once the schema is attached to
/// a [`super::Workspace`] the same instances live in the workspace registries.
#[derive(Debug, Clone)]
pub struct Schema {
    table: DataFrame,
    id: String,
    label: Option<String>,
    dimensions: Vec<Arc<Dimension>>,
    measures: Vec<Arc<Measure>>,
}

impl Schema {
    pub fn new(table: DataFrame, id: impl Into<String>) -> Self {
        Self {
            table,
            id: id.into(),
            label: None,
            dimensions: Vec::new(),
            measures: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn dimensions(&self) -> &[Arc<Dimension>] {
        &self.dimensions
    }

    pub fn measures(&self) -> &[Arc<Measure>] {
        &self.measures
    }

    /// Appends dimensions; a column name becomes a dimension over that
    /// column's values. An id already present is replaced in place.
    pub fn add_dimensions<I, D>(&mut self, dimensions: I) -> Result<&mut Self, ModelError>
    where
        I: IntoIterator<Item = D>,
        D: Into<DimensionRef>,
    {
        for dimension in dimensions {
            let dimension = match dimension.into() {
                DimensionRef::Column(column) => {
                    let series = self.column_series(&column, "Dimension")?;
                    Arc::new(Dimension::from_series(series)?)
                }
                DimensionRef::Dimension(dimension) => dimension,
            };
            if dimension.id() == MEASURES_DIMENSION {
                return Err(ModelError::ReservedId(dimension.id().to_string()));
            }
            match self.dimensions.iter_mut().find(|d| d.id() == dimension.id()) {
                Some(slot) => *slot = dimension,
                None => self.dimensions.push(dimension),
            }
        }
        Ok(self)
    }

    /// Appends measures; a column name becomes a measure with that id.
    pub fn add_measures<I, M>(&mut self, measures: I) -> Result<&mut Self, ModelError>
    where
        I: IntoIterator<Item = M>,
        M: Into<MeasureRef>,
    {
        for measure in measures {
            let measure = match measure.into() {
                MeasureRef::Column(column) => {
                    let series = self.column_series(&column, "Measure")?;
                    Arc::new(Measure::from_series(&series)?)
                }
                MeasureRef::Measure(measure) => measure,
            };
            match self.measures.iter_mut().find(|m| m.id() == measure.id()) {
                Some(slot) => *slot = measure,
                None => self.measures.push(measure),
            }
        }
        Ok(self)
    }

    fn column_series(&self, column: &str, kind: &'static str) -> Result<Series, ModelError> {
        self.table
            .column(column)
            .map(|c| c.as_materialized_series().clone())
            .map_err(|_| ModelError::ColumnNotFound {
                kind,
                column: column.to_string(),
            })
    }

    pub fn time_dimensions(&self) -> Vec<String> {
        self.dimensions_with_role(Role::Time)
    }

    pub fn geo_dimensions(&self) -> Vec<String> {
        self.dimensions_with_role(Role::Geo)
    }

    fn dimensions_with_role(&self, role: Role) -> Vec<String> {
        self.dimensions
            .iter()
            .filter(|d| d.role() == Some(role))
            .map(|d| d.id().to_string())
            .collect()
    }

    /// Table columns claimed by neither a dimension nor a measure.
    pub fn additional_fields(&self) -> Vec<String> {
        self.table
            .column_names()
            .into_iter()
            .filter(|column| {
                !self.dimensions.iter().any(|d| d.id() == column.as_str())
                    && !self.measures.iter().any(|m| m.id() == column.as_str())
            })
            .collect()
    }

    pub fn layout(&self) -> SchemaLayout {
        SchemaLayout {
            id: self.id.clone(),
            label: self.label().to_string(),
            dimension_ids: self.dimensions.iter().map(|d| d.id().to_string()).collect(),
            measure_ids: self.measures.iter().map(|m| m.id().to_string()).collect(),
            time_dimensions: self.time_dimensions(),
            geo_dimensions: self.geo_dimensions(),
            additional_fields: self.additional_fields(),
        }
    }

    /// Upserts the schema document only; its dimensions and measures are
    /// published by the owning workspace.
    pub async fn publish<H: HttpClient>(
        &self,
        client: &CatalogClient<H>,
        workspace_id: &str,
    ) -> Result<Upsert, PublishError> {
        let outcome = client.upsert_schema(workspace_id, &self.layout()).await?;
        info!("Schema {}/{}: {:?}", workspace_id, self.id, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;
    use polars::prelude::NamedFrom;
    use rstest::*;

    #[fixture]
    fn trade() -> DataFrame {
        DataFrame::new(vec![
            Column::new("year".into(), &[2020i64, 2021]),
            Column::new("reporter".into(), &["ITA", "FRA"]),
            Column::new("value".into(), &[1.5f64, 2.0]),
            Column::new("flag".into(), &["A", "E"]),
        ])
        .unwrap()
    }

    #[rstest]
    fn test_layout(trade: DataFrame) {
        let year = Dimension::builder(Series::new("year".into(), &[2020i64]))
            .role(Role::Time)
            .build()
            .unwrap();
        let mut schema = Schema::new(trade, "trade").with_label("Trade");
        schema
            .add_dimensions([DimensionRef::from(year), DimensionRef::from("reporter")])
            .unwrap()
            .add_measures(["value"])
            .unwrap();

        let layout = schema.layout();
        assert_eq!(layout.label, "Trade");
        assert_eq!(layout.dimension_ids, vec!["year", "reporter"]);
        assert_eq!(layout.measure_ids, vec!["value"]);
        assert_eq!(layout.time_dimensions, vec!["year"]);
        assert!(layout.geo_dimensions.is_empty());
        assert_eq!(layout.additional_fields, vec!["flag"]);
    }

    #[rstest]
    fn test_unknown_column(trade: DataFrame) {
        let mut schema = Schema::new(trade, "trade");
        let err = schema.add_dimensions(["partner"]).unwrap_err();
        assert_eq!(
            err,
            ModelError::ColumnNotFound {
                kind: "Dimension",
                column: "partner".to_string()
            }
        );
        let err = schema.add_measures(["qty"]).unwrap_err();
        assert!(matches!(err, ModelError::ColumnNotFound { kind: "Measure", .. }));
    }

    #[rstest]
    fn test_same_id_is_replaced(trade: DataFrame) {
        let mut schema = Schema::new(trade, "trade");
        schema
            .add_measures([Measure::new("value")])
            .unwrap()
            .add_measures([Measure::new("value").with_unit("USD")])
            .unwrap();
        assert_eq!(schema.measures().len(), 1);
        assert_eq!(schema.measures()[0].unit(), Some("USD"));
    }

    #[rstest]
    fn test_measures_id_is_reserved(trade: DataFrame) {
        let dimension = Dimension::from_series(Series::new("measures".into(), &["A"])).unwrap();
        let mut schema = Schema::new(trade, "trade");
        assert_eq!(
            schema.add_dimensions([dimension]).unwrap_err(),
            ModelError::ReservedId("measures".to_string())
        );
    }

    #[rstest]
    fn test_external_dimension_does_not_claim_column(trade: DataFrame) {
        let country = Dimension::builder(Series::new("reporter".into(), &["ITA"]))
            .id("dim_country")
            .build()
            .unwrap();
        let mut schema = Schema::new(trade, "trade");
        schema.add_dimensions([country]).unwrap();
        assert!(schema
            .additional_fields()
            .contains(&"reporter".to_string()));
    }
}
