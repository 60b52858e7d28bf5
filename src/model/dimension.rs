use super::{ModelError, Role};
use crate::catalog::{CatalogClient, HttpClient, Upsert};
use crate::document::{build_dimension_document, CategoryTable, DimensionDocument};
use crate::error::PublishError;
use crate::table::{single_column, to_json, DataFrame, Series, Table};
use crate::validate::{canonicalize, validate_functional_dependency};
use log::{debug, info};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

/// Source values of a dimension.
#[derive(Debug, Clone)]
pub enum DimensionData {
    /// Plain category values.
    Series(Series),
    /// Lookup table keyed by an index column.
    Frame(DataFrame),
}

impl From<Series> for DimensionData {
    fn from(series: Series) -> Self {
        DimensionData::Series(series)
    }
}

impl From<DataFrame> for DimensionData {
    fn from(frame: DataFrame) -> Self {
        DimensionData::Frame(frame)
    }
}

/// A categorical axis of a dataset.
#[derive(Debug, Clone)]
pub struct Dimension {
    data: DimensionData,
    id: String,
    label: String,
    role: Option<Role>,
    index_column: Option<String>,
    labels_column: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DimensionBuilder {
    data: DimensionData,
    id: Option<String>,
    label: Option<String>,
    role: Option<Role>,
    index_column: Option<String>,
    labels_column: Option<String>,
}

impl DimensionBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn index_column(mut self, column: impl Into<String>) -> Self {
        self.index_column = Some(column.into());
        self
    }

    pub fn labels_column(mut self, column: impl Into<String>) -> Self {
        self.labels_column = Some(column.into());
        self
    }

    /// Resolves the id (explicit, else series name, else index column) and
    /// checks that table-backed dimensions name their index column, distinct
    /// from the labels column.
    pub fn build(self) -> Result<Dimension, ModelError> {
        let id = match (self.id, &self.data) {
            (Some(id), _) => id,
            (None, DimensionData::Series(series)) if !series.name().is_empty() => {
                series.name().to_string()
            }
            (None, DimensionData::Series(_)) => {
                return Err(ModelError::MissingDimensionId(
                    "the series has no name".to_string(),
                ))
            }
            (None, DimensionData::Frame(_)) => self.index_column.clone().ok_or_else(|| {
                ModelError::MissingDimensionId(
                    "id and index_column cannot both be unset for a table".to_string(),
                )
            })?,
        };
        if matches!(self.data, DimensionData::Frame(_)) && self.index_column.is_none() {
            return Err(ModelError::MissingIndexColumn);
        }
        if let (Some(index_column), Some(labels_column)) =
            (&self.index_column, &self.labels_column)
        {
            if index_column == labels_column {
                return Err(ModelError::LabelsColumnIsIndex(labels_column.clone()));
            }
        }

        Ok(Dimension {
            label: self.label.unwrap_or_else(|| id.clone()),
            id,
            data: self.data,
            role: self.role,
            index_column: self.index_column,
            labels_column: self.labels_column,
        })
    }
}

impl Dimension {
    pub fn builder(data: impl Into<DimensionData>) -> DimensionBuilder {
        DimensionBuilder {
            data: data.into(),
            id: None,
            label: None,
            role: None,
            index_column: None,
            labels_column: None,
        }
    }

    /// Dimension over the distinct values of a named series.
    pub fn from_series(series: Series) -> Result<Self, ModelError> {
        Self::builder(series).build()
    }

    /// Dimension over a lookup table, identified by its index column.
    pub fn from_frame(frame: DataFrame, index_column: &str) -> Result<Self, ModelError> {
        Self::builder(frame).index_column(index_column).build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn index_column(&self) -> Option<&str> {
        self.index_column.as_deref()
    }

    pub fn labels_column(&self) -> Option<&str> {
        self.labels_column.as_deref()
    }

    /// Deduplicated, sorted, validated and canonicalized category content.
    pub fn categories(&self) -> Result<CategoryTable, PublishError> {
        match &self.data {
            DimensionData::Series(series) => {
                let sorted = single_column(series, &self.id)?
                    .distinct()?
                    .sorted_by(&self.id)?;
                let index = sorted
                    .cells(&self.id)?
                    .iter()
                    .map(canonicalize)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CategoryTable {
                    index,
                    ..Default::default()
                })
            }
            DimensionData::Frame(frame) => self.frame_categories(frame),
        }
    }

    fn frame_categories(&self, frame: &DataFrame) -> Result<CategoryTable, PublishError> {
        let index_column = self
            .index_column
            .as_deref()
            .ok_or(ModelError::MissingIndexColumn)?;
        if !frame.has_column(index_column) {
            return Err(ModelError::ColumnNotFound {
                kind: "Index",
                column: index_column.to_string(),
            }
            .into());
        }
        if let Some(labels_column) = self.labels_column.as_deref() {
            if !frame.has_column(labels_column) {
                return Err(ModelError::ColumnNotFound {
                    kind: "Labels",
                    column: labels_column.to_string(),
                }
                .into());
            }
        }

        let sorted = frame.distinct()?.sorted_by(index_column)?;
        validate_functional_dependency(&sorted, index_column)?;

        let keys = sorted
            .cells(index_column)?
            .iter()
            .map(canonicalize)
            .collect::<Result<Vec<_>, _>>()?;
        let mut seen = HashSet::new();
        let index: Vec<String> = keys
            .iter()
            .filter(|key| seen.insert(key.as_str()))
            .cloned()
            .collect();

        let mut labels = None;
        let mut attributes: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
            BTreeMap::new();
        for column in sorted.column_names() {
            if column == index_column {
                continue;
            }
            let cells = json_cells(&sorted, &column)?;
            let mut mapping: BTreeMap<String, serde_json::Value> = BTreeMap::new();
            for (key, cell) in keys.iter().zip(cells) {
                match mapping.entry(key.clone()) {
                    Entry::Vacant(entry) => {
                        entry.insert(cell);
                    }
                    Entry::Occupied(mut entry) if entry.get().is_null() => {
                        entry.insert(cell);
                    }
                    Entry::Occupied(_) => {}
                }
            }
            if self.labels_column.as_deref() == Some(column.as_str()) {
                labels = Some(mapping);
            } else {
                attributes.insert(column, mapping);
            }
        }

        debug!(
            "Dimension {}: {} categories, {} attribute column(s)",
            self.id,
            index.len(),
            attributes.len()
        );
        Ok(CategoryTable {
            index,
            labels,
            attributes,
        })
    }

    pub fn document(&self) -> Result<DimensionDocument, PublishError> {
        let categories = self.categories()?;
        Ok(build_dimension_document(
            &self.id,
            &self.label,
            self.role,
            categories,
        ))
    }

    pub async fn publish<H: HttpClient>(
        &self,
        client: &CatalogClient<H>,
        workspace_id: &str,
    ) -> Result<Upsert, PublishError> {
        let document = self.document()?;
        let outcome = client
            .upsert_dimension(workspace_id, &self.id, document)
            .await?;
        info!("Dimension {}/{}: {:?}", workspace_id, self.id, outcome);
        Ok(outcome)
    }
}

/// Numeric and boolean columns keep their JSON type, missing cells become
/// `null`; every other column is canonicalized to strings.
fn json_cells(frame: &DataFrame, column: &str) -> Result<Vec<serde_json::Value>, PublishError> {
    let values = frame.cells(column)?;
    if frame.column_kind(column)?.is_pass_through() {
        return Ok(values.iter().map(to_json).collect());
    }
    Ok(values
        .iter()
        .map(|value| canonicalize(value).map(serde_json::Value::String))
        .collect::<Result<Vec<_>, _>>()?)
}
