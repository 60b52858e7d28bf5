use super::{Dimension, Measure, ModelError, Registry, Schema};
use crate::catalog::{routes, CatalogClient, HttpClient};
use crate::error::PublishError;
use log::info;
use std::sync::Arc;

/// Publishing unit owning deduplicated pools of dimensions, measures and
/// schemas.
#[derive(Debug, Clone)]
pub struct Workspace {
    id: String,
    label: String,
    source: Option<String>,
    note: Option<Vec<String>>,
    dimensions: Registry<Arc<Dimension>>,
    measures: Registry<Arc<Measure>>,
    schemas: Registry<Schema>,
}

impl Workspace {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            source: None,
            note: None,
            dimensions: Registry::new(),
            measures: Registry::new(),
            schemas: Registry::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_note(mut self, note: Vec<String>) -> Self {
        self.note = Some(note);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn dimensions(&self) -> &Registry<Arc<Dimension>> {
        &self.dimensions
    }

    pub fn measures(&self) -> &Registry<Arc<Measure>> {
        &self.measures
    }

    pub fn schemas(&self) -> &Registry<Schema> {
        &self.schemas
    }

    /// Attaches a schema and registers its dimensions and measures.
    pub fn add_schema(&mut self, schema: Schema) -> &mut Self {
        self.register(&schema);
        self.schemas.insert(schema.id().to_string(), schema);
        self
    }

    /// Mutates an attached schema, then registers whatever dimensions and
    /// measures it holds afterwards.
    pub fn update_schema<F>(&mut self, schema_id: &str, update: F) -> Result<&mut Self, ModelError>
    where
        F: FnOnce(&mut Schema) -> Result<(), ModelError>,
    {
        let schema = self
            .schemas
            .get_mut(schema_id)
            .ok_or_else(|| not_registered("Schema", schema_id))?;
        let result = update(schema);
        let snapshot = schema.clone();
        self.register(&snapshot);
        result?;
        Ok(self)
    }

    /// Detaches a schema. Dimensions and measures it registered stay.
    pub fn remove_schema(&mut self, schema_id: &str) -> Result<Schema, ModelError> {
        self.schemas
            .remove(schema_id)
            .ok_or_else(|| not_registered("Schema", schema_id))
    }

    pub fn add_dimension(&mut self, dimension: impl Into<Arc<Dimension>>) -> &mut Self {
        let dimension = dimension.into();
        self.dimensions.insert(dimension.id().to_string(), dimension);
        self
    }

    pub fn remove_dimension(&mut self, dimension_id: &str) -> Result<Arc<Dimension>, ModelError> {
        self.dimensions
            .remove(dimension_id)
            .ok_or_else(|| not_registered("Dimension", dimension_id))
    }

    pub fn add_measure(&mut self, measure: impl Into<Arc<Measure>>) -> &mut Self {
        let measure = measure.into();
        self.measures.insert(measure.id().to_string(), measure);
        self
    }

    pub fn remove_measure(&mut self, measure_id: &str) -> Result<Arc<Measure>, ModelError> {
        self.measures
            .remove(measure_id)
            .ok_or_else(|| not_registered("Measure", measure_id))
    }

    fn register(&mut self, schema: &Schema) {
        for dimension in schema.dimensions() {
            self.add_dimension(Arc::clone(dimension));
        }
        for measure in schema.measures() {
            self.add_measure(Arc::clone(measure));
        }
    }

    /// Item URLs of every dimension and measure the schemas link to.
    fn linked_resources(&self, api_base: &str) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for schema in self.schemas.values() {
            let dimension_urls = schema
                .dimensions()
                .iter()
                .map(|d| routes::dimension_url(api_base, &self.id, d.id()));
            let measure_urls = schema
                .measures()
                .iter()
                .map(|m| routes::measure_url(api_base, &self.id, m.id()));
            for url in dimension_urls.chain(measure_urls) {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
        }
        urls
    }

    /// Publishes the workspace document, every dimension, every measure, waits
    /// for the catalog to settle, then publishes every schema.
    ///
    /// Stops at the first error; entities already published stay published.
    pub async fn publish<H: HttpClient>(
        &self,
        client: &CatalogClient<H>,
    ) -> Result<(), PublishError> {
        info!(
            "Publishing workspace {}: {} dimension(s), {} measure(s), {} schema(s)",
            self.id,
            self.dimensions.len(),
            self.measures.len(),
            self.schemas.len()
        );
        client
            .upsert_workspace(
                &self.id,
                &self.label,
                self.source.as_deref(),
                self.note.as_deref(),
            )
            .await?;

        for dimension in self.dimensions.values() {
            dimension.publish(client, &self.id).await?;
        }
        for measure in self.measures.values() {
            measure.publish(client, &self.id).await?;
        }

        if !self.schemas.is_empty() {
            client
                .settle(&self.linked_resources(client.api_base()))
                .await?;
        }
        for schema in self.schemas.values() {
            schema.publish(client, &self.id).await?;
        }
        info!("Workspace {} published", self.id);
        Ok(())
    }
}

fn not_registered(kind: &'static str, id: &str) -> ModelError {
    ModelError::NotRegistered {
        kind,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, DataFrame, Series};
    use polars::prelude::NamedFrom;
    use rstest::*;

    #[fixture]
    fn table() -> DataFrame {
        DataFrame::new(vec![
            Column::new("cat".into(), &["A", "B"]),
            Column::new("value".into(), &[1i64, 2]),
        ])
        .unwrap()
    }

    #[rstest]
    fn test_schemas_share_dimension_pool(table: DataFrame) {
        let shared = Arc::new(Dimension::from_series(Series::new("cat".into(), &["A"])).unwrap());
        let mut first = Schema::new(table.clone(), "first");
        first.add_dimensions([Arc::clone(&shared)]).unwrap();
        let mut second = Schema::new(table, "second");
        second
            .add_dimensions([Arc::clone(&shared)])
            .unwrap()
            .add_measures(["value"])
            .unwrap();

        let mut workspace = Workspace::new("ws", "Workspace");
        workspace.add_schema(first).add_schema(second);

        assert_eq!(workspace.dimensions().len(), 1);
        assert_eq!(workspace.measures().len(), 1);
        assert_eq!(workspace.schemas().ids().collect::<Vec<_>>(), vec!["first", "second"]);
        let registered = workspace.dimensions().get("cat").unwrap();
        assert!(Arc::ptr_eq(registered, &shared));
    }

    #[rstest]
    fn test_workspaces_do_not_share_registries(table: DataFrame) {
        let mut first = Workspace::new("a", "A");
        first.add_schema(Schema::new(table, "s"));
        let second = Workspace::new("b", "B");
        assert_eq!(first.schemas().len(), 1);
        assert!(second.schemas().is_empty());
    }

    #[rstest]
    fn test_update_schema_registers_new_entities(table: DataFrame) {
        let mut workspace = Workspace::new("ws", "Workspace");
        workspace.add_schema(Schema::new(table, "s"));
        workspace
            .update_schema("s", |schema| {
                schema.add_dimensions(["cat"])?.add_measures(["value"])?;
                Ok(())
            })
            .unwrap();
        assert!(workspace.dimensions().contains("cat"));
        assert!(workspace.measures().contains("value"));
        assert_eq!(workspace.schemas().get("s").unwrap().dimensions().len(), 1);
    }

    #[rstest]
    fn test_update_schema_registers_before_failing(table: DataFrame) {
        let mut workspace = Workspace::new("ws", "Workspace");
        workspace.add_schema(Schema::new(table, "s"));
        let err = workspace
            .update_schema("s", |schema| {
                schema.add_dimensions(["cat", "missing"])?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, ModelError::ColumnNotFound { .. }));
        assert!(workspace.dimensions().contains("cat"));
    }

    #[test]
    fn test_remove_unknown_entities() {
        let mut workspace = Workspace::new("ws", "Workspace");
        assert_eq!(
            workspace.remove_schema("s").unwrap_err(),
            ModelError::NotRegistered {
                kind: "Schema",
                id: "s".to_string()
            }
        );
        assert!(workspace.remove_dimension("d").is_err());
        assert!(workspace.remove_measure("m").is_err());
    }

    #[test]
    fn test_readding_overwrites() {
        let mut workspace = Workspace::new("ws", "Workspace");
        workspace
            .add_measure(Measure::new("value"))
            .add_measure(Measure::new("value").with_aggregator("AVG"));
        assert_eq!(workspace.measures().len(), 1);
        assert_eq!(workspace.measures().get("value").unwrap().aggregator(), "AVG");
        workspace.remove_measure("value").unwrap();
        assert!(workspace.measures().is_empty());
    }
}
