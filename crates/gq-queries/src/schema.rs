//! Grid Schema Resolution
//!
//! A grid's schema (attribute list, quick-search attributes and default sort)
//! lives in the backend's settings service. [`SchemaProvider`] is the seam to
//! that service and [`SchemaResolver`] is what the rest of the crate talks to.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use gq_core::error::GridResult;
use gq_core::traits::GridId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::filters::GridFilter;
use crate::sorts::SortOrder;

/// Description of one grid attribute (column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDescriptor {
    /// Attribute name used in filter conditions
    #[serde(rename = "Name")]
    pub name: String,
    /// Display caption
    #[serde(rename = "Caption", default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    /// Backend data type, e.g. "String", "Date", "Int"
    #[serde(rename = "DataType", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Whether the attribute takes part in quick search
    #[serde(rename = "QuickSearch", default)]
    pub quick_search: bool,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: None,
            data_type: None,
            quick_search: false,
        }
    }

    pub fn searchable(mut self) -> Self {
        self.quick_search = true;
        self
    }
}

/// Resolved schema of a single grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSchema {
    pub grid_id: GridId,
    pub attributes: Vec<AttributeDescriptor>,
    pub quick_search_attributes: Vec<String>,
    pub sort_settings: SortOrder,
}

impl GridSchema {
    /// Check if the grid lists the attribute
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Quick search needs at least one searchable attribute
    pub fn supports_quick_search(&self) -> bool {
        !self.quick_search_attributes.is_empty()
    }
}

/// Source of grid metadata, keyed by grid id
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Attribute list of the grid
    async fn get_attributes(&self, grid_id: GridId) -> GridResult<Vec<AttributeDescriptor>>;

    /// Names of the attributes flagged for quick search (may be empty)
    async fn get_quick_search_attributes(&self, grid_id: GridId) -> GridResult<Vec<String>>;

    /// Default multi-column sort order
    async fn get_sort_settings(&self, grid_id: GridId) -> GridResult<SortOrder>;

    /// The provider's full grid definition document
    async fn describe_grid(&self, grid_id: GridId) -> GridResult<serde_json::Value>;

    /// The provider's full grid settings document
    async fn describe_grid_settings(&self, grid_id: GridId) -> GridResult<serde_json::Value>;
}

/// Resolves grid schemas through an injected [`SchemaProvider`].
///
/// Every provider failure surfaces as `GridError::SchemaUnavailable`. When the
/// cache is enabled, full schemas are kept for the process lifetime.
#[derive(Clone)]
pub struct SchemaResolver {
    provider: Arc<dyn SchemaProvider>,
    cache: Option<Arc<DashMap<GridId, Arc<GridSchema>>>>,
}

impl SchemaResolver {
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            provider,
            cache: None,
        }
    }

    /// Memoize resolved schemas
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(Arc::new(DashMap::new()));
        self
    }

    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Resolve the complete schema of a grid
    pub async fn resolve(&self, grid_id: GridId) -> GridResult<Arc<GridSchema>> {
        if let Some(cache) = &self.cache {
            if let Some(schema) = cache.get(&grid_id) {
                debug!(grid_id, "Schema cache hit");
                return Ok(schema.clone());
            }
        }

        let schema = Arc::new(GridSchema {
            grid_id,
            attributes: self.fetch_attributes(grid_id).await?,
            quick_search_attributes: self.fetch_quick_search_attributes(grid_id).await?,
            sort_settings: self.fetch_sort_settings(grid_id).await?,
        });

        if let Some(cache) = &self.cache {
            cache.insert(grid_id, schema.clone());
        }
        Ok(schema)
    }

    pub async fn resolve_attributes(&self, grid_id: GridId) -> GridResult<Vec<AttributeDescriptor>> {
        if self.is_caching() {
            return Ok(self.resolve(grid_id).await?.attributes.clone());
        }
        self.fetch_attributes(grid_id).await
    }

    /// An empty list means the grid does not support quick search
    pub async fn resolve_quick_search_attributes(&self, grid_id: GridId) -> GridResult<Vec<String>> {
        if self.is_caching() {
            return Ok(self.resolve(grid_id).await?.quick_search_attributes.clone());
        }
        self.fetch_quick_search_attributes(grid_id).await
    }

    pub async fn resolve_sort_settings(&self, grid_id: GridId) -> GridResult<SortOrder> {
        if self.is_caching() {
            return Ok(self.resolve(grid_id).await?.sort_settings.clone());
        }
        self.fetch_sort_settings(grid_id).await
    }

    pub async fn describe_grid(&self, grid_id: GridId) -> GridResult<serde_json::Value> {
        self.provider
            .describe_grid(grid_id)
            .await
            .map_err(|e| e.into_schema_unavailable(grid_id))
    }

    pub async fn describe_grid_settings(&self, grid_id: GridId) -> GridResult<serde_json::Value> {
        self.provider
            .describe_grid_settings(grid_id)
            .await
            .map_err(|e| e.into_schema_unavailable(grid_id))
    }

    /// Attribute names used by `filter` that the grid does not list.
    ///
    /// Advisory only: the backend stays authoritative, so callers log the
    /// result and still send the query.
    pub async fn check_conformance(
        &self,
        grid_id: GridId,
        filter: &GridFilter,
    ) -> GridResult<Vec<String>> {
        let attributes = self.resolve_attributes(grid_id).await?;
        let mut seen = HashSet::new();
        let unknown: Vec<String> = filter
            .all_conditions()
            .into_iter()
            .map(|c| c.attribute.as_str())
            .filter(|name| !attributes.iter().any(|a| a.name == *name))
            .filter(|name| seen.insert(*name))
            .map(String::from)
            .collect();

        if !unknown.is_empty() {
            warn!(grid_id, ?unknown, "Filter references attributes missing from grid schema");
        }
        Ok(unknown)
    }

    async fn fetch_attributes(&self, grid_id: GridId) -> GridResult<Vec<AttributeDescriptor>> {
        self.provider
            .get_attributes(grid_id)
            .await
            .map_err(|e| e.into_schema_unavailable(grid_id))
    }

    async fn fetch_quick_search_attributes(&self, grid_id: GridId) -> GridResult<Vec<String>> {
        self.provider
            .get_quick_search_attributes(grid_id)
            .await
            .map_err(|e| e.into_schema_unavailable(grid_id))
    }

    async fn fetch_sort_settings(&self, grid_id: GridId) -> GridResult<SortOrder> {
        self.provider
            .get_sort_settings(grid_id)
            .await
            .map_err(|e| e.into_schema_unavailable(grid_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Condition, FilterExpression};
    use gq_core::error::GridError;
    use serde_json::json;

    fn drivers_provider(times: usize) -> MockSchemaProvider {
        let mut provider = MockSchemaProvider::new();
        provider
            .expect_get_attributes()
            .times(times)
            .returning(|_| {
                Ok(vec![
                    AttributeDescriptor::new("Status"),
                    AttributeDescriptor::new("FirstName").searchable(),
                    AttributeDescriptor::new("LastName").searchable(),
                ])
            });
        provider
            .expect_get_quick_search_attributes()
            .times(times)
            .returning(|_| Ok(vec!["FirstName".into(), "LastName".into()]));
        provider
            .expect_get_sort_settings()
            .times(times)
            .returning(|_| Ok(SortOrder::from(json!([{"Attribute": "LastName", "Direction": "DESC"}]))));
        provider
    }

    #[tokio::test]
    async fn test_resolve_full_schema() {
        let resolver = SchemaResolver::new(Arc::new(drivers_provider(1)));
        let schema = resolver.resolve(34).await.unwrap();

        assert_eq!(schema.grid_id, 34);
        assert!(schema.has_attribute("Status"));
        assert!(schema.supports_quick_search());
        assert_eq!(
            schema.sort_settings.as_value(),
            &json!([{"Attribute": "LastName", "Direction": "DESC"}])
        );
    }

    #[tokio::test]
    async fn test_cache_fetches_once() {
        let resolver = SchemaResolver::new(Arc::new(drivers_provider(1))).with_cache();

        let first = resolver.resolve_quick_search_attributes(34).await.unwrap();
        let second = resolver.resolve_quick_search_attributes(34).await.unwrap();
        let attributes = resolver.resolve_attributes(34).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(attributes.len(), 3);
    }

    #[tokio::test]
    async fn test_provider_failure_is_schema_unavailable() {
        let mut provider = MockSchemaProvider::new();
        provider
            .expect_get_quick_search_attributes()
            .returning(|_| Err(GridError::Config("settings endpoint missing".into())));

        let resolver = SchemaResolver::new(Arc::new(provider));
        let err = resolver.resolve_quick_search_attributes(99).await.unwrap_err();

        assert!(matches!(err, GridError::SchemaUnavailable { grid_id: 99, .. }));
    }

    #[tokio::test]
    async fn test_empty_quick_search_is_valid() {
        let mut provider = MockSchemaProvider::new();
        provider
            .expect_get_quick_search_attributes()
            .returning(|_| Ok(vec![]));

        let resolver = SchemaResolver::new(Arc::new(provider));
        assert!(resolver.resolve_quick_search_attributes(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_conformance_reports_unknown_attributes() {
        let mut provider = MockSchemaProvider::new();
        provider
            .expect_get_attributes()
            .returning(|_| Ok(vec![AttributeDescriptor::new("Status")]));

        let resolver = SchemaResolver::new(Arc::new(provider));
        let filter = GridFilter::from(
            FilterExpression::new()
                .with(Condition::equals("Status", "A"))
                .with(Condition::equals("Nickname", "x")),
        );

        let unknown = resolver.check_conformance(34, &filter).await.unwrap();
        assert_eq!(unknown, vec!["Nickname".to_string()]);
    }

    #[tokio::test]
    async fn test_check_conformance_reports_each_unknown_attribute_once() {
        let mut provider = MockSchemaProvider::new();
        provider
            .expect_get_attributes()
            .returning(|_| Ok(vec![AttributeDescriptor::new("Status")]));

        let resolver = SchemaResolver::new(Arc::new(provider));
        let filter = GridFilter::from(
            FilterExpression::new()
                .with(Condition::equals("Nickname", "x"))
                .with(Condition::equals("Status", "A"))
                .with(Condition::contains("Nickname", "y"))
                .with(Condition::equals("Alias", "z")),
        );

        let unknown = resolver.check_conformance(34, &filter).await.unwrap();
        assert_eq!(unknown, vec!["Nickname".to_string(), "Alias".to_string()]);
    }
}
