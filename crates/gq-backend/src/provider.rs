//! Collaborator trait implementations for the grid service client

use async_trait::async_trait;
use gq_core::error::GridResult;
use gq_core::traits::GridId;
use gq_queries::builder::GridQuery;
use gq_queries::executor::{GridBackend, GridQueryResult};
use gq_queries::schema::{AttributeDescriptor, SchemaProvider};
use gq_queries::sorts::SortOrder;

use crate::client::GridServiceClient;
use crate::error::BackendResult;
use crate::wire::{GridDefinition, GridSettings};

impl GridServiceClient {
    async fn grid_definition(&self, grid_id: GridId) -> BackendResult<GridDefinition> {
        let raw = self.get_grid(grid_id).await?;
        Ok(serde_json::from_value(raw)?)
    }

    async fn grid_settings(&self, grid_id: GridId) -> BackendResult<GridSettings> {
        let raw = self.get_grid_settings(grid_id).await?;
        Ok(serde_json::from_value(raw)?)
    }
}

#[async_trait]
impl SchemaProvider for GridServiceClient {
    async fn get_attributes(&self, grid_id: GridId) -> GridResult<Vec<AttributeDescriptor>> {
        self.grid_definition(grid_id)
            .await
            .map(|def| def.attributes)
            .map_err(|e| e.into_schema_error(grid_id))
    }

    async fn get_quick_search_attributes(&self, grid_id: GridId) -> GridResult<Vec<String>> {
        self.grid_definition(grid_id)
            .await
            .map(|def| def.quick_search_attributes())
            .map_err(|e| e.into_schema_error(grid_id))
    }

    async fn get_sort_settings(&self, grid_id: GridId) -> GridResult<SortOrder> {
        self.grid_settings(grid_id)
            .await
            .map(|settings| settings.sort)
            .map_err(|e| e.into_schema_error(grid_id))
    }

    async fn describe_grid(&self, grid_id: GridId) -> GridResult<serde_json::Value> {
        self.get_grid(grid_id)
            .await
            .map_err(|e| e.into_schema_error(grid_id))
    }

    async fn describe_grid_settings(&self, grid_id: GridId) -> GridResult<serde_json::Value> {
        self.get_grid_settings(grid_id)
            .await
            .map_err(|e| e.into_schema_error(grid_id))
    }
}

#[async_trait]
impl GridBackend for GridServiceClient {
    async fn run_query(&self, query: &GridQuery) -> GridResult<GridQueryResult> {
        self.get_grid_data(query)
            .await
            .map(GridQueryResult::from)
            .map_err(|e| e.into_query_error(query.grid_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gq_core::config::BackendConfig;
    use gq_core::error::GridError;
    use gq_queries::filters::FilterExpression;

    // Nothing listens on the discard port, so every call fails fast.
    fn unreachable_client() -> GridServiceClient {
        GridServiceClient::new(&BackendConfig {
            base_url: "http://127.0.0.1:9/api".into(),
            api_key: None,
            request_timeout_seconds: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_settings_is_schema_unavailable() {
        let client = unreachable_client();
        let err = client.get_quick_search_attributes(34).await.unwrap_err();
        assert!(matches!(err, GridError::SchemaUnavailable { grid_id: 34, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_query_is_backend_failure() {
        let client = unreachable_client();
        let query = GridQuery::new(7, FilterExpression::new());
        let err = client.run_query(&query).await.unwrap_err();
        assert!(matches!(err, GridError::BackendQueryFailed { grid_id: 7, .. }));
    }
}
