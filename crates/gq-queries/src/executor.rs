//! Grid Query Executor
//!
//! Sends a built [`GridQuery`] to the backend in a single round trip and
//! returns the total count with the rows. Filter semantics, pagination and
//! sorting all belong to the backend.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use gq_core::error::GridResult;
use gq_core::traits::Row;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info_span, warn, Instrument};

use crate::builder::GridQuery;

/// Rows matching a query plus the server-side total
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridQueryResult {
    /// Total matching rows, independent of any paging applied to `rows`
    pub count: u64,
    pub rows: Vec<Row>,
}

impl GridQueryResult {
    pub fn new(count: u64, rows: Vec<Row>) -> Self {
        Self { count, rows }
    }

    /// Shape the result for the response.
    ///
    /// Dropping the count is purely presentational: the query sent to the
    /// backend is the same either way.
    pub fn present(self, include_count: bool) -> GridPayload {
        if include_count {
            GridPayload::Counted {
                count: self.count,
                data: self.rows,
            }
        } else {
            GridPayload::Rows(self.rows)
        }
    }
}

/// Response body: `{count, data}` or a bare row array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GridPayload {
    Counted { count: u64, data: Vec<Row> },
    Rows(Vec<Row>),
}

/// The backend's generic "rows of grid X under filter Y" capability
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GridBackend: Send + Sync {
    async fn run_query(&self, query: &GridQuery) -> GridResult<GridQueryResult>;
}

/// Runs grid queries against an injected [`GridBackend`]
#[derive(Clone)]
pub struct GridQueryExecutor {
    backend: Arc<dyn GridBackend>,
}

impl GridQueryExecutor {
    pub fn new(backend: Arc<dyn GridBackend>) -> Self {
        Self { backend }
    }

    /// Execute `query` once. No retries; failures surface as
    /// `GridError::BackendQueryFailed` carrying the grid id.
    pub async fn execute(&self, query: &GridQuery) -> GridResult<GridQueryResult> {
        let span = info_span!("grid_query", grid_id = query.grid_id);
        async move {
            if !query.filter.is_valid() {
                warn!(filter = ?query.filter, "Sending filter with an empty attribute or value list");
            }
            let start = Instant::now();
            match self.backend.run_query(query).await {
                Ok(result) => {
                    debug!(
                        count = result.count,
                        rows = result.rows.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Grid query completed"
                    );
                    Ok(result)
                }
                Err(e) => {
                    let err = e.into_backend_failed(query.grid_id);
                    error!(error = %err, "Grid query failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Condition, FilterExpression};
    use gq_core::error::GridError;
    use serde_json::json;

    fn row(id: i64) -> Row {
        let mut row = Row::new();
        row.insert("InvoiceID".into(), json!(id));
        row
    }

    fn invoices_query() -> GridQuery {
        GridQuery::new(
            7,
            FilterExpression::new().with(Condition::equals("CustomerID", 2613496)),
        )
    }

    #[tokio::test]
    async fn test_execute_returns_backend_result() {
        let mut backend = MockGridBackend::new();
        backend
            .expect_run_query()
            .withf(|q| q.grid_id == 7)
            .times(1)
            .returning(|_| Ok(GridQueryResult::new(3, vec![row(1), row(2), row(3)])));

        let executor = GridQueryExecutor::new(Arc::new(backend));
        let result = executor.execute(&invoices_query()).await.unwrap();

        assert_eq!(result.count, 3);
        assert_eq!(result.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_execute_wraps_failure_without_retry() {
        let mut backend = MockGridBackend::new();
        backend
            .expect_run_query()
            .times(1)
            .returning(|_| Err(GridError::Config("connection refused".into())));

        let executor = GridQueryExecutor::new(Arc::new(backend));
        let err = executor.execute(&invoices_query()).await.unwrap_err();

        match err {
            GridError::BackendQueryFailed { grid_id, message } => {
                assert_eq!(grid_id, 7);
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_present_with_count() {
        let payload = GridQueryResult::new(3, vec![row(1), row(2), row(3)]).present(true);
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value["count"], 3);
        assert_eq!(value["data"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_present_without_count() {
        let payload = GridQueryResult::new(3, vec![row(1), row(2), row(3)]).present(false);
        let value = serde_json::to_value(payload).unwrap();
        assert_eq!(value, json!([{"InvoiceID": 1}, {"InvoiceID": 2}, {"InvoiceID": 3}]));
    }
}
