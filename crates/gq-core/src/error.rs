//! Core error types for the grid gateway
//!
//! Every failure a grid request can hit, from schema lookup to the backend
//! round trip, is expressed as a [`GridError`].

use thiserror::Error;

use crate::traits::GridId;

/// Core error type for all grid operations
#[derive(Error, Debug)]
pub enum GridError {
    #[error("Schema unavailable for grid {grid_id}: {message}")]
    SchemaUnavailable { grid_id: GridId, message: String },

    #[error("Grid {grid_id} has no quick-search attributes")]
    SearchUnsupported { grid_id: GridId },

    #[error("Backend query failed for grid {grid_id}: {message}")]
    BackendQueryFailed { grid_id: GridId, message: String },

    #[error("Unknown filter operator code: {0}")]
    InvalidOperatorCode(i32),

    #[error("Unknown group operator code: {0}")]
    InvalidGroupOperator(i32),

    #[error("Grid {grid_id} expects {expected} parameters")]
    ParameterMismatch {
        grid_id: GridId,
        expected: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GridError {
    pub fn schema_unavailable(grid_id: GridId, message: impl Into<String>) -> Self {
        GridError::SchemaUnavailable {
            grid_id,
            message: message.into(),
        }
    }

    pub fn backend_failed(grid_id: GridId, message: impl Into<String>) -> Self {
        GridError::BackendQueryFailed {
            grid_id,
            message: message.into(),
        }
    }

    /// Re-label a collaborator failure as a schema failure for `grid_id`.
    ///
    /// Errors that already are `SchemaUnavailable` keep their original context.
    pub fn into_schema_unavailable(self, grid_id: GridId) -> Self {
        match self {
            err @ GridError::SchemaUnavailable { .. } => err,
            other => GridError::schema_unavailable(grid_id, other.to_string()),
        }
    }

    /// Re-label a collaborator failure as a backend query failure for `grid_id`.
    pub fn into_backend_failed(self, grid_id: GridId) -> Self {
        match self {
            err @ GridError::BackendQueryFailed { .. } => err,
            other => GridError::backend_failed(grid_id, other.to_string()),
        }
    }
}

/// HTTP status code mapping for errors
impl GridError {
    pub fn status_code(&self) -> u16 {
        match self {
            GridError::SearchUnsupported { .. } | GridError::ParameterMismatch { .. } => 422,
            GridError::InvalidOperatorCode(_) | GridError::InvalidGroupOperator(_) => 400,
            GridError::SchemaUnavailable { .. } | GridError::BackendQueryFailed { .. } => 502,
            GridError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GridError::SchemaUnavailable { .. } => "schema_unavailable",
            GridError::SearchUnsupported { .. } => "search_unsupported",
            GridError::BackendQueryFailed { .. } => "backend_query_failed",
            GridError::InvalidOperatorCode(_) => "invalid_operator",
            GridError::InvalidGroupOperator(_) => "invalid_group_operator",
            GridError::ParameterMismatch { .. } => "parameter_mismatch",
            GridError::Config(_) => "configuration_error",
        }
    }
}

/// Standard Result type for grid operations
pub type GridResult<T> = Result<T, GridError>;
