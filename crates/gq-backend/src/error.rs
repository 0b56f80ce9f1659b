//! Error type for backend calls

use gq_core::error::GridError;
use gq_core::traits::GridId;

/// Error type for grid service calls
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Grid service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed grid service response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid grid service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid API key header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

impl BackendError {
    /// The call was a settings lookup for `grid_id`
    pub fn into_schema_error(self, grid_id: GridId) -> GridError {
        GridError::schema_unavailable(grid_id, self.to_string())
    }

    /// The call was a data query for `grid_id`
    pub fn into_query_error(self, grid_id: GridId) -> GridError {
        GridError::backend_failed(grid_id, self.to_string())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Http(e) if e.is_timeout())
    }
}

/// Result type for grid service calls
pub type BackendResult<T> = Result<T, BackendError>;
