//! API error handling
//!
//! Every error leaves the service as
//! `{"_type": "Error", "errorIdentifier": ..., "message": ...}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gq_core::error::GridError;
use serde::Serialize;

const ERROR_URN: &str = "urn:grid-gateway:errors:";

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// A failure from the query layer
    Grid(GridError),
    /// The body parsed but does not describe a valid request
    InvalidBody(String),
    /// The body could not be parsed at all
    BadRequest(String),
}

impl ApiError {
    pub fn invalid_body(msg: impl Into<String>) -> Self {
        ApiError::InvalidBody(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Grid(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn identifier(&self) -> String {
        let code = match self {
            ApiError::Grid(err) => err.error_code(),
            ApiError::InvalidBody(_) => "invalid_request_body",
            ApiError::BadRequest(_) => "bad_request",
        };
        format!("{ERROR_URN}{code}")
    }

    /// Client-facing message. Collaborator details stay in the logs.
    fn message(&self) -> String {
        match self {
            ApiError::Grid(err @ (GridError::SchemaUnavailable { .. }
            | GridError::BackendQueryFailed { .. })) => {
                tracing::error!(error = %err, "Grid request failed");
                "The grid service could not complete the request".into()
            }
            ApiError::Grid(err @ GridError::Config(_)) => {
                tracing::error!(error = %err, "Grid request failed");
                "Internal server error".into()
            }
            ApiError::Grid(err) => err.to_string(),
            ApiError::InvalidBody(msg) | ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl From<GridError> for ApiError {
    fn from(err: GridError) -> Self {
        ApiError::Grid(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::InvalidBody(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    #[serde(rename = "_type")]
    type_name: &'static str,
    #[serde(rename = "errorIdentifier")]
    error_identifier: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            type_name: "Error",
            error_identifier: self.identifier(),
            message: self.message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
