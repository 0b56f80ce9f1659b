//! Shared state and extractors for API handlers

use std::sync::Arc;

use axum::extract::FromRequest;
use gq_queries::{GridCatalog, GridQueryBuilder, GridQueryExecutor, SchemaResolver};

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub builder: GridQueryBuilder,
    pub executor: GridQueryExecutor,
    pub catalog: Arc<GridCatalog>,
}

impl AppState {
    pub fn new(builder: GridQueryBuilder, executor: GridQueryExecutor, catalog: GridCatalog) -> Self {
        Self {
            builder,
            executor,
            catalog: Arc::new(catalog),
        }
    }

    pub fn resolver(&self) -> &SchemaResolver {
        self.builder.resolver()
    }
}

/// JSON body extractor whose rejections use the API error format
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
