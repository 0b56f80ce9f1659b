//! Grid service client
//!
//! Thin JSON-over-HTTP client for the backend's `GetGrid`, `GetGridSettings`
//! and `GetGridData` calls. The request timeout configured here is the only
//! latency bound on backend calls.

use std::time::{Duration, Instant};

use gq_core::config::BackendConfig;
use gq_core::traits::GridId;
use gq_queries::builder::GridQuery;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{BackendError, BackendResult};
use crate::wire::{GridDataResponse, GridRequest};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Grid service endpoint names, relative to the base URL
pub mod endpoints {
    pub const GET_GRID: &str = "GetGrid";
    pub const GET_GRID_SETTINGS: &str = "GetGridSettings";
    pub const GET_GRID_DATA: &str = "GetGridData";
}

/// HTTP client for the grid service
#[derive(Clone)]
pub struct GridServiceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GridServiceClient {
    /// Create a client from configuration
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key)?;
            value.set_sensitive(true);
            headers.insert(API_KEY_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .default_headers(headers)
            .build()?;

        let base_url = normalize_base_url(&config.base_url)?;
        tracing::info!(base_url = %base_url, "Grid service client created");

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Raw `GetGrid` document
    pub async fn get_grid(&self, grid_id: GridId) -> BackendResult<serde_json::Value> {
        self.post(endpoints::GET_GRID, &GridRequest { grid_id }).await
    }

    /// Raw `GetGridSettings` document
    pub async fn get_grid_settings(&self, grid_id: GridId) -> BackendResult<serde_json::Value> {
        self.post(endpoints::GET_GRID_SETTINGS, &GridRequest { grid_id })
            .await
    }

    /// Run a grid query
    pub async fn get_grid_data(&self, query: &GridQuery) -> BackendResult<GridDataResponse> {
        self.post(endpoints::GET_GRID_DATA, query).await
    }

    /// Check that the grid service answers at all
    pub async fn ping(&self) -> BackendResult<()> {
        let response = self.http.get(self.base_url.clone()).send().await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: String::new(),
            });
        }
        Ok(())
    }

    async fn post<B, T>(&self, endpoint: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(endpoint)?;
        let start = Instant::now();

        let response = self.http.post(url).json(body).send().await.map_err(|e| {
            let err = BackendError::from(e);
            if err.is_timeout() {
                tracing::warn!(endpoint, "Grid service call timed out");
            }
            err
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(
            endpoint,
            bytes = bytes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Grid service call completed"
        );
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Parse the base URL and make sure relative joins append to its path
fn normalize_base_url(raw: &str) -> BackendResult<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
