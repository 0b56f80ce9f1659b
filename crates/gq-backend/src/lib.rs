//! # gq-backend
//!
//! Backend access for the grid gateway.
//!
//! This crate talks to the grid service over HTTP and implements the two
//! collaborator seams the query layer depends on:
//!
//! - `SchemaProvider` via `GetGrid` / `GetGridSettings`
//! - `GridBackend` via `GetGridData`
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gq_backend::GridServiceClient;
//! use gq_core::config::AppConfig;
//! use gq_queries::{GridQueryExecutor, SchemaResolver};
//!
//! let config = AppConfig::from_env()?;
//! let client = Arc::new(GridServiceClient::new(&config.backend)?);
//!
//! let resolver = SchemaResolver::new(client.clone());
//! let executor = GridQueryExecutor::new(client);
//! ```

pub mod client;
pub mod error;
pub mod provider;
pub mod wire;

pub use client::GridServiceClient;
pub use error::{BackendError, BackendResult};
pub use wire::{GridDataResponse, GridDefinition, GridRequest, GridSettings};
