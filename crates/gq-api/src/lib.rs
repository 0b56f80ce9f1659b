//! # gq-api
//!
//! HTTP endpoints of the grid gateway.
//!
//! Each data endpoint is a fixed grid spec plus a JSON body; the handlers
//! hand both to the query builder and executor from `gq-queries`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use extractors::AppState;
pub use routes::router;
