//! Identifier and row types shared by every layer

use serde_json::{Map, Value};

/// Backend grid identifier
pub type GridId = i32;

/// Domain record key (ticket, customer, invoice)
pub type Id = i64;

/// A single grid row as returned by the backend: attribute name to value.
///
/// Rows are opaque to this service and forwarded unchanged.
pub type Row = Map<String, Value>;
