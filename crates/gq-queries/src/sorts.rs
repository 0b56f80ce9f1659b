//! Grid Sort Orders
//!
//! Default sort settings are read from the settings provider and handed to the
//! backend untouched. The document is kept as the provider sent it: direction
//! spellings and fields this crate does not know survive the round trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A grid's sort settings, opaque to this crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortOrder(Value);

impl SortOrder {
    /// No sort settings; the backend default applies
    pub fn new() -> Self {
        Self(Value::Null)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// `null`, `[]` and `{}` all mean "no sort"
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }

    /// Number of sort criteria when the settings are a list
    pub fn len(&self) -> usize {
        match &self.0 {
            Value::Array(items) => items.len(),
            _ if self.is_empty() => 0,
            _ => 1,
        }
    }
}

impl From<Value> for SortOrder {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
