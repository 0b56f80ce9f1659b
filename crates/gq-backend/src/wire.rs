//! Request and response bodies of the grid service

use gq_core::traits::{GridId, Row};
use gq_queries::executor::GridQueryResult;
use gq_queries::schema::AttributeDescriptor;
use gq_queries::sorts::SortOrder;
use serde::{Deserialize, Serialize};

/// Body of the `GetGrid` and `GetGridSettings` calls
#[derive(Debug, Clone, Serialize)]
pub struct GridRequest {
    #[serde(rename = "GridID")]
    pub grid_id: GridId,
}

/// The parts of a `GetGrid` document this service reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridDefinition {
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<AttributeDescriptor>,
    #[serde(rename = "QuickSearchFields", default)]
    pub quick_search_fields: Vec<String>,
}

impl GridDefinition {
    /// Explicit quick-search fields, falling back to attributes flagged searchable
    pub fn quick_search_attributes(&self) -> Vec<String> {
        if !self.quick_search_fields.is_empty() {
            return self.quick_search_fields.clone();
        }
        self.attributes
            .iter()
            .filter(|a| a.quick_search)
            .map(|a| a.name.clone())
            .collect()
    }
}

/// The parts of a `GetGridSettings` document this service reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridSettings {
    #[serde(rename = "Sort", default)]
    pub sort: SortOrder,
}

/// Body returned by `GetGridData`
#[derive(Debug, Clone, Deserialize)]
pub struct GridDataResponse {
    #[serde(rename = "Count")]
    pub count: u64,
    #[serde(rename = "Data", default)]
    pub data: Vec<Row>,
}

impl From<GridDataResponse> for GridQueryResult {
    fn from(response: GridDataResponse) -> Self {
        GridQueryResult::new(response.count, response.data)
    }
}
