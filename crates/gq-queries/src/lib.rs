//! # gq-queries
//!
//! Grid query abstraction for the grid gateway.
//!
//! Every endpoint is a thin specialization of one mechanism: resolve the grid's
//! schema, build a filter from caller parameters, run it through the backend's
//! generic grid query, and optionally return the row count with the data.
//!
//! ## Structure
//!
//! - `filters` - Conditions, filter expressions and operator codes
//! - `sorts` - Opaque sort settings passed through to the backend
//! - `schema` - Schema provider seam and resolver
//! - `builder` - Construction rules and the query builder
//! - `catalog` - The built-in endpoint specs
//! - `executor` - Backend seam, executor and count suppression
//!
//! ## Example
//!
//! ```
//! use gq_queries::builder::GridQuerySpec;
//! use gq_queries::filters::{Condition, GridFilter};
//!
//! let spec = GridQuerySpec::identity("customer_invoices", 7, "CustomerID")
//!     .with_base(Condition::equals("Status", "A"));
//! let query = spec.identity_query(2613496).unwrap();
//!
//! assert_eq!(query.grid_id, 7);
//! assert!(matches!(query.filter, GridFilter::Plain(ref f) if f.len() == 2));
//! ```

pub mod builder;
pub mod catalog;
pub mod executor;
pub mod filters;
pub mod schema;
pub mod sorts;

// Re-exports for convenience
pub use builder::{ConstructionRule, GridQuery, GridQueryBuilder, GridQuerySpec, QueryParams};
pub use catalog::GridCatalog;
pub use executor::{GridBackend, GridPayload, GridQueryExecutor, GridQueryResult};
pub use filters::{
    Condition, FilterExpression, FilterOperator, GridFilter, GroupOperator, SearchFilterExpression,
};
pub use schema::{AttributeDescriptor, GridSchema, SchemaProvider, SchemaResolver};
pub use sorts::SortOrder;
