//! Grid Query Builder
//!
//! Turns caller parameters into a `(grid id, filter)` pair. Each endpoint is
//! described by a [`GridQuerySpec`]: a grid id, a base filter that is always
//! applied, and a [`ConstructionRule`] saying how parameters become conditions.

use gq_core::error::{GridError, GridResult};
use gq_core::traits::{GridId, Id};
use serde::Serialize;
use tracing::debug;

use crate::filters::{Condition, FilterExpression, GridFilter, SearchFilterExpression};
use crate::schema::SchemaResolver;
use crate::sorts::SortOrder;

/// How caller parameters map onto conditions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionRule {
    /// `attribute = id`
    IdentityLookup { attribute: String },
    /// `attribute >= start AND attribute <= end`, both inclusive
    DateRange { attribute: String },
    /// OR of `contains(term)` over the grid's quick-search attributes
    FreeTextSearch,
}

impl ConstructionRule {
    /// Human-readable parameter kind, used in mismatch errors
    pub fn expected(&self) -> &'static str {
        match self {
            ConstructionRule::IdentityLookup { .. } => "identity",
            ConstructionRule::DateRange { .. } => "date range",
            ConstructionRule::FreeTextSearch => "search term",
        }
    }
}

/// Caller parameters for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParams {
    Identity(Id),
    DateRange { start: String, end: String },
    Search(String),
}

/// Everything needed to build queries against one grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridQuerySpec {
    /// Endpoint name, used in logs
    pub name: String,
    pub grid_id: GridId,
    /// Conditions applied to every query on this grid
    pub base_filter: FilterExpression,
    pub rule: ConstructionRule,
}

impl GridQuerySpec {
    pub fn new(name: impl Into<String>, grid_id: GridId, rule: ConstructionRule) -> Self {
        Self {
            name: name.into(),
            grid_id,
            base_filter: FilterExpression::new(),
            rule,
        }
    }

    /// Spec for looking rows up by a foreign key
    pub fn identity(name: impl Into<String>, grid_id: GridId, attribute: impl Into<String>) -> Self {
        Self::new(
            name,
            grid_id,
            ConstructionRule::IdentityLookup {
                attribute: attribute.into(),
            },
        )
    }

    /// Spec for an inclusive date window
    pub fn date_range(name: impl Into<String>, grid_id: GridId, attribute: impl Into<String>) -> Self {
        Self::new(
            name,
            grid_id,
            ConstructionRule::DateRange {
                attribute: attribute.into(),
            },
        )
    }

    /// Spec for quick search across the grid's searchable attributes
    pub fn free_text_search(name: impl Into<String>, grid_id: GridId) -> Self {
        Self::new(name, grid_id, ConstructionRule::FreeTextSearch)
    }

    /// Add a base condition
    pub fn with_base(mut self, condition: Condition) -> Self {
        self.base_filter.add(condition);
        self
    }

    /// Base filter AND `attribute = id`.
    ///
    /// Any id is accepted, zero and negative included.
    pub fn identity_query(&self, id: Id) -> GridResult<GridQuery> {
        let ConstructionRule::IdentityLookup { attribute } = &self.rule else {
            return Err(self.mismatch());
        };
        let filter = self
            .base_filter
            .clone()
            .with(Condition::equals(attribute.as_str(), id));
        Ok(GridQuery::new(self.grid_id, filter))
    }

    /// Base filter AND `attribute >= start AND attribute <= end`.
    ///
    /// The bounds are sent exactly as given and never reordered; date format
    /// and `start > end` are for the backend to judge.
    pub fn date_range_query(&self, start: &str, end: &str) -> GridResult<GridQuery> {
        let ConstructionRule::DateRange { attribute } = &self.rule else {
            return Err(self.mismatch());
        };
        let filter = self
            .base_filter
            .clone()
            .with(Condition::at_least(attribute.as_str(), start))
            .with(Condition::at_most(attribute.as_str(), end));
        Ok(GridQuery::new(self.grid_id, filter))
    }

    fn mismatch(&self) -> GridError {
        GridError::ParameterMismatch {
            grid_id: self.grid_id,
            expected: self.rule.expected(),
        }
    }
}

/// A built query, ready for the executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridQuery {
    #[serde(rename = "GridID")]
    pub grid_id: GridId,
    #[serde(rename = "Filter")]
    pub filter: GridFilter,
    /// Passed through to the backend; empty means the backend default
    #[serde(rename = "Sort", skip_serializing_if = "SortOrder::is_empty")]
    pub sort: SortOrder,
}

impl GridQuery {
    pub fn new(grid_id: GridId, filter: impl Into<GridFilter>) -> Self {
        Self {
            grid_id,
            filter: filter.into(),
            sort: SortOrder::new(),
        }
    }
}

/// Builds [`GridQuery`] values from specs and caller parameters
#[derive(Clone)]
pub struct GridQueryBuilder {
    resolver: SchemaResolver,
}

impl GridQueryBuilder {
    pub fn new(resolver: SchemaResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Build a query for `spec` from `params`.
    ///
    /// Fails with `ParameterMismatch` when the params do not fit the spec's rule.
    pub async fn build(&self, spec: &GridQuerySpec, params: QueryParams) -> GridResult<GridQuery> {
        let query = match params {
            QueryParams::Identity(id) => spec.identity_query(id)?,
            QueryParams::DateRange { start, end } => spec.date_range_query(&start, &end)?,
            QueryParams::Search(term) => self.search_query(spec, &term).await?,
        };
        debug!(endpoint = %spec.name, grid_id = spec.grid_id, filter = ?query.filter, "Built grid query");
        Ok(query)
    }

    /// Base filter AND (`a1 contains term` OR ... OR `an contains term`).
    ///
    /// Fails with `SearchUnsupported` when the grid has no quick-search
    /// attributes, before anything is sent to the backend.
    pub async fn search_query(&self, spec: &GridQuerySpec, term: &str) -> GridResult<GridQuery> {
        if spec.rule != ConstructionRule::FreeTextSearch {
            return Err(spec.mismatch());
        }

        let attributes = self
            .resolver
            .resolve_quick_search_attributes(spec.grid_id)
            .await?;
        if attributes.is_empty() {
            return Err(GridError::SearchUnsupported {
                grid_id: spec.grid_id,
            });
        }

        let search = attributes
            .into_iter()
            .map(|attribute| Condition::contains(attribute, term))
            .collect();
        Ok(GridQuery::new(
            spec.grid_id,
            SearchFilterExpression::any_of(spec.base_filter.clone(), search),
        ))
    }

    /// Attach the grid's default sort settings
    pub async fn with_default_sort(&self, mut query: GridQuery) -> GridResult<GridQuery> {
        query.sort = self.resolver.resolve_sort_settings(query.grid_id).await?;
        Ok(query)
    }
}
