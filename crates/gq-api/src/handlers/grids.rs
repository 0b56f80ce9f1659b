//! Grid data handlers
//!
//! Each endpoint maps its body onto [`QueryParams`] for one catalog spec and
//! runs the shared build/execute/present pipeline.

use axum::{extract::State, Json};
use gq_core::traits::{GridId, Id};
use gq_queries::{GridPayload, GridQuery, GridQuerySpec, QueryParams};
use serde::{de, Deserialize, Deserializer};

use crate::error::ApiResult;
use crate::extractors::{ApiJson, AppState};

/// Body of `/schedule/`. Dates go to the backend as sent.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub start: String,
    pub end: String,
    #[serde(default, alias = "includeCount")]
    pub include_count: bool,
}

/// Body of `/titems/`
#[derive(Debug, Clone, Deserialize)]
pub struct TicketItemsRequest {
    #[serde(deserialize_with = "id_param")]
    pub ticketid: Id,
    #[serde(default, alias = "includeCount")]
    pub include_count: bool,
}

/// Body of `/cjobs/`, `/cinvoices/` and `/ccontacts/`
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRequest {
    #[serde(deserialize_with = "id_param")]
    pub customerid: Id,
    #[serde(default, alias = "includeCount")]
    pub include_count: bool,
}

/// Body of `/idetails/`
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceDetailsRequest {
    #[serde(deserialize_with = "id_param")]
    pub invoiceid: Id,
    #[serde(default, alias = "includeCount")]
    pub include_count: bool,
}

/// Body of `/drivers/search/`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(alias = "searchTerm")]
    pub search: String,
    #[serde(default, alias = "includeCount")]
    pub include_count: bool,
}

/// Body of `/getgrid/` and `/getgridsettings/`
#[derive(Debug, Clone, Deserialize)]
pub struct GridLookupRequest {
    pub grid: GridId,
}

/// POST /schedule/
pub async fn schedule(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ScheduleRequest>,
) -> ApiResult<Json<GridPayload>> {
    let params = QueryParams::DateRange {
        start: req.start,
        end: req.end,
    };
    run(&state, &state.catalog.schedule, params, req.include_count).await
}

/// POST /titems/
pub async fn ticket_items(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TicketItemsRequest>,
) -> ApiResult<Json<GridPayload>> {
    let params = QueryParams::Identity(req.ticketid);
    run(&state, &state.catalog.ticket_items, params, req.include_count).await
}

/// POST /cjobs/
pub async fn customer_jobs(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CustomerRequest>,
) -> ApiResult<Json<GridPayload>> {
    let params = QueryParams::Identity(req.customerid);
    run(&state, &state.catalog.customer_jobs, params, req.include_count).await
}

/// POST /cinvoices/
pub async fn customer_invoices(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CustomerRequest>,
) -> ApiResult<Json<GridPayload>> {
    let params = QueryParams::Identity(req.customerid);
    run(&state, &state.catalog.customer_invoices, params, req.include_count).await
}

/// POST /idetails/
pub async fn invoice_details(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<InvoiceDetailsRequest>,
) -> ApiResult<Json<GridPayload>> {
    let params = QueryParams::Identity(req.invoiceid);
    run(&state, &state.catalog.invoice_details, params, req.include_count).await
}

/// POST /ccontacts/
pub async fn customer_contacts(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CustomerRequest>,
) -> ApiResult<Json<GridPayload>> {
    let params = QueryParams::Identity(req.customerid);
    run(&state, &state.catalog.customer_contacts, params, req.include_count).await
}

/// POST /drivers/search/
///
/// Active drivers whose quick-search fields contain the term, in the grid's
/// configured sort order.
pub async fn search_drivers(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> ApiResult<Json<GridPayload>> {
    let spec = &state.catalog.drivers;
    let query = state
        .builder
        .build(spec, QueryParams::Search(req.search))
        .await?;
    let query = state.builder.with_default_sort(query).await?;
    check_schema(&state, &query).await;
    let result = state.executor.execute(&query).await?;
    Ok(Json(result.present(req.include_count)))
}

/// POST /getgrid/
pub async fn get_grid(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GridLookupRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(state.resolver().describe_grid(req.grid).await?))
}

/// POST /getgridsettings/
pub async fn get_grid_settings(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GridLookupRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    Ok(Json(state.resolver().describe_grid_settings(req.grid).await?))
}

async fn run(
    state: &AppState,
    spec: &GridQuerySpec,
    params: QueryParams,
    include_count: bool,
) -> ApiResult<Json<GridPayload>> {
    let query = state.builder.build(spec, params).await?;
    check_schema(state, &query).await;
    let result = state.executor.execute(&query).await?;
    Ok(Json(result.present(include_count)))
}

/// Log filter attributes the grid schema does not list. Runs only with the
/// schema cache on.
async fn check_schema(state: &AppState, query: &GridQuery) {
    let resolver = state.resolver();
    if !resolver.is_caching() {
        return;
    }
    if let Err(e) = resolver.check_conformance(query.grid_id, &query.filter).await {
        tracing::debug!(error = %e, grid_id = query.grid_id, "Schema conformance check skipped");
    }
}

/// Ids arrive as JSON numbers or numeric strings
fn id_param<'de, D>(deserializer: D) -> Result<Id, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(Id),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid id `{text}`"))),
    }
}
