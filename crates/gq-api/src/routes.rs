//! API routes
//!
//! Every POST route answers with and without the trailing slash.

use axum::{
    handler::Handler,
    routing::{get, post},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{grids, root};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    let router = Router::new().route("/", get(root::directory));

    let router = post_route(router, "/schedule", grids::schedule);
    let router = post_route(router, "/titems", grids::ticket_items);
    let router = post_route(router, "/cjobs", grids::customer_jobs);
    let router = post_route(router, "/cinvoices", grids::customer_invoices);
    let router = post_route(router, "/idetails", grids::invoice_details);
    let router = post_route(router, "/ccontacts", grids::customer_contacts);
    let router = post_route(router, "/drivers/search", grids::search_drivers);
    let router = post_route(router, "/getgrid", grids::get_grid);
    post_route(router, "/getgridsettings", grids::get_grid_settings)
}

fn post_route<H, T>(router: Router<AppState>, path: &str, handler: H) -> Router<AppState>
where
    H: Handler<T, AppState>,
    T: 'static,
{
    router
        .route(path, post(handler.clone()))
        .route(&format!("{path}/"), post(handler))
}
