//! Endpoint directory served at the root

use axum::Json;
use serde_json::{json, Value};

/// GET /
///
/// Lists every endpoint with its method, url and an example body.
pub async fn directory() -> Json<Value> {
    Json(json!({
        "Purpose": "Each endpoint below is a function of the API with the data it needs",
        "schedule": endpoint("/schedule/", json!({
            "start": "MM/DD/YYYY",
            "end": "MM/DD/YYYY",
            "include_count": true
        })),
        "ticket_items": endpoint("/titems/", json!({
            "ticketid": "2613496",
            "include_count": false
        })),
        "get_grid": endpoint("/getgrid/", json!({ "grid": 1 })),
        "get_grid_settings": endpoint("/getgridsettings/", json!({ "grid": 1 })),
        "customer_jobs": endpoint("/cjobs/", json!({
            "customerid": "2613496",
            "include_count": false
        })),
        "customer_invoices": endpoint("/cinvoices/", json!({
            "customerid": "2613496",
            "include_count": false
        })),
        "invoice_details": endpoint("/idetails/", json!({
            "invoiceid": "2613496",
            "include_count": false
        })),
        "customer_contacts": endpoint("/ccontacts/", json!({
            "customerid": "2613496",
            "include_count": false
        })),
        "drivers_search": endpoint("/drivers/search/", json!({
            "search": "smith",
            "include_count": false
        })),
    }))
}

fn endpoint(url: &str, parameters: Value) -> Value {
    json!({
        "type": "post",
        "url": url,
        "parameters": parameters,
    })
}
