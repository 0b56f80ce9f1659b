//! Grid Gateway Server
//!
//! HTTP front for the grid service: fixed grid queries behind small JSON
//! endpoints, plus health checks.

use std::sync::Arc;

use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gq_api::AppState;
use gq_backend::GridServiceClient;
use gq_core::config::{AppConfig, ConfigError};
use gq_queries::{GridCatalog, GridQueryBuilder, GridQueryExecutor, SchemaResolver};

mod health;

use health::{HealthChecker, HealthConfig, HealthState};

const DEFAULT_LOG_FILTER: &str = "info,gq_server=debug,gq_api=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = load_config(AppConfig::from_env)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        backend = %config.backend.base_url,
        "Starting grid gateway"
    );

    let client = Arc::new(GridServiceClient::new(&config.backend)?);

    let mut resolver = SchemaResolver::new(client.clone());
    if config.schema.cache_enabled {
        info!("Schema cache enabled");
        resolver = resolver.with_cache();
    }

    let api_state = AppState::new(
        GridQueryBuilder::new(resolver),
        GridQueryExecutor::new(client.clone()),
        GridCatalog::from_ids(&config.grids),
    );

    let health_checker = HealthChecker::new(HealthConfig::default())
        .with_backend(client)
        .with_schema_cache(config.schema.cache_enabled);
    let health_state = Arc::new(HealthState {
        health: Arc::new(health_checker),
    });

    let app = build_router(
        api_state,
        health_state,
        cors_layer(&config.server.cors_allowed_origins),
    );

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Read the configuration, refusing to start on a malformed value
fn load_config<F>(load: F) -> anyhow::Result<AppConfig>
where
    F: FnOnce() -> Result<AppConfig, ConfigError>,
{
    load().context("Invalid configuration")
}

/// Initialize tracing. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }
}

/// CORS for the configured browser origins, credentials allowed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build the application router
fn build_router(api_state: AppState, health_state: Arc<HealthState>, cors: CorsLayer) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health::default_health_check))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(health_state);

    Router::new()
        .merge(health_routes)
        .merge(gq_api::router().with_state(api_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use gq_core::config::BackendConfig;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = AppConfig::default();
        let client = Arc::new(
            GridServiceClient::new(&BackendConfig {
                base_url: "http://127.0.0.1:9/api".into(),
                api_key: None,
                request_timeout_seconds: 1,
            })
            .unwrap(),
        );

        let api_state = AppState::new(
            GridQueryBuilder::new(SchemaResolver::new(client.clone())),
            GridQueryExecutor::new(client),
            GridCatalog::from_ids(&config.grids),
        );
        let health_state = Arc::new(HealthState {
            health: Arc::new(HealthChecker::new(HealthConfig::default())),
        });

        build_router(
            api_state,
            health_state,
            cors_layer(&config.server.cors_allowed_origins),
        )
    }

    #[test]
    fn test_invalid_config_stops_startup() {
        let err = load_config(|| {
            AppConfig::from_vars(|key| (key == "GRID_ID_DRIVERS").then(|| "drivers".to_string()))
        })
        .unwrap_err();

        assert!(err.to_string().contains("Invalid configuration"));
        assert!(format!("{err:#}").contains("GRID_ID_DRIVERS"));
    }

    #[test]
    fn test_config_from_vars() {
        let config =
            load_config(|| AppConfig::from_vars(|key| (key == "PORT").then(|| "9090".to_string())))
                .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.grids.drivers, AppConfig::default().grids.drivers);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_endpoint() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_directory_is_mounted() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/cinvoices/")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_cors_ignores_unknown_origin() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/cinvoices/")
                    .header(header::ORIGIN, "http://evil.example")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
