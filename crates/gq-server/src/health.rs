//! Health Check System
//!
//! Liveness is unconditional. Readiness checks the grid service, since no
//! endpoint can answer without it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use gq_backend::GridServiceClient;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Overall health report
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HealthReport {
    pub fn http_status(&self) -> StatusCode {
        if self.status.is_healthy() {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Health checker configuration
#[derive(Debug, Clone)]
pub struct HealthConfig {
    /// Timeout for the backend check
    pub check_timeout: Duration,
    /// Cache duration for health results
    pub cache_duration: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout: Duration::from_secs(5),
            cache_duration: Duration::from_secs(10),
        }
    }
}

/// Something that can tell whether the grid service is reachable
#[async_trait]
pub trait BackendCheck: Send + Sync {
    async fn reach(&self) -> Result<(), String>;

    /// Where the check points, for the report
    fn target(&self) -> String;
}

#[async_trait]
impl BackendCheck for GridServiceClient {
    async fn reach(&self) -> Result<(), String> {
        self.ping().await.map_err(|e| e.to_string())
    }

    fn target(&self) -> String {
        self.base_url().to_string()
    }
}

struct CachedHealth {
    report: HealthReport,
    cached_at: Instant,
}

/// Health checker service
pub struct HealthChecker {
    config: HealthConfig,
    start_time: Instant,
    cache: RwLock<Option<CachedHealth>>,
    backend: Option<Arc<dyn BackendCheck>>,
    schema_cache_enabled: bool,
}

impl HealthChecker {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            cache: RwLock::new(None),
            backend: None,
            schema_cache_enabled: false,
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn BackendCheck>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_schema_cache(mut self, enabled: bool) -> Self {
        self.schema_cache_enabled = enabled;
        self
    }

    /// Get cached health or perform checks
    pub async fn check(&self) -> HealthReport {
        {
            let cache = self.cache.read().await;
            if let Some(ref cached) = *cache {
                if cached.cached_at.elapsed() < self.config.cache_duration {
                    debug!("Returning cached health report");
                    return cached.report.clone();
                }
            }
        }

        let report = self.perform_checks().await;

        {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedHealth {
                report: report.clone(),
                cached_at: Instant::now(),
            });
        }

        report
    }

    async fn perform_checks(&self) -> HealthReport {
        let mut components = Vec::new();
        let mut overall_status = HealthStatus::Healthy;

        if let Some(ref backend) = self.backend {
            let backend_health = self.check_backend(backend.as_ref()).await;
            if backend_health.status == HealthStatus::Unhealthy {
                overall_status = HealthStatus::Unhealthy;
            }
            components.push(backend_health);
        }

        components.push(self.check_schema_cache());

        HealthReport {
            status: overall_status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            components,
            timestamp: chrono::Utc::now(),
        }
    }

    async fn check_backend(&self, backend: &dyn BackendCheck) -> ComponentHealth {
        let start = Instant::now();

        let outcome = match tokio::time::timeout(self.config.check_timeout, backend.reach()).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "no answer within {}s",
                self.config.check_timeout.as_secs()
            )),
        };

        let (status, message) = match outcome {
            Ok(()) => (HealthStatus::Healthy, "Reachable".to_string()),
            Err(e) => {
                warn!(error = %e, "Grid service health check failed");
                (HealthStatus::Unhealthy, e)
            }
        };

        ComponentHealth {
            name: "grid_service".to_string(),
            status,
            message: Some(message),
            response_time_ms: start.elapsed().as_millis() as u64,
            details: Some(serde_json::json!({ "url": backend.target() })),
        }
    }

    fn check_schema_cache(&self) -> ComponentHealth {
        ComponentHealth {
            name: "schema_cache".to_string(),
            status: HealthStatus::Healthy,
            message: None,
            response_time_ms: 0,
            details: Some(serde_json::json!({ "enabled": self.schema_cache_enabled })),
        }
    }
}

/// State for the health routes
pub struct HealthState {
    pub health: Arc<HealthChecker>,
}

/// Simple liveness check
pub async fn liveness() -> &'static str {
    "OK"
}

/// Readiness check
pub async fn readiness(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.health.check().await;
    (report.http_status(), Json(report))
}

/// Plain OK while the process is up
pub async fn default_health_check() -> &'static str {
    "OK"
}
