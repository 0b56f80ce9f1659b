//! Configuration types and loading
//!
//! All settings come from environment variables layered over [`AppConfig::default`].

use serde::{Deserialize, Serialize};

use crate::traits::GridId;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP listener configuration
    pub server: ServerConfig,

    /// Backend grid service configuration
    pub backend: BackendConfig,

    /// Schema resolution settings
    pub schema: SchemaConfig,

    /// Grid ids backing each endpoint
    pub grids: GridIds,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the grid service, e.g. `http://tcr.local/api`
    pub base_url: String,
    /// Sent as `X-Api-Key` when present
    pub api_key: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SchemaConfig {
    /// Memoize resolved schemas for the process lifetime
    pub cache_enabled: bool,
}

/// Backend grid ids for the built-in endpoints.
///
/// Only the drivers grid id is fixed by the backend; the others differ per
/// installation and are expected to be set through the environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GridIds {
    pub schedule: GridId,
    pub ticket_items: GridId,
    pub customer_jobs: GridId,
    pub customer_invoices: GridId,
    pub invoice_details: GridId,
    pub customer_contacts: GridId,
    pub drivers: GridId,
}

impl Default for GridIds {
    fn default() -> Self {
        Self {
            schedule: 30,
            ticket_items: 12,
            customer_jobs: 5,
            customer_invoices: 7,
            invoice_details: 8,
            customer_contacts: 3,
            drivers: 34,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_allowed_origins: vec![
                    "http://localhost".to_string(),
                    "http://localhost:8080".to_string(),
                    "http://localhost:3000".to_string(),
                ],
            },
            backend: BackendConfig {
                base_url: "http://localhost:5000/api".to_string(),
                api_key: None,
                request_timeout_seconds: 30,
            },
            schema: SchemaConfig::default(),
            grids: GridIds::default(),
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

fn parse_number<T>(key: &str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Server
        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("PORT") {
            config.server.port = parse_number("PORT", port)?;
        }
        if let Some(origins) = var("CORS_ALLOWED_ORIGINS") {
            config.server.cors_allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        // Backend
        if let Some(url) = var("GRID_BACKEND_URL") {
            config.backend.base_url = url;
        }
        if let Some(key) = var("GRID_BACKEND_API_KEY") {
            config.backend.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(timeout) = var("GRID_BACKEND_TIMEOUT_SECONDS") {
            config.backend.request_timeout_seconds =
                parse_number("GRID_BACKEND_TIMEOUT_SECONDS", timeout)?;
        }

        // Schema
        if let Some(v) = var("GRID_SCHEMA_CACHE") {
            config.schema.cache_enabled = parse_bool(&v);
        }

        // Grid ids
        let grids = &mut config.grids;
        for (key, slot) in [
            ("GRID_ID_SCHEDULE", &mut grids.schedule),
            ("GRID_ID_TICKET_ITEMS", &mut grids.ticket_items),
            ("GRID_ID_CUSTOMER_JOBS", &mut grids.customer_jobs),
            ("GRID_ID_CUSTOMER_INVOICES", &mut grids.customer_invoices),
            ("GRID_ID_INVOICE_DETAILS", &mut grids.invoice_details),
            ("GRID_ID_CUSTOMER_CONTACTS", &mut grids.customer_contacts),
            ("GRID_ID_DRIVERS", &mut grids.drivers),
        ] {
            if let Some(raw) = var(key) {
                *slot = parse_number(key, raw)?;
            }
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.grids.drivers, 34);
        assert_eq!(config.server.cors_allowed_origins.len(), 3);
        assert!(!config.schema.cache_enabled);
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("PORT", "9090"),
            ("GRID_BACKEND_URL", "http://tcr.internal/api"),
            ("GRID_BACKEND_API_KEY", "secret"),
            ("GRID_SCHEMA_CACHE", "yes"),
            ("GRID_ID_CUSTOMER_INVOICES", "41"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.backend.base_url, "http://tcr.internal/api");
        assert_eq!(config.backend.api_key.as_deref(), Some("secret"));
        assert!(config.schema.cache_enabled);
        assert_eq!(config.grids.customer_invoices, 41);
        assert_eq!(config.grids.drivers, 34);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = AppConfig::from_vars(vars(&[("GRID_ID_DRIVERS", "drivers")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "GRID_ID_DRIVERS"));
    }

    #[test]
    fn test_server_addr() {
        let config = AppConfig::default();
        let addr = config.server_addr();
        assert_eq!(addr.port(), 8080);
    }
}
