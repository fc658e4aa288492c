//! Configuration structures and loading utilities.
//!
//! Every structure loads from environment variables via `from_env()` and
//! falls back to the values of its `Default` implementation.

pub mod cors;
pub mod logging;
pub mod metrics;
pub mod resilient_client;
pub mod server;

pub use cors::*;
pub use logging::*;
pub use metrics::*;
pub use server::*;

use crate::services::resilient_client::ResilientClientConfig;
use std::{env, str::FromStr};

/// Parse `key` from the environment, falling back to `default` when unset or invalid
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Complete application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub client: ResilientClientConfig,
    pub cors: CorsConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load every section from the environment
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            upstream: UpstreamConfig::from_env(),
            client: ResilientClientConfig::from_env(),
            cors: CorsConfig::from_env(),
            metrics: MetricsConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}
