//! Configuration for the resilient HTTP client
//!
//! Provides environment-based configuration for the shared upstream transport
//! with defaults suited to the public Open-Meteo endpoints.

use crate::services::resilient_client::{
    CacheConfig, CircuitBreakerConfig, ResilientClientConfig, RetryConfig,
};
use super::env_or;
use std::env;

impl ResilientClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            read_timeout_seconds: env_or(
                "RESILIENT_CLIENT_READ_TIMEOUT",
                defaults.read_timeout_seconds,
            ),
            connect_timeout_seconds: env_or(
                "RESILIENT_CLIENT_CONNECT_TIMEOUT",
                defaults.connect_timeout_seconds,
            ),
            retry: RetryConfig::from_env(),
            circuit_breaker: CircuitBreakerConfig::from_env(),
            cache: CacheConfig::from_env(),
            enable_detailed_logging: env_or(
                "RESILIENT_CLIENT_DETAILED_LOGGING",
                defaults.enable_detailed_logging,
            ),
        }
    }
}

impl RetryConfig {
    /// Load retry configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Comma-separated status codes, e.g. "500,502,503"
        let retry_on_status = env::var("RESILIENT_CLIENT_RETRY_ON_STATUS")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse::<u16>().ok())
                    .collect()
            })
            .unwrap_or(defaults.retry_on_status);

        Self {
            max_retries: env_or("RESILIENT_CLIENT_RETRY_MAX_RETRIES", defaults.max_retries),
            initial_delay_ms: env_or(
                "RESILIENT_CLIENT_RETRY_INITIAL_DELAY_MS",
                defaults.initial_delay_ms,
            ),
            max_delay_ms: env_or("RESILIENT_CLIENT_RETRY_MAX_DELAY_MS", defaults.max_delay_ms),
            jitter: env_or("RESILIENT_CLIENT_RETRY_JITTER", defaults.jitter),
            retry_on_status,
        }
    }
}

impl CircuitBreakerConfig {
    /// Load circuit breaker configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            failure_threshold: env_or(
                "RESILIENT_CLIENT_CB_FAILURE_THRESHOLD",
                defaults.failure_threshold,
            ),
            success_threshold: env_or(
                "RESILIENT_CLIENT_CB_SUCCESS_THRESHOLD",
                defaults.success_threshold,
            ),
            timeout_seconds: env_or("RESILIENT_CLIENT_CB_TIMEOUT_SECONDS", defaults.timeout_seconds),
        }
    }
}

impl CacheConfig {
    /// Load response cache configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            enabled: env_or("RESILIENT_CLIENT_CACHE_ENABLED", defaults.enabled),
            ttl_seconds: env_or("RESILIENT_CLIENT_CACHE_TTL_SECONDS", defaults.ttl_seconds),
        }
    }
}
