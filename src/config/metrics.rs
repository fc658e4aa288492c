//! Metrics configuration.

use super::env_or;

/// Whether `/api/metrics` serves the Prometheus registry
///
/// Collection itself always runs; disabling only hides the endpoint (503).
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Load from `METRICS_ENABLED` (`true`/`false`)
    pub fn from_env() -> Self {
        Self {
            enabled: env_or("METRICS_ENABLED", Self::default().enabled),
        }
    }
}
