//! Shared application state injected into handlers.

use crate::{
    config::AppConfig,
    error::StartupError,
    services::{
        AppMetrics, CoordinateResolver, ResilientClient, ResilientClientMetrics,
        TemperatureAggregator,
    },
};

/// Services shared by every worker
///
/// Both services hold clones of one [`ResilientClient`], so they share its
/// response cache, circuit breakers and connection pool.
#[derive(Clone)]
pub struct AppState {
    pub resolver: CoordinateResolver,
    pub aggregator: TemperatureAggregator,
}

impl AppState {
    pub fn new(resolver: CoordinateResolver, aggregator: TemperatureAggregator) -> Self {
        Self {
            resolver,
            aggregator,
        }
    }

    /// Build the shared transport and services, registering client metrics
    /// into `metrics`' registry
    pub fn from_config(config: &AppConfig, metrics: &AppMetrics) -> Result<Self, StartupError> {
        let client_metrics = ResilientClientMetrics::new(&metrics.registry)?;
        let client = ResilientClient::new(config.client.clone(), Some(client_metrics))?;

        Ok(Self::new(
            CoordinateResolver::new(client.clone(), config.upstream.geocoding_url.clone()),
            TemperatureAggregator::new(client, config.upstream.weather_url.clone()),
        ))
    }
}
