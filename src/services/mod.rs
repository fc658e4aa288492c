//! Business logic and service layer modules.
//!
//! This module contains the coordinate resolver, the temperature aggregator,
//! the shared resilient HTTP transport they both use, and metrics collection.

pub mod cache;
pub mod geocoding;
pub mod metrics;
pub mod resilient_client;
pub mod temperature;

pub use cache::ResponseCache;
pub use geocoding::CoordinateResolver;
pub use metrics::*;
pub use resilient_client::{
    ResilientClient, ResilientClientConfig, ResilientClientError, ResilientClientMetrics,
    UpstreamResponse,
};
pub use temperature::TemperatureAggregator;
