//! City Temperature API - average temperature for a city over trailing days
//!
//! A small Actix Web service in front of two Open-Meteo APIs:
//! - the geocoding API resolves a city name to coordinates
//! - the historical forecast API supplies hourly `temperature_2m` values,
//!   whose trailing `days * 24` samples are averaged
//!
//! ## Architecture
//!
//! - `models/` - Request/response models and weather value types
//! - `handlers/` - HTTP request handlers and the app factory
//! - `middleware/` - CORS, request IDs and metrics collection
//! - `services/` - Coordinate resolver, temperature aggregator, and the shared
//!   resilient HTTP client (retries, circuit breaker, response cache)
//! - `config/` - Configuration structures loaded from the environment
//! - `utils/` - Request inspection helpers
//!
//! ## Quick Start
//!
//! ```no_run
//! use actix_web::{HttpServer, web};
//! use city_temperature_api::{AppConfig, AppMetrics, AppState, create_app};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let config = AppConfig::from_env();
//!     let metrics = AppMetrics::new().map_err(std::io::Error::other)?;
//!     let state = web::Data::new(AppState::from_config(&config, &metrics)?);
//!     let metrics = web::Data::new(metrics);
//!
//!     HttpServer::new(move || create_app(config.clone(), state.clone(), metrics.clone()))
//!         .bind(("127.0.0.1", 8080))?
//!         .run()
//!         .await
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use config::{AppConfig, CorsConfig, LoggingConfig, MetricsConfig, ServerConfig, UpstreamConfig};
pub use error::{AppError, StartupError};
pub use handlers::{average_temperature, create_app, create_openapi_spec, get_metrics, health, version};
pub use middleware::{MetricsMiddleware, RequestIdMiddleware, cors_middleware};
pub use models::{
    AverageTemperatureQuery, AverageTemperatureResponse, Coordinates, ErrorResponse,
    HealthResponse, VersionResponse,
};
pub use services::{
    AppMetrics, CoordinateResolver, ResilientClient, ResilientClientConfig, ResilientClientError,
    ResilientClientMetrics, TemperatureAggregator,
};
pub use state::AppState;
pub use telemetry::init_tracing;
