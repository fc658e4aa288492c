//! API request and response models.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Response model for the health check endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response model for the version information endpoint
#[derive(Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct VersionResponse {
    pub version: String,
    pub commit: String,
    pub build_time: String,
}

/// Query parameters for the average temperature endpoint
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct AverageTemperatureQuery {
    /// City name (e.g., "London")
    pub city: String,
    /// Number of trailing days to average over
    pub days: i64,
}

/// Response model for the average temperature endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Apiv2Schema)]
pub struct AverageTemperatureResponse {
    /// City name as supplied by the caller
    pub city: String,
    pub days: i64,
    /// Mean hourly temperature at 2m in °C, rounded to 2 decimal places
    pub average_temperature: f64,
}

/// Error body returned for every non-2xx answer of the weather endpoint
#[derive(Clone, Debug, Serialize, Deserialize, Apiv2Schema)]
pub struct ErrorResponse {
    pub detail: String,
}
