//! Average temperature over a trailing window of days, computed from the
//! Open-Meteo historical forecast API.
//!
//! The weather service is asked for whole UTC calendar days
//! (`today - days ..= today`), while the average covers the last `days * 24`
//! hourly samples of the returned series. Both are kept as-is: the upstream
//! range is always at least as long as the averaging window.

use crate::{
    error::AppError,
    models::{
        Coordinates, DateRange, HourlySeries, SeriesError, mean_temperature, round_to_hundredths,
        window_len,
    },
    services::resilient_client::{ResilientClient, ResilientClientError},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Hourly variable requested from the weather service
const HOURLY_VARIABLE: &str = "temperature_2m";

/// Forecast API response, limited to the fields used here
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyBlock,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    /// Unix seconds (requested with `timeformat=unixtime`)
    time: Vec<i64>,
    temperature_2m: Vec<Option<f64>>,
}

/// Body Open-Meteo sends alongside 4xx statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    reason: String,
}

/// Failures while fetching the hourly series
#[derive(Debug, thiserror::Error)]
enum WeatherFetchError {
    #[error("{0}")]
    Transport(#[from] ResilientClientError),

    #[error("weather service returned status {status}: {reason}")]
    Api { status: u16, reason: String },

    #[error("invalid weather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid hourly data: {0}")]
    Series(#[from] SeriesError),

    #[error("invalid weather service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("no temperature samples in the requested window")]
    NoSamples,
}

/// Computes trailing-window mean temperatures for coordinates
#[derive(Clone)]
pub struct TemperatureAggregator {
    client: ResilientClient,
    base_url: String,
}

impl TemperatureAggregator {
    pub fn new(client: ResilientClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Mean hourly temperature over the last `days` days, rounded to 2 decimals
    pub async fn average_temperature(
        &self,
        coordinates: Coordinates,
        days: i64,
    ) -> Result<f64, AppError> {
        self.average_temperature_at(coordinates, days, Utc::now())
            .await
    }

    /// Same as [`Self::average_temperature`] with an explicit current time
    pub async fn average_temperature_at(
        &self,
        coordinates: Coordinates,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<f64, AppError> {
        let range = DateRange::trailing(now, days)?;

        self.compute(coordinates, days, &range).await.map_err(|e| {
            tracing::error!(
                latitude = coordinates.latitude,
                longitude = coordinates.longitude,
                days,
                error = %e,
                "Failed to compute average temperature"
            );
            AppError::upstream(format!("Error fetching weather data: {e}"))
        })
    }

    async fn compute(
        &self,
        coordinates: Coordinates,
        days: i64,
        range: &DateRange,
    ) -> Result<f64, WeatherFetchError> {
        let series = self.fetch_hourly(coordinates, range).await?;

        let window = window_len(days);
        let tail = series.tail(window);
        if tail.len() < window {
            tracing::warn!(
                requested = window,
                available = tail.len(),
                "Hourly series shorter than requested window, averaging available samples"
            );
        }

        let mean = mean_temperature(tail).ok_or(WeatherFetchError::NoSamples)?;
        Ok(round_to_hundredths(mean))
    }

    async fn fetch_hourly(
        &self,
        coordinates: Coordinates,
        range: &DateRange,
    ) -> Result<HourlySeries, WeatherFetchError> {
        let url = url::Url::parse_with_params(
            &self.base_url,
            &[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("start_date", range.start_param()),
                ("end_date", range.end_param()),
                ("hourly", HOURLY_VARIABLE.to_string()),
                ("timeformat", "unixtime".to_string()),
            ],
        )?;

        let response = self.client.get(url.as_str()).await?;

        if !response.status().is_success() {
            let reason = response
                .json::<ApiErrorBody>()
                .map(|body| body.reason)
                .unwrap_or_else(|_| {
                    response
                        .status()
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                });
            return Err(WeatherFetchError::Api {
                status: response.status().as_u16(),
                reason,
            });
        }

        let body: ForecastResponse = response.json()?;
        let series = HourlySeries::from_unix(&body.hourly.time, &body.hourly.temperature_2m)?;

        tracing::debug!(
            samples = series.len(),
            start = ?series.start(),
            end = ?series.end(),
            interval_seconds = series.interval().map(|i| i.num_seconds()),
            cached = response.is_cached(),
            "Fetched hourly temperature series"
        );

        Ok(series)
    }
}
