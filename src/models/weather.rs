//! Request-scoped weather values: coordinates, date ranges and hourly series.

use crate::error::AppError;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Detail returned for a non-positive day count
pub const DAYS_MUST_BE_POSITIVE: &str = "Days must be greater than 0";

/// Number of hourly samples in one day of the averaging window
pub const HOURS_PER_DAY: usize = 24;

/// Geographic position of a resolved city
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Some(Self {
                latitude,
                longitude,
            })
        } else {
            None
        }
    }
}

/// Inclusive UTC calendar-date range sent to the weather service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// The `days` calendar days preceding `now`, plus the current UTC day.
    ///
    /// A `days` too large for the calendar is an upstream failure (500), not
    /// a validation error: 400 is reserved for non-positive values.
    pub fn trailing(now: DateTime<Utc>, days: i64) -> Result<Self, AppError> {
        if days <= 0 {
            return Err(AppError::validation(DAYS_MUST_BE_POSITIVE));
        }

        let end = now.date_naive();
        let start = TimeDelta::try_days(days)
            .and_then(|delta| end.checked_sub_signed(delta))
            .ok_or_else(|| {
                AppError::upstream("Error fetching weather data: start date is out of range")
            })?;

        Ok(Self { start, end })
    }

    /// Dates formatted as `YYYY-MM-DD` for query strings
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

/// Number of trailing hourly samples averaged for `days`
pub fn window_len(days: i64) -> usize {
    usize::try_from(days)
        .unwrap_or(0)
        .saturating_mul(HOURS_PER_DAY)
}

/// One hourly reading; `temperature` is `None` where the service has no value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub timestamp: DateTime<Utc>,
    pub temperature: Option<f64>,
}

/// Problems building a series from the weather service's hourly block
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("hourly series has {timestamps} timestamps but {values} temperature values")]
    LengthMismatch { timestamps: usize, values: usize },

    #[error("hourly timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

/// Time-indexed hourly temperatures, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    samples: Vec<HourlySample>,
}

impl HourlySeries {
    /// Pair unix-second timestamps with temperature values positionally.
    pub fn from_unix(timestamps: &[i64], values: &[Option<f64>]) -> Result<Self, SeriesError> {
        if timestamps.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }

        let samples = timestamps
            .iter()
            .zip(values)
            .map(|(&secs, &temperature)| {
                DateTime::from_timestamp(secs, 0)
                    .map(|timestamp| HourlySample {
                        timestamp,
                        temperature,
                    })
                    .ok_or(SeriesError::InvalidTimestamp(secs))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[HourlySample] {
        &self.samples
    }

    /// Sampling interval, taken from the first two timestamps
    pub fn interval(&self) -> Option<TimeDelta> {
        match self.samples.as_slice() {
            [first, second, ..] => Some(second.timestamp - first.timestamp),
            _ => None,
        }
    }

    /// Declared start of the series
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.timestamp)
    }

    /// Exclusive end: last timestamp plus one interval (one hour for single samples)
    pub fn end(&self) -> Option<DateTime<Utc>> {
        let last = self.samples.last()?;
        let step = self.interval().unwrap_or_else(|| TimeDelta::hours(1));
        Some(last.timestamp + step)
    }

    /// The most recent `n` samples (all of them when the series is shorter)
    pub fn tail(&self, n: usize) -> &[HourlySample] {
        let start = self.samples.len().saturating_sub(n);
        &self.samples[start..]
    }
}

/// Arithmetic mean of the present temperatures, skipping gaps
pub fn mean_temperature(samples: &[HourlySample]) -> Option<f64> {
    let (sum, count) = samples
        .iter()
        .filter_map(|s| s.temperature)
        .fold((0.0_f64, 0_usize), |(sum, count), t| (sum + t, count + 1));

    (count > 0).then(|| sum / count as f64)
}

/// Round to 2 decimal places, ties to even
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
