//! Coordinate resolution through the Open-Meteo geocoding API.

use crate::{
    error::{AppError, GEOCODING_FAILURE},
    models::Coordinates,
    services::resilient_client::ResilientClient,
};
use serde::Deserialize;

/// Geocoding API response; `results` is absent when nothing matched
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    latitude: f64,
    longitude: f64,
}

/// Resolves free-text city names to coordinates
#[derive(Clone)]
pub struct CoordinateResolver {
    client: ResilientClient,
    base_url: String,
}

impl CoordinateResolver {
    pub fn new(client: ResilientClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Look up the first geocoding match for `city`
    pub async fn resolve(&self, city: &str) -> Result<Coordinates, AppError> {
        if city.trim().is_empty() {
            return Err(AppError::NotFound);
        }

        let url = url::Url::parse_with_params(&self.base_url, &[("name", city), ("count", "1")])
            .map_err(|e| {
                tracing::error!(base_url = %self.base_url, error = %e, "Invalid geocoding URL");
                AppError::upstream(GEOCODING_FAILURE)
            })?;

        let response = self.client.get(url.as_str()).await.map_err(|e| {
            tracing::error!(city = %city, error = %e, "Geocoding request failed");
            AppError::upstream(GEOCODING_FAILURE)
        })?;

        if !response.status().is_success() {
            tracing::error!(
                city = %city,
                status = response.status().as_u16(),
                "Geocoding service returned an error status"
            );
            return Err(AppError::upstream(GEOCODING_FAILURE));
        }

        let body: GeocodingResponse = response.json().map_err(|e| {
            tracing::error!(city = %city, error = %e, "Failed to parse geocoding response");
            AppError::upstream(format!("Failed to parse geocoding response: {e}"))
        })?;

        let location = body
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or(AppError::NotFound)?;

        let coordinates = Coordinates::new(location.latitude, location.longitude)
            .ok_or_else(|| AppError::upstream("Geocoding service returned invalid coordinates"))?;

        tracing::debug!(
            city = %city,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            cached = response.is_cached(),
            "Resolved city coordinates"
        );

        Ok(coordinates)
    }
}
