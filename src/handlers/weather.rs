//! Average temperature endpoint handler.

use crate::{
    error::AppError,
    models::{AverageTemperatureQuery, AverageTemperatureResponse, DAYS_MUST_BE_POSITIVE},
    state::AppState,
};
use actix_web::{Error, Result, web};
use paperclip::actix::api_v2_operation;

/// Average temperature endpoint
///
/// Resolves `city` to coordinates, then averages the hourly 2m temperature
/// over the trailing `days` days.
#[api_v2_operation(
    summary = "City Average Temperature Endpoint",
    description = "Returns the mean hourly temperature (°C, 2 decimals) for a city over the last `days` days. Errors are returned as {\"detail\": message}.",
    tags("Weather"),
    parameters(
        ("city" = String, Query, description = "City name (e.g., London)"),
        ("days" = i64, Query, description = "Number of trailing days, greater than 0"),
    ),
    responses(
        (status = 200, description = "Successful response", body = AverageTemperatureResponse),
        (status = 400, description = "Bad Request - days must be greater than 0"),
        (status = 404, description = "City not found"),
        (status = 500, description = "Internal Server Error - geocoding or weather service failure")
    )
)]
pub async fn average_temperature(
    state: web::Data<AppState>,
    query: web::Query<AverageTemperatureQuery>,
) -> Result<web::Json<AverageTemperatureResponse>, Error> {
    let AverageTemperatureQuery { city, days } = query.into_inner();

    if days <= 0 {
        return Err(AppError::validation(DAYS_MUST_BE_POSITIVE).into());
    }

    let coordinates = state.resolver.resolve(&city).await?;
    let average_temperature = state
        .aggregator
        .average_temperature(coordinates, days)
        .await?;

    tracing::info!(
        city = %city,
        days,
        latitude = coordinates.latitude,
        longitude = coordinates.longitude,
        average_temperature,
        "Computed average temperature"
    );

    Ok(web::Json(AverageTemperatureResponse {
        city,
        days,
        average_temperature,
    }))
}

/// Turn query extraction failures into the `{"detail": ...}` error shape
pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> Error {
    AppError::validation(format!("Invalid query parameters: {err}")).into()
}
