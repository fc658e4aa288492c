//! Health check endpoint handler.

use crate::models::HealthResponse;
use actix_web::{Result, web};
use paperclip::actix::api_v2_operation;

/// Health check endpoint
///
/// Liveness only: upstream services are not contacted.
#[api_v2_operation(
    summary = "Health Check Endpoint",
    description = "Returns the current health status of the API in JSON format.",
    tags("Health"),
    responses(
        (status = 200, description = "Successful response", body = HealthResponse)
    )
)]
pub async fn health() -> Result<web::Json<HealthResponse>> {
    Ok(web::Json(HealthResponse {
        status: "healthy".to_string(),
    }))
}
