//! Version information endpoint handler.

use crate::{
    models::VersionResponse,
    services::{BUILD_COMMIT, BUILD_TIMESTAMP},
};
use actix_web::{Result, web};
use paperclip::actix::api_v2_operation;

/// Version information endpoint
///
/// Returns the crate version plus the commit and build time captured by the
/// build script.
#[api_v2_operation(
    summary = "Version Information Endpoint",
    description = "Returns the current API version, commit hash, and build time.",
    tags("Version"),
    responses(
        (status = 200, description = "Successful response", body = VersionResponse)
    )
)]
pub async fn version() -> Result<web::Json<VersionResponse>> {
    Ok(web::Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: BUILD_COMMIT.to_string(),
        build_time: BUILD_TIMESTAMP.to_string(),
    }))
}
