//! Error types shared by the services and the HTTP layer.

use crate::models::ErrorResponse;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};

/// Detail returned when the geocoding service cannot be reached or answers
/// with a non-success status.
pub const GEOCODING_FAILURE: &str = "Failed to fetch city coordinates";

/// Outcome kinds of a temperature lookup
///
/// Every variant renders as `{"detail": "<message>"}` with the matching status code.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    /// Bad caller input (400)
    #[error("{0}")]
    Validation(String),

    /// The city could not be resolved to coordinates (404)
    #[error("City not found")]
    NotFound,

    /// Geocoding or weather service failure, including malformed responses (500)
    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            detail: self.to_string(),
        })
    }
}

/// Failures while wiring the application together at startup
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to register metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl From<StartupError> for std::io::Error {
    fn from(err: StartupError) -> Self {
        std::io::Error::other(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::validation("Days must be greater than 0").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::upstream("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_error_body_is_detail_json() {
        let response = AppError::NotFound.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "detail": "City not found" }));
    }
}
