//! Route pattern extraction utilities.

use actix_web::HttpRequest;

/// Route label for metrics
///
/// Uses the registered resource pattern so unmatched paths collapse into a
/// single `/unknown` label.
pub fn extract_route_pattern(req: &HttpRequest) -> String {
    req.match_pattern()
        .unwrap_or_else(|| "/unknown".to_string())
}
