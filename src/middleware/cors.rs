//! CORS policy for the API, built on `actix-cors`.

use crate::config::CorsConfig;
use actix_cors::Cors;

/// Build the CORS middleware described by `config`
///
/// Every method and request header is accepted. A wildcard origin list
/// accepts any origin, which is echoed back rather than sent as `*` so
/// credentialed requests keep working.
pub fn cors_middleware(config: &CorsConfig) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(config.max_age as usize);

    let cors = if config.allows_any_origin() {
        cors.allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    };

    if config.allow_credentials {
        cors.supports_credentials()
    } else {
        cors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::Method, http::StatusCode, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().body("ok")
    }

    #[actix_web::test]
    async fn test_simple_request_gets_origin_headers() {
        let app = test::init_service(
            App::new()
                .wrap(cors_middleware(&CorsConfig::default()))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Origin", "https://app.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "https://app.example"
        );
        assert_eq!(
            resp.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[actix_web::test]
    async fn test_preflight_is_answered_directly() {
        let app = test::init_service(
            App::new()
                .wrap(cors_middleware(&CorsConfig::default()))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/")
            .insert_header(("Origin", "https://app.example"))
            .insert_header(("Access-Control-Request-Method", "GET"))
            .insert_header(("Access-Control-Request-Headers", "x-custom-header"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let methods = resp
            .headers()
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("GET"), "methods: {methods}");
        assert_eq!(resp.headers().get("access-control-max-age").unwrap(), "600");
    }

    #[actix_web::test]
    async fn test_credentials_header_follows_config() {
        let config = CorsConfig {
            allow_credentials: false,
            ..CorsConfig::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(cors_middleware(&config))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header(("Origin", "https://app.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.headers().get("access-control-allow-origin").is_some());
        assert!(resp.headers().get("access-control-allow-credentials").is_none());
    }

    #[actix_web::test]
    async fn test_disallowed_origin_preflight_is_rejected() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.example".to_string()],
            ..CorsConfig::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(cors_middleware(&config))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/")
            .insert_header(("Origin", "https://evil.example"))
            .insert_header(("Access-Control-Request-Method", "GET"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers().get("access-control-allow-origin").is_none());
    }
}
