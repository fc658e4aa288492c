use actix_web::{http::StatusCode, test, web};
use city_temperature_api::{AppConfig, AppMetrics, AppState, CorsConfig, MetricsConfig, create_app};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_data(config: &AppConfig) -> (web::Data<AppState>, web::Data<AppMetrics>) {
    let metrics = AppMetrics::new().unwrap();
    let state = AppState::from_config(config, &metrics).unwrap();
    (web::Data::new(state), web::Data::new(metrics))
}

/// Integration test for the health check endpoint
///
/// Runs through the complete application (OpenAPI wrapper and middleware stack)
/// rather than the bare handler.
#[actix_web::test]
async fn test_health_endpoint_integration() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK, "Expected 200 OK status");

    let content_type = resp
        .headers()
        .get("content-type")
        .expect("Content-Type header should be present")
        .to_str()
        .unwrap();
    assert!(
        content_type.contains("application/json"),
        "Expected JSON content type, got: {content_type}"
    );

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "healthy"}));
}

/// Integration test for the version endpoint
#[actix_web::test]
async fn test_version_endpoint_integration() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get().uri("/api/version").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["version"], json!("0.1.0"));
    assert!(body["commit"].is_string(), "Commit should be a string");
    assert!(body["build_time"].is_string(), "Build time should be a string");
}

/// Test that Request ID middleware adds X-Request-ID header to responses
#[actix_web::test]
async fn test_request_id_header_added() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;

    let request_id = resp
        .headers()
        .get("x-request-id")
        .expect("X-Request-ID header should be present");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("X-Request-ID", "client-supplied-id"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("x-request-id").unwrap(),
        "client-supplied-id"
    );
}

/// The metrics endpoint exposes server and upstream client metrics from one registry
#[actix_web::test]
async fn test_metrics_endpoint_integration() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let mut config = AppConfig::default();
    config.upstream.geocoding_url = format!("{}/v1/search", mock_server.uri());
    config.client.retry.max_retries = 0;
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get()
        .uri("/weather/average?city=Atlantis&days=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let output = std::str::from_utf8(&body).unwrap();
    assert!(output.contains("http_requests_total"));
    assert!(output.contains("route=\"/weather/average\""));
    assert!(output.contains("resilient_http_requests_total"));
    assert!(output.contains("app_uptime_seconds"));
}

#[actix_web::test]
async fn test_metrics_endpoint_disabled() {
    let config = AppConfig {
        metrics: MetricsConfig { enabled: false },
        ..AppConfig::default()
    };
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn test_openapi_spec_served() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get().uri("/api/spec/v2").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let spec: Value = test::read_body_json(resp).await;
    assert_eq!(spec["info"]["title"], json!("City Temperature API"));
    assert!(spec["paths"].get("/weather/average").is_some());
    assert!(spec["paths"].get("/api/health").is_some());
}

#[actix_web::test]
async fn test_cors_preflight_on_weather_endpoint() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/weather/average")
        .insert_header(("Origin", "http://localhost:3000"))
        .insert_header(("Access-Control-Request-Method", "GET"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        resp.headers().get("access-control-allow-credentials").unwrap(),
        "true"
    );
    assert!(resp.headers().get("access-control-allow-methods").is_some());
}

#[actix_web::test]
async fn test_cors_headers_on_error_responses() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get()
        .uri("/weather/average?city=London&days=0")
        .insert_header(("Origin", "https://dashboard.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://dashboard.example"
    );
}

#[actix_web::test]
async fn test_cors_restricted_origins() {
    let config = AppConfig {
        cors: CorsConfig {
            allowed_origins: vec!["https://dashboard.example".to_string()],
            ..CorsConfig::default()
        },
        ..AppConfig::default()
    };
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("Origin", "https://other.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.headers().get("access-control-allow-origin").is_none());

    let req = test::TestRequest::get()
        .uri("/api/health")
        .insert_header(("Origin", "https://dashboard.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "https://dashboard.example"
    );
}

#[actix_web::test]
async fn test_unknown_route_returns_404() {
    let config = AppConfig::default();
    let (state, metrics) = app_data(&config);
    let app = test::init_service(create_app(config, state, metrics)).await;

    let req = test::TestRequest::get().uri("/weather/median").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
