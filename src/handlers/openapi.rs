//! OpenAPI specification generation and app factory.

use crate::{
    config::AppConfig,
    handlers::{average_temperature, get_metrics, health, query_error_handler, version},
    middleware::{MetricsMiddleware, RequestIdMiddleware, cors_middleware},
    services::AppMetrics,
    state::AppState,
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};

/// Creates the OpenAPI document served at `/api/spec/v2`
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "City Temperature API".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            description: Some(
                "Average temperature for a city over a trailing window of days.\n\n\
                ## Data sources\n\
                - City names are resolved with the Open-Meteo geocoding API (first match).\n\
                - Hourly `temperature_2m` values come from the Open-Meteo historical forecast API.\n\
                \n\
                ## Errors\n\
                Failures are returned as `{\"detail\": \"message\"}`:\n\
                - `400` invalid query parameters or `days` not greater than 0\n\
                - `404` city not found\n\
                - `500` geocoding or weather service failure\n\
                \n\
                ## Caching\n\
                Upstream responses are cached in memory (`RESILIENT_CLIENT_CACHE_TTL_SECONDS`, default one hour)."
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the application with all routes, middleware and shared state
///
/// `state` and `metrics` are created once by the caller and cloned into each
/// worker, so every worker shares the same upstream cache and registry.
pub fn create_app(
    config: AppConfig,
    state: web::Data<AppState>,
    metrics: web::Data<AppMetrics>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(RequestIdMiddleware)
        .wrap(MetricsMiddleware)
        .wrap(cors_middleware(&config.cors))
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(state)
        .app_data(metrics)
        .app_data(web::Data::new(config.metrics))
        .app_data(actix_web::web::QueryConfig::default().error_handler(query_error_handler))
        .service(web::resource("/weather/average").route(web::get().to(average_temperature)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/version").route(web::get().to(version)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
