use actix_web::{HttpServer, web};
use city_temperature_api::{AppConfig, AppMetrics, AppState, create_app, init_tracing};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::from_env();

    if let Err(e) = init_tracing(&config.logging) {
        eprintln!("Failed to initialise logging: {e}");
    }

    let metrics = AppMetrics::new().map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState::from_config(&config, &metrics)?);
    let metrics = web::Data::new(metrics);

    let bind_address = config.server.bind_address();
    tracing::info!(
        host = %bind_address.0,
        port = bind_address.1,
        geocoding_url = %config.upstream.geocoding_url,
        weather_url = %config.upstream.weather_url,
        cache_ttl_seconds = config.client.cache.ttl_seconds,
        max_retries = config.client.retry.max_retries,
        "Starting City Temperature API"
    );

    HttpServer::new(move || create_app(config.clone(), state.clone(), metrics.clone()))
        .bind(bind_address)?
        .run()
        .await
}
