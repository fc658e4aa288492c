//! Listener and upstream endpoint configuration.

use super::env_or;
use std::env;

pub const DEFAULT_GEOCODING_API_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_WEATHER_API_URL: &str =
    "https://historical-forecast-api.open-meteo.com/v1/forecast";

/// Address the HTTP server binds to
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Load configuration from `HOST` and `PORT`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);
        let port = env_or("PORT", defaults.port);

        Self { host, port }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

/// Base URLs of the Open-Meteo services
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub geocoding_url: String,
    pub weather_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_API_URL.to_string(),
            weather_url: DEFAULT_WEATHER_API_URL.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Load configuration from `GEOCODING_API_URL` and `WEATHER_API_URL`
    pub fn from_env() -> Self {
        Self {
            geocoding_url: env::var("GEOCODING_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_API_URL.to_string()),
            weather_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| DEFAULT_WEATHER_API_URL.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.bind_address(), ("127.0.0.1".to_string(), 8080));

        let upstream = UpstreamConfig::default();
        assert!(upstream.geocoding_url.starts_with("https://geocoding-api.open-meteo.com"));
        assert!(upstream.weather_url.ends_with("/v1/forecast"));
    }
}
