//! Cross-origin resource sharing configuration.

use std::env;

/// Configuration for the CORS middleware
///
/// The default answers every origin, method and header, with credentials.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; `*` allows any
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds
    pub max_age: u32,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
            max_age: 600,
        }
    }
}

impl CorsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        let allow_credentials = env::var("CORS_ALLOW_CREDENTIALS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(defaults.allow_credentials);

        let max_age = env::var("CORS_MAX_AGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_age);

        Self {
            allowed_origins,
            allow_credentials,
            max_age,
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_allows_everything() {
        let config = CorsConfig::default();
        assert!(config.allows_any_origin());
        assert!(config.allow_credentials);
    }

    #[test]
    fn test_origins_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();

        unsafe {
            env::set_var("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,");
            env::set_var("CORS_ALLOW_CREDENTIALS", "false");
        }

        let config = CorsConfig::from_env();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(!config.allow_credentials);
        assert!(!config.allows_any_origin());

        unsafe {
            env::remove_var("CORS_ALLOWED_ORIGINS");
            env::remove_var("CORS_ALLOW_CREDENTIALS");
        }
    }
}
