//! Shared upstream HTTP transport with retries, timeouts, circuit breaking
//! and a time-bounded response cache.
//!
//! One [`ResilientClient`] is built at startup and cloned into every service
//! that talks to Open-Meteo. Clones share the connection pool, the response
//! cache and the per-host circuit breakers.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use prometheus::{CounterVec, GaugeVec, HistogramVec, Opts, Registry};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio_retry::{Retry, strategy::ExponentialBackoff};
use tracing::{debug, error, info, warn};

use super::cache::ResponseCache;

/// Configuration for the resilient HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilientClientConfig {
    /// Timeout for sending a request and reading its body (in seconds)
    pub read_timeout_seconds: u64,

    /// Connection timeout (in seconds)
    pub connect_timeout_seconds: u64,

    pub retry: RetryConfig,

    pub circuit_breaker: CircuitBreakerConfig,

    pub cache: CacheConfig,

    /// Log every attempt outcome
    pub enable_detailed_logging: bool,
}

/// Retry configuration
///
/// Delays grow as `initial_delay_ms * 2^n`, capped at `max_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// First retry delay in milliseconds
    pub initial_delay_ms: u64,

    pub max_delay_ms: u64,

    /// Randomise each delay within [0, delay)
    pub jitter: bool,

    /// Retry on these HTTP status codes
    pub retry_on_status: Vec<u16>,
}

/// Simple circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: usize,

    /// Successes in half-open state needed to close it again
    pub success_threshold: usize,

    /// Time the circuit stays open before a trial call (in seconds)
    pub timeout_seconds: u64,
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

impl Default for ResilientClientConfig {
    fn default() -> Self {
        Self {
            read_timeout_seconds: 10,
            connect_timeout_seconds: 3,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            cache: CacheConfig::default(),
            enable_detailed_logging: true,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            jitter: true,
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            timeout_seconds: 60,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 3600,
        }
    }
}

impl RetryConfig {
    /// Backoff delays for successive retries
    pub fn delays(&self) -> impl Iterator<Item = Duration> + use<> {
        let jitter = self.jitter;
        ExponentialBackoff::from_millis(2)
            .factor((self.initial_delay_ms / 2).max(1))
            .max_delay(Duration::from_millis(self.max_delay_ms))
            .map(move |delay| {
                if jitter {
                    tokio_retry::strategy::jitter(delay)
                } else {
                    delay
                }
            })
            .take(self.max_retries)
    }
}

/// Circuit breaker state
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreakerState {
    fn gauge_value(&self) -> f64 {
        match self {
            CircuitBreakerState::Closed => 0.0,
            CircuitBreakerState::Open => 1.0,
            CircuitBreakerState::HalfOpen => 2.0,
        }
    }
}

/// Consecutive-failure circuit breaker for one upstream host
#[derive(Debug)]
pub struct SimpleCircuitBreaker {
    state: CircuitBreakerState,
    failure_count: usize,
    success_count: usize,
    config: CircuitBreakerConfig,
    opened_at: Option<Instant>,
}

impl SimpleCircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            state: CircuitBreakerState::Closed,
            failure_count: 0,
            success_count: 0,
            config,
            opened_at: None,
        }
    }

    /// Whether a call may go out; moves Open to HalfOpen once the timeout passed
    pub fn call_allowed(&mut self) -> bool {
        match self.state {
            CircuitBreakerState::Closed | CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => {
                let cooled_down = self.opened_at.is_some_and(|at| {
                    at.elapsed() >= Duration::from_secs(self.config.timeout_seconds)
                });
                if cooled_down {
                    self.state = CircuitBreakerState::HalfOpen;
                    self.success_count = 0;
                }
                cooled_down
            }
        }
    }

    pub fn on_success(&mut self) {
        self.failure_count = 0;

        if self.state == CircuitBreakerState::HalfOpen {
            self.success_count += 1;
            if self.success_count >= self.config.success_threshold {
                self.state = CircuitBreakerState::Closed;
            }
        }
    }

    pub fn on_failure(&mut self) {
        self.failure_count += 1;

        let trial_failed = self.state == CircuitBreakerState::HalfOpen;
        if trial_failed || self.failure_count >= self.config.failure_threshold {
            self.state = CircuitBreakerState::Open;
            self.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self) -> &CircuitBreakerState {
        &self.state
    }
}

/// Prometheus metrics for upstream calls
#[derive(Clone)]
pub struct ResilientClientMetrics {
    /// Requests by destination, method and outcome
    pub http_requests_total: CounterVec,

    pub http_request_duration_seconds: HistogramVec,

    /// Failed attempts by destination and reason
    pub retry_attempts_total: CounterVec,

    /// 0=closed, 1=open, 2=half-open
    pub circuit_breaker_state: GaugeVec,

    pub timeouts_total: CounterVec,

    /// Cache lookups by destination and outcome (hit/miss)
    pub cache_lookups_total: CounterVec,
}

impl ResilientClientMetrics {
    /// Create the collectors and register them with `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let http_requests_total = CounterVec::new(
            Opts::new(
                "resilient_http_requests_total",
                "Total upstream HTTP requests by destination, method, and outcome",
            ),
            &["destination", "method", "outcome"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "resilient_http_request_duration_seconds",
                "Duration of upstream HTTP requests including retries",
            )
            .buckets(vec![
                0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["destination", "method"],
        )?;

        let retry_attempts_total = CounterVec::new(
            Opts::new(
                "resilient_http_retry_attempts_total",
                "Failed upstream attempts by destination and reason",
            ),
            &["destination", "reason"],
        )?;

        let circuit_breaker_state = GaugeVec::new(
            Opts::new(
                "resilient_http_circuit_breaker_state",
                "Circuit breaker state (0=closed, 1=open, 2=half-open)",
            ),
            &["destination"],
        )?;

        let timeouts_total = CounterVec::new(
            Opts::new(
                "resilient_http_timeouts_total",
                "Upstream request timeouts by destination",
            ),
            &["destination"],
        )?;

        let cache_lookups_total = CounterVec::new(
            Opts::new(
                "resilient_http_cache_lookups_total",
                "Response cache lookups by destination and outcome",
            ),
            &["destination", "outcome"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(retry_attempts_total.clone()))?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;
        registry.register(Box::new(timeouts_total.clone()))?;
        registry.register(Box::new(cache_lookups_total.clone()))?;

        Ok(Self {
            http_requests_total,
            http_request_duration_seconds,
            retry_attempts_total,
            circuit_breaker_state,
            timeouts_total,
            cache_lookups_total,
        })
    }
}

/// A fully read upstream response
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    status: StatusCode,
    body: String,
    from_cache: bool,
}

impl UpstreamResponse {
    pub fn new(status: StatusCode, body: String) -> Self {
        Self {
            status,
            body,
            from_cache: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether this response was served from the response cache
    pub fn is_cached(&self) -> bool {
        self.from_cache
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    fn into_cached(mut self) -> Self {
        self.from_cache = true;
        self
    }
}

/// Request context for logging and metrics
#[derive(Debug, Clone)]
struct RequestContext {
    destination: String,
    method: &'static str,
    url: String,
}

/// Resilient HTTP client with retries, timeouts, circuit breakers and caching
#[derive(Clone)]
pub struct ResilientClient {
    client: Client,
    config: ResilientClientConfig,
    metrics: Option<ResilientClientMetrics>,
    circuit_breakers: Arc<Mutex<HashMap<String, SimpleCircuitBreaker>>>,
    cache: Option<ResponseCache>,
}

impl ResilientClient {
    /// Create a new resilient HTTP client
    pub fn new(
        config: ResilientClientConfig,
        metrics: Option<ResilientClientMetrics>,
    ) -> Result<Self, reqwest::Error> {
        // The read timeout is applied per attempt in `execute_request`
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = config
            .cache
            .enabled
            .then(|| ResponseCache::new(Duration::from_secs(config.cache.ttl_seconds)));

        Ok(Self {
            client,
            config,
            metrics,
            circuit_breakers: Arc::new(Mutex::new(HashMap::new())),
            cache,
        })
    }

    pub fn config(&self) -> &ResilientClientConfig {
        &self.config
    }

    /// Execute an HTTP GET, serving fresh successful responses from the cache
    pub async fn get(&self, url: &str) -> Result<UpstreamResponse, ResilientClientError> {
        let parsed =
            url::Url::parse(url).map_err(|e| ResilientClientError::InvalidUrl(e.to_string()))?;

        let context = RequestContext {
            destination: parsed.host_str().unwrap_or("unknown").to_string(),
            method: "GET",
            url: url.to_string(),
        };

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(url) {
                self.record_cache_lookup(&context, "hit");
                debug!(destination = %context.destination, url = %context.url, "Serving upstream response from cache");
                return Ok(hit.into_cached());
            }
            self.record_cache_lookup(&context, "miss");
        }

        let result = self.execute_request(&context).await;

        if let Some(cache) = &self.cache
            && let Ok(response) = &result
            && response.status().is_success()
        {
            cache.insert(url, response.clone());
        }

        result
    }

    async fn execute_request(
        &self,
        context: &RequestContext,
    ) -> Result<UpstreamResponse, ResilientClientError> {
        self.check_circuit(context)?;

        let timeout = Duration::from_secs(self.config.read_timeout_seconds);
        let started = Instant::now();

        let result = Retry::spawn(self.config.retry.delays(), || {
            let client = self.client.clone();
            async move {
                let attempt = Instant::now();
                let outcome = tokio::time::timeout(timeout, async {
                    let response = client.get(&context.url).send().await?;
                    let status = response.status();
                    let body = response.text().await?;
                    Ok::<_, reqwest::Error>(UpstreamResponse::new(status, body))
                })
                .await;

                match outcome {
                    Ok(Ok(response)) => {
                        let status = response.status().as_u16();
                        if self.config.retry.retry_on_status.contains(&status) {
                            if self.config.enable_detailed_logging {
                                warn!(
                                    destination = %context.destination,
                                    url = %context.url,
                                    status,
                                    duration_ms = attempt.elapsed().as_millis(),
                                    "Upstream request failed with retryable status"
                                );
                            }
                            self.record_retry_attempt(context, "http_status");
                            Err(ResilientClientError::RetryableStatus(status))
                        } else {
                            if self.config.enable_detailed_logging {
                                info!(
                                    destination = %context.destination,
                                    url = %context.url,
                                    status,
                                    duration_ms = attempt.elapsed().as_millis(),
                                    "Upstream request completed"
                                );
                            }
                            Ok(response)
                        }
                    }
                    Ok(Err(e)) => {
                        if self.config.enable_detailed_logging {
                            error!(
                                destination = %context.destination,
                                url = %context.url,
                                error = %e,
                                duration_ms = attempt.elapsed().as_millis(),
                                "Upstream request failed with network error"
                            );
                        }
                        self.record_retry_attempt(context, "network_error");
                        Err(ResilientClientError::NetworkError(e))
                    }
                    Err(_) => {
                        if self.config.enable_detailed_logging {
                            warn!(
                                destination = %context.destination,
                                url = %context.url,
                                timeout_seconds = timeout.as_secs(),
                                "Upstream request timed out"
                            );
                        }
                        self.record_timeout(context);
                        self.record_retry_attempt(context, "timeout");
                        Err(ResilientClientError::Timeout)
                    }
                }
            }
        })
        .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ResilientClientError::RetryableStatus(_)) => "retry_exhausted",
            Err(ResilientClientError::NetworkError(_)) => "network_error",
            Err(ResilientClientError::Timeout) => "timeout",
            Err(_) => "error",
        };
        self.record_request_metrics(context, outcome, started.elapsed());
        self.update_circuit(context, result.is_ok());

        result
    }

    fn check_circuit(&self, context: &RequestContext) -> Result<(), ResilientClientError> {
        let mut breakers = self.lock_breakers();
        let breaker = breakers
            .entry(context.destination.clone())
            .or_insert_with(|| SimpleCircuitBreaker::new(self.config.circuit_breaker.clone()));

        let allowed = breaker.call_allowed();
        self.record_circuit_breaker_state(&context.destination, breaker.state().gauge_value());

        if allowed {
            Ok(())
        } else {
            warn!(
                destination = %context.destination,
                url = %context.url,
                "Circuit breaker is open, rejecting request"
            );
            Err(ResilientClientError::CircuitBreakerOpen)
        }
    }

    fn update_circuit(&self, context: &RequestContext, succeeded: bool) {
        let mut breakers = self.lock_breakers();
        if let Some(breaker) = breakers.get_mut(&context.destination) {
            if succeeded {
                breaker.on_success();
            } else {
                breaker.on_failure();
            }
            self.record_circuit_breaker_state(&context.destination, breaker.state().gauge_value());
        }
    }

    fn lock_breakers(&self) -> MutexGuard<'_, HashMap<String, SimpleCircuitBreaker>> {
        self.circuit_breakers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn record_request_metrics(&self, context: &RequestContext, outcome: &str, duration: Duration) {
        if let Some(metrics) = &self.metrics {
            metrics
                .http_requests_total
                .with_label_values(&[context.destination.as_str(), context.method, outcome])
                .inc();

            metrics
                .http_request_duration_seconds
                .with_label_values(&[context.destination.as_str(), context.method])
                .observe(duration.as_secs_f64());
        }
    }

    fn record_retry_attempt(&self, context: &RequestContext, reason: &str) {
        if let Some(metrics) = &self.metrics {
            metrics
                .retry_attempts_total
                .with_label_values(&[context.destination.as_str(), reason])
                .inc();
        }
    }

    fn record_timeout(&self, context: &RequestContext) {
        if let Some(metrics) = &self.metrics {
            metrics
                .timeouts_total
                .with_label_values(&[context.destination.as_str()])
                .inc();
        }
    }

    fn record_cache_lookup(&self, context: &RequestContext, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics
                .cache_lookups_total
                .with_label_values(&[context.destination.as_str(), outcome])
                .inc();
        }
    }

    fn record_circuit_breaker_state(&self, destination: &str, state: f64) {
        if let Some(metrics) = &self.metrics {
            metrics
                .circuit_breaker_state
                .with_label_values(&[destination])
                .set(state);
        }
    }
}

/// Errors that can occur with the resilient client
#[derive(Debug, thiserror::Error)]
pub enum ResilientClientError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Circuit breaker is open")]
    CircuitBreakerOpen,

    #[error("Retryable status code: {0}")]
    RetryableStatus(u16),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
