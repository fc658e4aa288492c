//! Time-bounded in-memory cache of upstream responses.

use cached::{Cached, TimedCache};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use super::resilient_client::UpstreamResponse;

/// Response cache keyed by full request URL
///
/// Entries expire `ttl` after insertion (whole seconds). Clones share the
/// same storage.
#[derive(Clone)]
pub struct ResponseCache {
    ttl: Duration,
    storage: Arc<Mutex<TimedCache<String, UpstreamResponse>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            storage: Arc::new(Mutex::new(TimedCache::with_lifespan(ttl.as_secs()))),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return a fresh entry for `key`, if any
    pub fn get(&self, key: &str) -> Option<UpstreamResponse> {
        self.lock().cache_get(key).cloned()
    }

    pub fn insert(&self, key: &str, response: UpstreamResponse) {
        let mut storage = self.lock();
        storage.flush();
        storage.cache_set(key.to_string(), response);
    }

    pub fn len(&self) -> usize {
        self.lock().cache_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, TimedCache<String, UpstreamResponse>> {
        // A poisoned cache only ever holds complete entries
        self.storage.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn response(body: &str) -> UpstreamResponse {
        UpstreamResponse::new(StatusCode::OK, body.to_string())
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("https://example.com/a", response("{}"));

        let hit = cache.get("https://example.com/a").unwrap();
        assert_eq!(hit.body(), "{}");
        assert!(cache.get("https://example.com/b").is_none());
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("key", response("stale"));

        assert!(cache.get("key").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let other = cache.clone();
        other.insert("key", response("shared"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("key").unwrap().body(), "shared");
    }
}
