//! Cache-aware fetching and body validation

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use url::Url;

use super::{FetchError, Transport};
use crate::cache::{CacheEntry, CacheLookup, Clock, ResponseCache};
use crate::config::EngineConfig;

/// Fetches referenced documents through the transport, consulting the cache first
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: Option<ResponseCache>,
    clock: Arc<dyn Clock>,
    error_marker_key: String,
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    rejected: AtomicU64,
}

impl Fetcher {
    pub fn new(config: &EngineConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        let cache = if config.enable_cache {
            NonZeroUsize::new(config.cache_capacity)
                .map(|capacity| ResponseCache::new(capacity, config.cache_ttl_seconds))
        } else {
            None
        };

        Self {
            transport,
            cache,
            clock,
            error_marker_key: config.error_marker_key.clone(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Fetch and decode the document at `uri`.
    ///
    /// With caching enabled a fresh cached body is returned without touching
    /// the transport. Freshly fetched bodies are cached only once they decode
    /// as a JSON object without the error marker.
    pub async fn fetch(&self, uri: &Url) -> Result<serde_json::Value, FetchError> {
        let key = uri.as_str();

        if let Some(cache) = &self.cache {
            match cache.lookup(key, self.clock.now_epoch_seconds()) {
                CacheLookup::Hit(body) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    debug!("Cache hit: {}", key);
                    return self.decode(&body);
                }
                CacheLookup::Expired => debug!("Cache entry expired: {}", key),
                CacheLookup::Miss => debug!("Cache miss: {}", key),
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        let body = self.transport.get(uri).await?;

        let document = match self.decode(&body) {
            Ok(document) => document,
            Err(e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                debug!("Rejected body from {}: {}", key, e);
                return Err(e);
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(
                key,
                CacheEntry {
                    fetched_at: self.clock.now_epoch_seconds(),
                    body,
                },
            );
        }

        Ok(document)
    }

    /// Decode a body; it must be a JSON object without the error marker
    fn decode(&self, body: &str) -> Result<serde_json::Value, FetchError> {
        let document: serde_json::Value =
            serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let Some(object) = document.as_object() else {
            return Err(FetchError::Decode("expected a JSON object".to_string()));
        };

        if !self.error_marker_key.is_empty()
            && object
                .get(&self.error_marker_key)
                .is_some_and(|marker| !marker.is_null())
        {
            return Err(FetchError::ErrorBody(self.error_marker_key.clone()));
        }

        Ok(document)
    }

    /// Get current statistics
    pub fn stats(&self) -> FetcherStats {
        FetcherStats {
            cache_enabled: self.cache.is_some(),
            cached_entries: self.cache.as_ref().map(ResponseCache::len).unwrap_or(0),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Reset statistics (but not the cache contents)
    pub fn reset_stats(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.fetches.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
    }
}

/// Statistics for the fetcher and its cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherStats {
    pub cache_enabled: bool,
    pub cached_entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Requests handed to the transport
    pub fetches: u64,
    /// Fetched bodies that failed validation
    pub rejected: u64,
}

impl FetcherStats {
    /// Fraction of cache reads that were served from the cache
    pub fn hit_rate(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }
}
