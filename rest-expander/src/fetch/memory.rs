//! In-process transport serving canned responses

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use super::{FetchError, Transport};

/// Transport answering from a fixed route table.
///
/// Useful for embedding hosts that already hold the target resources in
/// memory, and for tests. Unknown URIs answer with a 404.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: Mutex<HashMap<String, Result<String, FetchError>>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: serve `body` as JSON at `uri`
    pub fn with_json(self, uri: &str, body: serde_json::Value) -> Self {
        self.insert_json(uri, body);
        self
    }

    /// Builder-style: fail every request to `uri`
    pub fn with_failure(self, uri: &str, error: FetchError) -> Self {
        self.insert_failure(uri, error);
        self
    }

    /// Serve (or replace) a JSON body
    pub fn insert_json(&self, uri: &str, body: serde_json::Value) {
        self.insert_body(uri, body.to_string());
    }

    /// Serve (or replace) a raw body
    pub fn insert_body(&self, uri: &str, body: impl Into<String>) {
        self.lock_routes().insert(normalize(uri), Ok(body.into()));
    }

    pub fn insert_failure(&self, uri: &str, error: FetchError) {
        self.lock_routes().insert(normalize(uri), Err(error));
    }

    /// Number of requests made for `uri`
    pub fn calls_to(&self, uri: &str) -> usize {
        let uri = normalize(uri);
        self.lock_calls().iter().filter(|c| **c == uri).count()
    }

    /// Number of requests made overall
    pub fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }

    fn lock_routes(&self) -> std::sync::MutexGuard<'_, HashMap<String, Result<String, FetchError>>> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Route keys go through the same URL parser as requests (`http://a` == `http://a/`)
fn normalize(uri: &str) -> String {
    Url::parse(uri)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| uri.to_string())
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, uri: &Url) -> Result<String, FetchError> {
        let key = uri.to_string();
        self.lock_calls().push(key.clone());

        self.lock_routes()
            .get(&key)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}
