//! Engine configuration with builder pattern
//!
//! Set once per process and shared by every expansion. Loadable from TOML;
//! every key is optional and falls back to the defaults below.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::diagnostics::Diagnostic;

/// Process-wide expansion settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Follow foreign-key (`Collection`/`Id`/`Database`) references
    pub enable_foreign_key_resolution: bool,
    /// Collection name -> base URI that ids are appended to
    pub id_uri_bases: HashMap<String, String>,
    /// Cache fetched bodies in memory
    pub enable_cache: bool,
    /// Age after which a cached body is refetched
    pub cache_ttl_seconds: i64,
    /// Connection/response timeout of a single fetch
    pub connection_timeout_seconds: u64,
    /// Maximum number of cached bodies
    pub cache_capacity: usize,
    /// How many references deep a single expansion may follow
    pub max_expansion_depth: usize,
    /// Top-level key that marks a fetched body as an error document
    pub error_marker_key: String,
    /// Treat `expand=*` as "expand what `fields` names" when fields is given
    pub narrow_wildcard_to_fields: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_foreign_key_resolution: false,
            id_uri_bases: HashMap::new(),
            enable_cache: false,
            cache_ttl_seconds: 86_400, // 24 hours
            connection_timeout_seconds: 2,
            cache_capacity: 250,
            max_expansion_depth: 8,
            error_marker_key: "error".to_string(),
            narrow_wildcard_to_fields: false,
        }
    }
}

impl EngineConfig {
    /// Create a new builder for EngineConfig
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse engine configuration")
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&source)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Whether foreign-key references can actually be resolved
    pub fn foreign_keys_active(&self) -> bool {
        self.enable_foreign_key_resolution && !self.id_uri_bases.is_empty()
    }

    /// Whether the response cache can hold anything
    pub fn cache_active(&self) -> bool {
        self.enable_cache && self.cache_capacity > 0
    }

    /// Report settings that degrade behaviour without being fatal
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut warnings = Vec::new();

        if self.enable_foreign_key_resolution && self.id_uri_bases.is_empty() {
            warnings.push(Diagnostic::Misconfiguration(
                "foreign-key resolution is enabled but no id URI bases are configured; \
                 foreign keys will not be expanded"
                    .to_string(),
            ));
        }

        if self.enable_cache && self.cache_ttl_seconds <= 0 {
            warnings.push(Diagnostic::Misconfiguration(format!(
                "cache is enabled with a TTL of {}s; every read will miss",
                self.cache_ttl_seconds
            )));
        }

        if self.enable_cache && self.cache_capacity == 0 {
            warnings.push(Diagnostic::Misconfiguration(
                "cache is enabled with capacity 0; caching is disabled".to_string(),
            ));
        }

        if self.connection_timeout_seconds == 0 {
            warnings.push(Diagnostic::Misconfiguration(
                "connection timeout of 0s; fetches are not time-bounded".to_string(),
            ));
        }

        warnings
    }
}

/// Builder for [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn foreign_key_resolution(mut self, enabled: bool) -> Self {
        self.config.enable_foreign_key_resolution = enabled;
        self
    }

    pub fn id_uri_base(mut self, collection: impl Into<String>, base: impl Into<String>) -> Self {
        self.config
            .id_uri_bases
            .insert(collection.into(), base.into());
        self
    }

    pub fn cache(mut self, enabled: bool) -> Self {
        self.config.enable_cache = enabled;
        self
    }

    pub fn cache_ttl_seconds(mut self, ttl: i64) -> Self {
        self.config.cache_ttl_seconds = ttl;
        self
    }

    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    pub fn connection_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.connection_timeout_seconds = seconds;
        self
    }

    pub fn max_expansion_depth(mut self, depth: usize) -> Self {
        self.config.max_expansion_depth = depth;
        self
    }

    pub fn error_marker_key(mut self, key: impl Into<String>) -> Self {
        self.config.error_marker_key = key.into();
        self
    }

    pub fn narrow_wildcard_to_fields(mut self, enabled: bool) -> Self {
        self.config.narrow_wildcard_to_fields = enabled;
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
