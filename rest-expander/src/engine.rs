//! Expansion engine: parse filters, walk and resolve, then project

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::future::join_all;
use log::{debug, info, warn};

use crate::cache::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::diagnostics::Diagnostic;
use crate::fetch::{Fetcher, FetcherStats, HttpTransport, Transport};
use crate::filter::{FilterSpec, FilterTree};
use crate::projector::project;
use crate::resolver::Resolver;
use crate::shape::{Expandable, Shape};
use crate::value::{GenericValue, Record};

/// Result of a single expansion plus the faults encountered on the way
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expansion {
    pub record: Record,
    pub diagnostics: Vec<Diagnostic>,
}

impl Expansion {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Result of expanding a sequence of roots
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchExpansion {
    /// One record per root, in input order
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Holds the configuration and the fetcher (with its cache) shared by every call.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Engine {
    config: EngineConfig,
    fetcher: Fetcher,
    warnings: Vec<Diagnostic>,
}

impl Engine {
    /// Engine fetching over HTTP with the configured timeout
    pub fn new(config: EngineConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let transport = HttpTransport::new(timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: EngineConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_parts(config, transport, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: EngineConfig,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let warnings = config.validate();
        for warning in &warnings {
            warn!("Engine configuration: {}", warning);
        }

        let fetcher = Fetcher::new(&config, transport, clock);
        info!(
            "Expansion engine ready (cache: {}, foreign keys: {}, max depth: {})",
            if config.cache_active() { "on" } else { "off" },
            if config.foreign_keys_active() { "on" } else { "off" },
            config.max_expansion_depth
        );

        Self {
            config,
            fetcher,
            warnings,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Misconfigurations detected at construction
    pub fn config_warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn cache_stats(&self) -> FetcherStats {
        self.fetcher.stats()
    }

    /// Drop every cached body and reset the counters
    pub fn clear_cache(&self) {
        if let Some(cache) = self.fetcher.cache() {
            cache.clear();
        }
        self.fetcher.reset_stats();
    }

    /// Expand `root` and project it; faults are logged and dropped
    pub async fn expand<T: Expandable + ?Sized>(
        &self,
        root: &T,
        expansion: &str,
        fields: &str,
    ) -> Record {
        self.expand_with_report(root, expansion, fields).await.record
    }

    /// Expand `root` and project it, returning the faults alongside
    pub async fn expand_with_report<T: Expandable + ?Sized>(
        &self,
        root: &T,
        expansion: &str,
        fields: &str,
    ) -> Expansion {
        let shape = root.describe();
        let mut diagnostics = Vec::new();
        let (expansion, fields) = self.parse_filters(expansion, fields, &mut diagnostics);

        let mut result = self.expand_shape(shape, &expansion, &fields).await;
        diagnostics.append(&mut result.diagnostics);
        result.diagnostics = diagnostics;
        result
    }

    /// Expand every root concurrently; output order follows input order
    pub async fn expand_all<T: Expandable>(
        &self,
        roots: &[T],
        expansion: &str,
        fields: &str,
    ) -> Vec<Record> {
        self.expand_all_with_report(roots, expansion, fields)
            .await
            .records
    }

    pub async fn expand_all_with_report<T: Expandable>(
        &self,
        roots: &[T],
        expansion: &str,
        fields: &str,
    ) -> BatchExpansion {
        let shapes: Vec<Shape> = roots.iter().map(Expandable::describe).collect();
        let mut diagnostics = Vec::new();
        let (expansion, fields) = self.parse_filters(expansion, fields, &mut diagnostics);

        debug!("Expanding {} roots", shapes.len());
        let results = join_all(
            shapes
                .into_iter()
                .map(|shape| self.expand_shape(shape, &expansion, &fields)),
        )
        .await;

        let mut records = Vec::with_capacity(results.len());
        for result in results {
            records.push(result.record);
            diagnostics.extend(result.diagnostics);
        }

        BatchExpansion {
            records,
            diagnostics,
        }
    }

    /// Parse both filter strings, applying the wildcard narrowing if configured
    fn parse_filters(
        &self,
        expansion: &str,
        fields: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (FilterSpec, FilterTree) {
        let expansion = FilterSpec::parse_lenient(expansion, diagnostics);
        let fields = FilterSpec::parse_lenient(fields, diagnostics);

        // `*` for fields means "everything", same as empty
        let fields = fields.tree;

        if expansion.recursive && self.config.narrow_wildcard_to_fields && !fields.is_empty() {
            debug!("Narrowing wildcard expansion to fields '{}'", fields);
            let narrowed = FilterSpec {
                tree: fields.clone(),
                recursive: false,
            };
            return (narrowed, fields);
        }

        (expansion, fields)
    }

    async fn expand_shape(
        &self,
        shape: Shape,
        expansion: &FilterSpec,
        fields: &FilterTree,
    ) -> Expansion {
        let expanded = Resolver::new(&self.config, &self.fetcher)
            .expand(shape, &expansion.tree, expansion.recursive, 0)
            .await;

        let record = match expanded.value {
            GenericValue::Map(record) => record,
            other => {
                warn!("Expansion produced a non-record value, discarding: {}", other);
                Record::new()
            }
        };

        Expansion {
            record: project(record, fields),
            diagnostics: expanded.diagnostics,
        }
    }
}
