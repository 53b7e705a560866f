//! Resolves pending references and writes the results back into their slots

use futures::future::{BoxFuture, FutureExt, join_all};
use log::{debug, warn};

use crate::config::EngineConfig;
use crate::diagnostics::Diagnostic;
use crate::fetch::{Fetcher, parse_uri};
use crate::filter::FilterTree;
use crate::introspect::{Introspector, PendingUnit, Walk};
use crate::shape::Shape;
use crate::value::{GenericValue, Record, Slot};

/// An expanded value and whatever went wrong along the way
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
    pub value: GenericValue,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of following a single reference.
///
/// `record` is `None` when the reference could not be resolved; the caller
/// then keeps the raw reference in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: Option<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            record: None,
            diagnostics: vec![diagnostic],
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.record.is_some()
    }
}

pub struct Resolver<'a> {
    config: &'a EngineConfig,
    fetcher: &'a Fetcher,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a EngineConfig, fetcher: &'a Fetcher) -> Self {
        Self { config, fetcher }
    }

    /// Expand `shape` at nesting `depth`.
    ///
    /// All references found in one pass are fetched concurrently. Each result
    /// is written into the slot reserved for it only after every fetch of
    /// the pass has finished, so sibling fetches never observe each other.
    pub fn expand(
        &self,
        shape: Shape,
        filter: &FilterTree,
        recursive: bool,
        depth: usize,
    ) -> BoxFuture<'_, Expanded> {
        let walk = Introspector::new(self.config, recursive).walk_root(shape, filter);

        async move {
            let Walk {
                mut value,
                units,
                mut diagnostics,
            } = walk;

            if units.is_empty() {
                return Expanded { value, diagnostics };
            }

            debug!("Resolving {} reference(s) at depth {}", units.len(), depth);
            let outcomes = join_all(
                units
                    .into_iter()
                    .map(|unit| self.resolve_unit(unit, recursive, depth + 1)),
            )
            .await;

            for (slot, resolution) in outcomes {
                diagnostics.extend(resolution.diagnostics);
                if let Some(record) = resolution.record {
                    if !value.set_at(&slot, GenericValue::Map(record)) {
                        warn!("Reserved slot {:?} disappeared before write-back", slot);
                    }
                }
            }

            Expanded { value, diagnostics }
        }
        .boxed()
    }

    async fn resolve_unit(
        &self,
        unit: PendingUnit,
        recursive: bool,
        depth: usize,
    ) -> (Vec<Slot>, Resolution) {
        let resolution = self.resolve(&unit.uri, &unit.filter, recursive, depth).await;
        (unit.slot, resolution)
    }

    /// Fetch the resource at `uri` and expand the references it carries.
    ///
    /// Nested references are followed when `recursive` is set or when
    /// `filter` names them.
    pub async fn resolve(
        &self,
        uri: &str,
        filter: &FilterTree,
        recursive: bool,
        depth: usize,
    ) -> Resolution {
        if depth > self.config.max_expansion_depth {
            debug!("Depth limit reached at {}", uri);
            return Resolution::failed(Diagnostic::DepthLimit {
                uri: uri.to_string(),
                depth: self.config.max_expansion_depth,
            });
        }

        let document = match parse_uri(uri) {
            Ok(url) => self.fetcher.fetch(&url).await,
            Err(e) => Err(e),
        };

        let document = match document {
            Ok(document) => document,
            Err(error) => {
                warn!("Leaving reference to {} unexpanded: {}", uri, error);
                return Resolution::failed(Diagnostic::Unresolved {
                    uri: uri.to_string(),
                    error,
                });
            }
        };

        let shape = Shape::from_hypermedia_document(&document);
        let expanded = self.expand(shape, filter, recursive, depth).await;

        Resolution {
            record: Some(expanded.value.into_map().unwrap_or_default()),
            diagnostics: expanded.diagnostics,
        }
    }
}
