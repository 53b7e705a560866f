//! Hypermedia expansion and sparse fieldsets for REST resource graphs
//!
//! Given a value whose type implements [`Expandable`], an [`Engine`] follows
//! the references it carries (hyperlinks or foreign keys), inlines the
//! fetched resources, and projects the result down to the requested fields:
//!
//! ```no_run
//! use rest_expander::{Engine, EngineConfig, Expandable, Link};
//!
//! #[derive(Expandable)]
//! struct User {
//!     name: String,
//!     group: Link,
//! }
//!
//! # async fn run() -> anyhow::Result<()> {
//! let engine = Engine::new(EngineConfig::default())?;
//! let user = User {
//!     name: "alice".into(),
//!     group: Link::get("http://localhost:9000/groups/1", "group"),
//! };
//! let record = engine.expand(&user, "group", "name,group(name)").await;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod fetch;
pub mod filter;
pub mod introspect;
pub mod projector;
pub mod reference;
pub mod resolver;
pub mod shape;
pub mod value;

pub use cache::{Clock, ManualClock, SystemClock};
pub use config::{EngineConfig, EngineConfigBuilder};
pub use diagnostics::Diagnostic;
pub use engine::{BatchExpansion, Engine, Expansion};
pub use fetch::{FetchError, FetcherStats, HttpTransport, MemoryTransport, Transport};
pub use filter::{FilterError, FilterNode, FilterSpec, FilterTree};
pub use reference::{DbRef, Link, Reference, ReferenceDescriptor};
pub use shape::{Expandable, Hypermedia, Shape};
pub use value::{GenericValue, Record};

/// `#[derive(Expandable)]` for records with named fields.
///
/// Output keys follow `#[serde(rename = "..")]`, overridden by
/// `#[expandable(rename = "..")]`; fields marked `#[serde(skip)]` or
/// `#[expandable(skip)]` are left out.
pub use rest_expander_macros::Expandable;
