//! Non-fatal faults reported alongside an expansion result

use crate::fetch::FetchError;
use crate::filter::FilterError;

/// A fault that left part of the output unexpanded or unfiltered.
///
/// Diagnostics never appear inside the expanded data; hosts receive them
/// separately through [`crate::Expansion`].
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An expansion or fields string failed to parse and was treated as empty
    FilterSyntax { input: String, error: FilterError },
    /// A reference could not be fetched or decoded; the raw reference was kept
    Unresolved { uri: String, error: FetchError },
    /// A reference was not followed because the nesting limit was reached
    DepthLimit { uri: String, depth: usize },
    /// A foreign-key reference names a collection with no configured URI base
    MissingUriBase { collection: String },
    /// The engine configuration is inconsistent; behaviour is degraded
    Misconfiguration(String),
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::FilterSyntax { input, error } => {
                write!(f, "filter '{}' ignored: {}", input, error)
            }
            Diagnostic::Unresolved { uri, error } => {
                write!(f, "could not resolve {}: {}", uri, error)
            }
            Diagnostic::DepthLimit { uri, depth } => {
                write!(f, "not following {}: depth limit {} reached", uri, depth)
            }
            Diagnostic::MissingUriBase { collection } => {
                write!(f, "no id URI base configured for collection '{}'", collection)
            }
            Diagnostic::Misconfiguration(message) => write!(f, "{}", message),
        }
    }
}
