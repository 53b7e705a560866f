//! Procedural macros for rest-expander
//!
//! - `#[derive(Expandable)]` - describe a record to the expansion engine

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod expandable;

/// Derive `rest_expander::Expandable` for a struct.
///
/// Named fields become record entries. Keys follow serde: the field name,
/// or `#[serde(rename = "...")]` if present. `#[expandable(rename = "...")]`
/// overrides both. Fields marked `#[serde(skip)]`,
/// `#[serde(skip_serializing)]` or `#[expandable(skip)]` are left out.
///
/// A newtype struct describes itself as its inner value; other tuple structs
/// become sequences. Enums and unions are rejected.
///
/// ```ignore
/// #[derive(Serialize, Expandable)]
/// struct Member {
///     #[serde(rename = "Name")]
///     name: String,
///     #[expandable(rename = "L")]
///     link: Link,
///     #[serde(skip)]
///     internal: u32,
/// }
/// ```
#[proc_macro_derive(Expandable, attributes(expandable))]
pub fn derive_expandable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expandable::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
