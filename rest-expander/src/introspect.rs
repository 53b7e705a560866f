//! Walks a described value into a `GenericValue`, deciding which references to follow
//!
//! The walk itself never blocks. Every reference that should be followed is
//! left in place in its raw form and recorded as a [`PendingUnit`] together
//! with the path to its slot, so the resolver can fill the slots in once all
//! units of the pass have finished.

use log::{debug, warn};

use crate::config::EngineConfig;
use crate::diagnostics::Diagnostic;
use crate::filter::FilterTree;
use crate::reference::{Reference, ReferenceDescriptor};
use crate::shape::Shape;
use crate::value::{GenericValue, Record, Slot};

/// A reference waiting to be resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUnit {
    /// Where the resolved record goes; empty for the root itself
    pub slot: Vec<Slot>,
    pub uri: String,
    /// Filter applying inside the referenced resource
    pub filter: FilterTree,
}

/// Result of one walk
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub value: GenericValue,
    pub units: Vec<PendingUnit>,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct Introspector<'a> {
    config: &'a EngineConfig,
    recursive: bool,
    units: Vec<PendingUnit>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Introspector<'a> {
    pub fn new(config: &'a EngineConfig, recursive: bool) -> Self {
        Self {
            config,
            recursive,
            units: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Walk a root value.
    ///
    /// A root that is itself a reference is resolved in place when expanding
    /// recursively: its target becomes the result, not a field of it.
    pub fn walk_root(mut self, shape: Shape, filter: &FilterTree) -> Walk {
        let value = match shape {
            Shape::Object(fields) => {
                let mut path = Vec::new();
                self.walk_object(fields, filter, &mut path)
            }
            Shape::Reference(reference) => {
                if self.recursive {
                    self.follow(&reference, Vec::new(), filter);
                }
                reference.raw
            }
            Shape::Null => GenericValue::Map(Record::new()),
            other => {
                warn!("Expansion root is not a record or reference: {:?}", other);
                GenericValue::Map(Record::new())
            }
        };

        Walk {
            value,
            units: self.units,
            diagnostics: self.diagnostics,
        }
    }

    fn walk_object(
        &mut self,
        fields: Vec<(String, Shape)>,
        filter: &FilterTree,
        path: &mut Vec<Slot>,
    ) -> GenericValue {
        let mut record = Record::new();

        for (key, shape) in fields {
            path.push(Slot::Key(key.clone()));
            let value = self.walk_field(&key, shape, filter, path);
            path.pop();
            record.insert(key, value);
        }

        GenericValue::Map(record)
    }

    /// Walk the value of field `key`; `filter` is the tree of the level that holds `key`
    fn walk_field(
        &mut self,
        key: &str,
        shape: Shape,
        filter: &FilterTree,
        path: &mut Vec<Slot>,
    ) -> GenericValue {
        match shape {
            Shape::Null => GenericValue::Null,
            Shape::Bool(b) => GenericValue::Bool(b),
            Shape::Int(i) => GenericValue::Int(i),
            Shape::UInt(u) => GenericValue::UInt(u),
            Shape::Float(f) => GenericValue::Float(f),
            Shape::Text(text) | Shape::Rendered(text) => GenericValue::String(unquote_once(text)),
            Shape::Reference(reference) => {
                if self.recursive || filter.names(key) {
                    self.follow(&reference, path.clone(), filter.get(key));
                }
                reference.raw
            }
            // Elements share the field's filter: the decision is made by `key`, not by index
            Shape::Sequence(items) => GenericValue::List(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        path.push(Slot::Index(i));
                        let value = self.walk_field(key, item, filter, path);
                        path.pop();
                        value
                    })
                    .collect(),
            ),
            Shape::Object(fields) => self.walk_object(fields, filter.get(key), path),
        }
    }

    /// Queue `reference` for resolution into `slot`, if it resolves to a URI
    fn follow(&mut self, reference: &Reference, slot: Vec<Slot>, filter: &FilterTree) {
        match reference.descriptor.resolve_uri(self.config) {
            Some(uri) => {
                debug!("Queueing {} for expansion (filter '{}')", uri, filter);
                self.units.push(PendingUnit {
                    slot,
                    uri,
                    filter: filter.clone(),
                });
            }
            None => {
                if let ReferenceDescriptor::ForeignKey { collection, .. } = &reference.descriptor {
                    if self.config.foreign_keys_active()
                        && !self.config.id_uri_bases.contains_key(collection)
                    {
                        warn!("No id URI base for collection '{}'", collection);
                        self.diagnostics.push(Diagnostic::MissingUriBase {
                            collection: collection.clone(),
                        });
                    }
                }
            }
        }
    }
}

/// Strip one level of quoting, if the text is a valid quoted literal.
///
/// Three forms are recognised: a JSON string literal (`"a\tb"`), a
/// backtick raw string (`` `a\tb` ``, no escapes, carriage returns dropped)
/// and a single-quoted character literal (`'x'`, `'\n'`). Anything else is
/// returned untouched.
pub fn unquote_once(text: String) -> String {
    if text.len() < 2 {
        return text;
    }

    let unquoted = match (text.chars().next(), text.chars().last()) {
        (Some('"'), Some('"')) => serde_json::from_str::<String>(&text).ok(),
        (Some('`'), Some('`')) => {
            let inner = &text[1..text.len() - 1];
            (!inner.contains('`')).then(|| inner.replace('\r', ""))
        }
        (Some('\''), Some('\'')) => unquote_char(&text[1..text.len() - 1]).map(String::from),
        _ => None,
    };

    unquoted.unwrap_or(text)
}

/// Body of a character literal: one character or one simple escape
fn unquote_char(inner: &str) -> Option<char> {
    let mut chars = inner.chars();
    let c = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            _ => return None,
        },
        '\'' => return None,
        c => c,
    };

    chars.next().is_none().then_some(c)
}
