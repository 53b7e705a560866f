//! Structural description of expandable values
//!
//! Types opt in to expansion by implementing [`Expandable`], usually through
//! `#[derive(Expandable)]`. The walker never inspects types at runtime; it
//! only sees the [`Shape`] a value describes itself as, with references
//! marked explicitly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::reference::Reference;
use crate::value::GenericValue;

/// What the walker sees of a value
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Plain text; one level of quoting is removed by the walker
    Text(String),
    /// Output of the value's own serializer, used instead of walking its fields
    Rendered(String),
    /// A reference that may be followed
    Reference(Reference),
    Sequence(Vec<Shape>),
    /// Record fields (by external name) or map entries (by key)
    Object(Vec<(String, Shape)>),
}

/// A value the expansion engine can walk
pub trait Expandable {
    fn describe(&self) -> Shape;
}

impl Shape {
    /// Describe a value through its serializer, as an opaque leaf
    pub fn render<T: Serialize + ?Sized>(value: &T) -> Shape {
        match serde_json::to_string(value) {
            Ok(text) => Shape::Rendered(text),
            Err(e) => {
                log::warn!("Failed to render value, using null: {}", e);
                Shape::Null
            }
        }
    }

    /// Describe decoded JSON as plain data, with no references
    pub fn from_json(json: &serde_json::Value) -> Shape {
        match json {
            serde_json::Value::Object(map) => Shape::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Shape::from_json(v)))
                    .collect(),
            ),
            serde_json::Value::Array(items) => {
                Shape::Sequence(items.iter().map(Shape::from_json).collect())
            }
            other => Shape::from_json_scalar(other),
        }
    }

    /// Describe decoded JSON, treating objects with a string `ref` key as links
    pub fn from_hypermedia(json: &serde_json::Value) -> Shape {
        match json {
            serde_json::Value::Object(map) => match Reference::from_json_link(map) {
                Some(reference) => Shape::Reference(reference),
                None => Shape::from_hypermedia_fields(map),
            },
            serde_json::Value::Array(items) => {
                Shape::Sequence(items.iter().map(Shape::from_hypermedia).collect())
            }
            other => Shape::from_json_scalar(other),
        }
    }

    /// Like [`Shape::from_hypermedia`], but the top-level object is never
    /// itself a link: it is the resource a link pointed at.
    pub fn from_hypermedia_document(json: &serde_json::Value) -> Shape {
        match json {
            serde_json::Value::Object(map) => Shape::from_hypermedia_fields(map),
            other => Shape::from_hypermedia(other),
        }
    }

    fn from_hypermedia_fields(map: &serde_json::Map<String, serde_json::Value>) -> Shape {
        Shape::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Shape::from_hypermedia(v)))
                .collect(),
        )
    }

    fn from_json_scalar(json: &serde_json::Value) -> Shape {
        match GenericValue::from_json(json) {
            GenericValue::Bool(b) => Shape::Bool(b),
            GenericValue::Int(i) => Shape::Int(i),
            GenericValue::UInt(u) => Shape::UInt(u),
            GenericValue::Float(f) => Shape::Float(f),
            GenericValue::String(s) => Shape::Text(s),
            _ => Shape::Null,
        }
    }

    /// Whether any reference appears anywhere in this shape
    pub fn has_reference(&self) -> bool {
        match self {
            Shape::Reference(_) => true,
            Shape::Sequence(items) => items.iter().any(Shape::has_reference),
            Shape::Object(fields) => fields.iter().any(|(_, v)| v.has_reference()),
            _ => false,
        }
    }
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(impl Expandable for $t {
            fn describe(&self) -> Shape {
                Shape::Int(*self as i64)
            }
        })*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(impl Expandable for $t {
            fn describe(&self) -> Shape {
                Shape::UInt(*self as u64)
            }
        })*
    };
}

macro_rules! impl_rendered {
    ($($t:ty),*) => {
        $(impl Expandable for $t {
            fn describe(&self) -> Shape {
                Shape::render(self)
            }
        })*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);
impl_rendered!(
    chrono::DateTime<chrono::Utc>,
    chrono::DateTime<chrono::FixedOffset>,
    chrono::NaiveDate,
    chrono::NaiveDateTime
);

impl Expandable for f32 {
    fn describe(&self) -> Shape {
        Shape::Float(f64::from(*self))
    }
}

impl Expandable for f64 {
    fn describe(&self) -> Shape {
        Shape::Float(*self)
    }
}

impl Expandable for bool {
    fn describe(&self) -> Shape {
        Shape::Bool(*self)
    }
}

impl Expandable for char {
    fn describe(&self) -> Shape {
        Shape::Text(self.to_string())
    }
}

impl Expandable for str {
    fn describe(&self) -> Shape {
        Shape::Text(self.to_string())
    }
}

impl Expandable for String {
    fn describe(&self) -> Shape {
        Shape::Text(self.clone())
    }
}

impl Expandable for () {
    fn describe(&self) -> Shape {
        Shape::Null
    }
}

impl<T: Expandable + ?Sized> Expandable for &T {
    fn describe(&self) -> Shape {
        (**self).describe()
    }
}

impl<T: Expandable + ?Sized> Expandable for Box<T> {
    fn describe(&self) -> Shape {
        (**self).describe()
    }
}

impl<T: Expandable + ?Sized> Expandable for Arc<T> {
    fn describe(&self) -> Shape {
        (**self).describe()
    }
}

impl<T: Expandable> Expandable for Option<T> {
    fn describe(&self) -> Shape {
        match self {
            Some(inner) => inner.describe(),
            None => Shape::Null,
        }
    }
}

impl<T: Expandable> Expandable for [T] {
    fn describe(&self) -> Shape {
        Shape::Sequence(self.iter().map(Expandable::describe).collect())
    }
}

impl<T: Expandable> Expandable for Vec<T> {
    fn describe(&self) -> Shape {
        self.as_slice().describe()
    }
}

impl<T: Expandable, S> Expandable for HashMap<String, T, S> {
    fn describe(&self) -> Shape {
        Shape::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.describe()))
                .collect(),
        )
    }
}

impl<T: Expandable> Expandable for BTreeMap<String, T> {
    fn describe(&self) -> Shape {
        Shape::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.describe()))
                .collect(),
        )
    }
}

impl Expandable for serde_json::Value {
    fn describe(&self) -> Shape {
        Shape::from_json(self)
    }
}

/// Decoded hypermedia JSON, whose `{"ref": ...}` objects are followable links
#[derive(Debug, Clone, Copy)]
pub struct Hypermedia<'a>(pub &'a serde_json::Value);

impl Expandable for Hypermedia<'_> {
    fn describe(&self) -> Shape {
        Shape::from_hypermedia(self.0)
    }
}

impl Expandable for GenericValue {
    fn describe(&self) -> Shape {
        match self {
            GenericValue::Null => Shape::Null,
            GenericValue::Bool(b) => Shape::Bool(*b),
            GenericValue::Int(i) => Shape::Int(*i),
            GenericValue::UInt(u) => Shape::UInt(*u),
            GenericValue::Float(f) => Shape::Float(*f),
            GenericValue::String(s) => Shape::Text(s.clone()),
            GenericValue::List(items) => {
                Shape::Sequence(items.iter().map(Expandable::describe).collect())
            }
            GenericValue::Map(map) => map.describe(),
        }
    }
}
