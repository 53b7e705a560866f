//! Universal value representation produced by the expansion walker

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// A record: one entry per visible field, keyed by external name
pub type Record = BTreeMap<String, GenericValue>;

/// A value in the expanded graph, independent of the source record types
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenericValue {
    /// Null/absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
    /// String value
    String(String),
    /// Ordered list
    List(Vec<GenericValue>),
    /// String-keyed map
    Map(Record),
}

/// One step of a path into a `GenericValue` tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Key(String),
    Index(usize),
}

impl GenericValue {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, GenericValue::Null)
    }

    /// Check if this value is a map
    pub fn is_map(&self) -> bool {
        matches!(self, GenericValue::Map(_))
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            GenericValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as signed integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GenericValue::Int(i) => Some(*i),
            GenericValue::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Try to get as unsigned integer
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            GenericValue::UInt(u) => Some(*u),
            GenericValue::Int(i) => u64::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GenericValue::Float(f) => Some(*f),
            GenericValue::Int(i) => Some(*i as f64),
            GenericValue::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GenericValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[GenericValue]> {
        match self {
            GenericValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to get as map
    pub fn as_map(&self) -> Option<&Record> {
        match self {
            GenericValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Consume into a map, if this is one
    pub fn into_map(self) -> Option<Record> {
        match self {
            GenericValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key on a map value
    pub fn get(&self, key: &str) -> Option<&GenericValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Replace the value at `path`, returning false if the path does not exist.
    ///
    /// An empty path replaces `self`. Intermediate steps must already exist;
    /// slots are reserved by the walker before anything is written into them.
    pub fn set_at(&mut self, path: &[Slot], value: GenericValue) -> bool {
        let Some((last, parents)) = path.split_last() else {
            *self = value;
            return true;
        };

        let mut current = self;
        for slot in parents {
            current = match (current, slot) {
                (GenericValue::Map(map), Slot::Key(key)) => match map.get_mut(key) {
                    Some(next) => next,
                    None => return false,
                },
                (GenericValue::List(items), Slot::Index(i)) => match items.get_mut(*i) {
                    Some(next) => next,
                    None => return false,
                },
                _ => return false,
            };
        }

        match (current, last) {
            (GenericValue::Map(map), Slot::Key(key)) => match map.get_mut(key) {
                Some(target) => {
                    *target = value;
                    true
                }
                None => false,
            },
            (GenericValue::List(items), Slot::Index(i)) => match items.get_mut(*i) {
                Some(target) => {
                    *target = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Convert to JSON value for the host's encoder
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GenericValue::Null => serde_json::Value::Null,
            GenericValue::Bool(b) => serde_json::Value::Bool(*b),
            GenericValue::Int(i) => serde_json::json!(*i),
            GenericValue::UInt(u) => serde_json::json!(*u),
            // Non-finite floats have no JSON form
            GenericValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            GenericValue::String(s) => serde_json::Value::String(s.clone()),
            GenericValue::List(items) => {
                serde_json::Value::Array(items.iter().map(GenericValue::to_json).collect())
            }
            GenericValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Parse from JSON value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => GenericValue::Null,
            serde_json::Value::Bool(b) => GenericValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    GenericValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    GenericValue::UInt(u)
                } else if let Some(f) = n.as_f64() {
                    GenericValue::Float(f)
                } else {
                    GenericValue::Null
                }
            }
            serde_json::Value::String(s) => GenericValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                GenericValue::List(items.iter().map(GenericValue::from_json).collect())
            }
            serde_json::Value::Object(map) => GenericValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), GenericValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for GenericValue {
    fn from(json: &serde_json::Value) -> Self {
        GenericValue::from_json(json)
    }
}

impl From<Record> for GenericValue {
    fn from(map: Record) -> Self {
        GenericValue::Map(map)
    }
}

impl From<&str> for GenericValue {
    fn from(s: &str) -> Self {
        GenericValue::String(s.to_string())
    }
}

impl From<String> for GenericValue {
    fn from(s: String) -> Self {
        GenericValue::String(s)
    }
}

impl From<i64> for GenericValue {
    fn from(i: i64) -> Self {
        GenericValue::Int(i)
    }
}

impl From<u64> for GenericValue {
    fn from(u: u64) -> Self {
        GenericValue::UInt(u)
    }
}

impl From<f64> for GenericValue {
    fn from(f: f64) -> Self {
        GenericValue::Float(f)
    }
}

impl From<bool> for GenericValue {
    fn from(b: bool) -> Self {
        GenericValue::Bool(b)
    }
}

impl Serialize for GenericValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GenericValue::Null => serializer.serialize_unit(),
            GenericValue::Bool(b) => serializer.serialize_bool(*b),
            GenericValue::Int(i) => serializer.serialize_i64(*i),
            GenericValue::UInt(u) => serializer.serialize_u64(*u),
            GenericValue::Float(f) => serializer.serialize_f64(*f),
            GenericValue::String(s) => serializer.serialize_str(s),
            GenericValue::List(items) => items.serialize(serializer),
            GenericValue::Map(map) => map.serialize(serializer),
        }
    }
}

impl std::fmt::Display for GenericValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
