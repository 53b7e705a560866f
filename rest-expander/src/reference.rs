//! Reference descriptors: hyperlinks and foreign keys to other resources

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::shape::{Expandable, Shape};
use crate::value::{GenericValue, Record};

/// Key that identifies a hyperlink object in fetched documents
pub const REF_KEY: &str = "ref";
pub const REL_KEY: &str = "rel";
pub const VERB_KEY: &str = "verb";

pub const COLLECTION_KEY: &str = "Collection";
pub const ID_KEY: &str = "Id";
pub const DATABASE_KEY: &str = "Database";

/// Where a reference points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceDescriptor {
    /// Hypermedia link: `{ref, rel, verb}`
    Link {
        uri: String,
        relation: String,
        verb: String,
    },
    /// Foreign key into a collection, resolved through `id_uri_bases`
    ForeignKey {
        collection: String,
        id: String,
        database: String,
    },
}

impl ReferenceDescriptor {
    /// Resolve to a fetchable URI.
    ///
    /// `None` means "leave the field as-is": an empty link, foreign-key
    /// resolution switched off, or no base URI for the collection.
    pub fn resolve_uri(&self, config: &EngineConfig) -> Option<String> {
        let uri = match self {
            ReferenceDescriptor::Link { uri, .. } => uri.clone(),
            ReferenceDescriptor::ForeignKey { collection, id, .. } => {
                if !config.foreign_keys_active() {
                    return None;
                }
                let base = config.id_uri_bases.get(collection)?;
                format!("{}/{}", base.trim_end_matches('/'), id)
            }
        };

        if uri.is_empty() { None } else { Some(uri) }
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self, ReferenceDescriptor::ForeignKey { .. })
    }

    /// The unresolved wire representation
    pub fn raw(&self) -> GenericValue {
        let mut map = Record::new();
        match self {
            ReferenceDescriptor::Link {
                uri,
                relation,
                verb,
            } => {
                map.insert(REF_KEY.to_string(), GenericValue::from(uri.as_str()));
                map.insert(REL_KEY.to_string(), GenericValue::from(relation.as_str()));
                map.insert(VERB_KEY.to_string(), GenericValue::from(verb.as_str()));
            }
            ReferenceDescriptor::ForeignKey {
                collection,
                id,
                database,
            } => {
                map.insert(
                    COLLECTION_KEY.to_string(),
                    GenericValue::from(collection.as_str()),
                );
                map.insert(ID_KEY.to_string(), GenericValue::from(id.as_str()));
                map.insert(
                    DATABASE_KEY.to_string(),
                    GenericValue::from(database.as_str()),
                );
            }
        }
        GenericValue::Map(map)
    }
}

/// A reference as found in the graph: where it points plus how it looked
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub descriptor: ReferenceDescriptor,
    /// Kept in the output whenever the reference is not (or cannot be) expanded
    pub raw: GenericValue,
}

impl Reference {
    pub fn new(descriptor: ReferenceDescriptor) -> Self {
        let raw = descriptor.raw();
        Self { descriptor, raw }
    }

    pub fn with_raw(descriptor: ReferenceDescriptor, raw: GenericValue) -> Self {
        Self { descriptor, raw }
    }

    /// Recognize a hyperlink object (one with a string `ref` key) in decoded JSON
    pub fn from_json_link(object: &serde_json::Map<String, serde_json::Value>) -> Option<Self> {
        let uri = object.get(REF_KEY)?.as_str()?;
        let text = |key: &str| {
            object
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let descriptor = ReferenceDescriptor::Link {
            uri: uri.to_string(),
            relation: text(REL_KEY),
            verb: text(VERB_KEY),
        };
        let raw = GenericValue::Map(
            object
                .iter()
                .map(|(k, v)| (k.clone(), GenericValue::from_json(v)))
                .collect(),
        );

        Some(Self::with_raw(descriptor, raw))
    }
}

/// Hypermedia link field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "ref")]
    pub uri: String,
    #[serde(rename = "rel")]
    pub relation: String,
    pub verb: String,
}

impl Link {
    pub fn new(uri: impl Into<String>, relation: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            relation: relation.into(),
            verb: verb.into(),
        }
    }

    /// A `GET` link, the common case
    pub fn get(uri: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::new(uri, relation, "GET")
    }
}

impl Expandable for Link {
    fn describe(&self) -> Shape {
        Shape::Reference(Reference::new(ReferenceDescriptor::Link {
            uri: self.uri.clone(),
            relation: self.relation.clone(),
            verb: self.verb.clone(),
        }))
    }
}

/// Foreign-key reference into a document collection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DbRef {
    #[serde(rename = "Collection")]
    pub collection: String,
    /// Hex form of the target document's id
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Database")]
    pub database: String,
}

impl DbRef {
    pub fn new(
        collection: impl Into<String>,
        id: impl std::fmt::Display,
        database: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.to_string(),
            database: database.into(),
        }
    }
}

impl Expandable for DbRef {
    fn describe(&self) -> Shape {
        Shape::Reference(Reference::new(ReferenceDescriptor::ForeignKey {
            collection: self.collection.clone(),
            id: self.id.clone(),
            database: self.database.clone(),
        }))
    }
}
