//! Schema catalog: collections, fields and relations
//!
//! The schema is read-only input to the compiler. It names every collection
//! (table), the fields each collection carries, and a flat list of directed
//! relation edges between collections. Relation *kinds* (m2o, o2m, a2o, o2a)
//! are not stored; they are derived per lookup by [`Schema::relation_info`].

pub mod errors;
pub mod loader;
pub mod relations;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use errors::SchemaError;
pub use relations::{Relation, RelationKind, RelationMeta};

/// Storage type of a field, using the wire names clients send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Text,
    Integer,
    BigInteger,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    Timestamp,
    Uuid,
    Json,
    Csv,
    Hash,
    Alias,
    #[serde(other)]
    #[default]
    Unknown,
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::BigInteger | FieldType::Float | FieldType::Decimal
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            FieldType::Date | FieldType::DateTime | FieldType::Time | FieldType::Timestamp
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Text)
    }

    /// True for integer-valued column types, where a search token must parse
    /// as a whole number to be comparable.
    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::BigInteger)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub field: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    /// Name of the primary-key field.
    pub primary: String,
    #[serde(default)]
    pub fields: HashMap<String, Field>,
}

impl Collection {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }
}

/// The full catalog handed to every compilation. Shared freely across
/// threads; the compiler never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub collections: HashMap<String, Collection>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl Schema {
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn field(&self, collection: &str, field: &str) -> Option<&Field> {
        self.collections.get(collection)?.field(field)
    }

    /// Primary-key field name of a collection, if the collection exists.
    pub fn primary(&self, collection: &str) -> Option<&str> {
        self.collections.get(collection).map(|c| c.primary.as_str())
    }
}
