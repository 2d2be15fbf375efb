//! Relation records and kind derivation
//!
//! A [`Relation`] is a directed edge: `collection` is the "many" side holding
//! the foreign key in `field`; `related_collection` is the "one" side (absent
//! for polymorphic edges, which carry the target collection name in a
//! discriminator column instead). The kind of a traversal depends on which
//! end you stand on, so it is derived at lookup time rather than stored.

use serde::{Deserialize, Serialize};

use super::Schema;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationMeta {
    /// Inverse field name on the one side. Present when the one side exposes
    /// the relation as a to-many field.
    #[serde(default)]
    pub one_field: Option<String>,
    /// Discriminator column on the many side naming the target collection.
    /// Present only for polymorphic edges.
    #[serde(default)]
    pub one_collection_field: Option<String>,
    /// Collections a polymorphic edge is allowed to point at.
    #[serde(default)]
    pub one_allowed_collections: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Collection holding the foreign key.
    pub collection: String,
    /// Foreign-key column on `collection`.
    pub field: String,
    /// Target collection; `None` for polymorphic edges.
    #[serde(default)]
    pub related_collection: Option<String>,
    #[serde(default)]
    pub meta: RelationMeta,
}

impl Relation {
    pub fn is_polymorphic(&self) -> bool {
        self.meta.one_collection_field.is_some()
    }
}

/// Traversal direction of a relation, derived from the (parent, field) pair
/// used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Parent row references one related row via a scalar FK on parent.
    ManyToOne,
    /// Parent row is referenced by many child rows via an FK on child.
    OneToMany,
    /// Polymorphic FK on parent: scalar id plus a discriminator column.
    AnyToOne,
    /// Inverse of a2o: parent is referenced by many polymorphic children.
    OneToAny,
}

impl RelationKind {
    /// True when a traversal of this kind can reach more than one row.
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::OneToAny)
    }
}

impl Schema {
    /// Resolve the relation reachable from `parent` through `field`, along
    /// with its traversal kind. Scans the forward orientation first so
    /// self-referential collections resolve deterministically.
    ///
    /// Returns `None` when the field is a plain column (or unknown).
    pub fn relation_info(&self, parent: &str, field: &str) -> Option<(&Relation, RelationKind)> {
        for relation in &self.relations {
            if relation.collection == parent && relation.field == field {
                let kind = if relation.is_polymorphic() {
                    RelationKind::AnyToOne
                } else {
                    RelationKind::ManyToOne
                };
                return Some((relation, kind));
            }
        }

        for relation in &self.relations {
            let inverse = relation
                .meta
                .one_field
                .as_deref()
                .is_some_and(|one_field| one_field == field);
            if !inverse {
                continue;
            }
            if relation.is_polymorphic() {
                // Inverse of a polymorphic edge: any collection in the allowed
                // set (or any at all, when unrestricted) can stand on the one
                // side.
                let allowed = relation
                    .meta
                    .one_allowed_collections
                    .as_ref()
                    .map_or(true, |cols| cols.iter().any(|c| c == parent));
                if allowed {
                    return Some((relation, RelationKind::OneToAny));
                }
            } else if relation.related_collection.as_deref() == Some(parent) {
                return Some((relation, RelationKind::OneToMany));
            }
        }

        None
    }
}
