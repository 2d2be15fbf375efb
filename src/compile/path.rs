//! Dotted-path resolution
//!
//! Sort keys and filter paths address columns through chains of relations
//! (`articles.author.name`). This module splits the dotted spelling into
//! [`PathSegment`]s, resolves the collection a path lands in, and maps a
//! planned path back to its `alias.column` form through the alias map.

use crate::compile::alias::AliasMap;
use crate::query::PathSegment;
use crate::schema::{RelationKind, Schema};
use crate::sql::ColumnRef;

pub fn parse_path(raw: &str) -> Vec<PathSegment> {
    raw.split('.').map(PathSegment::parse).collect()
}

/// Resolve a planned path to a qualified column. Single segments qualify
/// with the root collection; deeper paths look up the alias the join
/// planner recorded for their relational prefix. `None` means the prefix
/// was never planned (dangling path) and the caller should drop the
/// predicate or sort key.
pub fn column_path(
    path: &[PathSegment],
    collection: &str,
    alias_map: &AliasMap,
) -> Option<ColumnRef> {
    match path {
        [] => None,
        [segment] => Some(ColumnRef::qualified(collection, &segment.field)),
        [prefix @ .., last] => {
            let key: Vec<String> = prefix.iter().map(PathSegment::raw).collect();
            let alias = alias_map.get(&key)?;
            Some(ColumnRef::qualified(alias, &last.field))
        }
    }
}

/// Collection the final segment of a path belongs to, following each hop's
/// relation. Used to look up the field type for compare-value coercion.
/// `None` when any hop fails to resolve.
pub fn target_collection(
    path: &[PathSegment],
    collection: &str,
    schema: &Schema,
) -> Option<String> {
    let mut current = collection.to_string();
    for segment in &path[..path.len().saturating_sub(1)] {
        let (relation, kind) = schema.relation_info(&current, &segment.field)?;
        current = match kind {
            RelationKind::ManyToOne => relation.related_collection.clone()?,
            RelationKind::AnyToOne => segment.scope.clone()?,
            RelationKind::OneToMany | RelationKind::OneToAny => relation.collection.clone(),
        };
    }
    Some(current)
}
