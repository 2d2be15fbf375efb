//! Join planning
//!
//! Walks a relational path one hop at a time, allocating an alias per hop
//! and emitting the LEFT JOIN that realizes the relation. To-many hops at
//! the root of a top-level statement are left to the filter compiler, which
//! realizes them as existence subqueries instead of row-multiplying joins.

use crate::compile::alias::{AliasAllocator, AliasMap};
use crate::compile::errors::{CompileError, CompileResult};
use crate::query::PathSegment;
use crate::schema::{Relation, RelationKind, Schema};
use crate::sql::{Join, SelectStatement, SqlExpr, SqlOperator};

pub fn add_join(
    stmt: &mut SelectStatement,
    path: &[PathSegment],
    collection: &str,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<()> {
    follow_relation(
        stmt,
        path,
        collection,
        None,
        Vec::new(),
        schema,
        alias_map,
        allocator,
        in_subquery,
    )
}

#[allow(clippy::too_many_arguments)]
fn follow_relation(
    stmt: &mut SelectStatement,
    remaining: &[PathSegment],
    parent_collection: &str,
    parent_alias: Option<&str>,
    mut key: Vec<String>,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<()> {
    let Some(segment) = remaining.first() else {
        return Ok(());
    };

    let Some((relation, kind)) = schema.relation_info(parent_collection, &segment.field) else {
        // Scalar column (or unknown field): nothing left to join. Column
        // resolution decides later whether the remainder is addressable.
        return Ok(());
    };

    let alias = allocator.next();
    key.push(segment.raw());

    // Qualify parent columns with its alias once we are past the root hop.
    let parent_ref = parent_alias.unwrap_or(parent_collection);

    let next_collection = match kind {
        RelationKind::ManyToOne => {
            let related = relation.related_collection.as_deref().ok_or_else(|| {
                CompileError::InvalidQuery(format!(
                    "relation on `{}.{}` has no related collection",
                    relation.collection, relation.field
                ))
            })?;
            let related_pk = schema.primary(related).unwrap_or("id");
            stmt.left_join(Join {
                table: related.to_string(),
                alias: alias.clone(),
                on: vec![SqlExpr::binary(
                    SqlOperator::Eq,
                    SqlExpr::column(parent_ref, &relation.field),
                    SqlExpr::column(&alias, related_pk),
                )],
            });
            alias_map.insert(key.clone(), alias.clone());
            log::debug!("joined {related} AS {alias} (m2o via {parent_ref}.{})", relation.field);
            Some(related.to_string())
        }

        RelationKind::AnyToOne => {
            let scope = segment.scope.as_deref().ok_or_else(|| {
                CompileError::InvalidQuery(format!(
                    "polymorphic field `{}` requires an explicit `:scope` suffix",
                    segment.field
                ))
            })?;
            if let Some(allowed) = &relation.meta.one_allowed_collections {
                if !allowed.iter().any(|candidate| candidate == scope) {
                    return Err(CompileError::InvalidQuery(format!(
                        "collection `{scope}` is not a valid scope for `{}`",
                        segment.field
                    )));
                }
            }
            let discriminator = discriminator_field(relation)?;
            let scope_pk = schema.primary(scope).unwrap_or("id");
            stmt.left_join(Join {
                table: scope.to_string(),
                alias: alias.clone(),
                on: vec![
                    SqlExpr::binary(
                        SqlOperator::Eq,
                        SqlExpr::column(parent_ref, discriminator),
                        SqlExpr::string(scope),
                    ),
                    // Primary keys may be numeric while the polymorphic FK
                    // stores text.
                    SqlExpr::binary(
                        SqlOperator::Eq,
                        SqlExpr::column(parent_ref, &relation.field),
                        SqlExpr::cast_char(SqlExpr::column(&alias, scope_pk)),
                    ),
                ],
            });
            alias_map.insert(key.clone(), alias.clone());
            Some(scope.to_string())
        }

        RelationKind::OneToAny => {
            if in_subquery || parent_alias.is_some() {
                let discriminator = discriminator_field(relation)?;
                let parent_pk = schema.primary(parent_collection).unwrap_or("id");
                stmt.left_join(Join {
                    table: relation.collection.clone(),
                    alias: alias.clone(),
                    on: vec![
                        SqlExpr::binary(
                            SqlOperator::Eq,
                            SqlExpr::column(&alias, discriminator),
                            SqlExpr::string(parent_collection),
                        ),
                        SqlExpr::binary(
                            SqlOperator::Eq,
                            SqlExpr::column(&alias, &relation.field),
                            SqlExpr::cast_char(SqlExpr::column(parent_ref, parent_pk)),
                        ),
                    ],
                });
                alias_map.insert(key.clone(), alias.clone());
                Some(relation.collection.clone())
            } else {
                log::debug!(
                    "to-many hop `{}` at root left to the subquery compiler",
                    segment.field
                );
                None
            }
        }

        RelationKind::OneToMany => {
            if in_subquery || parent_alias.is_some() {
                let parent_pk = schema.primary(parent_collection).unwrap_or("id");
                stmt.left_join(Join {
                    table: relation.collection.clone(),
                    alias: alias.clone(),
                    on: vec![SqlExpr::binary(
                        SqlOperator::Eq,
                        SqlExpr::column(&alias, &relation.field),
                        SqlExpr::column(parent_ref, parent_pk),
                    )],
                });
                alias_map.insert(key.clone(), alias.clone());
                Some(relation.collection.clone())
            } else {
                // Root-level to-many hop in a top-level statement: the
                // filter compiler realizes it as an existence subquery, so
                // a row-multiplying join here would be wrong.
                log::debug!(
                    "to-many hop `{}` at root left to the subquery compiler",
                    segment.field
                );
                None
            }
        }
    };

    match next_collection {
        Some(next) => follow_relation(
            stmt,
            &remaining[1..],
            &next,
            Some(&alias),
            key,
            schema,
            alias_map,
            allocator,
            in_subquery,
        ),
        None => Ok(()),
    }
}

fn discriminator_field(relation: &Relation) -> CompileResult<&str> {
    relation
        .meta
        .one_collection_field
        .as_deref()
        .ok_or_else(|| {
            CompileError::InvalidQuery(format!(
                "polymorphic relation on `{}.{}` has no discriminator column",
                relation.collection, relation.field
            ))
        })
}
