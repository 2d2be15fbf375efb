//! Query compilation driver
//!
//! [`apply_query`] decorates a statement with every member the query
//! carries, in a fixed order: sort, limit, offset, page, search, group,
//! aggregate, and filter last. Filter runs last so its subquery builders
//! see a statement already carrying pagination-free context; the resulting
//! SQL semantics are order-independent.
//!
//! One alias allocator spans the whole compilation, including nested
//! existence subqueries, so every alias in the emitted statement is unique.
//! The alias map is narrower: each statement scope (outer query, each
//! subquery) holds its own, shared between its sort and filter passes.

pub mod aggregate;
pub mod alias;
pub mod errors;
pub mod filter;
pub mod helpers;
pub mod joins;
pub mod operators;
pub mod path;
pub mod search;
pub mod sort;

use crate::query::Query;
use crate::schema::Schema;
use crate::sql::SelectStatement;

use alias::{AliasAllocator, AliasMap};
use errors::CompileResult;

/// Apply `query` to `stmt` over the root `collection`. `sub_query` marks
/// compilation into an existence subquery, where to-many hops join inline
/// instead of nesting further.
pub fn apply_query(
    stmt: &mut SelectStatement,
    collection: &str,
    query: &Query,
    schema: &Schema,
    sub_query: bool,
) -> CompileResult<()> {
    let reserved = schema.collections.keys().cloned().collect();
    let mut allocator = AliasAllocator::new(reserved);
    apply_query_inner(stmt, collection, query, schema, sub_query, &mut allocator)
}

pub(crate) fn apply_query_inner(
    stmt: &mut SelectStatement,
    collection: &str,
    query: &Query,
    schema: &Schema,
    sub_query: bool,
    allocator: &mut AliasAllocator,
) -> CompileResult<()> {
    let mut alias_map = AliasMap::default();

    if let Some(sort_keys) = &query.sort {
        sort::apply_sort(
            stmt,
            sort_keys,
            collection,
            schema,
            &mut alias_map,
            allocator,
            sub_query,
        )?;
    }

    if let Some(limit) = query.limit {
        // -1 disables the LIMIT clause entirely.
        if limit >= 0 {
            stmt.limit(limit);
        }
    }

    if let Some(offset) = query.offset {
        stmt.offset(offset);
    }

    if let Some(page) = query.page {
        // A page is only meaningful relative to a limit; it overrides any
        // provided offset.
        if let Some(limit) = query.limit {
            if limit >= 0 && page >= 1 {
                stmt.offset(limit * (page - 1));
            }
        }
    }

    if let Some(term) = &query.search {
        search::apply_search(stmt, term, collection, schema)?;
    }

    if let Some(group) = &query.group {
        aggregate::apply_group(
            stmt,
            group,
            collection,
            schema,
            &mut alias_map,
            allocator,
            sub_query,
        )?;
    }

    if let Some(aggregates) = &query.aggregate {
        aggregate::apply_aggregate(
            stmt,
            aggregates,
            collection,
            schema,
            &mut alias_map,
            allocator,
            sub_query,
        )?;
    }

    if let Some(filter) = &query.filter {
        filter::apply_filter(
            stmt,
            filter,
            collection,
            schema,
            &mut alias_map,
            allocator,
            sub_query,
        )?;
    }

    Ok(())
}
