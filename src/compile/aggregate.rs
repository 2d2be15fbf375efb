//! Group-by and aggregate fan-out
//!
//! Group and aggregate keys are dotted paths like sort keys: multi-segment
//! keys plan joins through the shared alias map and resolve to the joined
//! column. Aggregate operations map onto the SQL aggregate functions with
//! aliases of the form `op-><field>`; `count: ["*"]` becomes
//! `COUNT(*) AS count` and the `countAll` operation `COUNT(*) AS countAll`.

use std::collections::BTreeMap;

use crate::compile::alias::{AliasAllocator, AliasMap};
use crate::compile::errors::CompileResult;
use crate::compile::joins::add_join;
use crate::compile::path::{column_path, parse_path};
use crate::schema::Schema;
use crate::sql::{SelectStatement, SqlExpr};

#[allow(clippy::too_many_arguments)]
pub fn apply_group(
    stmt: &mut SelectStatement,
    group: &[String],
    collection: &str,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<()> {
    for key in group {
        match resolve_key(stmt, key, collection, schema, alias_map, allocator, in_subquery)? {
            Some(column) => {
                stmt.group_by(column);
            }
            None => log::debug!("group key `{key}` did not resolve to a column; dropped"),
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn apply_aggregate(
    stmt: &mut SelectStatement,
    aggregate: &BTreeMap<String, Vec<String>>,
    collection: &str,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<()> {
    for (operation, fields) in aggregate {
        if operation == "countAll" {
            stmt.select_expr(count_star(), Some("countAll".to_string()));
            continue;
        }

        let Some((function, distinct)) = aggregate_function(operation) else {
            log::warn!("unknown aggregate operation `{operation}` skipped");
            continue;
        };

        for field in fields {
            if field == "*" {
                if operation == "count" {
                    stmt.select_expr(count_star(), Some("count".to_string()));
                } else {
                    log::warn!("aggregate `{operation}` over `*` is not defined; skipped");
                }
                continue;
            }

            let Some(column) = resolve_key(
                stmt, field, collection, schema, alias_map, allocator, in_subquery,
            )?
            else {
                log::debug!("aggregate key `{field}` did not resolve to a column; dropped");
                continue;
            };

            stmt.select_expr(
                SqlExpr::FnCall {
                    name: function.to_string(),
                    distinct,
                    args: vec![column],
                },
                Some(format!("{operation}->{field}")),
            );
        }
    }
    Ok(())
}

/// Resolve a dotted group/aggregate key: single segments qualify with the
/// root collection, deeper paths plan joins and resolve through the alias
/// map. `None` means the key is unknown or crosses an unplannable relation
/// and should be dropped silently.
#[allow(clippy::too_many_arguments)]
fn resolve_key(
    stmt: &mut SelectStatement,
    key: &str,
    collection: &str,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<Option<SqlExpr>> {
    let path = parse_path(key);

    if path.len() == 1 {
        let field = &path[0].field;
        if schema.field(collection, field).is_none() {
            return Ok(None);
        }
        return Ok(Some(SqlExpr::column(collection, field)));
    }

    add_join(
        stmt,
        &path,
        collection,
        schema,
        alias_map,
        allocator,
        in_subquery,
    )?;
    Ok(column_path(&path, collection, alias_map).map(SqlExpr::Column))
}

fn count_star() -> SqlExpr {
    SqlExpr::FnCall {
        name: "COUNT".to_string(),
        distinct: false,
        args: vec![SqlExpr::Star],
    }
}

fn aggregate_function(operation: &str) -> Option<(&'static str, bool)> {
    match operation {
        "count" => Some(("COUNT", false)),
        "countDistinct" => Some(("COUNT", true)),
        "sum" => Some(("SUM", false)),
        "sumDistinct" => Some(("SUM", true)),
        "avg" => Some(("AVG", false)),
        "avgDistinct" => Some(("AVG", true)),
        "min" => Some(("MIN", false)),
        "max" => Some(("MAX", false)),
        _ => None,
    }
}
