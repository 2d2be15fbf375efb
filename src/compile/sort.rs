//! Sort compilation
//!
//! Sort keys are dotted paths with an optional `-` prefix for descending
//! order. Relational keys plan their joins through the shared alias map so
//! a path already joined for the filter is not resolved differently here.

use crate::compile::alias::{AliasAllocator, AliasMap};
use crate::compile::errors::CompileResult;
use crate::compile::joins::add_join;
use crate::compile::path::{column_path, parse_path};
use crate::schema::Schema;
use crate::sql::{SelectStatement, SortDirection, SqlExpr};

#[allow(clippy::too_many_arguments)]
pub fn apply_sort(
    stmt: &mut SelectStatement,
    sort: &[String],
    collection: &str,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<()> {
    for key in sort {
        let (raw, direction) = match key.strip_prefix('-') {
            Some(rest) => (rest, SortDirection::Desc),
            None => (key.as_str(), SortDirection::Asc),
        };
        let path = parse_path(raw);

        if path.len() == 1 {
            let field = &path[0].field;
            if schema.field(collection, field).is_none() {
                log::debug!("unknown sort key `{collection}.{field}` dropped");
                continue;
            }
            stmt.order_by(SqlExpr::column(collection, field), direction);
            continue;
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
        match column_path(&path, collection, alias_map) {
            Some(column) => {
                stmt.order_by(SqlExpr::Column(column), direction);
            }
            None => {
                // A to-many prefix stops join planning at the root; sorting
                // across it is undefined, so the key is dropped.
                log::debug!("sort key `{raw}` did not resolve to a column; dropped");
            }
        }
    }
    Ok(())
}
