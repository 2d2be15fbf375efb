//! Search fan-out
//!
//! A search term becomes one AND-attached group of OR disjuncts across
//! every scalar field of the root collection: case-insensitive substring
//! match on text, exact match on numbers when the term parses, exact match
//! on uuid columns when the term is a valid UUID.

use uuid::Uuid;

use crate::compile::errors::CompileResult;
use crate::compile::helpers::escape_like;
use crate::schema::{FieldType, Schema};
use crate::sql::{Connective, Literal, SelectStatement, SqlExpr, SqlOperator, WhereGroup};

pub fn apply_search(
    stmt: &mut SelectStatement,
    search: &str,
    collection: &str,
    schema: &Schema,
) -> CompileResult<()> {
    let Some(meta) = schema.collection(collection) else {
        log::debug!("search against unknown collection `{collection}` dropped");
        return Ok(());
    };

    let token = search.trim();
    let needle = format!("%{}%", escape_like(&token.to_lowercase()));
    let integer_token = token.parse::<i64>().ok();
    let float_token = token.parse::<f64>().ok();
    let uuid_token = Uuid::parse_str(token).ok();

    let mut disjuncts = WhereGroup::new(Connective::Or);

    // Field iteration is sorted so compiling the same query twice yields
    // identical SQL.
    let mut names: Vec<&String> = meta.fields.keys().collect();
    names.sort();

    for name in names {
        let Some(field) = meta.field(name) else {
            continue;
        };
        let column = SqlExpr::column(collection, name);
        let field_type = field.field_type;

        if field_type.is_textual() {
            disjuncts.push(SqlExpr::binary(
                SqlOperator::Like,
                SqlExpr::FnCall {
                    name: "LOWER".to_string(),
                    distinct: false,
                    args: vec![column],
                },
                SqlExpr::string(needle.clone()),
            ));
        } else if field_type.is_integer() {
            if let Some(value) = integer_token {
                disjuncts.push(SqlExpr::binary(
                    SqlOperator::Eq,
                    column,
                    SqlExpr::Literal(Literal::Integer(value)),
                ));
            }
        } else if field_type.is_numeric() {
            if let Some(value) = float_token {
                disjuncts.push(SqlExpr::binary(
                    SqlOperator::Eq,
                    column,
                    SqlExpr::Literal(Literal::Float(value)),
                ));
            }
        } else if field_type == FieldType::Uuid && uuid_token.is_some() {
            disjuncts.push(SqlExpr::binary(
                SqlOperator::Eq,
                column,
                SqlExpr::string(token),
            ));
        }
    }

    stmt.where_group(disjuncts);
    Ok(())
}
