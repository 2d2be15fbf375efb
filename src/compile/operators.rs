//! Operator registry
//!
//! Maps symbolic filter operators (`_eq`, `_in`, `_between`, ...) to the
//! predicate emitter that appends SQL for them. Emitters receive the target
//! group so the predicate lands under the caller's `_and`/`_or` connective.
//! Negatable operators carry their `_n` twin (`_starts_with` /
//! `_nstarts_with`) so negation inversion maps back into the registry.

use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashMap;

use crate::compile::errors::{CompileError, CompileResult};
use crate::compile::helpers::escape_like;
use crate::sql::{Literal, SqlExpr, SqlOperator, WhereGroup};

type OperatorFn = fn(&mut WhereGroup, SqlExpr, &Value) -> CompileResult<()>;

/// Append the predicate for `operator` to `group`, or fail with
/// [`CompileError::UnknownOperator`].
pub fn apply_operator(
    group: &mut WhereGroup,
    column: SqlExpr,
    operator: &str,
    value: &Value,
) -> CompileResult<()> {
    match OPERATORS.get(operator) {
        Some(emit) => emit(group, column, value),
        None => Err(CompileError::UnknownOperator(operator.to_string())),
    }
}

pub fn is_known_operator(operator: &str) -> bool {
    OPERATORS.contains_key(operator)
}

#[derive(Clone, Copy)]
enum LikeShape {
    Contains,
    StartsWith,
    EndsWith,
}

lazy_static! {
    static ref OPERATORS: HashMap<&'static str, OperatorFn> = {
        let mut m: HashMap<&'static str, OperatorFn> = HashMap::new();

        m.insert("_eq", |group, column, value| {
            if value.is_null() {
                group.push(SqlExpr::unary(SqlOperator::IsNull, column));
            } else {
                group.push(SqlExpr::binary(
                    SqlOperator::Eq,
                    column,
                    SqlExpr::Literal(Literal::from_json(value)),
                ));
            }
            Ok(())
        });

        m.insert("_neq", |group, column, value| {
            if value.is_null() {
                group.push(SqlExpr::unary(SqlOperator::IsNotNull, column));
            } else {
                group.push(SqlExpr::binary(
                    SqlOperator::Neq,
                    column,
                    SqlExpr::Literal(Literal::from_json(value)),
                ));
            }
            Ok(())
        });

        m.insert("_lt", |group, column, value| {
            emit_comparison(group, column, value, SqlOperator::Lt)
        });
        m.insert("_lte", |group, column, value| {
            emit_comparison(group, column, value, SqlOperator::Lte)
        });
        m.insert("_gt", |group, column, value| {
            emit_comparison(group, column, value, SqlOperator::Gt)
        });
        m.insert("_gte", |group, column, value| {
            emit_comparison(group, column, value, SqlOperator::Gte)
        });

        m.insert("_in", |group, column, value| {
            emit_in(group, column, value, false)
        });
        m.insert("_nin", |group, column, value| {
            emit_in(group, column, value, true)
        });

        m.insert("_null", |group, column, value| {
            if is_false(value) {
                group.push(SqlExpr::unary(SqlOperator::IsNotNull, column));
            } else {
                group.push(SqlExpr::unary(SqlOperator::IsNull, column));
            }
            Ok(())
        });
        m.insert("_nnull", |group, column, value| {
            if is_false(value) {
                group.push(SqlExpr::unary(SqlOperator::IsNull, column));
            } else {
                group.push(SqlExpr::unary(SqlOperator::IsNotNull, column));
            }
            Ok(())
        });

        m.insert("_contains", |group, column, value| {
            emit_like(group, column, value, LikeShape::Contains, false)
        });
        m.insert("_ncontains", |group, column, value| {
            emit_like(group, column, value, LikeShape::Contains, true)
        });
        m.insert("_starts_with", |group, column, value| {
            emit_like(group, column, value, LikeShape::StartsWith, false)
        });
        m.insert("_nstarts_with", |group, column, value| {
            emit_like(group, column, value, LikeShape::StartsWith, true)
        });
        m.insert("_ends_with", |group, column, value| {
            emit_like(group, column, value, LikeShape::EndsWith, false)
        });
        m.insert("_nends_with", |group, column, value| {
            emit_like(group, column, value, LikeShape::EndsWith, true)
        });

        m.insert("_between", |group, column, value| {
            emit_between(group, column, value, false)
        });
        m.insert("_nbetween", |group, column, value| {
            emit_between(group, column, value, true)
        });

        m.insert("_empty", |group, column, _value| {
            group.push(SqlExpr::OperatorApplication {
                operator: SqlOperator::Or,
                operands: vec![
                    SqlExpr::unary(SqlOperator::IsNull, column.clone()),
                    SqlExpr::binary(SqlOperator::Eq, column, SqlExpr::string("")),
                ],
            });
            Ok(())
        });
        m.insert("_nempty", |group, column, _value| {
            group.push(SqlExpr::OperatorApplication {
                operator: SqlOperator::And,
                operands: vec![
                    SqlExpr::unary(SqlOperator::IsNotNull, column.clone()),
                    SqlExpr::binary(SqlOperator::Neq, column, SqlExpr::string("")),
                ],
            });
            Ok(())
        });

        m
    };
}

fn emit_comparison(
    group: &mut WhereGroup,
    column: SqlExpr,
    value: &Value,
    operator: SqlOperator,
) -> CompileResult<()> {
    if value.is_null() {
        log::debug!("range comparison against null dropped");
        return Ok(());
    }
    group.push(SqlExpr::binary(
        operator,
        column,
        SqlExpr::Literal(Literal::from_json(value)),
    ));
    Ok(())
}

fn emit_in(
    group: &mut WhereGroup,
    column: SqlExpr,
    value: &Value,
    negated: bool,
) -> CompileResult<()> {
    let elements: Vec<&Value> = match value {
        Value::Array(elements) => elements.iter().collect(),
        Value::Null => {
            log::debug!("list comparison against null dropped");
            return Ok(());
        }
        single => vec![single],
    };

    if elements.is_empty() {
        // IN over the empty set is never (always when negated) true; emit
        // the constant instead of invalid SQL.
        group.push(SqlExpr::Raw(
            if negated { "1 = 1" } else { "1 = 0" }.to_string(),
        ));
        return Ok(());
    }

    let list = SqlExpr::List(
        elements
            .iter()
            .map(|element| SqlExpr::Literal(Literal::from_json(element)))
            .collect(),
    );
    let operator = if negated {
        SqlOperator::NotIn
    } else {
        SqlOperator::In
    };
    group.push(SqlExpr::binary(operator, column, list));
    Ok(())
}

fn emit_like(
    group: &mut WhereGroup,
    column: SqlExpr,
    value: &Value,
    shape: LikeShape,
    negated: bool,
) -> CompileResult<()> {
    let Some(needle) = string_needle(value) else {
        log::debug!("pattern comparison against non-scalar dropped");
        return Ok(());
    };

    let escaped = escape_like(&needle);
    let pattern = match shape {
        LikeShape::Contains => format!("%{escaped}%"),
        LikeShape::StartsWith => format!("{escaped}%"),
        LikeShape::EndsWith => format!("%{escaped}"),
    };
    let operator = if negated {
        SqlOperator::NotLike
    } else {
        SqlOperator::Like
    };
    group.push(SqlExpr::binary(operator, column, SqlExpr::string(pattern)));
    Ok(())
}

fn emit_between(
    group: &mut WhereGroup,
    column: SqlExpr,
    value: &Value,
    negated: bool,
) -> CompileResult<()> {
    let bounds = match value {
        Value::Array(bounds) if bounds.len() == 2 => bounds,
        other => {
            return Err(CompileError::InvalidQuery(format!(
                "between expects exactly two bounds, got {other}"
            )));
        }
    };

    let operator = if negated {
        SqlOperator::NotBetween
    } else {
        SqlOperator::Between
    };
    group.push(SqlExpr::OperatorApplication {
        operator,
        operands: vec![
            column,
            SqlExpr::Literal(Literal::from_json(&bounds[0])),
            SqlExpr::Literal(Literal::from_json(&bounds[1])),
        ],
    });
    Ok(())
}

fn is_false(value: &Value) -> bool {
    matches!(value, Value::Bool(false)) || value.as_str() == Some("false")
}

fn string_needle(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
