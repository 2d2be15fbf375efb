//! SQL expression tree

use super::SelectStatement;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl Literal {
    /// Lossy conversion from a JSON value, used after compare-value
    /// coercion has already normalized dates and numbers.
    pub fn from_json(value: &serde_json::Value) -> Literal {
        match value {
            serde_json::Value::Null => Literal::Null,
            serde_json::Value::Bool(b) => Literal::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Literal::Integer(i)
                } else {
                    Literal::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Literal::String(s.clone()),
            other => Literal::String(other.to_string()),
        }
    }
}

/// A column reference, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub column: String,
}

impl ColumnRef {
    pub fn qualified(table: impl Into<String>, column: impl Into<String>) -> Self {
        ColumnRef {
            table: Some(table.into()),
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    Like,
    NotLike,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
    And,
    Or,
}

/// Target types for CAST expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    /// The textual bridge for polymorphic keys: primary keys may be numeric
    /// while the discriminator/FK storage is a string.
    Char255,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Literal(Literal),
    Column(ColumnRef),
    Star,
    List(Vec<SqlExpr>),
    FnCall {
        name: String,
        distinct: bool,
        args: Vec<SqlExpr>,
    },
    Cast {
        expr: Box<SqlExpr>,
        cast_type: CastType,
    },
    OperatorApplication {
        operator: SqlOperator,
        operands: Vec<SqlExpr>,
    },
    InSubquery {
        expr: Box<SqlExpr>,
        negated: bool,
        subquery: Box<SelectStatement>,
    },
    Exists {
        negated: bool,
        subquery: Box<SelectStatement>,
    },
    /// Escape hatch for fragments the tree does not model, e.g. the
    /// never-true predicate emitted for `IN ()`.
    Raw(String),
}

impl SqlExpr {
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> SqlExpr {
        SqlExpr::Column(ColumnRef::qualified(table, column))
    }

    pub fn string(value: impl Into<String>) -> SqlExpr {
        SqlExpr::Literal(Literal::String(value.into()))
    }

    pub fn cast_char(expr: SqlExpr) -> SqlExpr {
        SqlExpr::Cast {
            expr: Box::new(expr),
            cast_type: CastType::Char255,
        }
    }

    pub fn binary(operator: SqlOperator, left: SqlExpr, right: SqlExpr) -> SqlExpr {
        SqlExpr::OperatorApplication {
            operator,
            operands: vec![left, right],
        }
    }

    pub fn unary(operator: SqlOperator, operand: SqlExpr) -> SqlExpr {
        SqlExpr::OperatorApplication {
            operator,
            operands: vec![operand],
        }
    }
}
