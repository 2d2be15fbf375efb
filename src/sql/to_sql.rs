//! SQL string rendering
//!
//! Identifiers are emitted unquoted; select aliases are double-quoted only
//! when they contain characters an unquoted identifier cannot carry (the
//! aggregate aliases use `->`). String literals double embedded quotes.

use super::expr::{CastType, Literal, SqlExpr, SqlOperator};
use super::{
    Connective, Join, OrderByItem, SelectItem, SelectStatement, SortDirection, WhereCondition,
    WhereGroup,
};

pub trait ToSql {
    fn to_sql(&self) -> String;
}

fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn render_alias(alias: &str) -> String {
    if is_plain_identifier(alias) {
        alias.to_string()
    } else {
        format!("\"{}\"", alias.replace('"', "\"\""))
    }
}

impl ToSql for Literal {
    fn to_sql(&self) -> String {
        match self {
            Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
            Literal::Integer(i) => i.to_string(),
            Literal::Float(f) => f.to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Null => "NULL".to_string(),
        }
    }
}

impl ToSql for SqlExpr {
    fn to_sql(&self) -> String {
        match self {
            SqlExpr::Literal(literal) => literal.to_sql(),
            SqlExpr::Column(column) => match &column.table {
                Some(table) => format!("{}.{}", table, column.column),
                None => column.column.clone(),
            },
            SqlExpr::Star => "*".to_string(),
            SqlExpr::List(items) => {
                let rendered: Vec<String> = items.iter().map(|item| item.to_sql()).collect();
                format!("({})", rendered.join(", "))
            }
            SqlExpr::FnCall {
                name,
                distinct,
                args,
            } => {
                let rendered: Vec<String> = args.iter().map(|arg| arg.to_sql()).collect();
                if *distinct {
                    format!("{}(DISTINCT {})", name, rendered.join(", "))
                } else {
                    format!("{}({})", name, rendered.join(", "))
                }
            }
            SqlExpr::Cast { expr, cast_type } => match cast_type {
                CastType::Char255 => format!("CAST({} AS CHAR(255))", expr.to_sql()),
            },
            SqlExpr::OperatorApplication { operator, operands } => {
                render_operator_application(*operator, operands)
            }
            SqlExpr::InSubquery {
                expr,
                negated,
                subquery,
            } => {
                let keyword = if *negated { "NOT IN" } else { "IN" };
                format!("{} {} ({})", expr.to_sql(), keyword, subquery.to_sql())
            }
            SqlExpr::Exists { negated, subquery } => {
                let keyword = if *negated { "NOT EXISTS" } else { "EXISTS" };
                format!("{} ({})", keyword, subquery.to_sql())
            }
            SqlExpr::Raw(sql) => sql.clone(),
        }
    }
}

fn render_operator_application(operator: SqlOperator, operands: &[SqlExpr]) -> String {
    let rendered: Vec<String> = operands.iter().map(|operand| operand.to_sql()).collect();
    let binary = |symbol: &str| -> String {
        format!(
            "{} {} {}",
            rendered.first().cloned().unwrap_or_default(),
            symbol,
            rendered.get(1).cloned().unwrap_or_default()
        )
    };

    match operator {
        SqlOperator::Eq => binary("="),
        SqlOperator::Neq => binary("!="),
        SqlOperator::Lt => binary("<"),
        SqlOperator::Lte => binary("<="),
        SqlOperator::Gt => binary(">"),
        SqlOperator::Gte => binary(">="),
        SqlOperator::In => binary("IN"),
        SqlOperator::NotIn => binary("NOT IN"),
        SqlOperator::Like => binary("LIKE"),
        SqlOperator::NotLike => binary("NOT LIKE"),
        SqlOperator::Between | SqlOperator::NotBetween => {
            let keyword = if operator == SqlOperator::Between {
                "BETWEEN"
            } else {
                "NOT BETWEEN"
            };
            format!(
                "{} {} {} AND {}",
                rendered.first().cloned().unwrap_or_default(),
                keyword,
                rendered.get(1).cloned().unwrap_or_default(),
                rendered.get(2).cloned().unwrap_or_default()
            )
        }
        SqlOperator::IsNull => format!("{} IS NULL", rendered.first().cloned().unwrap_or_default()),
        SqlOperator::IsNotNull => format!(
            "{} IS NOT NULL",
            rendered.first().cloned().unwrap_or_default()
        ),
        SqlOperator::And => format!("({})", rendered.join(" AND ")),
        SqlOperator::Or => format!("({})", rendered.join(" OR ")),
    }
}

impl ToSql for WhereGroup {
    fn to_sql(&self) -> String {
        let connective = match self.connective {
            Connective::And => " AND ",
            Connective::Or => " OR ",
        };
        let parts: Vec<String> = self
            .conditions
            .iter()
            .filter_map(|condition| match condition {
                WhereCondition::Predicate(expr) => Some(expr.to_sql()),
                WhereCondition::Group(group) if group.is_empty() => None,
                WhereCondition::Group(group) => Some(format!("({})", group.to_sql())),
            })
            .collect();
        parts.join(connective)
    }
}

impl ToSql for SelectItem {
    fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} AS {}", self.expression.to_sql(), render_alias(alias)),
            None => self.expression.to_sql(),
        }
    }
}

impl ToSql for Join {
    fn to_sql(&self) -> String {
        let on: Vec<String> = self.on.iter().map(|term| term.to_sql()).collect();
        format!(
            "LEFT JOIN {} AS {} ON {}",
            self.table,
            self.alias,
            on.join(" AND ")
        )
    }
}

impl ToSql for OrderByItem {
    fn to_sql(&self) -> String {
        let direction = match self.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        format!("{} {}", self.expression.to_sql(), direction)
    }
}

impl ToSql for SelectStatement {
    fn to_sql(&self) -> String {
        let select = if self.select.is_empty() {
            "*".to_string()
        } else {
            self.select
                .iter()
                .map(|item| item.to_sql())
                .collect::<Vec<String>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", select, self.from);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        if !self.where_clause.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.where_clause.to_sql());
        }

        if !self.group_by.is_empty() {
            let group: Vec<String> = self.group_by.iter().map(|expr| expr.to_sql()).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&group.join(", "));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self.order_by.iter().map(|item| item.to_sql()).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }
}
