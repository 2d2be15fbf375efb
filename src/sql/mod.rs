//! SQL statement model
//!
//! A [`SelectStatement`] is the object the compiler decorates: clause items
//! are plain data, mutated through knex-flavoured builder methods and
//! rendered by [`ToSql`] once compilation finishes. Keeping the statement as
//! a tree (instead of concatenating strings during planning) lets the filter
//! compiler nest whole statements inside `IN (...)` and `EXISTS (...)`
//! expressions.

pub mod expr;
pub mod to_sql;

pub use expr::{CastType, ColumnRef, Literal, SqlExpr, SqlOperator};
pub use to_sql::ToSql;

/// How predicates within one [`WhereGroup`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereCondition {
    Predicate(SqlExpr),
    Group(WhereGroup),
}

/// A parenthesized group of predicates joined by one connective. Groups nest
/// arbitrarily; empty groups render nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereGroup {
    pub connective: Connective,
    pub conditions: Vec<WhereCondition>,
}

impl WhereGroup {
    pub fn new(connective: Connective) -> Self {
        WhereGroup {
            connective,
            conditions: Vec::new(),
        }
    }

    pub fn push(&mut self, predicate: SqlExpr) {
        self.conditions.push(WhereCondition::Predicate(predicate));
    }

    pub fn push_group(&mut self, group: WhereGroup) {
        if !group.is_empty() {
            self.conditions.push(WhereCondition::Group(group));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expression: SqlExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub table: String,
    pub alias: String,
    /// ON terms, joined with AND on render.
    pub on: Vec<SqlExpr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expression: SqlExpr,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Select list; renders `*` when empty.
    pub select: Vec<SelectItem>,
    pub from: String,
    pub joins: Vec<Join>,
    pub where_clause: WhereGroup,
    pub group_by: Vec<SqlExpr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SelectStatement {
    pub fn new(from: impl Into<String>) -> Self {
        SelectStatement {
            select: Vec::new(),
            from: from.into(),
            joins: Vec::new(),
            where_clause: WhereGroup::new(Connective::And),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn select_expr(&mut self, expression: SqlExpr, alias: Option<String>) -> &mut Self {
        self.select.push(SelectItem { expression, alias });
        self
    }

    pub fn left_join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }

    /// AND-attach a predicate to the outer WHERE.
    pub fn and_where(&mut self, predicate: SqlExpr) -> &mut Self {
        self.where_clause.push(predicate);
        self
    }

    /// AND-attach a grouped sub-clause to the outer WHERE.
    pub fn where_group(&mut self, group: WhereGroup) -> &mut Self {
        self.where_clause.push_group(group);
        self
    }

    pub fn order_by(&mut self, expression: SqlExpr, direction: SortDirection) -> &mut Self {
        self.order_by.push(OrderByItem {
            expression,
            direction,
        });
        self
    }

    pub fn group_by(&mut self, expression: SqlExpr) -> &mut Self {
        self.group_by.push(expression);
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }
}
