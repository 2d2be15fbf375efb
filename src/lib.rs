//! collectql - Declarative query to SQL compilation
//!
//! This crate compiles a structured `Query` description (filter tree, sort
//! list, pagination, search, group-by, aggregation) over a relational
//! `Schema` into a SQL SELECT statement:
//! - Relational path traversal across m2o / o2m / a2o / o2a relations
//! - Join planning with collision-free table aliases
//! - Existence subqueries for to-many predicates
//! - Operator registry for comparison primitives
//!
//! The compiler never executes SQL; it decorates a [`sql::SelectStatement`]
//! which the caller renders with [`sql::ToSql`] and hands to a database
//! driver.

pub mod compile;
pub mod query;
pub mod schema;
pub mod sql;

pub use compile::apply_query;
pub use compile::errors::{CompileError, CompileResult};
pub use query::{Filter, Query};
pub use schema::{Collection, Field, FieldType, Relation, RelationKind, Schema};
pub use sql::{SelectStatement, ToSql};
