//! Filter compilation
//!
//! Two passes over one normalized filter tree, sharing the compilation's
//! alias map. Pass 1 plans joins for every leaf whose path crosses a
//! relation. Pass 2 emits predicates, threading the `_and`/`_or` connective
//! down the tree. Leaves that cross a to-many relation do not join at the
//! top level (a join would multiply rows); they compile into existence
//! subqueries whose nested filter is compiled recursively with
//! `sub_query = true`.

use serde_json::Value;

use crate::compile::alias::{AliasAllocator, AliasMap};
use crate::compile::errors::CompileResult;
use crate::compile::helpers::coerce_compare_value;
use crate::compile::joins::add_join;
use crate::compile::operators::apply_operator;
use crate::compile::path::{column_path, target_collection};
use crate::query::filter::{invert_filter_value, is_negative_operator};
use crate::query::{Filter, FilterLeaf, FilterNode, Query};
use crate::schema::{RelationKind, Schema};
use crate::sql::{Connective, SelectStatement, SqlExpr, SqlOperator, WhereGroup};

#[allow(clippy::too_many_arguments)]
pub fn apply_filter(
    stmt: &mut SelectStatement,
    filter: &Filter,
    collection: &str,
    schema: &Schema,
    alias_map: &mut AliasMap,
    allocator: &mut AliasAllocator,
    in_subquery: bool,
) -> CompileResult<()> {
    let node = filter.normalize()?;
    let mut compiler = FilterCompiler {
        schema,
        alias_map,
        allocator,
        in_subquery,
    };

    compiler.plan_joins(stmt, &node, collection)?;
    compiler.emit(&mut stmt.where_clause, &node, collection)
}

struct FilterCompiler<'a> {
    schema: &'a Schema,
    alias_map: &'a mut AliasMap,
    allocator: &'a mut AliasAllocator,
    in_subquery: bool,
}

impl<'a> FilterCompiler<'a> {
    /// Pass 1: visit every branch and plan joins for multi-hop leaves.
    fn plan_joins(
        &mut self,
        stmt: &mut SelectStatement,
        node: &FilterNode,
        collection: &str,
    ) -> CompileResult<()> {
        match node {
            FilterNode::MatchAll => Ok(()),
            FilterNode::And(nodes) | FilterNode::Or(nodes) => {
                for child in nodes {
                    self.plan_joins(stmt, child, collection)?;
                }
                Ok(())
            }
            FilterNode::Leaf(leaf) => {
                if leaf.path.len() > 1 {
                    add_join(
                        stmt,
                        &leaf.path,
                        collection,
                        self.schema,
                        self.alias_map,
                        self.allocator,
                        self.in_subquery,
                    )?;
                }
                Ok(())
            }
        }
    }

    /// Pass 2: emit predicates into `group`, which carries the connective
    /// the predicate attaches with.
    fn emit(
        &mut self,
        group: &mut WhereGroup,
        node: &FilterNode,
        collection: &str,
    ) -> CompileResult<()> {
        match node {
            FilterNode::MatchAll => Ok(()),
            FilterNode::And(nodes) => {
                let mut sub = WhereGroup::new(Connective::And);
                for child in nodes {
                    self.emit(&mut sub, child, collection)?;
                }
                group.push_group(sub);
                Ok(())
            }
            FilterNode::Or(nodes) => {
                let mut sub = WhereGroup::new(Connective::Or);
                for child in nodes {
                    self.emit(&mut sub, child, collection)?;
                }
                group.push_group(sub);
                Ok(())
            }
            FilterNode::Leaf(leaf) => self.emit_leaf(group, leaf, collection),
        }
    }

    fn emit_leaf(
        &mut self,
        group: &mut WhereGroup,
        leaf: &FilterLeaf,
        collection: &str,
    ) -> CompileResult<()> {
        let kind = self
            .schema
            .relation_info(collection, &leaf.path[0].field)
            .map(|(_, kind)| kind);

        // `_some` / `_none` only have meaning as existence checks, so they
        // never fall through to inline handling.
        let existence_qualifier =
            matches!(leaf.operator.as_deref(), Some("_some") | Some("_none"));

        match kind {
            // To-many relations span multiple child rows: existence
            // subquery, unless we are already inside one and the predicate
            // sits directly on the relation (the join is planned then).
            Some(kind)
                if kind.is_to_many()
                    && (existence_qualifier
                        || !(self.in_subquery && leaf.path.len() == 1)) =>
            {
                self.emit_existence(group, leaf, collection, kind)
            }
            _ => self.emit_inline(group, leaf, collection),
        }
    }

    /// Inline predicate: scalar column, or a path whose joins are already
    /// planned (m2o / a2o chains).
    fn emit_inline(
        &mut self,
        group: &mut WhereGroup,
        leaf: &FilterLeaf,
        collection: &str,
    ) -> CompileResult<()> {
        let Some(operator) = leaf.operator.as_deref() else {
            log::debug!(
                "nested filter object on a to-one path `{}`; dropping predicate",
                leaf.path[0].field
            );
            return Ok(());
        };

        let column = if leaf.path.len() == 1 {
            let field = &leaf.path[0].field;
            let known = self.schema.field(collection, field).is_some()
                || self.schema.relation_info(collection, field).is_some();
            if !known {
                // Permission filters may reference fields this request does
                // not see; failing hard would leak schema information.
                log::debug!("unknown field `{collection}.{field}` in filter; dropped");
                return Ok(());
            }
            SqlExpr::column(collection, field)
        } else {
            match column_path(&leaf.path, collection, self.alias_map) {
                Some(column) => SqlExpr::Column(column),
                None => {
                    log::debug!("dangling filter path; predicate dropped");
                    return Ok(());
                }
            }
        };

        let field_type = target_collection(&leaf.path, collection, self.schema)
            .and_then(|target| {
                leaf.path
                    .last()
                    .and_then(|segment| self.schema.field(&target, &segment.field))
            })
            .map(|field| field.field_type);

        let value = coerce_compare_value(operator, &leaf.value, field_type)?;
        apply_operator(group, column, operator, &value)
    }

    fn emit_existence(
        &mut self,
        group: &mut WhereGroup,
        leaf: &FilterLeaf,
        collection: &str,
        kind: RelationKind,
    ) -> CompileResult<()> {
        let Some((relation, _)) = self.schema.relation_info(collection, &leaf.path[0].field)
        else {
            return Ok(());
        };
        let child = relation.collection.clone();
        let fk = relation.field.clone();
        let discriminator = relation.meta.one_collection_field.clone();
        let parent_pk = self
            .schema
            .primary(collection)
            .unwrap_or("id")
            .to_string();

        // `_some` / `_none` apply only directly on the relation field; any
        // deeper spelling treats the whole chain as the nested filter.
        if leaf.path.len() == 1 {
            match leaf.operator.as_deref() {
                Some("_none") => {
                    return self.emit_projection(
                        group,
                        ExistenceShape {
                            collection,
                            parent_pk: &parent_pk,
                            child: &child,
                            fk: &fk,
                            discriminator: discriminator.as_deref(),
                            kind,
                        },
                        leaf.value.clone(),
                        true,
                    );
                }
                Some("_some") => {
                    return self.emit_projection(
                        group,
                        ExistenceShape {
                            collection,
                            parent_pk: &parent_pk,
                            child: &child,
                            fk: &fk,
                            discriminator: discriminator.as_deref(),
                            kind,
                        },
                        leaf.value.clone(),
                        false,
                    );
                }
                _ => {}
            }
        }

        let shape = ExistenceShape {
            collection,
            parent_pk: &parent_pk,
            child: &child,
            fk: &fk,
            discriminator: discriminator.as_deref(),
            kind,
        };

        if let Some(operator) = leaf.operator.as_deref() {
            if is_negative_operator(operator) {
                // De Morgan: invert every nested operator once and negate
                // the whole existence check, instead of wrapping the outer
                // clause in NOT.
                let nested = invert_filter_value(&leaf.nested_filter());
                return self.emit_not_exists(group, shape, nested);
            }
        }

        self.emit_projection(group, shape, leaf.nested_filter(), false)
    }

    /// `pk [NOT] IN (SELECT fk FROM child WHERE fk IS NOT NULL AND ...)`
    fn emit_projection(
        &mut self,
        group: &mut WhereGroup,
        shape: ExistenceShape<'_>,
        nested: Value,
        negated: bool,
    ) -> CompileResult<()> {
        let mut sub = SelectStatement::new(shape.child);
        sub.select_expr(SqlExpr::column(shape.child, shape.fk), None);
        sub.and_where(SqlExpr::unary(
            SqlOperator::IsNotNull,
            SqlExpr::column(shape.child, shape.fk),
        ));
        if shape.kind == RelationKind::OneToAny {
            if let Some(discriminator) = shape.discriminator {
                sub.and_where(SqlExpr::binary(
                    SqlOperator::Eq,
                    SqlExpr::column(shape.child, discriminator),
                    SqlExpr::string(shape.collection),
                ));
            }
        }

        self.compile_nested(&mut sub, shape.child, nested)?;

        let mut pk = SqlExpr::column(shape.collection, shape.parent_pk);
        if shape.kind == RelationKind::OneToAny {
            // The polymorphic FK stores text while pks may be numeric.
            pk = SqlExpr::cast_char(pk);
        }
        group.push(SqlExpr::InSubquery {
            expr: Box::new(pk),
            negated,
            subquery: Box::new(sub),
        });
        Ok(())
    }

    /// `NOT EXISTS (SELECT * FROM child WHERE child.fk = parent.pk AND ...)`
    fn emit_not_exists(
        &mut self,
        group: &mut WhereGroup,
        shape: ExistenceShape<'_>,
        nested: Value,
    ) -> CompileResult<()> {
        let mut sub = SelectStatement::new(shape.child);
        let parent_pk = SqlExpr::column(shape.collection, shape.parent_pk);

        match shape.kind {
            RelationKind::OneToAny => {
                if let Some(discriminator) = shape.discriminator {
                    sub.and_where(SqlExpr::binary(
                        SqlOperator::Eq,
                        SqlExpr::column(shape.child, discriminator),
                        SqlExpr::string(shape.collection),
                    ));
                }
                sub.and_where(SqlExpr::binary(
                    SqlOperator::Eq,
                    SqlExpr::column(shape.child, shape.fk),
                    SqlExpr::cast_char(parent_pk),
                ));
            }
            _ => {
                sub.and_where(SqlExpr::binary(
                    SqlOperator::Eq,
                    SqlExpr::column(shape.child, shape.fk),
                    parent_pk,
                ));
            }
        }

        self.compile_nested(&mut sub, shape.child, nested)?;

        group.push(SqlExpr::Exists {
            negated: true,
            subquery: Box::new(sub),
        });
        Ok(())
    }

    fn compile_nested(
        &mut self,
        sub: &mut SelectStatement,
        child: &str,
        nested: Value,
    ) -> CompileResult<()> {
        let nested_query = Query {
            filter: Some(Filter::new(nested)),
            ..Default::default()
        };
        super::apply_query_inner(sub, child, &nested_query, self.schema, true, self.allocator)
    }
}

/// The schema facts an existence subquery is built from.
struct ExistenceShape<'a> {
    collection: &'a str,
    parent_pk: &'a str,
    child: &'a str,
    fk: &'a str,
    discriminator: Option<&'a str>,
    kind: RelationKind,
}
