//! Filter trees and their normalized form
//!
//! Client filters arrive as JSON objects that are ambiguous between "nested
//! relational object" and "operator application": `{author: {name: {_eq:
//! "Rijk"}}}` nests two relational hops before the `_eq` leaf, while
//! `{_and: [...]}` is a connective and `{status: "published"}` is shorthand
//! for `{status: {_eq: "published"}}`. Rather than re-deriving this shape in
//! every compiler pass, [`FilterNode::normalize`] converts the raw tree into
//! a tagged tree once; the join pass and the predicate pass both walk the
//! normalized form, so they cannot disagree about what a branch means.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compile::errors::{CompileError, CompileResult};

/// Maximum nesting depth accepted from clients before compilation fails
/// with [`CompileError::FilterTooDeep`].
pub const MAX_FILTER_DEPTH: usize = 10;

/// Raw filter tree as received from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(pub Value);

impl Filter {
    pub fn new(value: Value) -> Self {
        Filter(value)
    }

    /// Normalize into the tagged form used by the compiler passes.
    pub fn normalize(&self) -> CompileResult<FilterNode> {
        FilterNode::normalize(&self.0, 0)
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        Filter(value)
    }
}

/// One hop of a filter or sort path. Polymorphic hops select their target
/// collection with a `name:scope` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub field: String,
    pub scope: Option<String>,
}

impl PathSegment {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((field, scope)) => PathSegment {
                field: field.to_string(),
                scope: Some(scope.to_string()),
            },
            None => PathSegment {
                field: raw.to_string(),
                scope: None,
            },
        }
    }

    /// The original `name` or `name:scope` spelling, used as alias-map key.
    pub fn raw(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}:{}", self.field, scope),
            None => self.field.clone(),
        }
    }
}

/// A single predicate: the relational path walked from the current
/// collection down to the operator leaf. `operator` is `None` when the chain
/// ended on a nested filter object (connectives or several fields) instead
/// of an operator key; such leaves only make sense across a to-many hop,
/// where the whole `value` becomes the nested filter of a subquery.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterLeaf {
    pub path: Vec<PathSegment>,
    pub operator: Option<String>,
    pub value: Value,
}

impl FilterLeaf {
    /// Rebuild the filter object that sits below the first hop, for
    /// compilation inside a subquery over the related collection.
    /// `[articles, author, name]` + `_eq`/`"Rijk"` becomes
    /// `{author: {name: {_eq: "Rijk"}}}`.
    pub fn nested_filter(&self) -> Value {
        let mut value = match &self.operator {
            Some(op) => {
                let mut leaf = Map::new();
                leaf.insert(op.clone(), self.value.clone());
                Value::Object(leaf)
            }
            None => self.value.clone(),
        };

        for segment in self.path.iter().skip(1).rev() {
            let mut wrapper = Map::new();
            wrapper.insert(segment.raw(), value);
            value = Value::Object(wrapper);
        }
        value
    }
}

/// Normalized filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    /// The empty object `{}`: matches every row, contributes nothing. An
    /// `_or` containing one of these collapses to `MatchAll` here, so no
    /// pass ever plans joins or predicates for the sibling arms.
    MatchAll,
    Leaf(FilterLeaf),
}

impl FilterNode {
    pub fn normalize(value: &Value, depth: usize) -> CompileResult<FilterNode> {
        if depth > MAX_FILTER_DEPTH {
            return Err(CompileError::FilterTooDeep {
                depth,
                limit: MAX_FILTER_DEPTH,
            });
        }

        let object = match value {
            Value::Object(object) => object,
            _ => {
                log::debug!("ignoring non-object filter root: {value}");
                return Ok(FilterNode::MatchAll);
            }
        };

        if object.is_empty() {
            return Ok(FilterNode::MatchAll);
        }

        let mut nodes = Vec::with_capacity(object.len());
        for (key, entry) in object {
            match key.as_str() {
                "_and" => nodes.push(Self::normalize_arms(entry, depth, false)?),
                "_or" => nodes.push(Self::normalize_arms(entry, depth, true)?),
                _ => nodes.push(Self::normalize_leaf(key, entry, depth)?),
            }
        }

        // A multi-key object is an implicit conjunction of its entries.
        nodes.retain(|node| !matches!(node, FilterNode::MatchAll));
        Ok(match nodes.len() {
            0 => FilterNode::MatchAll,
            1 => nodes.into_iter().next().unwrap_or(FilterNode::MatchAll),
            _ => FilterNode::And(nodes),
        })
    }

    fn normalize_arms(value: &Value, depth: usize, disjunction: bool) -> CompileResult<FilterNode> {
        let arms = match value {
            Value::Array(arms) => arms,
            _ => {
                log::warn!("connective expects an array of filters, got {value}");
                return Ok(FilterNode::MatchAll);
            }
        };

        let mut nodes = Vec::with_capacity(arms.len());
        for arm in arms {
            let node = Self::normalize(arm, depth + 1)?;
            if disjunction && matches!(node, FilterNode::MatchAll) {
                // Permission-style union: one arm grants everything, so the
                // whole disjunction is a no-op.
                log::debug!("_or branch contains the match-everything object; skipping branch");
                return Ok(FilterNode::MatchAll);
            }
            nodes.push(node);
        }

        if disjunction {
            Ok(FilterNode::Or(nodes))
        } else {
            nodes.retain(|node| !matches!(node, FilterNode::MatchAll));
            Ok(match nodes.len() {
                0 => FilterNode::MatchAll,
                1 => nodes.into_iter().next().unwrap_or(FilterNode::MatchAll),
                _ => FilterNode::And(nodes),
            })
        }
    }

    /// Walk the single-key chain below a field key until an operator key (or
    /// anything that is not a single-key object) terminates it.
    fn normalize_leaf(key: &str, value: &Value, depth: usize) -> CompileResult<FilterNode> {
        let mut path = vec![PathSegment::parse(key)];
        let mut current = value;
        let mut level = depth;

        loop {
            level += 1;
            if level > MAX_FILTER_DEPTH {
                return Err(CompileError::FilterTooDeep {
                    depth: level,
                    limit: MAX_FILTER_DEPTH,
                });
            }

            let object = match current {
                Value::Object(object) => object,
                // Scalar shorthand: `{status: "published"}`.
                scalar => {
                    return Ok(FilterNode::Leaf(FilterLeaf {
                        path,
                        operator: Some("_eq".to_string()),
                        value: scalar.clone(),
                    }));
                }
            };

            if object.is_empty() {
                log::debug!("empty object under `{key}`; dropping predicate");
                return Ok(FilterNode::MatchAll);
            }

            if object.len() == 1 {
                let Some((child_key, child_value)) = object.iter().next() else {
                    return Ok(FilterNode::MatchAll);
                };
                match child_key.as_str() {
                    "_and" | "_or" => {
                        // Nested connective: the chain ends here and the whole
                        // object is the nested filter of a to-many hop.
                        return Ok(FilterNode::Leaf(FilterLeaf {
                            path,
                            operator: None,
                            value: current.clone(),
                        }));
                    }
                    op if op.starts_with('_') => {
                        return Ok(FilterNode::Leaf(FilterLeaf {
                            path,
                            operator: Some(op.to_string()),
                            value: child_value.clone(),
                        }));
                    }
                    field => {
                        path.push(PathSegment::parse(field));
                        current = child_value;
                    }
                }
                continue;
            }

            // Several keys below a field: operator keys split into an AND of
            // single-operator leaves sharing the path; anything else is a
            // nested filter object for a to-many hop.
            if object.keys().all(|k| k.starts_with('_')) && !object.contains_key("_and")
                && !object.contains_key("_or")
            {
                let leaves = object
                    .iter()
                    .map(|(op, op_value)| {
                        FilterNode::Leaf(FilterLeaf {
                            path: path.clone(),
                            operator: Some(op.clone()),
                            value: op_value.clone(),
                        })
                    })
                    .collect();
                return Ok(FilterNode::And(leaves));
            }

            return Ok(FilterNode::Leaf(FilterLeaf {
                path,
                operator: None,
                value: current.clone(),
            }));
        }
    }
}

/// Rewrite every operator key in a raw filter tree to its negated twin (and
/// back), leaving connectives and field keys untouched. Wrapping the result
/// in a single `NOT EXISTS` preserves De Morgan semantics for negated
/// relational predicates.
pub fn invert_filter_value(value: &Value) -> Value {
    match value {
        Value::Object(object) => {
            let inverted = object
                .iter()
                .map(|(key, entry)| match key.as_str() {
                    "_and" | "_or" => (key.clone(), invert_filter_value(entry)),
                    op if op.starts_with('_') => (invert_operator(op), entry.clone()),
                    _ => (key.clone(), invert_filter_value(entry)),
                })
                .collect();
            Value::Object(inverted)
        }
        Value::Array(arms) => Value::Array(arms.iter().map(invert_filter_value).collect()),
        scalar => scalar.clone(),
    }
}

/// Whether an operator is the negated member of its pair. `_null` and
/// `_none` spell like negatives but are not: `_null` is the positive half
/// of `_null`/`_nnull`, and `_none` pairs with `_some`, not with an
/// `_n`-prefix twin.
pub fn is_negative_operator(operator: &str) -> bool {
    operator.starts_with("_n") && !matches!(operator, "_null" | "_none")
}

/// Toggle the `_n` negation prefix: `_eq` <-> `_neq`, `_between` <->
/// `_nbetween`, `_null` <-> `_nnull`. The existence qualifiers negate each
/// other: `_some` <-> `_none`.
pub fn invert_operator(operator: &str) -> String {
    match operator {
        "_null" => return "_nnull".to_string(),
        "_some" => return "_none".to_string(),
        "_none" => return "_some".to_string(),
        _ => {}
    }
    match operator.strip_prefix("_n") {
        Some(rest) => format!("_{rest}"),
        None => format!("_n{}", operator.trim_start_matches('_')),
    }
}
