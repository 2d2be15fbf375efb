//! Query descriptors
//!
//! A [`Query`] is the wire-level description of what a client wants from one
//! collection. Every member is optional; the compiler applies the present
//! ones to the statement in a fixed order (see [`crate::compile`]).

pub mod filter;

use serde::Deserialize;
use std::collections::BTreeMap;

pub use filter::{Filter, FilterLeaf, FilterNode, PathSegment};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Query {
    pub filter: Option<Filter>,
    /// Dotted field paths; a leading `-` sorts descending.
    pub sort: Option<Vec<String>>,
    /// `-1` means "no limit".
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// 1-based. When both `page` and `limit` are present, the page wins over
    /// any provided `offset`.
    pub page: Option<i64>,
    pub search: Option<String>,
    pub group: Option<Vec<String>>,
    /// Aggregate operation name to the fields it applies to. A `BTreeMap`
    /// keeps the emitted select list deterministic.
    pub aggregate: Option<BTreeMap<String, Vec<String>>>,
}

impl Query {
    /// True when the query carries no members at all.
    pub fn is_empty(&self) -> bool {
        self.filter.is_none()
            && self.sort.is_none()
            && self.limit.is_none()
            && self.offset.is_none()
            && self.page.is_none()
            && self.search.is_none()
            && self.group.is_none()
            && self.aggregate.is_none()
    }
}
