//! Pagination coherence
//!
//! limit / offset / page interactions: `-1` disables LIMIT, and a page
//! plus a limit overrides any provided offset with `limit * (page - 1)`.

use crate::common::compile;
use collectql::Query;
use test_case::test_case;

fn paged(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> Query {
    Query {
        limit,
        offset,
        page,
        ..Default::default()
    }
}

#[test_case(Some(25), None, None, "SELECT * FROM pages LIMIT 25"; "limit only")]
#[test_case(Some(0), None, None, "SELECT * FROM pages LIMIT 0"; "limit zero")]
#[test_case(Some(-1), None, None, "SELECT * FROM pages"; "minus one disables limit")]
#[test_case(None, Some(50), None, "SELECT * FROM pages OFFSET 50"; "offset only")]
#[test_case(
    Some(10),
    None,
    Some(3),
    "SELECT * FROM pages LIMIT 10 OFFSET 20";
    "page computes offset"
)]
#[test_case(
    Some(10),
    Some(5),
    Some(2),
    "SELECT * FROM pages LIMIT 10 OFFSET 10";
    "page overrides offset"
)]
#[test_case(
    Some(10),
    None,
    Some(1),
    "SELECT * FROM pages LIMIT 10 OFFSET 0";
    "first page is offset zero"
)]
#[test_case(None, None, Some(3), "SELECT * FROM pages"; "page without limit is inert")]
#[test_case(
    Some(-1),
    Some(5),
    Some(3),
    "SELECT * FROM pages OFFSET 5";
    "unlimited keeps explicit offset"
)]
fn pagination_grid(limit: Option<i64>, offset: Option<i64>, page: Option<i64>, expected: &str) {
    assert_eq!(compile("pages", &paged(limit, offset, page)), expected);
}
