//! Search fan-out and group/aggregate compilation

use std::collections::BTreeMap;

use crate::common::compile;
use collectql::Query;

fn searching(term: &str) -> Query {
    Query {
        search: Some(term.to_string()),
        ..Default::default()
    }
}

fn aggregating(pairs: &[(&str, &[&str])], group: &[&str]) -> Query {
    let aggregate: BTreeMap<String, Vec<String>> = pairs
        .iter()
        .map(|(op, fields)| {
            (
                op.to_string(),
                fields.iter().map(|f| f.to_string()).collect(),
            )
        })
        .collect();
    Query {
        aggregate: Some(aggregate),
        group: if group.is_empty() {
            None
        } else {
            Some(group.iter().map(|g| g.to_string()).collect())
        },
        ..Default::default()
    }
}

#[test]
fn search_matches_text_fields_case_insensitively() {
    let sql = compile("authors", &searching("Rijk"));
    assert_eq!(
        sql,
        "SELECT * FROM authors WHERE (LOWER(authors.name) LIKE '%rijk%')"
    );
}

#[test]
fn numeric_search_token_compares_number_fields() {
    let sql = compile("authors", &searching("42"));
    assert_eq!(
        sql,
        "SELECT * FROM authors WHERE (authors.id = 42 OR LOWER(authors.name) LIKE '%42%')"
    );
}

#[test]
fn non_numeric_token_skips_number_fields() {
    let sql = compile("authors", &searching("rijk"));
    assert!(!sql.contains("authors.id"));
}

#[test]
fn uuid_token_compares_uuid_fields() {
    let sql = compile("pages", &searching("123e4567-e89b-12d3-a456-426614174000"));
    assert!(sql.contains("pages.uid = '123e4567-e89b-12d3-a456-426614174000'"));
}

#[test]
fn search_wildcards_are_escaped() {
    let sql = compile("authors", &searching("50%"));
    assert_eq!(
        sql,
        "SELECT * FROM authors WHERE (LOWER(authors.name) LIKE '%50\\%%')"
    );
}

#[test]
fn search_and_filter_conjoin() {
    use collectql::Filter;
    use serde_json::json;

    let query = Query {
        search: Some("rijk".to_string()),
        filter: Some(Filter::new(json!({"id": {"_gt": 10}}))),
        ..Default::default()
    };
    let sql = compile("authors", &query);
    assert_eq!(
        sql,
        "SELECT * FROM authors WHERE (LOWER(authors.name) LIKE '%rijk%') AND authors.id > 10"
    );
}

#[test]
fn count_star_and_field_aggregates() {
    let sql = compile(
        "pages",
        &aggregating(&[("count", &["*"]), ("sum", &["price"])], &["category"]),
    );
    assert_eq!(
        sql,
        "SELECT COUNT(*) AS count, SUM(pages.price) AS \"sum->price\" \
         FROM pages GROUP BY pages.category"
    );
}

#[test]
fn distinct_aggregates_render_distinct() {
    let sql = compile("pages", &aggregating(&[("countDistinct", &["status"])], &[]));
    assert_eq!(
        sql,
        "SELECT COUNT(DISTINCT pages.status) AS \"countDistinct->status\" FROM pages"
    );
}

#[test]
fn count_all_operation_renders_count_star() {
    let sql = compile("pages", &aggregating(&[("countAll", &["*"])], &[]));
    assert_eq!(sql, "SELECT COUNT(*) AS countAll FROM pages");
}

#[test]
fn min_max_avg_aggregates() {
    let sql = compile(
        "pages",
        &aggregating(&[("avg", &["price"]), ("max", &["price"]), ("min", &["price"])], &[]),
    );
    assert_eq!(
        sql,
        "SELECT AVG(pages.price) AS \"avg->price\", \
         MAX(pages.price) AS \"max->price\", \
         MIN(pages.price) AS \"min->price\" FROM pages"
    );
}

#[test]
fn relational_group_key_joins_like_a_sort_key() {
    let sql = compile(
        "pages",
        &aggregating(&[("count", &["*"])], &["author.name"]),
    );
    assert_eq!(
        sql,
        "SELECT COUNT(*) AS count FROM pages \
         LEFT JOIN authors AS aaaaa ON pages.author = aaaaa.id \
         GROUP BY aaaaa.name"
    );
}

#[test]
fn relational_aggregate_key_resolves_through_the_alias_map() {
    let sql = compile("pages", &aggregating(&[("max", &["author.name"])], &[]));
    assert_eq!(
        sql,
        "SELECT MAX(aaaaa.name) AS \"max->author.name\" FROM pages \
         LEFT JOIN authors AS aaaaa ON pages.author = aaaaa.id"
    );
}

#[test]
fn to_many_group_key_is_dropped() {
    let sql = compile(
        "pages",
        &aggregating(&[("count", &["*"])], &["articles.title"]),
    );
    assert_eq!(sql, "SELECT COUNT(*) AS count FROM pages");
}

#[test]
fn unknown_aggregate_fields_are_dropped() {
    let sql = compile("pages", &aggregating(&[("sum", &["bogus"])], &[]));
    assert_eq!(sql, "SELECT * FROM pages");
}

#[test]
fn unknown_group_fields_are_dropped() {
    let sql = compile("pages", &aggregating(&[("count", &["*"])], &["bogus"]));
    assert_eq!(sql, "SELECT COUNT(*) AS count FROM pages");
}
