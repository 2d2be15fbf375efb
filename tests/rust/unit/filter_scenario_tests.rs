//! Filter compilation scenarios
//!
//! End-to-end shapes: inline predicates, joined to-one chains, existence
//! subqueries across to-many relations, polymorphic traversal, negation
//! inversion, and the permission-style `_or` short-circuit.

use crate::common::{compile, filter_query, try_compile};
use collectql::CompileError;
use serde_json::json;

#[test]
fn deep_to_many_chain_compiles_to_in_subquery() {
    let sql = compile(
        "pages",
        &filter_query(json!({"articles": {"author": {"name": {"_eq": "Rijk"}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE pages.id IN (\
         SELECT articles.page_id FROM articles \
         LEFT JOIN authors AS aaaab ON articles.author = aaaab.id \
         WHERE articles.page_id IS NOT NULL AND aaaab.name = 'Rijk')"
    );
}

#[test]
fn to_one_chain_joins_inline() {
    let sql = compile("pages", &filter_query(json!({"author": {"name": {"_eq": "Rijk"}}})));
    assert_eq!(
        sql,
        "SELECT * FROM pages \
         LEFT JOIN authors AS aaaaa ON pages.author = aaaaa.id \
         WHERE aaaaa.name = 'Rijk'"
    );
}

#[test]
fn scalar_predicates_qualify_with_the_collection() {
    let sql = compile("pages", &filter_query(json!({"status": {"_eq": "published"}})));
    assert_eq!(sql, "SELECT * FROM pages WHERE pages.status = 'published'");
}

#[test]
fn or_branch_with_match_everything_vanishes() {
    let sql = compile(
        "pages",
        &filter_query(json!({
            "status": {"_in": ["a", "b"]},
            "_or": [{}, {"secret": {"_eq": true}}]
        })),
    );
    assert_eq!(sql, "SELECT * FROM pages WHERE pages.status IN ('a', 'b')");
}

#[test]
fn or_short_circuit_emits_no_joins_or_predicates() {
    // The relational arm must leave no trace: no join, no subquery.
    let sql = compile(
        "pages",
        &filter_query(json!({"_or": [{}, {"articles": {"published": {"_eq": true}}}]})),
    );
    assert_eq!(sql, "SELECT * FROM pages");
}

#[test]
fn or_without_short_circuit_groups_disjuncts() {
    let sql = compile(
        "pages",
        &filter_query(json!({"_or": [
            {"status": {"_eq": "published"}},
            {"status": {"_eq": "draft"}}
        ]})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE (pages.status = 'published' OR pages.status = 'draft')"
    );
}

#[test]
fn none_operator_compiles_to_not_in_projection() {
    let sql = compile(
        "pages",
        &filter_query(json!({"articles": {"_none": {"published": {"_eq": true}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE pages.id NOT IN (\
         SELECT articles.page_id FROM articles \
         WHERE articles.page_id IS NOT NULL AND articles.published = true)"
    );
}

#[test]
fn some_operator_compiles_to_in_projection() {
    let sql = compile(
        "pages",
        &filter_query(json!({"articles": {"_some": {"published": {"_eq": true}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE pages.id IN (\
         SELECT articles.page_id FROM articles \
         WHERE articles.page_id IS NOT NULL AND articles.published = true)"
    );
}

#[test]
fn nested_none_qualifier_compiles_through_subqueries() {
    let sql = compile(
        "pages",
        &filter_query(json!({"articles": {"comments": {"_none": {"text": {"_eq": "spam"}}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE pages.id IN (\
         SELECT articles.page_id FROM articles \
         WHERE articles.page_id IS NOT NULL \
         AND CAST(articles.id AS CHAR(255)) NOT IN (\
         SELECT comments.item FROM comments \
         WHERE comments.item IS NOT NULL AND comments.collection = 'articles' \
         AND comments.text = 'spam'))"
    );
}

#[test]
fn nested_some_qualifier_compiles_through_subqueries() {
    let sql = compile(
        "pages",
        &filter_query(json!({"articles": {"comments": {"_some": {"text": {"_eq": "spam"}}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE pages.id IN (\
         SELECT articles.page_id FROM articles \
         WHERE articles.page_id IS NOT NULL \
         AND CAST(articles.id AS CHAR(255)) IN (\
         SELECT comments.item FROM comments \
         WHERE comments.item IS NOT NULL AND comments.collection = 'articles' \
         AND comments.text = 'spam'))"
    );
}

#[test]
fn negated_operator_inverts_into_not_exists() {
    let sql = compile(
        "pages",
        &filter_query(json!({"articles": {"author": {"name": {"_neq": "Rijk"}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE NOT EXISTS (\
         SELECT * FROM articles \
         LEFT JOIN authors AS aaaab ON articles.author = aaaab.id \
         WHERE articles.page_id = pages.id AND aaaab.name = 'Rijk')"
    );
}

#[test]
fn polymorphic_scope_joins_with_discriminator_and_cast() {
    let sql = compile(
        "comments",
        &filter_query(json!({"item:pages": {"title": {"_eq": "Home"}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM comments \
         LEFT JOIN pages AS aaaaa ON comments.collection = 'pages' \
         AND comments.item = CAST(aaaaa.id AS CHAR(255)) \
         WHERE aaaaa.title = 'Home'"
    );
}

#[test]
fn polymorphic_traversal_without_scope_fails() {
    let result = try_compile(
        "comments",
        &filter_query(json!({"item": {"title": {"_eq": "Home"}}})),
    );
    assert!(matches!(result, Err(CompileError::InvalidQuery(_))));
}

#[test]
fn inverse_polymorphic_compiles_to_cast_in_projection() {
    let sql = compile("pages", &filter_query(json!({"comments": {"text": {"_eq": "hi"}}})));
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE CAST(pages.id AS CHAR(255)) IN (\
         SELECT comments.item FROM comments \
         WHERE comments.item IS NOT NULL AND comments.collection = 'pages' \
         AND comments.text = 'hi')"
    );
}

#[test]
fn self_referential_hops_alias_each_level() {
    let sql = compile(
        "categories",
        &filter_query(json!({"parent": {"parent": {"name": {"_eq": "Root"}}}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM categories \
         LEFT JOIN categories AS aaaaa ON categories.parent = aaaaa.id \
         LEFT JOIN categories AS aaaab ON aaaaa.parent = aaaab.id \
         WHERE aaaab.name = 'Root'"
    );
}

#[test]
fn unknown_fields_are_dropped_silently() {
    let sql = compile("pages", &filter_query(json!({"nonexistent": {"_eq": 1}})));
    assert_eq!(sql, "SELECT * FROM pages");
}

#[test]
fn unknown_operator_is_an_error() {
    let result = try_compile("pages", &filter_query(json!({"status": {"_fuzzy": "x"}})));
    assert_eq!(result, Err(CompileError::UnknownOperator("_fuzzy".to_string())));
}

#[test]
fn filter_depth_is_capped() {
    let mut filter = json!({"_eq": 1});
    for _ in 0..12 {
        filter = json!({ "parent": filter });
    }
    let result = try_compile("categories", &filter_query(filter));
    assert!(matches!(result, Err(CompileError::FilterTooDeep { .. })));
}

#[test]
fn date_values_are_normalized_for_temporal_fields() {
    let sql = compile(
        "pages",
        &filter_query(json!({"created_at": {"_gte": "2023-01-15T10:30:00Z"}})),
    );
    assert_eq!(
        sql,
        "SELECT * FROM pages WHERE pages.created_at >= '2023-01-15 10:30:00'"
    );
}

#[test]
fn numeric_strings_coerce_for_numeric_fields() {
    let sql = compile("pages", &filter_query(json!({"price": {"_gt": "1.5"}})));
    assert_eq!(sql, "SELECT * FROM pages WHERE pages.price > 1.5");
}

#[test]
fn csv_shorthand_expands_for_list_operators() {
    let sql = compile("pages", &filter_query(json!({"status": {"_in": "a,b"}})));
    assert_eq!(sql, "SELECT * FROM pages WHERE pages.status IN ('a', 'b')");
}

#[test]
fn compilation_is_idempotent() {
    let query = filter_query(json!({
        "_and": [
            {"articles": {"author": {"name": {"_eq": "Rijk"}}}},
            {"status": {"_eq": "published"}}
        ]
    }));
    assert_eq!(compile("pages", &query), compile("pages", &query));
}

#[test]
fn foreign_key_fields_compare_inline() {
    // A to-one relation field used with a scalar operator compares the FK
    // column itself.
    let sql = compile("pages", &filter_query(json!({"author": {"_eq": 5}})));
    assert_eq!(sql, "SELECT * FROM pages WHERE pages.author = 5");
}

#[test]
fn null_compare_value_becomes_is_null() {
    let sql = compile("pages", &filter_query(json!({"status": {"_eq": null}})));
    assert_eq!(sql, "SELECT * FROM pages WHERE pages.status IS NULL");
}
