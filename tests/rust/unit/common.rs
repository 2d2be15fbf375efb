//! Shared fixtures for the unit test suite

#![allow(dead_code)]

use collectql::{apply_query, CompileResult, Filter, Query, Schema, SelectStatement, ToSql};
use serde_json::Value;

/// Blog-shaped schema: pages with an m2o author, o2m articles (which have
/// their own m2o author), polymorphic comments, and a self-referential
/// categories tree.
pub fn blog_schema() -> Schema {
    Schema::from_yaml_str(
        r#"
collections:
  pages:
    primary: id
    fields:
      id: { field: id, type: integer }
      title: { field: title, type: string }
      status: { field: status, type: string }
      secret: { field: secret, type: boolean }
      created_at: { field: created_at, type: dateTime }
      price: { field: price, type: float }
      category: { field: category, type: string }
      author: { field: author, type: integer }
      uid: { field: uid, type: uuid }
  articles:
    primary: id
    fields:
      id: { field: id, type: integer }
      page_id: { field: page_id, type: integer }
      author: { field: author, type: integer }
      published: { field: published, type: boolean }
      title: { field: title, type: string }
  authors:
    primary: id
    fields:
      id: { field: id, type: integer }
      name: { field: name, type: string }
  comments:
    primary: id
    fields:
      id: { field: id, type: integer }
      item: { field: item, type: string }
      collection: { field: collection, type: string }
      text: { field: text, type: text }
  categories:
    primary: id
    fields:
      id: { field: id, type: integer }
      name: { field: name, type: string }
      parent: { field: parent, type: integer }
relations:
  - collection: articles
    field: page_id
    related_collection: pages
    meta: { one_field: articles }
  - collection: articles
    field: author
    related_collection: authors
  - collection: pages
    field: author
    related_collection: authors
  - collection: comments
    field: item
    meta:
      one_field: comments
      one_collection_field: collection
      one_allowed_collections: [pages, articles]
  - collection: categories
    field: parent
    related_collection: categories
    meta: { one_field: children }
"#,
    )
    .expect("fixture schema parses")
}

pub fn try_compile(collection: &str, query: &Query) -> CompileResult<String> {
    let schema = blog_schema();
    let mut stmt = SelectStatement::new(collection);
    apply_query(&mut stmt, collection, query, &schema, false)?;
    Ok(stmt.to_sql())
}

pub fn compile(collection: &str, query: &Query) -> String {
    try_compile(collection, query).expect("query compiles")
}

pub fn filter_query(filter: Value) -> Query {
    Query {
        filter: Some(Filter::new(filter)),
        ..Default::default()
    }
}
