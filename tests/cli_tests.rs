#![cfg(feature = "cli")]

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use userquery::cli::{self, CheckOptions, CheckResult, CliError};
use userquery::{QueryError, json::schema_from_file};

const SCHEMA_FILE: &str = "schema.json";

/// Directory holding the schema file; removed when dropped.
fn schema_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(SCHEMA_FILE),
        r#"{
            "entity": "media",
            "default_field": "title",
            "fields": [
                { "name": "title" },
                { "name": "rating", "type": "int" }
            ]
        }"#,
    )
    .unwrap();
    dir
}

fn options(dir: &TempDir, query: &str) -> CheckOptions {
    CheckOptions {
        query: query.to_string(),
        schema: dir.path().join(SCHEMA_FILE),
        input: Some(
            json!([
                { "title": "Waffles", "rating": 1 },
                { "title": "Beans", "rating": 5 },
                { "title": "Toast", "rating": 10 }
            ])
            .to_string(),
        ),
        ..Default::default()
    }
}

#[test]
fn test_check_filters_and_sorts() {
    let dir = schema_dir();
    let result = cli::execute_check(&options(&dir, "rating > 1 orderbydescending rating")).unwrap();
    match result {
        CheckResult::Success(output) => assert_eq!(
            output,
            json!([
                { "title": "Toast", "rating": 10 },
                { "title": "Beans", "rating": 5 }
            ])
        ),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_check_single_object() {
    let dir = schema_dir();
    let mut opts = options(&dir, "rating = 3");
    opts.input = Some(r#"{"title": "Jam", "rating": 3}"#.to_string());
    let result = cli::execute_check(&opts).unwrap();
    assert!(matches!(result, CheckResult::Success(ref v) if v.as_array().map(Vec::len) == Some(1)));
}

#[test]
fn test_check_syntax_only() {
    let dir = schema_dir();
    let mut opts = options(&dir, "rating >= 5");
    opts.syntax_only = true;
    opts.input = None;
    assert!(matches!(cli::execute_check(&opts), Ok(CheckResult::SyntaxValid)));
}

#[test]
fn test_check_invalid_query() {
    let dir = schema_dir();
    let err = cli::execute_check(&options(&dir, "rating ^ 5")).unwrap_err();
    assert!(matches!(err, CliError::Query(QueryError::UnsupportedOperator { .. })));
}

#[test]
fn test_check_requires_input() {
    let dir = schema_dir();
    let mut opts = options(&dir, "rating > 1");
    opts.input = None;
    assert!(matches!(cli::execute_check(&opts), Err(CliError::NoInput)));
}

#[test]
fn test_check_rejects_scalar_input() {
    let dir = schema_dir();
    let mut opts = options(&dir, "rating > 1");
    opts.input = Some("42".to_string());
    assert!(matches!(cli::execute_check(&opts), Err(CliError::NotRecords)));
}

#[cfg(feature = "sql")]
#[test]
fn test_check_sql() {
    let dir = schema_dir();
    let mut opts = options(&dir, "rating > 1");
    opts.sql = Some("media".to_string());
    match cli::execute_check(&opts).unwrap() {
        CheckResult::Sql(sql) => assert!(sql.contains(r#"FROM "media""#), "{}", sql),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[cfg(not(feature = "sql"))]
#[test]
fn test_check_sql_unavailable() {
    let dir = schema_dir();
    let mut opts = options(&dir, "rating > 1");
    opts.sql = Some("media".to_string());
    assert!(matches!(cli::execute_check(&opts), Err(CliError::SqlUnavailable)));
}

#[test]
fn test_fields_listing() {
    let dir = schema_dir();
    let schema = schema_from_file(dir.path().join(SCHEMA_FILE)).unwrap();
    assert_eq!(cli::describe_fields(&schema), "media\n* title   string\n  rating  int\n");
}

#[test]
fn test_syntax_docs() {
    assert!(cli::get_docs_overview().contains("orderbydescending"));
    assert!(cli::get_doc_category("operators").unwrap().contains("!*"));
    assert!(matches!(cli::get_doc_category("methods"), Err(CliError::UnknownCategory(_))));
}
