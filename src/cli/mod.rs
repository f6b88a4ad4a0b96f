//! CLI support for userquery
//!
//! Runs user queries over JSON records described by a schema configuration
//! file. Exposed as a module so that other tools can embed the commands.

mod check;
mod docs;
mod fields;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use fields::describe_fields;

use std::io;

use thiserror::Error;

use crate::{error::QueryError, json::ConfigError};

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid query: {0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON records to stdin.")]
    NoInput,

    #[error("Input must be a JSON array of objects or a single object")]
    NotRecords,

    #[error("SQL output requires the `sql` feature")]
    SqlUnavailable,

    #[error("Unknown category: '{0}'\nRun 'userquery syntax' to see available categories.")]
    UnknownCategory(String),
}
