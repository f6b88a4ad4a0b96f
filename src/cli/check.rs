//! Run user queries against JSON records

use std::path::PathBuf;

use super::CliError;
use crate::{compile, json};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The user query to compile
    pub query: String,
    /// Schema configuration file
    pub schema: PathBuf,
    /// JSON records: an array of objects or a single object
    pub input: Option<String>,
    /// Only compile, don't evaluate
    pub syntax_only: bool,
    /// Translate to SQL against this table instead of evaluating
    pub sql: Option<String>,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// The query compiled
    SyntaxValid,
    /// Matching records, filtered and sorted
    Success(serde_json::Value),
    /// Translated SQL statement
    Sql(String),
}

/// Execute a userquery check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let schema = json::schema_from_file(&options.schema)?;
    let compiled = compile(&options.query, &schema)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    if let Some(table) = &options.sql {
        return translate(&compiled, table);
    }

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = match serde_json::from_str(input)? {
        serde_json::Value::Array(records) => records,
        record @ serde_json::Value::Object(_) => vec![record],
        _ => return Err(CliError::NotRecords),
    };

    let matched = compiled.apply(&records).into_iter().cloned().collect();
    Ok(CheckResult::Success(serde_json::Value::Array(matched)))
}

#[cfg(feature = "sql")]
fn translate(compiled: &crate::CompiledQuery<'_, serde_json::Value>, table: &str) -> Result<CheckResult, CliError> {
    Ok(CheckResult::Sql(crate::sql::SqlTranslator::new(table).to_postgres(compiled)))
}

#[cfg(not(feature = "sql"))]
fn translate(_: &crate::CompiledQuery<'_, serde_json::Value>, _: &str) -> Result<CheckResult, CliError> {
    Err(CliError::SqlUnavailable)
}
