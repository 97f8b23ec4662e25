//! CLI support for cql2-filter
//!
//! Provides programmatic access to the `cql2` binary's behavior for
//! embedding in other tools.

use crate::dispatch::{self, Parsed};

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Parse failure in either encoding
    Parse(crate::Error),
    /// Output serialization failure
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "{}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Json(e) => Some(e),
        }
    }
}

impl From<crate::Error> for CliError {
    fn from(e: crate::Error) -> Self {
        CliError::Parse(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

/// Parse a filter and render both encodings, one per line.
pub fn execute(input: &str) -> Result<String, CliError> {
    let Parsed { expression, .. } = dispatch::parse(input)?;
    let json = serde_json::to_string(&expression.to_json())?;
    Ok(format!("{}\n{}", expression.to_text(), json))
}
