//! Entry points that accept either CQL2 encoding.
//!
//! `parse` sniffs text vs. JSON input and delegates; both success and failure
//! come back in one normalized shape, which is the stable contract consumed
//! by tools built on top of this crate (filter builders, renderers, the CLI).

use serde_json::Value;

use crate::ast::Expr;
use crate::json::{self, ParseJsonError};
use crate::lexer::{ScanError, Scanner};
use crate::parser::{ParseTextError, Parser};

/// Which encoding an input parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Text,
    Json,
}

/// A successful parse: the detected encoding and the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub encoding: Encoding,
    pub expression: Expr,
}

/// Normalized failure from either parsing path.
#[derive(Debug)]
pub enum Error {
    /// Lexical error in text input
    Scan(ScanError),
    /// Grammar violation in text input
    Text(ParseTextError),
    /// Structural violation in JSON input
    Json(ParseJsonError),
    /// Input looked like JSON but did not decode
    Decode(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Scan(e) => write!(f, "Scan error: {}", e),
            Error::Text(e) => write!(f, "Parse error: {}", e),
            Error::Json(e) => write!(f, "Parse error: {}", e),
            Error::Decode(e) => write!(f, "Invalid JSON: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Scan(e) => Some(e),
            Error::Text(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Decode(e) => Some(e),
        }
    }
}

impl From<ScanError> for Error {
    fn from(e: ScanError) -> Self {
        Error::Scan(e)
    }
}

impl From<ParseTextError> for Error {
    fn from(e: ParseTextError) -> Self {
        Error::Text(e)
    }
}

impl From<ParseJsonError> for Error {
    fn from(e: ParseJsonError) -> Self {
        Error::Json(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e)
    }
}

/// Parse a filter in either encoding.
///
/// A string beginning with `{` is decoded as JSON and structurally mapped;
/// anything else is scanned and parsed as CQL2 Text.
pub fn parse(input: &str) -> Result<Parsed, Error> {
    if input.trim_start().starts_with('{') {
        let value: Value = serde_json::from_str(input)?;
        return parse_value(&value);
    }
    Ok(Parsed {
        encoding: Encoding::Text,
        expression: parse_text(input)?,
    })
}

/// Parse an already-decoded JSON value.
pub fn parse_value(value: &Value) -> Result<Parsed, Error> {
    Ok(Parsed {
        encoding: Encoding::Json,
        expression: json::from_json(value)?,
    })
}

/// Parse CQL2 Text directly, without encoding detection.
pub fn parse_text(input: &str) -> Result<Expr, Error> {
    let tokens = Scanner::new(input).scan()?;
    Ok(Parser::new(tokens).parse()?)
}

/// Parse a CQL2 JSON value directly, without encoding detection.
pub fn parse_json(value: &Value) -> Result<Expr, ParseJsonError> {
    json::from_json(value)
}
