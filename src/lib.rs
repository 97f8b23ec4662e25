pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod dispatch;
pub mod json;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod temporal;

pub use ast::{Expr, GeometryKind, IntervalEnd, Operator, Scalar, Token, TokenKind, Visitor};
pub use dispatch::{Encoding, Error, Parsed, parse, parse_json, parse_text, parse_value};
pub use json::{JsonPath, ParseJsonError, PathStep};
pub use lexer::{ScanError, Scanner};
pub use parser::{MAX_DEPTH, ParseTextError, Parser};
