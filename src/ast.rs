//! # CQL2 Filter - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) shared by both CQL2
//! encodings. Text input and JSON input parse into the same node shapes, and
//! every node serializes back to either encoding.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the scanner
//! - **[expressions]** - Expression nodes (literals, operators, geometry)
//! - **[operators]** - The static operator-metadata registry
//! - **[visitor]** - Double-dispatch traversal over node kinds
//!
//! ## Core Concepts
//!
//! ### One tree, two encodings
//!
//! ```text
//! depth BETWEEN 100 AND 150
//! {"op": "between", "args": [{"property": "depth"}, 100, 150]}
//! ```
//!
//! Both of the above parse to the same `AdvancedComparison` node, and
//! [`Expr::to_text`](crate::Expr::to_text) /
//! [`Expr::to_json`](crate::Expr::to_json) reproduce either form.
//!
//! ### Operator metadata
//!
//! Every operator node carries registry-resolved metadata: text and JSON
//! spellings, arity, notation, precedence, and associativity. Names missing
//! from the registry (arbitrary functions like `avg`) resolve to a variadic
//! function-shaped default, so any function identifier is representable.
//!
//! ### Immutability
//!
//! Nodes are plain immutable values. Parsing builds them bottom-up, children
//! before parents in left-to-right order, and nothing mutates them after
//! construction.
pub mod expressions;
pub mod operators;
pub mod tokens;
pub mod visitor;

pub use expressions::{Expr, GeometryKind, IntervalEnd};
pub use operators::{Associativity, Notation, OpMeta, Operator};
pub use tokens::{Scalar, Token, TokenKind};
pub use visitor::Visitor;
