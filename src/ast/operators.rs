use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ast::{Token, TokenKind};

/// How an operator sits relative to its operands in the Text encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// Operator before its single operand (`NOT x`)
    Prefix,
    /// Operator between two operands (`a + b`)
    Infix,
    /// Operator spread through the operand list (`a BETWEEN b AND c`)
    Mixfix,
    /// Name followed by a parenthesized argument list (`casei(x)`)
    Function,
}

/// Tie-breaking direction for chains of equal precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Static metadata for one operator.
///
/// `arity` of 0 means variadic. `template` is the text-format rule, with
/// `{0}`/`{1}`/`{2}` operand slots; the serializer inserts `NOT` before the
/// spelling for negated advanced comparisons.
#[derive(Debug, Clone, Copy)]
pub struct OpMeta {
    pub text: &'static str,
    pub json: &'static str,
    pub label: &'static str,
    pub arity: u8,
    pub notation: Notation,
    pub precedence: u8,
    pub associativity: Associativity,
    pub template: &'static str,
}

// Precedence ranks, ascending binding strength.
pub const PREC_OR: u8 = 1;
pub const PREC_AND: u8 = 2;
pub const PREC_EQUALITY: u8 = 3;
pub const PREC_COMPARISON: u8 = 4;
pub const PREC_ADDITIVE: u8 = 5;
pub const PREC_MULTIPLICATIVE: u8 = 6;
pub const PREC_EXPONENT: u8 = 7;
pub const PREC_UNARY: u8 = 8;
pub const PREC_FUNCTION: u8 = 9;

macro_rules! op {
    ($text:expr, $json:expr, $label:expr, $arity:expr, $notation:expr, $prec:expr, $assoc:expr, $template:expr) => {
        (
            $json,
            OpMeta {
                text: $text,
                json: $json,
                label: $label,
                arity: $arity,
                notation: $notation,
                precedence: $prec,
                associativity: $assoc,
                template: $template,
            },
        )
    };
}

static REGISTRY: LazyLock<HashMap<&'static str, OpMeta>> = LazyLock::new(|| {
    use Associativity::{Left, Right};
    use Notation::{Function, Infix, Mixfix, Prefix};

    HashMap::from([
        // Logical
        op!("OR", "or", "or", 2, Infix, PREC_OR, Left, "{0} OR {1}"),
        op!("AND", "and", "and", 2, Infix, PREC_AND, Left, "{0} AND {1}"),
        op!("NOT", "not", "not", 1, Prefix, PREC_UNARY, Right, "NOT {0}"),
        // Equality
        op!("=", "=", "equals", 2, Infix, PREC_EQUALITY, Left, "{0} = {1}"),
        op!("<>", "<>", "not equals", 2, Infix, PREC_EQUALITY, Left, "{0} <> {1}"),
        // Comparison
        op!("<", "<", "less than", 2, Infix, PREC_COMPARISON, Left, "{0} < {1}"),
        op!("<=", "<=", "at most", 2, Infix, PREC_COMPARISON, Left, "{0} <= {1}"),
        op!(">", ">", "greater than", 2, Infix, PREC_COMPARISON, Left, "{0} > {1}"),
        op!(">=", ">=", "at least", 2, Infix, PREC_COMPARISON, Left, "{0} >= {1}"),
        op!(
            "IS NULL",
            "isNull",
            "is null",
            1,
            Mixfix,
            PREC_COMPARISON,
            Left,
            "{0} IS NULL"
        ),
        // Advanced comparison
        op!(
            "LIKE",
            "like",
            "matches pattern",
            2,
            Mixfix,
            PREC_COMPARISON,
            Left,
            "{0} LIKE {1}"
        ),
        op!(
            "BETWEEN",
            "between",
            "in range",
            3,
            Mixfix,
            PREC_COMPARISON,
            Left,
            "{0} BETWEEN {1} AND {2}"
        ),
        op!(
            "IN",
            "in",
            "one of",
            2,
            Mixfix,
            PREC_COMPARISON,
            Left,
            "{0} IN {1}"
        ),
        // Arithmetic
        op!("+", "+", "add", 2, Infix, PREC_ADDITIVE, Left, "{0} + {1}"),
        op!("-", "-", "subtract", 2, Infix, PREC_ADDITIVE, Left, "{0} - {1}"),
        op!("*", "*", "multiply", 2, Infix, PREC_MULTIPLICATIVE, Left, "{0} * {1}"),
        op!("/", "/", "divide", 2, Infix, PREC_MULTIPLICATIVE, Left, "{0} / {1}"),
        op!("%", "%", "modulo", 2, Infix, PREC_MULTIPLICATIVE, Left, "{0} % {1}"),
        op!(
            "DIV",
            "div",
            "integer divide",
            2,
            Infix,
            PREC_MULTIPLICATIVE,
            Left,
            "{0} DIV {1}"
        ),
        op!("^", "^", "power", 2, Infix, PREC_EXPONENT, Right, "{0} ^ {1}"),
        // Insensitivity wrappers
        op!(
            "CASEI",
            "casei",
            "case-insensitive",
            1,
            Function,
            PREC_UNARY,
            Right,
            "CASEI({0})"
        ),
        op!(
            "ACCENTI",
            "accenti",
            "accent-insensitive",
            1,
            Function,
            PREC_UNARY,
            Right,
            "ACCENTI({0})"
        ),
    ])
});

/// A resolved operator, as stored inside expression nodes.
///
/// Metadata is looked up from the registry exactly once, at construction.
/// Names missing from the registry (arbitrary functions like `avg` or
/// `s_intersects`) fall back to a variadic function-notation default that
/// spells the operator as the name itself.
#[derive(Debug, Clone)]
pub struct Operator {
    name: String,
    meta: Option<&'static OpMeta>,
}

impl Operator {
    /// Resolve an operator directly from its JSON spelling (or any casing of
    /// a known text spelling).
    pub fn new(name: &str) -> Operator {
        let meta = REGISTRY
            .get(name)
            .or_else(|| REGISTRY.get(name.to_ascii_lowercase().as_str()));
        Operator {
            name: name.to_string(),
            meta,
        }
    }

    /// Resolve an operator from a scanned token. Identifier tokens resolve by
    /// lexeme, everything else by its fixed spelling.
    pub fn from_token(token: &Token) -> Operator {
        let name = match token.kind {
            TokenKind::Identifier => token.lexeme.as_str(),
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Div => "div",
            TokenKind::Eq => "=",
            TokenKind::NotEq => "<>",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::Is => "isNull",
            TokenKind::Like => "like",
            TokenKind::Between => "between",
            TokenKind::In => "in",
            TokenKind::Casei => "casei",
            TokenKind::Accenti => "accenti",
            _ => token.lexeme.as_str(),
        };
        Operator::new(name)
    }

    /// Text-encoding spelling.
    pub fn text(&self) -> &str {
        self.meta.map(|m| m.text).unwrap_or(&self.name)
    }

    /// JSON-encoding spelling.
    pub fn json(&self) -> &str {
        self.meta.map(|m| m.json).unwrap_or(&self.name)
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        self.meta.map(|m| m.label).unwrap_or(&self.name)
    }

    /// Operand count; 0 means variadic.
    pub fn arity(&self) -> u8 {
        self.meta.map(|m| m.arity).unwrap_or(0)
    }

    pub fn notation(&self) -> Notation {
        self.meta.map(|m| m.notation).unwrap_or(Notation::Function)
    }

    pub fn precedence(&self) -> u8 {
        self.meta.map(|m| m.precedence).unwrap_or(PREC_FUNCTION)
    }

    pub fn associativity(&self) -> Associativity {
        self.meta
            .map(|m| m.associativity)
            .unwrap_or(Associativity::Left)
    }

    /// Text-format rule. Fallback operators render as `name(args...)`.
    pub fn template(&self) -> Option<&'static str> {
        self.meta.map(|m| m.template)
    }

    /// Whether the name resolved to a registry entry.
    pub fn is_registered(&self) -> bool {
        self.meta.is_some()
    }
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.json() == other.json()
    }
}
