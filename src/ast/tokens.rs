/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Punctuation
    /// Left parenthesis, opens groupings, arrays, and argument lists
    LeftParen,
    /// Right parenthesis
    RightParen,
    /// Comma, separates arguments and array elements
    Comma,

    // Arithmetic
    /// Addition (`+`)
    Plus,
    /// Binary subtraction (`-`)
    ///
    /// A `-` immediately followed by a digit usually lexes into the number
    /// token instead; see the scanner's minus disambiguation rule.
    Minus,
    /// Multiplication (`*`)
    Star,
    /// Division (`/`)
    Slash,
    /// Modulo (`%`)
    Percent,
    /// Exponentiation (`^`)
    Caret,

    // Comparison
    /// Equality (`=`)
    Eq,
    /// Inequality (`<>`)
    NotEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,

    // Reserved words (matched case-insensitively)
    /// Logical AND
    And,
    /// Logical OR
    Or,
    /// Logical NOT, also negates advanced comparisons (`NOT LIKE`)
    Not,
    /// `IS`, only valid as part of `IS [NOT] NULL`
    Is,
    /// `NULL` literal, or the tail of `IS NULL`
    Null,
    /// `TRUE`
    True,
    /// `FALSE`
    False,
    /// `DATE`, introduces a date literal: `DATE('2020-01-01')`
    Date,
    /// `TIMESTAMP`, introduces a timestamp literal
    Timestamp,
    /// `INTERVAL`, introduces a two-bound temporal interval
    Interval,
    /// `LIKE` pattern comparison
    Like,
    /// `BETWEEN ... AND ...` range comparison
    Between,
    /// `IN (...)` membership comparison
    In,
    /// `CASEI(...)` case-insensitive wrapper
    Casei,
    /// `ACCENTI(...)` accent-insensitive wrapper
    Accenti,
    /// `BBOX(...)` bounding-box literal
    Bbox,
    /// `POINT(x y)` geometry
    Point,
    /// `MULTIPOINT(...)` geometry
    MultiPoint,
    /// `LINESTRING(...)` geometry
    LineString,
    /// `MULTILINESTRING(...)` geometry
    MultiLineString,
    /// `POLYGON(...)` geometry
    Polygon,
    /// `MULTIPOLYGON(...)` geometry
    MultiPolygon,
    /// `GEOMETRYCOLLECTION(...)` geometry
    GeometryCollection,
    /// Integer division (`DIV`)
    Div,

    // Values
    /// Property name or function name
    Identifier,
    /// Numeric literal (including a leading sign when lexed as negative)
    Number,
    /// Quoted string literal
    Str,

    /// End of input
    Eof,
}

/// A decoded literal value.
///
/// Carried both by tokens (the scanner decodes literals as it reads them) and
/// by `Literal` expression nodes. Dates and timestamps keep their validated
/// source text; decoding only proves they are calendrically real.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// UTF-8 string
    String(String),
    /// Number (CQL2 has a single numeric type)
    Number(f64),
    /// Boolean
    Boolean(bool),
    /// Null
    Null,
    /// Calendar date, `YYYY-MM-DD`
    Date(String),
    /// Instant, RFC 3339 style
    Timestamp(String),
}

/// One lexical unit of CQL2 Text input.
///
/// Immutable; constructed only by the scanner. `lexeme` is the exact source
/// substring, `literal` the decoded value for literal-bearing kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Scalar>,
    /// Character offset of the first character of the lexeme.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, offset: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            offset,
        }
    }

    pub fn with_literal(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Scalar,
        offset: usize,
    ) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal: Some(literal),
            offset,
        }
    }
}

impl TokenKind {
    /// Reserved-word lookup, case-insensitive. Anything that misses here
    /// lexes as an identifier.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let folded = word.to_ascii_uppercase();
        let kind = match folded.as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "IS" => TokenKind::Is,
            "NULL" => TokenKind::Null,
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            "DATE" => TokenKind::Date,
            "TIMESTAMP" => TokenKind::Timestamp,
            "INTERVAL" => TokenKind::Interval,
            "LIKE" => TokenKind::Like,
            "BETWEEN" => TokenKind::Between,
            "IN" => TokenKind::In,
            "CASEI" => TokenKind::Casei,
            "ACCENTI" => TokenKind::Accenti,
            "BBOX" => TokenKind::Bbox,
            "POINT" => TokenKind::Point,
            "MULTIPOINT" => TokenKind::MultiPoint,
            "LINESTRING" => TokenKind::LineString,
            "MULTILINESTRING" => TokenKind::MultiLineString,
            "POLYGON" => TokenKind::Polygon,
            "MULTIPOLYGON" => TokenKind::MultiPolygon,
            "GEOMETRYCOLLECTION" => TokenKind::GeometryCollection,
            "DIV" => TokenKind::Div,
            _ => return None,
        };
        Some(kind)
    }
}
