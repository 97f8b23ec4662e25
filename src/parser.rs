use crate::ast::{Expr, GeometryKind, IntervalEnd, Operator, Scalar, Token, TokenKind};
use crate::temporal;

/// Nesting-depth bound for parenthesized expressions, arrays, and geometry.
/// Inputs deeper than this fail with a parse error instead of exhausting the
/// call stack.
pub const MAX_DEPTH: usize = 64;

/// Grammar violation in CQL2 Text input.
///
/// Carries the token where parsing stopped; the message names what was
/// expected and where.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTextError {
    pub token: Token,
    pub message: String,
}

impl std::fmt::Display for ParseTextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at character index {}.",
            self.message, self.token.offset
        )
    }
}

impl std::error::Error for ParseTextError {}

/// Recursive-descent parser over a scanned token sequence.
///
/// One function per precedence level, each delegating to the next
/// tighter-binding level. The first violation aborts parsing; there is no
/// recovery.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // The scanner terminates every sequence with Eof; enforce the same
        // for tokens built by hand.
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let offset = tokens
                .last()
                .map(|t| t.offset + t.lexeme.chars().count())
                .unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, "", offset));
        }
        Parser {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse a complete expression; trailing input is an error.
    pub fn parse(&mut self) -> Result<Expr, ParseTextError> {
        let expr = self.parse_expression()?;
        if self.current().kind != TokenKind::Eof {
            return Err(self.error("Expected end of input"));
        }
        Ok(expr)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        // Never step past the terminating Eof.
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expectation: &str) -> Result<Token, ParseTextError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expectation))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseTextError {
        let token = self.current().clone();
        // An error at Eof points at the last real token, so truncated input
        // like a lone "(" reports where the expression went wrong.
        let token = if token.kind == TokenKind::Eof && self.position > 0 {
            self.tokens
                .get(self.position.saturating_sub(1))
                .cloned()
                .unwrap_or(token)
        } else {
            token
        };
        ParseTextError {
            message: message.into(),
            token,
        }
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseTextError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("Expression nesting exceeds {} levels", MAX_DEPTH)));
        }
        self.depth += 1;
        let expr = self.parse_or();
        self.depth -= 1;
        expr
    }

    fn parse_or(&mut self) -> Result<Expr, ParseTextError> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let op = Operator::from_token(&self.advance());
            let right = self.parse_and()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseTextError> {
        let mut left = self.parse_not()?;
        while self.check(TokenKind::And) {
            let op = Operator::from_token(&self.advance());
            let right = self.parse_not()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Expr, ParseTextError> {
        if self.check(TokenKind::Not) {
            let op = Operator::from_token(&self.advance());
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(op, operand));
        }
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseTextError> {
        let mut left = self.parse_comparison()?;
        while matches!(self.current().kind, TokenKind::Eq | TokenKind::NotEq) {
            let op = Operator::from_token(&self.advance());
            let right = self.parse_comparison()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseTextError> {
        let mut left = self.parse_advanced_comparison()?;
        loop {
            match self.current().kind {
                TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => {
                    let op = Operator::from_token(&self.advance());
                    let right = self.parse_advanced_comparison()?;
                    left = Expr::binary(left, op, right);
                }
                TokenKind::Is => {
                    self.advance();
                    let negate = self.eat(TokenKind::Not);
                    self.expect(TokenKind::Null, "Expected NULL after IS")?;
                    left = Expr::IsNull {
                        expr: Box::new(left),
                        negate,
                    };
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_advanced_comparison(&mut self) -> Result<Expr, ParseTextError> {
        let left = self.parse_term()?;

        let negate = self.check(TokenKind::Not);
        if negate {
            self.advance();
            if !matches!(
                self.current().kind,
                TokenKind::Like | TokenKind::Between | TokenKind::In
            ) {
                return Err(self.error("Expected LIKE, BETWEEN or IN after NOT"));
            }
        }

        match self.current().kind {
            TokenKind::Like => {
                let op = Operator::from_token(&self.advance());
                let pattern = self.parse_term()?;
                Ok(Expr::AdvancedComparison {
                    op,
                    args: vec![left, pattern],
                    negate,
                })
            }
            TokenKind::Between => {
                let op = Operator::from_token(&self.advance());
                let low = self.parse_term()?;
                self.expect(TokenKind::And, "Expected AND in BETWEEN")?;
                let high = self.parse_term()?;
                Ok(Expr::AdvancedComparison {
                    op,
                    args: vec![left, low, high],
                    negate,
                })
            }
            TokenKind::In => {
                let op = Operator::from_token(&self.advance());
                self.expect(TokenKind::LeftParen, "Expected '(' after IN")?;
                let mut items = vec![self.parse_term()?];
                while self.eat(TokenKind::Comma) {
                    items.push(self.parse_term()?);
                }
                self.expect(TokenKind::RightParen, "Expected ')' after IN list")?;
                Ok(Expr::AdvancedComparison {
                    op,
                    args: vec![left, Expr::Array(items)],
                    negate,
                })
            }
            _ => Ok(left),
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseTextError> {
        let mut left = self.parse_factor()?;
        while matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let op = Operator::from_token(&self.advance());
            let right = self.parse_factor()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseTextError> {
        let mut left = self.parse_exponent()?;
        while matches!(
            self.current().kind,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent | TokenKind::Div
        ) {
            let op = Operator::from_token(&self.advance());
            let right = self.parse_exponent()?;
            left = Expr::binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<Expr, ParseTextError> {
        let left = self.parse_unary()?;
        if self.check(TokenKind::Caret) {
            let op = Operator::from_token(&self.advance());
            // Right-associative
            let right = self.parse_exponent()?;
            return Ok(Expr::binary(left, op, right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseTextError> {
        if matches!(self.current().kind, TokenKind::Casei | TokenKind::Accenti) {
            let op = Operator::from_token(&self.advance());
            self.expect(TokenKind::LeftParen, "Expected '(' after insensitivity wrapper")?;
            let operand = self.parse_unary()?;
            self.expect(TokenKind::RightParen, "Expected ')'")?;
            return Ok(Expr::unary(op, operand));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseTextError> {
        match self.current().kind {
            TokenKind::Number
            | TokenKind::Str
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                let token = self.advance();
                let literal = token
                    .literal
                    .clone()
                    .unwrap_or_else(|| Scalar::String(token.lexeme.clone()));
                Ok(Expr::Literal(literal))
            }
            TokenKind::Date => self.parse_temporal_literal(TokenKind::Date),
            TokenKind::Timestamp => self.parse_temporal_literal(TokenKind::Timestamp),
            TokenKind::Interval => self.parse_interval(),
            TokenKind::Bbox => self.parse_bbox(),
            TokenKind::Point => self.parse_geometry(GeometryKind::Point),
            TokenKind::MultiPoint => self.parse_geometry(GeometryKind::MultiPoint),
            TokenKind::LineString => self.parse_geometry(GeometryKind::LineString),
            TokenKind::MultiLineString => self.parse_geometry(GeometryKind::MultiLineString),
            TokenKind::Polygon => self.parse_geometry(GeometryKind::Polygon),
            TokenKind::MultiPolygon => self.parse_geometry(GeometryKind::MultiPolygon),
            TokenKind::GeometryCollection => self.parse_geometry_collection(),
            TokenKind::Identifier => self.parse_identifier(),
            TokenKind::LeftParen => self.parse_grouping_or_array(),
            _ => Err(self.error("Expected expression")),
        }
    }

    /// `DATE('...')` / `TIMESTAMP('...')`. The scanner has already decoded
    /// the quoted string into a temporal scalar.
    fn parse_temporal_literal(&mut self, intro: TokenKind) -> Result<Expr, ParseTextError> {
        let tag = self.advance();
        self.expect(
            TokenKind::LeftParen,
            &format!("Expected '(' after {}", tag.lexeme.to_ascii_uppercase()),
        )?;
        let inner = self.expect(TokenKind::Str, "Expected a quoted temporal literal")?;
        self.expect(TokenKind::RightParen, "Expected ')'")?;

        match inner.literal {
            Some(literal @ Scalar::Date(_)) if intro == TokenKind::Date => {
                Ok(Expr::Literal(literal))
            }
            Some(literal @ Scalar::Timestamp(_)) if intro == TokenKind::Timestamp => {
                Ok(Expr::Literal(literal))
            }
            _ => Err(ParseTextError {
                message: "Expected a quoted temporal literal".to_string(),
                token: inner,
            }),
        }
    }

    fn parse_interval(&mut self) -> Result<Expr, ParseTextError> {
        self.advance();
        self.expect(TokenKind::LeftParen, "Expected '(' after INTERVAL")?;
        let start = self.parse_interval_end()?;
        self.expect(TokenKind::Comma, "Expected ',' between interval bounds")?;
        let end = self.parse_interval_end()?;
        self.expect(TokenKind::RightParen, "Expected ')'")?;
        Ok(Expr::Interval { start, end })
    }

    fn parse_interval_end(&mut self) -> Result<IntervalEnd, ParseTextError> {
        let token = self.expect(TokenKind::Str, "Expected a quoted interval bound")?;
        let Some(Scalar::String(text)) = token.literal.clone() else {
            return Err(ParseTextError {
                message: "Expected a quoted interval bound".to_string(),
                token,
            });
        };
        if text == ".." {
            return Ok(IntervalEnd::Open);
        }
        match temporal::decode_temporal(&text) {
            Ok(literal) => Ok(IntervalEnd::At(Box::new(Expr::Literal(literal)))),
            Err(message) => Err(ParseTextError { message, token }),
        }
    }

    fn parse_bbox(&mut self) -> Result<Expr, ParseTextError> {
        self.advance();
        self.expect(TokenKind::LeftParen, "Expected '(' after BBOX")?;
        let mut values = vec![self.parse_signed_number()?];
        while self.eat(TokenKind::Comma) {
            values.push(self.parse_signed_number()?);
        }
        self.expect(TokenKind::RightParen, "Expected ')'")?;
        if values.len() != 4 && values.len() != 6 {
            return Err(self.error("Expected 4 or 6 numbers in BBOX"));
        }
        Ok(Expr::BBox(values))
    }

    fn parse_geometry(&mut self, kind: GeometryKind) -> Result<Expr, ParseTextError> {
        let tag = self.advance();
        self.expect(
            TokenKind::LeftParen,
            &format!("Expected '(' after {}", tag.lexeme.to_ascii_uppercase()),
        )?;
        let coords = match kind.depth() {
            0 => self.parse_position(kind)?,
            depth => self.parse_coord_lists(kind, depth)?,
        };
        self.expect(TokenKind::RightParen, "Expected ')'")?;
        Ok(Expr::Geometry { kind, coords })
    }

    /// A single position: 2 or 3 whitespace-separated numbers.
    fn parse_position(&mut self, kind: GeometryKind) -> Result<Vec<Expr>, ParseTextError> {
        let mut coords = vec![self.parse_signed_number()?, self.parse_signed_number()?];
        if self.position_continues() {
            coords.push(self.parse_signed_number()?);
        }
        if self.position_continues() {
            return Err(self.error(format!(
                "Expected 2 or 3 coordinates per {} position",
                kind.tag()
            )));
        }
        Ok(coords)
    }

    fn position_continues(&self) -> bool {
        self.check(TokenKind::Number)
            || (self.check(TokenKind::Minus)
                && self
                    .tokens
                    .get(self.position + 1)
                    .is_some_and(|t| t.kind == TokenKind::Number))
    }

    /// Comma-separated coordinate lists, `depth` levels above bare positions.
    fn parse_coord_lists(
        &mut self,
        kind: GeometryKind,
        depth: usize,
    ) -> Result<Vec<Expr>, ParseTextError> {
        if self.depth + depth >= MAX_DEPTH {
            return Err(self.error(format!("Expression nesting exceeds {} levels", MAX_DEPTH)));
        }
        let mut items = vec![self.parse_coord_item(kind, depth)?];
        while self.eat(TokenKind::Comma) {
            items.push(self.parse_coord_item(kind, depth)?);
        }
        Ok(items)
    }

    fn parse_coord_item(
        &mut self,
        kind: GeometryKind,
        depth: usize,
    ) -> Result<Expr, ParseTextError> {
        if depth == 1 {
            return Ok(Expr::Array(self.parse_position(kind)?));
        }
        self.expect(TokenKind::LeftParen, "Expected '(' opening a coordinate list")?;
        let inner = self.parse_coord_lists(kind, depth - 1)?;
        self.expect(TokenKind::RightParen, "Expected ')' closing a coordinate list")?;
        Ok(Expr::Array(inner))
    }

    /// A numeric literal, tolerating a separate minus token so coordinates
    /// parse the same whichever way the scanner split the sign.
    fn parse_signed_number(&mut self) -> Result<Expr, ParseTextError> {
        let negate = self.check(TokenKind::Minus)
            && self
                .tokens
                .get(self.position + 1)
                .is_some_and(|t| t.kind == TokenKind::Number);
        if negate {
            self.advance();
        }
        let token = self.expect(TokenKind::Number, "Expected a number")?;
        match token.literal {
            Some(Scalar::Number(n)) => Ok(Expr::Literal(Scalar::Number(if negate {
                -n
            } else {
                n
            }))),
            _ => Err(ParseTextError {
                message: "Expected a number".to_string(),
                token,
            }),
        }
    }

    fn parse_geometry_collection(&mut self) -> Result<Expr, ParseTextError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("Expression nesting exceeds {} levels", MAX_DEPTH)));
        }
        self.depth += 1;
        let collection = self.parse_geometry_collection_body();
        self.depth -= 1;
        collection
    }

    fn parse_geometry_collection_body(&mut self) -> Result<Expr, ParseTextError> {
        self.advance();
        self.expect(TokenKind::LeftParen, "Expected '(' after GEOMETRYCOLLECTION")?;
        let mut members = vec![self.parse_collection_member()?];
        while self.eat(TokenKind::Comma) {
            members.push(self.parse_collection_member()?);
        }
        self.expect(TokenKind::RightParen, "Expected ')'")?;
        Ok(Expr::GeometryCollection(members))
    }

    fn parse_collection_member(&mut self) -> Result<Expr, ParseTextError> {
        match self.current().kind {
            TokenKind::Point => self.parse_geometry(GeometryKind::Point),
            TokenKind::MultiPoint => self.parse_geometry(GeometryKind::MultiPoint),
            TokenKind::LineString => self.parse_geometry(GeometryKind::LineString),
            TokenKind::MultiLineString => self.parse_geometry(GeometryKind::MultiLineString),
            TokenKind::Polygon => self.parse_geometry(GeometryKind::Polygon),
            TokenKind::MultiPolygon => self.parse_geometry(GeometryKind::MultiPolygon),
            TokenKind::GeometryCollection => self.parse_geometry_collection(),
            _ => Err(self.error("Expected a geometry literal")),
        }
    }

    fn parse_identifier(&mut self) -> Result<Expr, ParseTextError> {
        let name = self.advance().lexeme;
        if !self.eat(TokenKind::LeftParen) {
            return Ok(Expr::Property(name));
        }

        let op = Operator::new(&name);
        if self.eat(TokenKind::RightParen) {
            return Ok(Expr::Function { op, args: vec![] });
        }
        let mut args = vec![self.parse_expression()?];
        while self.eat(TokenKind::Comma) {
            args.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RightParen, "Expected ')' closing argument list")?;
        Ok(Expr::Function { op, args })
    }

    /// `(expr)` is a grouping, `(a, b, ...)` an array, `()` an empty array.
    fn parse_grouping_or_array(&mut self) -> Result<Expr, ParseTextError> {
        self.advance();
        if self.eat(TokenKind::RightParen) {
            return Ok(Expr::Array(vec![]));
        }
        let first = self.parse_expression()?;
        if !self.check(TokenKind::Comma) {
            self.expect(TokenKind::RightParen, "Expected ')'")?;
            return Ok(Expr::grouping(first));
        }
        let mut items = vec![first];
        while self.eat(TokenKind::Comma) {
            items.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RightParen, "Expected ')'")?;
        Ok(Expr::Array(items))
    }
}
