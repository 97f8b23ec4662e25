use crate::ast::{Scalar, Token, TokenKind};
use crate::temporal;

/// Lexical error, located by character offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanError {
    pub offset: usize,
    pub message: String,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at character index {}.", self.message, self.offset)
    }
}

impl std::error::Error for ScanError {}

/// Single-pass scanner for CQL2 Text input.
///
/// One character of lookahead; literals are decoded as they are read, so the
/// resulting tokens carry both the exact lexeme and its value.
pub struct Scanner {
    input: Vec<char>,
    position: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Scanner {
            input: input.chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Scan the whole input into a token sequence ending in `Eof`.
    pub fn scan(mut self) -> Result<Vec<Token>, ScanError> {
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            self.tokens.push(token);
            if done {
                return Ok(self.tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ScanError {
        ScanError {
            offset,
            message: message.into(),
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let offset = self.position;
        let lexeme = self.current_char().map(String::from).unwrap_or_default();
        self.advance();
        Token::new(kind, lexeme, offset)
    }

    /// Minus disambiguation: a `-` before a digit starts a negative-number
    /// token unless the previous token is a number, identifier, or right
    /// paren *and* whitespace separates that token from the minus, in which
    /// case the minus is the binary subtraction operator. Geometry input like
    /// `POINT(43.58 -79.54)` relies on the parser accepting either split.
    fn minus_is_binary(&self) -> bool {
        let Some(prev) = self.tokens.last() else {
            return false;
        };
        let value_like = matches!(
            prev.kind,
            TokenKind::Number | TokenKind::Identifier | TokenKind::RightParen
        );
        let prev_end = prev.offset + prev.lexeme.chars().count();
        value_like && self.position > prev_end
    }

    fn read_identifier(&mut self) -> Token {
        let offset = self.position;
        let mut word = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match TokenKind::keyword(&word) {
            Some(TokenKind::True) => {
                Token::with_literal(TokenKind::True, word, Scalar::Boolean(true), offset)
            }
            Some(TokenKind::False) => {
                Token::with_literal(TokenKind::False, word, Scalar::Boolean(false), offset)
            }
            Some(TokenKind::Null) => {
                Token::with_literal(TokenKind::Null, word, Scalar::Null, offset)
            }
            Some(kind) => Token::new(kind, word, offset),
            None => Token::new(TokenKind::Identifier, word, offset),
        }
    }

    fn read_number(&mut self) -> Result<Token, ScanError> {
        let offset = self.position;
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        let mut is_float = false;
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Optional exponent: e or E, optional sign, at least one digit.
        if matches!(self.current_char(), Some('e') | Some('E')) {
            let digit_at = match self.peek_char(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..=digit_at {
                    if let Some(ch) = self.current_char() {
                        number.push(ch);
                        self.advance();
                    }
                }
                while let Some(ch) = self.current_char() {
                    if ch.is_ascii_digit() {
                        number.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let value: f64 = number
            .parse()
            .map_err(|_| self.error(offset, format!("Invalid number '{}'", number)))?;
        Ok(Token::with_literal(
            TokenKind::Number,
            number,
            Scalar::Number(value),
            offset,
        ))
    }

    fn read_string(&mut self, quote: char) -> Result<Token, ScanError> {
        let offset = self.position;
        let mut lexeme = String::from(quote);
        let mut value = String::new();
        self.advance(); // consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    // A doubled quote is an escaped quote, not the end.
                    if self.peek_char(1) == Some(quote) {
                        lexeme.push(quote);
                        lexeme.push(quote);
                        value.push(quote);
                        self.advance();
                        self.advance();
                        continue;
                    }
                    lexeme.push(quote);
                    self.advance();
                    return self.string_token(lexeme, value, offset);
                }
                '\\' => {
                    self.advance();
                    let raw = self.current_char();
                    let decoded = match raw {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some(other) => {
                            return Err(self.error(
                                self.position - 1,
                                format!("Invalid escape sequence '\\{}'", other),
                            ));
                        }
                        None => {
                            return Err(self.error(offset, "Unterminated string".to_string()));
                        }
                    };
                    lexeme.push('\\');
                    lexeme.push(raw.unwrap_or_default());
                    value.push(decoded);
                    self.advance();
                }
                _ => {
                    lexeme.push(ch);
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Err(self.error(offset, "Unterminated string"))
    }

    /// Build the token for a completed string. Inside `DATE(`/`TIMESTAMP(`
    /// the string is a temporal literal and must decode; anywhere else it is
    /// a plain string.
    fn string_token(
        &self,
        lexeme: String,
        value: String,
        offset: usize,
    ) -> Result<Token, ScanError> {
        let temporal_context = match self.tokens.as_slice() {
            [.., intro, open] if open.kind == TokenKind::LeftParen => match intro.kind {
                TokenKind::Date | TokenKind::Timestamp => Some(intro.kind),
                _ => None,
            },
            _ => None,
        };

        let literal = match temporal_context {
            Some(TokenKind::Date) => {
                temporal::decode_date(&value).map_err(|message| self.error(offset, message))?
            }
            Some(_) => {
                temporal::decode_timestamp(&value).map_err(|message| self.error(offset, message))?
            }
            None => Scalar::String(value),
        };

        Ok(Token {
            kind: TokenKind::Str,
            lexeme,
            literal: Some(literal),
            offset,
        })
    }

    fn next_token(&mut self) -> Result<Token, ScanError> {
        self.skip_whitespace();

        match self.current_char() {
            None => Ok(Token::new(TokenKind::Eof, "", self.position)),
            Some('(') => Ok(self.single(TokenKind::LeftParen)),
            Some(')') => Ok(self.single(TokenKind::RightParen)),
            Some(',') => Ok(self.single(TokenKind::Comma)),
            Some('+') => Ok(self.single(TokenKind::Plus)),
            Some('*') => Ok(self.single(TokenKind::Star)),
            Some('/') => Ok(self.single(TokenKind::Slash)),
            Some('%') => Ok(self.single(TokenKind::Percent)),
            Some('^') => Ok(self.single(TokenKind::Caret)),
            Some('-') => {
                if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) && !self.minus_is_binary()
                {
                    self.read_number()
                } else {
                    Ok(self.single(TokenKind::Minus))
                }
            }
            Some('=') => Ok(self.single(TokenKind::Eq)),
            Some('<') => {
                let offset = self.position;
                match self.peek_char(1) {
                    Some('>') => {
                        self.advance();
                        self.advance();
                        Ok(Token::new(TokenKind::NotEq, "<>", offset))
                    }
                    Some('=') => {
                        self.advance();
                        self.advance();
                        Ok(Token::new(TokenKind::LtEq, "<=", offset))
                    }
                    _ => Ok(self.single(TokenKind::Lt)),
                }
            }
            Some('>') => {
                let offset = self.position;
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::new(TokenKind::GtEq, ">=", offset))
                } else {
                    Ok(self.single(TokenKind::Gt))
                }
            }
            Some('\'') => self.read_string('\''),
            Some('"') => self.read_string('"'),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => Ok(self.read_identifier()),
            Some(ch) => Err(self.error(self.position, format!("Unexpected character '{}'", ch))),
        }
    }
}
