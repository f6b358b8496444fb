// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer for JSONPath-style mapping expressions
//!
//! Works directly on the expression bytes and hands out zero-copy slices for
//! identifiers and escape-free string literals. Non-ASCII bytes are accepted as
//! identifier characters so member names like `$.größe` tokenize as one name.

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use std::borrow::Cow;
use std::fmt;

/// Token of a path expression
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// Root marker (`$`)
    Dollar,
    /// Current filter candidate (`@`)
    At,
    /// Member access (`.`)
    Dot,
    /// Recursive descent (`..`)
    DotDot,
    /// Wildcard (`*`)
    Star,
    /// Left square bracket `[`
    LeftBracket,
    /// Right square bracket `]`
    RightBracket,
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Filter introducer (`?`)
    Question,

    /// Member name
    Identifier(&'input str),
    /// Integer literal (e.g. 0, 42, -1)
    Integer(i64),
    /// Decimal literal as string slice, parsed on demand (e.g. 3.14)
    Decimal(&'input str),
    /// String literal with escapes resolved
    String(Cow<'input, str>),
    /// Boolean literal true
    True,
    /// Boolean literal false
    False,
    /// Null literal
    Null,

    /// Equality operator (`==`)
    Equal,
    /// Inequality operator (`!=`)
    NotEqual,
    /// Less than operator (`<`)
    LessThan,
    /// Less than or equal operator (`<=`)
    LessThanOrEqual,
    /// Greater than operator (`>`)
    GreaterThan,
    /// Greater than or equal operator (`>=`)
    GreaterThanOrEqual,
    /// Logical AND operator (`&&`)
    And,
    /// Logical OR operator (`||`)
    Or,
    /// Logical NOT operator (`!`)
    Not,
}

impl<'input> Token<'input> {
    /// Member name this token can stand for after `.` or `..`
    ///
    /// Keyword literals double as member names so `$.null` and `$.true` still
    /// address fields called `null` and `true`.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            Token::True => Some("true"),
            Token::False => Some("false"),
            Token::Null => Some("null"),
            _ => None,
        }
    }

    fn from_keyword(word: &str) -> Option<Token<'input>> {
        match word {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            _ => None,
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Dollar => write!(f, "$"),
            Token::At => write!(f, "@"),
            Token::Dot => write!(f, "."),
            Token::DotDot => write!(f, ".."),
            Token::Star => write!(f, "*"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Question => write!(f, "?"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Integer(value) => write!(f, "{value}"),
            Token::Decimal(value) => write!(f, "{value}"),
            Token::String(value) => write!(f, "'{value}'"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::LessThan => write!(f, "<"),
            Token::LessThanOrEqual => write!(f, "<="),
            Token::GreaterThan => write!(f, ">"),
            Token::GreaterThanOrEqual => write!(f, ">="),
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Not => write!(f, "!"),
        }
    }
}

/// Byte-oriented tokenizer over a single expression
#[derive(Clone)]
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
    end: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a tokenizer positioned at the start of `input`
    pub fn new(input: &'input str) -> Self {
        let bytes = input.as_bytes();
        Self {
            input,
            bytes,
            pos: 0,
            end: bytes.len(),
        }
    }

    /// Current byte offset
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline(always)]
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline(always)]
    fn is_id_start(ch: u8) -> bool {
        matches!(ch, b'A'..=b'Z' | b'a'..=b'z' | b'_') || ch >= 0x80
    }

    #[inline(always)]
    fn is_id_continue(ch: u8) -> bool {
        matches!(ch, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-') || ch >= 0x80
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.end {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                _ => break,
            }
        }
    }

    fn parse_identifier(&mut self) -> &'input str {
        let start = self.pos;
        while self.pos < self.end && Self::is_id_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        // Boundaries sit on ASCII bytes or after a complete multi-byte sequence
        &self.input[start..self.pos]
    }

    fn parse_number(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        if self.bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        while self.pos < self.end && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        let is_decimal = self.peek_byte(0) == Some(b'.')
            && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit());

        if is_decimal {
            self.pos += 1;
            while self.pos < self.end && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            return Ok(Token::Decimal(&self.input[start..self.pos]));
        }

        let text = &self.input[start..self.pos];
        text.parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| ParseError::InvalidLiteral {
                literal_type: "integer".to_string(),
                value: text.to_string(),
                position: start,
            })
    }

    fn parse_string_literal(&mut self, quote: u8) -> ParseResult<Cow<'input, str>> {
        let open = self.pos;
        self.pos += 1;
        let start = self.pos;

        while self.pos < self.end {
            match self.bytes[self.pos] {
                b if b == quote => {
                    let raw = &self.input[start..self.pos];
                    self.pos += 1;
                    return Ok(Cow::Borrowed(raw));
                }
                b'\\' => return self.parse_escaped_string(quote, open, start),
                _ => self.pos += 1,
            }
        }

        Err(ParseError::UnclosedString { position: open })
    }

    /// Slow path once the first escape is seen
    fn parse_escaped_string(
        &mut self,
        quote: u8,
        open: usize,
        start: usize,
    ) -> ParseResult<Cow<'input, str>> {
        let mut value = String::from(&self.input[start..self.pos]);

        while self.pos < self.end {
            let ch = self.bytes[self.pos];
            if ch == quote {
                self.pos += 1;
                return Ok(Cow::Owned(value));
            }
            if ch != b'\\' {
                let run_start = self.pos;
                while self.pos < self.end
                    && self.bytes[self.pos] != quote
                    && self.bytes[self.pos] != b'\\'
                {
                    self.pos += 1;
                }
                value.push_str(&self.input[run_start..self.pos]);
                continue;
            }

            let escape_start = self.pos;
            let Some(escaped) = self.peek_byte(1) else {
                return Err(ParseError::UnclosedString { position: open });
            };
            self.pos += 2;
            match escaped {
                b'\\' => value.push('\\'),
                b'\'' => value.push('\''),
                b'"' => value.push('"'),
                b'/' => value.push('/'),
                b'n' => value.push('\n'),
                b'r' => value.push('\r'),
                b't' => value.push('\t'),
                b'u' => value.push(self.parse_unicode_escape(escape_start)?),
                _ => {
                    let end = (escape_start + 2).min(self.end);
                    return Err(ParseError::InvalidEscape {
                        sequence: String::from_utf8_lossy(&self.bytes[escape_start..end])
                            .into_owned(),
                        position: escape_start,
                    });
                }
            }
        }

        Err(ParseError::UnclosedString { position: open })
    }

    fn parse_unicode_escape(&mut self, escape_start: usize) -> ParseResult<char> {
        if self.pos + 4 > self.end {
            return Err(self.unicode_escape_error(escape_start));
        }
        let ch = std::str::from_utf8(&self.bytes[self.pos..self.pos + 4])
            .ok()
            .and_then(|digits| u32::from_str_radix(digits, 16).ok())
            .and_then(char::from_u32)
            .ok_or_else(|| self.unicode_escape_error(escape_start))?;
        self.pos += 4;
        Ok(ch)
    }

    fn unicode_escape_error(&self, escape_start: usize) -> ParseError {
        let end = (escape_start + 6).min(self.end);
        ParseError::InvalidEscape {
            sequence: String::from_utf8_lossy(&self.bytes[escape_start..end]).into_owned(),
            position: escape_start,
        }
    }

    /// Two-byte operator whose second byte is mandatory (`&&`, `||`, `==`)
    fn expect_pair(&mut self, second: u8, token: Token<'input>) -> ParseResult<Token<'input>> {
        if self.peek_byte(1) == Some(second) {
            self.pos += 2;
            Ok(token)
        } else {
            Err(ParseError::UnexpectedCharacter {
                character: self.bytes[self.pos] as char,
                position: self.pos,
            })
        }
    }

    /// Operator with an optional `=` suffix (`<`/`<=`, `!`/`!=`, ...)
    fn with_optional_equals(&mut self, short: Token<'input>, long: Token<'input>) -> Token<'input> {
        if self.peek_byte(1) == Some(b'=') {
            self.pos += 2;
            long
        } else {
            self.pos += 1;
            short
        }
    }

    fn single(&mut self, token: Token<'input>) -> Token<'input> {
        self.pos += 1;
        token
    }

    /// Read the next token, or `None` at end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Spanned<Token<'input>>>> {
        self.skip_whitespace();

        if self.pos >= self.end {
            return Ok(None);
        }

        let start = self.pos;
        let token = match self.bytes[self.pos] {
            b'.' => {
                if self.peek_byte(1) == Some(b'.') {
                    self.pos += 2;
                    Token::DotDot
                } else {
                    self.single(Token::Dot)
                }
            }
            b'[' => self.single(Token::LeftBracket),
            b']' => self.single(Token::RightBracket),
            b'(' => self.single(Token::LeftParen),
            b')' => self.single(Token::RightParen),
            b'*' => self.single(Token::Star),
            b'$' => self.single(Token::Dollar),
            b'@' => self.single(Token::At),
            b'?' => self.single(Token::Question),
            b'\'' => Token::String(self.parse_string_literal(b'\'')?),
            b'"' => Token::String(self.parse_string_literal(b'"')?),
            b'=' => {
                let token = self.expect_pair(b'=', Token::Equal)?;
                // Accept the strict form `===` as plain equality
                if self.peek_byte(0) == Some(b'=') {
                    self.pos += 1;
                }
                token
            }
            b'!' => self.with_optional_equals(Token::Not, Token::NotEqual),
            b'<' => self.with_optional_equals(Token::LessThan, Token::LessThanOrEqual),
            b'>' => self.with_optional_equals(Token::GreaterThan, Token::GreaterThanOrEqual),
            b'&' => self.expect_pair(b'&', Token::And)?,
            b'|' => self.expect_pair(b'|', Token::Or)?,
            b'0'..=b'9' => self.parse_number()?,
            b'-' if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.parse_number()?
            }
            ch if Self::is_id_start(ch) => {
                let word = self.parse_identifier();
                Token::from_keyword(word).unwrap_or(Token::Identifier(word))
            }
            _ => {
                let character = self.input[self.pos..].chars().next().unwrap_or('\u{FFFD}');
                return Err(ParseError::UnexpectedCharacter {
                    character,
                    position: self.pos,
                });
            }
        };

        Ok(Some(Spanned::new(token, start, self.pos)))
    }

    /// Tokenize the whole input
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Spanned<Token<'input>>>> {
        let mut tokens = Vec::with_capacity(self.end / 3 + 1);
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Convenience function to tokenize an expression
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned<Token<'_>>>> {
    Tokenizer::new(input).tokenize_all()
}
