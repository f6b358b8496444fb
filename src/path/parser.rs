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

//! Parser producing the segment list of a path expression
//!
//! Grammar (whitespace between tokens is ignored):
//!
//! ```text
//! path       := ['$'] segment*            -- a leading name or '[' implies '$'
//! segment    := '.' (name | '*')
//!             | '..' (name | '*' | bracket)
//!             | bracket
//! bracket    := '[' ('*' | integer | string | '?' or_expr) ']'
//! or_expr    := and_expr ('||' and_expr)*
//! and_expr   := unary ('&&' unary)*
//! unary      := '!' unary | '(' or_expr ')' | comparison
//! comparison := operand (compare_op operand)?
//! operand    := '@' segment* | '$' segment* | literal
//! ```

use super::error::{ParseError, ParseResult};
use super::span::Spanned;
use super::tokenizer::{Token, Tokenizer};
use serde_json::{Number, Value};
use std::fmt;

/// What a segment picks out of each input node
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Object member by name
    Name(String),
    /// Every child of an object or array
    Wildcard,
    /// Array element by position
    Index(usize),
    /// Children of an object or array satisfying a predicate
    Filter(FilterExpr),
}

/// One step of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Apply the selector to the current nodes
    Child(Selector),
    /// Apply the selector to the current nodes and all of their descendants
    Descendant(Selector),
}

/// Comparison operators available in filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
}

/// Value source on either side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Path relative to the filter candidate (`@...`)
    Current(Vec<Segment>),
    /// Path relative to the document root (`$...`)
    Root(Vec<Segment>),
    /// Literal JSON scalar
    Literal(Value),
}

/// Filter predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Either side holds
    Or(Box<FilterExpr>, Box<FilterExpr>),
    /// Both sides hold
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// Negation
    Not(Box<FilterExpr>),
    /// Binary comparison
    Compare {
        /// Left operand
        left: Operand,
        /// Operator
        op: CompareOp,
        /// Right operand
        right: Operand,
    },
    /// Operand selects something (or, for a literal, is truthy)
    Exists(Operand),
}

impl FilterExpr {
    /// `@.<field> == '<value>'`
    pub fn field_equals(field: &str, value: &str) -> Self {
        FilterExpr::Compare {
            left: Operand::Current(vec![Segment::Child(Selector::Name(field.to_string()))]),
            op: CompareOp::Equal,
            right: Operand::Literal(Value::String(value.to_string())),
        }
    }

    /// Disjunction of two predicates
    pub fn or(self, other: FilterExpr) -> Self {
        FilterExpr::Or(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::LessThan => "<",
            CompareOp::LessThanOrEqual => "<=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterThanOrEqual => ">=",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "['{}']", name.replace('\'', "\\'")),
            Selector::Wildcard => f.write_str("[*]"),
            Selector::Index(index) => write!(f, "[{index}]"),
            Selector::Filter(expr) => write!(f, "[?({expr})]"),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Child(selector) => write!(f, "{selector}"),
            Segment::Descendant(selector) => write!(f, "..{selector}"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (anchor, segments) = match self {
            Operand::Literal(Value::String(text)) => {
                return write!(f, "'{}'", text.replace('\'', "\\'"));
            }
            Operand::Literal(value) => return write!(f, "{value}"),
            Operand::Current(segments) => ("@", segments),
            Operand::Root(segments) => ("$", segments),
        };
        f.write_str(anchor)?;
        segments.iter().try_for_each(|segment| write!(f, "{segment}"))
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Or(left, right) => write!(f, "({left} || {right})"),
            FilterExpr::And(left, right) => write!(f, "({left} && {right})"),
            FilterExpr::Not(inner) => write!(f, "!{inner}"),
            FilterExpr::Compare { left, op, right } => write!(f, "{left}{op}{right}"),
            FilterExpr::Exists(operand) => write!(f, "{operand}"),
        }
    }
}

/// Recursive-descent parser over a pre-tokenized expression
pub struct PathParser<'input> {
    tokens: Vec<Spanned<Token<'input>>>,
    pos: usize,
    input_len: usize,
}

impl<'input> PathParser<'input> {
    /// Tokenize `input` and prepare for parsing
    pub fn new(input: &'input str) -> ParseResult<Self> {
        let tokens = Tokenizer::new(input).tokenize_all()?;
        Ok(Self {
            tokens,
            pos: 0,
            input_len: input.len(),
        })
    }

    fn current(&self) -> Option<&Token<'input>> {
        self.tokens.get(self.pos).map(|spanned| &spanned.value)
    }

    fn current_position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.input_len, |spanned| spanned.start)
    }

    fn advance(&mut self) -> Option<Spanned<Token<'input>>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(&self) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ParseError::UnexpectedToken {
                token: spanned.value.to_string(),
                position: spanned.start,
            },
            None => ParseError::UnexpectedEndOfInput {
                position: self.input_len,
            },
        }
    }

    fn expected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ParseError::ExpectedToken {
                expected: format!("{expected}, found '{}'", spanned.value),
                position: spanned.start,
            },
            None => ParseError::UnexpectedEndOfInput {
                position: self.input_len,
            },
        }
    }

    fn expect(&mut self, expected: Token<'input>) -> ParseResult<()> {
        if self.current() == Some(&expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.expected(&format!("'{expected}'")))
        }
    }

    /// Parse the whole input as a path
    pub fn parse(&mut self) -> ParseResult<Vec<Segment>> {
        let mut segments = Vec::new();

        match self.current() {
            None => return Err(ParseError::EmptyExpression),
            Some(Token::Dollar) => {
                self.pos += 1;
            }
            Some(token) => {
                // the root may be omitted: `items[0]`, `[?(...)]`
                if let Some(name) = token.as_name() {
                    segments.push(Segment::Child(Selector::Name(name.to_string())));
                    self.pos += 1;
                } else if *token != Token::LeftBracket {
                    return Err(self.unexpected());
                }
            }
        }

        segments.extend(self.parse_segments()?);

        if self.current().is_some() {
            return Err(self.unexpected());
        }
        Ok(segments)
    }

    /// Segments until the next token cannot continue a path
    fn parse_segments(&mut self) -> ParseResult<Vec<Segment>> {
        let mut segments = Vec::new();
        loop {
            let segment = match self.current() {
                Some(Token::Dot) => {
                    self.pos += 1;
                    Segment::Child(self.parse_dotted_selector()?)
                }
                Some(Token::DotDot) => {
                    self.pos += 1;
                    if self.current() == Some(&Token::LeftBracket) {
                        self.pos += 1;
                        Segment::Descendant(self.parse_bracket()?)
                    } else {
                        Segment::Descendant(self.parse_dotted_selector()?)
                    }
                }
                Some(Token::LeftBracket) => {
                    self.pos += 1;
                    Segment::Child(self.parse_bracket()?)
                }
                _ => return Ok(segments),
            };
            segments.push(segment);
        }
    }

    fn parse_dotted_selector(&mut self) -> ParseResult<Selector> {
        if self.current() == Some(&Token::Star) {
            self.pos += 1;
            return Ok(Selector::Wildcard);
        }
        match self.current().and_then(|token| token.as_name()) {
            Some(name) => {
                let selector = Selector::Name(name.to_string());
                self.pos += 1;
                Ok(selector)
            }
            None => Err(self.expected("member name")),
        }
    }

    /// Bracket contents, after the opening `[`
    fn parse_bracket(&mut self) -> ParseResult<Selector> {
        let position = self.current_position();
        let selector = match self.advance().map(|spanned| spanned.value) {
            Some(Token::Star) => Selector::Wildcard,
            Some(Token::Integer(index)) => {
                let index = usize::try_from(index).map_err(|_| ParseError::InvalidLiteral {
                    literal_type: "index".to_string(),
                    value: index.to_string(),
                    position,
                })?;
                Selector::Index(index)
            }
            Some(Token::String(name)) => Selector::Name(name.into_owned()),
            Some(Token::Question) => Selector::Filter(self.parse_or()?),
            Some(_) => {
                self.pos -= 1;
                return Err(self.expected("'*', index, quoted name or filter"));
            }
            None => {
                return Err(ParseError::UnexpectedEndOfInput {
                    position: self.input_len,
                });
            }
        };
        self.expect(Token::RightBracket)?;
        Ok(selector)
    }

    fn parse_or(&mut self) -> ParseResult<FilterExpr> {
        let mut left = self.parse_and()?;
        while self.current() == Some(&Token::Or) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<FilterExpr> {
        let mut left = self.parse_unary()?;
        while self.current() == Some(&Token::And) {
            self.pos += 1;
            let right = self.parse_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<FilterExpr> {
        match self.current() {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(FilterExpr::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::LeftParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            _ => self.parse_comparison(),
        }
    }

    fn parse_comparison(&mut self) -> ParseResult<FilterExpr> {
        let left = self.parse_operand()?;
        let op = match self.current() {
            Some(Token::Equal) => CompareOp::Equal,
            Some(Token::NotEqual) => CompareOp::NotEqual,
            Some(Token::LessThan) => CompareOp::LessThan,
            Some(Token::LessThanOrEqual) => CompareOp::LessThanOrEqual,
            Some(Token::GreaterThan) => CompareOp::GreaterThan,
            Some(Token::GreaterThanOrEqual) => CompareOp::GreaterThanOrEqual,
            _ => return Ok(FilterExpr::Exists(left)),
        };
        self.pos += 1;
        let right = self.parse_operand()?;
        Ok(FilterExpr::Compare { left, op, right })
    }

    fn parse_operand(&mut self) -> ParseResult<Operand> {
        let position = self.current_position();
        let operand = match self.current() {
            Some(Token::At) => {
                self.pos += 1;
                return Ok(Operand::Current(self.parse_segments()?));
            }
            Some(Token::Dollar) => {
                self.pos += 1;
                return Ok(Operand::Root(self.parse_segments()?));
            }
            Some(Token::String(text)) => Operand::Literal(Value::String(text.to_string())),
            Some(Token::Integer(value)) => Operand::Literal(Value::from(*value)),
            Some(Token::Decimal(text)) => {
                let number = text
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .ok_or_else(|| ParseError::InvalidLiteral {
                        literal_type: "decimal".to_string(),
                        value: text.to_string(),
                        position,
                    })?;
                Operand::Literal(Value::Number(number))
            }
            Some(Token::True) => Operand::Literal(Value::Bool(true)),
            Some(Token::False) => Operand::Literal(Value::Bool(false)),
            Some(Token::Null) => Operand::Literal(Value::Null),
            _ => return Err(self.expected("filter operand")),
        };
        self.pos += 1;
        Ok(operand)
    }
}

/// Parse an expression into its segments
pub fn parse_segments(input: &str) -> ParseResult<Vec<Segment>> {
    PathParser::new(input)?.parse()
}
