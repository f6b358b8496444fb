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

//! Path expression error types

use thiserror::Error;

/// Result type for tokenizer and parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for path selection
pub type PathResult<T> = Result<T, PathError>;

/// Syntax error in a path expression, with the byte offset where it was detected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The expression contains no tokens
    #[error("Empty path expression")]
    EmptyExpression,

    /// A character that cannot start any token
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Position where the character was found
        position: usize,
    },

    /// Unexpected token
    #[error("Unexpected token '{token}' at position {position}")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: String,
        /// Position where the token was found
        position: usize,
    },

    /// Expected token
    #[error("Expected {expected} at position {position}")]
    ExpectedToken {
        /// The expected token description
        expected: String,
        /// Position where the token was expected
        position: usize,
    },

    /// Unexpected end of input at specific position
    #[error("Unexpected end of input at position {position}")]
    UnexpectedEndOfInput {
        /// Position where more input was expected
        position: usize,
    },

    /// Invalid literal value
    #[error("Invalid {literal_type} literal at position {position}: {value}")]
    InvalidLiteral {
        /// Type of literal that failed to parse
        literal_type: String,
        /// The invalid value that was encountered
        value: String,
        /// Position where the invalid literal was found
        position: usize,
    },

    /// Invalid escape sequence
    #[error("Invalid escape sequence at position {position}: {sequence}")]
    InvalidEscape {
        /// The invalid escape sequence
        sequence: String,
        /// Position where the escape sequence was found
        position: usize,
    },

    /// Unclosed string literal
    #[error("Unclosed string literal starting at position {position}")]
    UnclosedString {
        /// Position where the unclosed string started
        position: usize,
    },
}

impl ParseError {
    /// Byte offset the error points at, if it has one
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::EmptyExpression => None,
            ParseError::UnexpectedCharacter { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::ExpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position }
            | ParseError::InvalidLiteral { position, .. }
            | ParseError::InvalidEscape { position, .. }
            | ParseError::UnclosedString { position } => Some(*position),
        }
    }
}

/// Errors raised while selecting nodes with a path expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    /// The expression could not be parsed
    #[error("Invalid path '{path}': {source}")]
    Syntax {
        /// The expression as written
        path: String,
        /// Underlying parser error
        #[source]
        source: ParseError,
    },

    /// A mandatory selection matched nothing
    #[error("could not find {path} in data json")]
    NotFound {
        /// The expression as written
        path: String,
    },

    /// A single-valued selection matched several nodes
    #[error("Path '{path}' returned {count} tokens, expected at most one")]
    MultipleMatches {
        /// The expression as written
        path: String,
        /// Number of matched nodes
        count: usize,
    },
}

impl PathError {
    /// Wrap a parser error for the given expression
    pub fn syntax(path: impl Into<String>, source: ParseError) -> Self {
        PathError::Syntax {
            path: path.into(),
            source,
        }
    }
}
