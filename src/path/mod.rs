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

//! JSONPath resolver
//!
//! Paths are compiled once into a [`JsonPath`] and can then be evaluated
//! against plain `serde_json::Value` trees or against the mutable working
//! document through the [`Navigable`] trait.
//!
//! ```
//! use serde_json::json;
//! use smt_mapper::path::select_many;
//!
//! let data = json!({"items": [{"name": "a"}, {"name": "b"}]});
//! let names = select_many(&data, "$.items[*].name", true).unwrap();
//! assert_eq!(names, vec![&json!("a"), &json!("b")]);
//! ```

pub mod error;
pub mod evaluator;
pub mod navigator;
pub mod parser;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult, PathError, PathResult};
pub use navigator::Navigable;
pub use parser::{CompareOp, FilterExpr, Operand, Segment, Selector};
pub use span::Spanned;
pub use tokenizer::{Token, Tokenizer};

use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed path expression, ready to evaluate
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    expression: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parse an expression
    pub fn parse(expression: &str) -> ParseResult<Self> {
        let segments = parser::parse_segments(expression)?;
        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    /// Build a path from already constructed segments
    pub fn from_segments(expression: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            expression: expression.into(),
            segments,
        }
    }

    /// The expression text this path was built from
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Parsed segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// All nodes selected from `root`, in document order
    pub fn select<'a, N: Navigable<'a>>(&self, root: N) -> Vec<N> {
        evaluator::evaluate(&self.segments, root, root)
    }

    /// At most one node; several matches are an error
    pub fn select_one<'a, N: Navigable<'a>>(&self, root: N) -> PathResult<Option<N>> {
        let mut matches = self.select(root);
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            count => Err(PathError::MultipleMatches {
                path: self.expression.clone(),
                count,
            }),
        }
    }

    /// All matches; an empty result is an error when `mandatory` is set
    pub fn select_many<'a, N: Navigable<'a>>(
        &self,
        root: N,
        mandatory: bool,
    ) -> PathResult<Vec<N>> {
        let matches = self.select(root);
        if mandatory && matches.is_empty() {
            return Err(PathError::NotFound {
                path: self.expression.clone(),
            });
        }
        Ok(matches)
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Parse an expression, reporting failures as [`PathError::Syntax`]
pub fn compile(expression: &str) -> PathResult<JsonPath> {
    JsonPath::parse(expression).map_err(|source| PathError::syntax(expression, source))
}

/// Select at most one node from a JSON value
pub fn select_one<'a>(document: &'a Value, path: &str) -> PathResult<Option<&'a Value>> {
    compile(path)?.select_one(document)
}

/// Select all matching nodes from a JSON value
pub fn select_many<'a>(document: &'a Value, path: &str, mandatory: bool) -> PathResult<Vec<&'a Value>> {
    compile(path)?.select_many(document, mandatory)
}
