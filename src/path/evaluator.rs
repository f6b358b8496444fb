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

//! Segment-by-segment evaluation of parsed paths

use super::navigator::Navigable;
use super::parser::{CompareOp, FilterExpr, Operand, Segment, Selector};
use serde_json::Value;
use std::cmp::Ordering;

/// Evaluate `segments` starting from `current`; `root` anchors `$` inside filters
///
/// Results are in document order for each step, duplicates are kept.
pub fn evaluate<'a, N: Navigable<'a>>(segments: &[Segment], root: N, current: N) -> Vec<N> {
    let mut nodes = vec![current];
    for segment in segments {
        let mut next = Vec::new();
        for node in nodes {
            match segment {
                Segment::Child(selector) => apply_selector(selector, node, root, &mut next),
                Segment::Descendant(selector) => {
                    for descendant in descendants(node) {
                        apply_selector(selector, descendant, root, &mut next);
                    }
                }
            }
        }
        log::trace!("segment {segment} selected {} node(s)", next.len());
        if next.is_empty() {
            return next;
        }
        nodes = next;
    }
    nodes
}

/// `node` followed by every node below it, preorder
fn descendants<'a, N: Navigable<'a>>(node: N) -> Vec<N> {
    let mut ordered = Vec::new();
    let mut stack = vec![node];
    while let Some(next) = stack.pop() {
        ordered.push(next);
        stack.extend(next.children().into_iter().rev());
    }
    ordered
}

fn apply_selector<'a, N: Navigable<'a>>(selector: &Selector, node: N, root: N, out: &mut Vec<N>) {
    match selector {
        Selector::Name(name) => out.extend(node.field(name)),
        Selector::Index(index) => out.extend(node.element(*index)),
        Selector::Wildcard => out.extend(node.children()),
        Selector::Filter(expr) => out.extend(
            node.children()
                .into_iter()
                .filter(|candidate| matches_filter(expr, *candidate, root)),
        ),
    }
}

fn matches_filter<'a, N: Navigable<'a>>(expr: &FilterExpr, candidate: N, root: N) -> bool {
    match expr {
        FilterExpr::Or(left, right) => {
            matches_filter(left, candidate, root) || matches_filter(right, candidate, root)
        }
        FilterExpr::And(left, right) => {
            matches_filter(left, candidate, root) && matches_filter(right, candidate, root)
        }
        FilterExpr::Not(inner) => !matches_filter(inner, candidate, root),
        FilterExpr::Exists(Operand::Literal(value)) => is_truthy(value),
        FilterExpr::Exists(Operand::Current(segments)) => {
            !evaluate(segments, root, candidate).is_empty()
        }
        FilterExpr::Exists(Operand::Root(segments)) => !evaluate(segments, root, root).is_empty(),
        FilterExpr::Compare { left, op, right } => {
            let left = resolve(left, candidate, root);
            let right = resolve(right, candidate, root);
            compare(&left, *op, &right)
        }
    }
}

/// Comparable form of an operand
enum Resolved<'v> {
    Missing,
    Structured,
    Scalar(&'v Value),
}

fn resolve<'v, 'a: 'v, N: Navigable<'a>>(operand: &'v Operand, candidate: N, root: N) -> Resolved<'v> {
    let first = match operand {
        Operand::Literal(value) => return Resolved::Scalar(value),
        Operand::Current(segments) => evaluate(segments, root, candidate).into_iter().next(),
        Operand::Root(segments) => evaluate(segments, root, root).into_iter().next(),
    };
    match first {
        None => Resolved::Missing,
        Some(node) => node.scalar().map_or(Resolved::Structured, Resolved::Scalar),
    }
}

fn compare(left: &Resolved<'_>, op: CompareOp, right: &Resolved<'_>) -> bool {
    match op {
        CompareOp::Equal => equals(left, right),
        CompareOp::NotEqual => !equals(left, right),
        CompareOp::LessThan => ordering(left, right) == Some(Ordering::Less),
        CompareOp::LessThanOrEqual => matches!(
            ordering(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CompareOp::GreaterThan => ordering(left, right) == Some(Ordering::Greater),
        CompareOp::GreaterThanOrEqual => matches!(
            ordering(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

fn equals(left: &Resolved<'_>, right: &Resolved<'_>) -> bool {
    match (left, right) {
        (Resolved::Missing, Resolved::Missing) => true,
        (Resolved::Scalar(Value::Number(a)), Resolved::Scalar(Value::Number(b))) => {
            a.as_f64() == b.as_f64()
        }
        (Resolved::Scalar(a), Resolved::Scalar(b)) => a == b,
        _ => false,
    }
}

fn ordering(left: &Resolved<'_>, right: &Resolved<'_>) -> Option<Ordering> {
    match (left, right) {
        (Resolved::Scalar(Value::Number(a)), Resolved::Scalar(Value::Number(b))) => {
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Resolved::Scalar(Value::String(a)), Resolved::Scalar(Value::String(b))) => Some(a.cmp(b)),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}
