//! Expression evaluation over candidate documents.

use super::expression::{Expression, Operator};
use super::scalar_text;
use crate::document::{Content, Document};
use std::cmp::Ordering;

/// Parses a value as a number when it reads as a finite float.
fn as_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compares numerically when both sides are numbers, else as strings.
fn compare(stored: &str, literal: &str) -> Ordering {
    match (as_number(stored), as_number(literal)) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => stored.cmp(literal),
    }
}

/// Evaluates one expression against document content.
///
/// A missing field, or one holding null, an array or an object, never matches.
pub fn matches(content: &Content, expression: &Expression) -> bool {
    let Some(stored) = content.get(&expression.operand).and_then(scalar_text) else {
        return false;
    };
    let Some(literal) = scalar_text(&expression.value) else {
        return false;
    };

    match expression.operator {
        Operator::StartsWith => stored.starts_with(&*literal),
        Operator::Eq => compare(&stored, &literal) == Ordering::Equal,
        Operator::Gt => compare(&stored, &literal) == Ordering::Greater,
        Operator::Lt => compare(&stored, &literal) == Ordering::Less,
        Operator::Ge => compare(&stored, &literal) != Ordering::Less,
        Operator::Le => compare(&stored, &literal) != Ordering::Greater,
    }
}

/// Evaluates the conjunction of `expressions`; vacuously true when empty.
pub fn matches_all(content: &Content, expressions: &[Expression]) -> bool {
    expressions.iter().all(|e| matches(content, e))
}

/// Keeps matching documents and orders them by id, then parent id.
pub fn evaluate(mut candidates: Vec<Document>, expressions: &[Expression]) -> Vec<Document> {
    candidates.retain(|doc| matches_all(&doc.content, expressions));
    candidates.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    candidates
}
