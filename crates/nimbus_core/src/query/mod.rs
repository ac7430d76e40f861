//! Query evaluation and pagination.
//!
//! A query selects candidates by scope (collection, optional parent id,
//! optional sub-collection), keeps those matching every [`Expression`],
//! orders them by id (then parent id) and slices a page with a
//! [`PagingToken`] to resume from.

mod cursor;
pub mod engine;
mod expression;

pub use cursor::PagingToken;
pub use expression::{Expression, Filters, Operator};

pub(crate) use cursor::{Paginator, SECRET_SIZE};

use serde_json::Value;
use std::borrow::Cow;

/// Text form of a JSON scalar; `None` for null, arrays and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
