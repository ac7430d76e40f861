//! Filter expressions.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// `==`
    #[serde(rename = "==")]
    Eq,
    /// `>`
    #[serde(rename = ">")]
    Gt,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>=`
    #[serde(rename = ">=")]
    Ge,
    /// `<=`
    #[serde(rename = "<=")]
    Le,
    /// `startsWith`
    #[serde(rename = "startsWith")]
    StartsWith,
}

impl Operator {
    /// Wire spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::StartsWith => "startsWith",
        }
    }
}

impl FromStr for Operator {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "==" => Ok(Self::Eq),
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            "startsWith" => Ok(Self::StartsWith),
            other => Err(CoreError::validation(format!(
                "unsupported query operator {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `operand operator value` predicate over document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    /// Content field the predicate reads.
    pub operand: String,
    /// Comparison to apply.
    pub operator: Operator,
    /// Literal to compare against. Must be a JSON scalar.
    pub value: Value,
}

impl Expression {
    /// Creates an expression.
    pub fn new(operand: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            operand: operand.into(),
            operator,
            value: value.into(),
        }
    }

    /// Parses the wire triple, e.g. `("age", ">", "40")`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an unknown operator.
    pub fn parse(operand: &str, operator: &str, value: impl Into<Value>) -> CoreResult<Self> {
        Ok(Self::new(operand, operator.parse()?, value))
    }

    pub(crate) fn validate(&self) -> CoreResult<()> {
        if self.operand.is_empty() {
            return Err(CoreError::validation("expression operand must not be blank"));
        }
        if super::scalar_text(&self.value).is_none() {
            return Err(CoreError::validation(format!(
                "expression value for {:?} must be a string, number or boolean",
                self.operand
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.operand, self.operator, self.value)
    }
}

/// The filter argument of a query.
///
/// `Unspecified` stands for "the caller passed no filter list" and is
/// rejected; `Where(vec![])` explicitly asks for every document in scope.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filters {
    /// No filter list was supplied.
    #[default]
    Unspecified,
    /// Conjunction of expressions; empty matches everything.
    Where(Vec<Expression>),
}

impl Filters {
    /// Explicitly matches every document in scope.
    #[must_use]
    pub const fn all() -> Self {
        Self::Where(Vec::new())
    }

    /// Returns the expression list, rejecting `Unspecified`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for `Unspecified` or an invalid expression.
    pub fn expressions(&self) -> CoreResult<&[Expression]> {
        match self {
            Self::Unspecified => Err(CoreError::validation(
                "query expressions must be provided (use an empty list to match all)",
            )),
            Self::Where(expressions) => {
                for expression in expressions {
                    expression.validate()?;
                }
                Ok(expressions)
            }
        }
    }
}

impl From<Vec<Expression>> for Filters {
    fn from(expressions: Vec<Expression>) -> Self {
        Self::Where(expressions)
    }
}

impl From<Option<Vec<Expression>>> for Filters {
    fn from(expressions: Option<Vec<Expression>>) -> Self {
        expressions.map_or(Self::Unspecified, Self::Where)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operators_parse_from_wire_strings() {
        for op in [
            Operator::Eq,
            Operator::Gt,
            Operator::Lt,
            Operator::Ge,
            Operator::Le,
            Operator::StartsWith,
        ] {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("=~".parse::<Operator>().unwrap_err().is_validation());
    }

    #[test]
    fn unspecified_filters_are_rejected() {
        assert!(Filters::Unspecified.expressions().unwrap_err().is_validation());
        assert!(Filters::from(None::<Vec<Expression>>).expressions().is_err());
        assert!(Filters::all().expressions().unwrap().is_empty());
    }

    #[test]
    fn blank_operand_is_rejected() {
        let filters = Filters::from(vec![Expression::new("", Operator::Eq, "x")]);
        assert!(filters.expressions().unwrap_err().is_validation());
    }

    #[test]
    fn non_scalar_value_is_rejected() {
        let filters = Filters::from(vec![Expression::new("tags", Operator::Eq, json!(["a"]))]);
        assert!(filters.expressions().unwrap_err().is_validation());
    }

    #[test]
    fn parse_triple() {
        let e = Expression::parse("age", ">=", "40").unwrap();
        assert_eq!(e.operator, Operator::Ge);
        assert_eq!(e.to_string(), "age >= \"40\"");
    }
}
