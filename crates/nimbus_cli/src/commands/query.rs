//! Query command implementation.

use nimbus_core::{Expression, Key, PagingToken};
use std::path::Path;

/// Runs a query and prints the page as JSON.
pub fn run(
    path: &Path,
    collections: Vec<String>,
    key: &Key,
    sub_collection: &str,
    filters: &[String],
    limit: usize,
    token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let expressions = filters
        .iter()
        .map(|f| parse_filter(f))
        .collect::<Result<Vec<_>, _>>()?;
    let token = token.map(PagingToken::from);

    let backend = super::open(path, collections)?;
    let page = backend
        .documents()
        .query(key, sub_collection, expressions, limit, token.as_ref())?;

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}

/// Parses `"field op value"`. The value is everything after the operator.
pub fn parse_filter(filter: &str) -> Result<Expression, Box<dyn std::error::Error>> {
    let mut parts = filter.trim().splitn(3, char::is_whitespace);
    let (Some(operand), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("filter {filter:?} is not of the form \"field op value\"").into());
    };
    Ok(Expression::parse(operand, operator, value.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::Operator;

    #[test]
    fn parse_simple_filter() {
        let expr = parse_filter("age > 40").unwrap();
        assert_eq!(expr, Expression::new("age", Operator::Gt, "40"));
    }

    #[test]
    fn parse_value_with_spaces() {
        let expr = parse_filter("name startsWith Jane Sm").unwrap();
        assert_eq!(expr, Expression::new("name", Operator::StartsWith, "Jane Sm"));
    }

    #[test]
    fn parse_rejects_short_filter() {
        assert!(parse_filter("age >").is_err());
        assert!(parse_filter("").is_err());
    }

    #[test]
    fn parse_rejects_unknown_operator() {
        assert!(parse_filter("age ~ 40").is_err());
    }
}
