//! Property-based test generators using proptest.

use nimbus_core::{Expression, Key, Operator};
use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for document ids, including characters that need escaping.
pub fn id_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9@._%/-]{1,16}").expect("Invalid regex")
}

/// Strategy for keys in `collection`.
pub fn key_strategy(collection: &'static str) -> impl Strategy<Value = Key> {
    id_strategy().prop_map(move |id| Key::new(collection, id))
}

/// Strategy for a scalar field value: a string, a numeric string or a number.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::string::string_regex("[a-zA-Z ]{0,12}")
            .expect("Invalid regex")
            .prop_map(Value::from),
        (-10_000i64..10_000).prop_map(|n| Value::from(n.to_string())),
        (-10_000i64..10_000).prop_map(Value::from),
    ]
}

/// Strategy for flat document content.
pub fn content_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(
        prop::string::string_regex("[a-z]{1,8}").expect("Invalid regex"),
        scalar_strategy(),
        0..6,
    )
    .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>()))
}

/// Strategy for any operator.
pub fn operator_strategy() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Eq),
        Just(Operator::Gt),
        Just(Operator::Lt),
        Just(Operator::Ge),
        Just(Operator::Le),
        Just(Operator::StartsWith),
    ]
}

/// Strategy for an expression over `operand`.
pub fn expression_strategy(operand: &'static str) -> impl Strategy<Value = Expression> {
    (operator_strategy(), scalar_strategy())
        .prop_map(move |(operator, value)| Expression::new(operand, operator, value))
}
