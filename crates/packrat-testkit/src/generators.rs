//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Generate a store key.
pub fn key() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._:-]{0,63}".prop_map(String::from)
}

/// Generate a scalar JSON value.
///
/// Numbers are kept to integers so deep-equality after an encode/decode
/// cycle is exact.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[ -~]{0,32}".prop_map(Value::String),
    ]
}

/// Generate an arbitrary JSON value, nesting arrays and objects up to
/// three levels deep.
pub fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 32, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
            prop::collection::hash_map(key(), inner, 0..8)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}
