//! Property-based test generators using proptest.
//!
//! Provides strategies for generating keys, values and operation
//! sequences that stay within what a store can represent.

use proptest::prelude::*;
use stagekv_core::Value;

/// Strategy for generating arbitrary keys, including the empty key and
/// keys full of path separators and punctuation.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => any::<String>(),
        2 => prop::string::string_regex("[a-z/:\\\\?&=_.-]{0,24}").expect("Invalid regex"),
        1 => Just(String::new()),
    ]
}

/// Strategy for keys long enough to need a digest file name.
pub fn long_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9/]{180,600}").expect("Invalid regex")
}

/// Strategy for keys from a small alphabet, so that generated operation
/// sequences hit the same keys repeatedly.
pub fn small_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-d]{1,2}").expect("Invalid regex")
}

/// Strategy for generating scalar values.
///
/// Floats are finite and not integral-valued so they cannot be confused
/// with integers after decoding.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12f64..1.0e12f64)
            .prop_filter("float must have a fraction", |f| f.fract() != 0.0)
            .prop_map(Value::Float),
        ".{0,32}".prop_map(Value::Text),
    ]
}

/// Strategy for generating nested values up to a few levels deep.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(".{0,8}", inner, 0..6).prop_map(Value::Map),
        ]
    })
}

/// An operation within a transaction.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Write a value.
    Set {
        /// Key to write.
        key: String,
        /// Value to write.
        value: Value,
    },
    /// Delete a key.
    Drop {
        /// Key to delete.
        key: String,
    },
    /// Read a key.
    Get {
        /// Key to read.
        key: String,
    },
}

impl Operation {
    /// Returns the key the operation targets.
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key, .. } | Self::Drop { key } | Self::Get { key } => key,
        }
    }
}

/// Strategy for generating operations over a small key space.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (small_key_strategy(), value_strategy())
            .prop_map(|(key, value)| Operation::Set { key, value }),
        1 => small_key_strategy().prop_map(|key| Operation::Drop { key }),
        2 => small_key_strategy().prop_map(|key| Operation::Get { key }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
