//! JSON document encoding for entry values.
//!
//! Every entry is stored as one JSON document. The mapping is direct:
//!
//! | `Value`         | JSON                         |
//! |-----------------|------------------------------|
//! | `Null`          | `null`                       |
//! | `Bool`          | `true` / `false`             |
//! | `Integer`       | number without fraction      |
//! | `Float`         | number (must be finite)      |
//! | `Text`          | string                       |
//! | `Array`         | array                        |
//! | `Map`           | object (keys in sorted order)|
//!
//! Numbers that do not fit an `i64` decode as `Float`.

use crate::error::{CodecError, CodecResult};
use crate::value::Value;
use serde_json::{Map, Number};

/// File name suffix identifying the document format.
pub const DOCUMENT_SUFFIX: &str = ".json";

/// Encode a value to document bytes.
///
/// # Errors
///
/// Returns [`CodecError::UnsupportedValue`] if the value contains a NaN or
/// infinite float, which JSON cannot represent.
pub fn to_document(value: &Value) -> CodecResult<Vec<u8>> {
    let json = to_json(value)?;
    serde_json::to_vec(&json).map_err(|e| CodecError::encoding_failed(e.to_string()))
}

/// Decode document bytes into a value.
///
/// # Errors
///
/// Returns [`CodecError::ParseFailed`] if the bytes are not a valid document.
pub fn from_document(bytes: &[u8]) -> CodecResult<Value> {
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| CodecError::parse_failed(e.to_string()))?;
    Ok(from_json(json))
}

/// Convert a value into its JSON representation.
///
/// # Errors
///
/// Returns an error for non-finite floats.
pub fn to_json(value: &Value) -> CodecResult<serde_json::Value> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::Number((*n).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| CodecError::unsupported_value(format!("non-finite float {f}")))?,
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(to_json).collect::<CodecResult<_>>()?)
        }
        Value::Map(entries) => {
            let mut object = Map::with_capacity(entries.len());
            for (k, v) in entries {
                object.insert(k.clone(), to_json(v)?);
            }
            serde_json::Value::Object(object)
        }
    })
}

/// Convert a JSON value into a [`Value`].
pub fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            // u64 beyond i64::MAX and fractional numbers
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(object) => Value::Map(
            object
                .into_iter()
                .map(|(k, v)| (k, from_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn document_layout_is_plain_json() {
        let value = Value::map([("value", Value::from("hello world!"))]);
        let bytes = to_document(&value).unwrap();
        assert_eq!(bytes, br#"{"value":"hello world!"}"#);
    }

    #[test]
    fn nested_document() {
        let value = Value::map([
            (
                "users",
                Value::Array(vec![
                    Value::map([("name", Value::from("Alice")), ("age", Value::Integer(30))]),
                    Value::map([("name", Value::from("Bob")), ("age", Value::Integer(25))]),
                ]),
            ),
            ("count", Value::Integer(2)),
            ("ratio", Value::Float(0.25)),
            ("active", Value::Bool(true)),
            ("note", Value::Null),
        ]);
        let bytes = to_document(&value).unwrap();
        assert_eq!(from_document(&bytes).unwrap(), value);
    }

    #[test]
    fn float_with_zero_fraction_stays_float() {
        let bytes = to_document(&Value::Float(2.0)).unwrap();
        assert_eq!(from_document(&bytes).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn large_unsigned_decodes_as_float() {
        let value = from_document(b"18446744073709551615").unwrap();
        assert!(matches!(value, Value::Float(_)));
    }

    #[test]
    fn non_finite_float_rejected() {
        let err = to_document(&Value::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedValue { .. }));

        let nested = Value::Array(vec![Value::Float(f64::INFINITY)]);
        assert!(to_document(&nested).is_err());
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = from_document(b"{\"value\": ").unwrap_err();
        assert!(matches!(err, CodecError::ParseFailed { .. }));

        let err = from_document(b"").unwrap_err();
        assert!(matches!(err, CodecError::ParseFailed { .. }));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e12f64..1.0e12).prop_map(Value::Float),
            ".*".prop_map(Value::Text),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map(".*", inner, 0..6).prop_map(Value::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn documents_decode_to_the_encoded_value(value in arb_value()) {
            let bytes = to_document(&value).unwrap();
            prop_assert_eq!(from_document(&bytes).unwrap(), value);
        }
    }
}
