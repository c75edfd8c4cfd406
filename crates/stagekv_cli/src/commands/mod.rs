//! CLI command implementations.

pub mod drop;
pub mod get;
pub mod list;
pub mod random_key;
pub mod set;
pub mod staging;

use crate::error::CliResult;
use stagekv_core::{Config, Store};
use std::path::Path;

/// Opens the store at `path`.
///
/// Commands that only read must not create anything, so they pass
/// `create = false` and fail on a missing root.
pub fn open_store(path: &Path, create: bool) -> CliResult<Store> {
    let config = Config::default().create_if_missing(create);
    Ok(Store::open_with_config(path, config)?)
}

/// Parses a JSON argument into a value.
pub fn parse_value(text: &str) -> CliResult<stagekv_core::Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(stagekv_codec::from_json(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekv_core::Value;

    #[test]
    fn parses_json_values() {
        assert_eq!(parse_value("42").unwrap(), Value::Integer(42));
        assert_eq!(
            parse_value(r#"{"value": "hello world!"}"#).unwrap(),
            Value::map([("value", Value::from("hello world!"))])
        );
        assert!(parse_value("not json").is_err());
    }

    #[test]
    fn read_commands_require_existing_root() {
        let temp = tempfile::tempdir().unwrap();
        assert!(open_store(&temp.path().join("missing"), false).is_err());
        assert!(open_store(&temp.path().join("missing"), true).is_ok());
    }
}
