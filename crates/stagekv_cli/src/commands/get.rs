//! Get command implementation.

use super::open_store;
use crate::error::{CliError, CliResult};
use std::path::Path;

/// Runs the get command: prints the value of `key` as JSON.
pub fn run(path: &Path, key: &str, pretty: bool) -> CliResult<()> {
    println!("{}", render(path, key, pretty)?);
    Ok(())
}

/// Reads `key` and renders its value as JSON text.
pub fn render(path: &Path, key: &str, pretty: bool) -> CliResult<String> {
    let store = open_store(path, false)?;
    let value = store.get(key)?.ok_or_else(|| CliError::NotFound {
        key: key.to_string(),
    })?;

    let json = stagekv_codec::to_json(&value)?;
    let text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::set;

    #[test]
    fn renders_committed_value() {
        let temp = tempfile::tempdir().unwrap();
        set::run(temp.path(), "k", r#"{"b": [1, 2.5], "a": null}"#).unwrap();

        assert_eq!(render(temp.path(), "k", false).unwrap(), r#"{"a":null,"b":[1,2.5]}"#);
    }

    #[test]
    fn missing_key_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = render(temp.path(), "nope", false).unwrap_err();
        assert!(matches!(err, CliError::NotFound { .. }));
    }
}
