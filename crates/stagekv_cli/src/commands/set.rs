//! Set command implementation.

use super::{open_store, parse_value};
use crate::error::CliResult;
use std::path::Path;
use tracing::info;

/// Runs the set command: commits `value` (JSON text) under `key`.
pub fn run(path: &Path, key: &str, value: &str) -> CliResult<()> {
    let value = parse_value(value)?;
    let store = open_store(path, true)?;

    let mut txn = store.begin();
    txn.set(key, value)?;
    let summary = txn.commit()?;

    info!(key, written = summary.written, "set");
    Ok(())
}
