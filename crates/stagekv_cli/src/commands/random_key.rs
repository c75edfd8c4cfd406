//! Random key command implementation.

use super::{open_store, parse_value};
use crate::error::CliResult;
use stagekv_core::RandomKey;
use std::path::Path;
use tracing::info;

/// Runs the random-key command.
///
/// Allocates an unused key under `prefix` and prints it. With a value, the
/// value is committed under the new key in the same transaction.
pub fn run(path: &Path, prefix: &str, value: Option<&str>) -> CliResult<()> {
    let key = allocate(path, prefix, value)?;
    println!("{key}");
    Ok(())
}

/// Allocates a key and optionally stores `value` under it.
pub fn allocate(path: &Path, prefix: &str, value: Option<&str>) -> CliResult<RandomKey> {
    let value = value.map(parse_value).transpose()?;
    let store = open_store(path, value.is_some())?;

    let mut txn = store.begin();
    let key = txn.create_random_key(prefix)?;
    if let Some(value) = value {
        txn.set(key.key(), value)?;
        txn.commit()?;
        info!(key = key.key(), "stored under random key");
    } else {
        txn.rollback()?;
    }
    Ok(key)
}
