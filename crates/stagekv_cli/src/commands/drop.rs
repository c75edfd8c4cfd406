//! Drop command implementation.

use super::open_store;
use crate::error::CliResult;
use std::path::Path;
use tracing::info;

/// Runs the drop command: deletes `key` if present.
pub fn run(path: &Path, key: &str) -> CliResult<()> {
    let store = open_store(path, false)?;

    let mut txn = store.begin();
    txn.drop(key)?;
    let summary = txn.commit()?;

    if summary.removed == 0 {
        println!("{key:?} was not present");
    }
    info!(key, removed = summary.removed, "drop");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::set;
    use stagekv_core::Store;

    #[test]
    fn drop_removes_key() {
        let temp = tempfile::tempdir().unwrap();
        set::run(temp.path(), "k", "1").unwrap();
        run(temp.path(), "k").unwrap();

        let store = Store::open(temp.path()).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn drop_of_absent_key_succeeds() {
        let temp = tempfile::tempdir().unwrap();
        run(temp.path(), "k").unwrap();
    }
}
