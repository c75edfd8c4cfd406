//! Staging command implementation.
//!
//! Staging directories normally vanish when their commit ends. Those left
//! by failed cleanups or crashed processes are listed here and, with
//! `--purge`, removed. Purging must not run while any process is
//! committing to the same store.

use super::open_store;
use crate::error::CliResult;
use std::path::Path;
use tracing::info;

/// Runs the staging command.
pub fn run(path: &Path, purge: bool) -> CliResult<()> {
    let store = open_store(path, false)?;
    let orphans = store.staging_orphans()?;

    if orphans.is_empty() {
        println!("No leftover staging directories");
        return Ok(());
    }

    for dir in &orphans {
        println!("{}", dir.display());
    }

    if purge {
        let removed = store.purge_staging()?;
        info!(removed, "purged staging directories");
        println!("Removed {removed} staging directories");
    } else {
        println!("{} leftover staging directories (use --purge to remove)", orphans.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekv_core::Store;

    #[test]
    fn purge_removes_leftovers() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("transactions").join("7")).unwrap();

        run(temp.path(), false).unwrap();
        let store = Store::open(temp.path()).unwrap();
        assert_eq!(store.staging_orphans().unwrap().len(), 1);

        run(temp.path(), true).unwrap();
        assert!(store.staging_orphans().unwrap().is_empty());
    }
}
