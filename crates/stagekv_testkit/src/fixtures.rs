//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use stagekv_core::{Config, CorruptionReport, Store};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test store in a temporary directory with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Store,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: TempDir,
}

impl TestStore {
    /// Creates a store in a fresh temporary directory.
    ///
    /// `sync_on_commit` is off: tests don't need durability and run much
    /// faster without fsync.
    pub fn new() -> Self {
        Self::with_config(Config::default().sync_on_commit(false))
    }

    /// Creates a store with the given configuration.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Store::open_with_config(temp_dir.path().join("store"), config)
            .expect("Failed to open store");
        Self { store, temp_dir }
    }

    /// Replaces the store's corruption handler.
    pub fn with_corruption_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CorruptionReport) + Send + Sync + 'static,
    {
        self.store = self.store.with_corruption_handler(handler);
        self
    }

    /// Returns the store root.
    pub fn root(&self) -> &Path {
        self.store.root()
    }

    /// Returns the directory holding published entries.
    pub fn storage_path(&self) -> PathBuf {
        self.root().join("storage")
    }

    /// Returns the directory holding staging directories.
    pub fn staging_path(&self) -> PathBuf {
        self.root().join("transactions")
    }

    /// Opens a second handle on the same root.
    pub fn reopen(&self) -> Store {
        Store::open_with_config(self.root(), self.store.config().clone())
            .expect("Failed to reopen store")
    }

    /// Returns the temporary directory containing the root.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for TestStore {
    type Target = Store;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Runs a test with a temporary store.
///
/// # Example
///
/// ```
/// use stagekv_testkit::with_temp_store;
///
/// with_temp_store(|store| {
///     assert!(store.keys().unwrap().is_empty());
/// });
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Store) -> R,
{
    let test_store = TestStore::new();
    f(&test_store.store)
}

/// Lists the raw file names in a directory, sorted. A missing directory
/// lists as empty.
pub fn dir_listing(path: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(path) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| {
            e.expect("Failed to read directory entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use stagekv_core::Value;

    /// Key used for the `index`th entry of [`populated_store`].
    pub fn populated_key(index: usize) -> String {
        format!("entry/{index:04}")
    }

    /// Creates a store with `count` entries committed in one transaction.
    ///
    /// Entry `i` is stored under [`populated_key`]`(i)` with value
    /// `{"index": i}`.
    pub fn populated_store(count: usize) -> TestStore {
        let test_store = TestStore::new();
        test_store
            .transaction(|txn| {
                for i in 0..count {
                    let index = i64::try_from(i).expect("index fits i64");
                    txn.set(
                        &populated_key(i),
                        Value::map([("index", Value::Integer(index))]),
                    )?;
                }
                Ok(())
            })
            .expect("Failed to populate store");
        test_store
    }
}
