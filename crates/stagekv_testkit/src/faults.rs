//! Fault injection against a store root.
//!
//! A store trusts its root directory completely. These helpers tamper with
//! the root from outside to reproduce the failures a store has to survive
//! or report:
//!
//! 1. **Unparseable entries** - garbage where a document should be
//! 2. **Blocked publish** - a non-empty directory where an entry file
//!    would be renamed to, so the rename fails midway through a commit
//! 3. **Orphaned staging** - staging directories left by a process that
//!    died before cleaning up
//!
//! ## Usage
//!
//! ```
//! use stagekv_testkit::{block_publish, TestStore};
//!
//! let test_store = TestStore::new();
//! block_publish(test_store.root(), "b");
//!
//! let result = test_store.transaction(|txn| txn.set("b", 1i64));
//! assert!(result.is_err());
//! ```

use parking_lot::Mutex;
use stagekv_codec::encode_key;
use stagekv_core::CorruptionReport;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Returns the path of the published entry for `key` under `root`.
pub fn entry_path(root: &Path, key: &str) -> PathBuf {
    root.join("storage").join(encode_key(key))
}

/// Overwrites the entry for `key` with bytes that are not a document.
pub fn corrupt_entry(root: &Path, key: &str) -> PathBuf {
    let path = entry_path(root, key);
    fs::create_dir_all(path.parent().expect("entry path has a parent"))
        .expect("Failed to create storage directory");
    fs::write(&path, b"{ not json").expect("Failed to corrupt entry");
    path
}

/// Makes publishing `key` fail by placing a non-empty directory at its
/// entry path.
///
/// Renaming a file over a non-empty directory fails on every platform the
/// store supports. Removing `key` fails the same way.
pub fn block_publish(root: &Path, key: &str) -> PathBuf {
    let path = entry_path(root, key);
    fs::create_dir_all(path.join("blocker")).expect("Failed to block entry path");
    path
}

/// Undoes [`block_publish`].
pub fn unblock_publish(root: &Path, key: &str) {
    fs::remove_dir_all(entry_path(root, key)).expect("Failed to unblock entry path");
}

/// Creates a staging directory named `name` holding one stray file, as a
/// crashed commit would leave behind.
pub fn leave_orphan_staging(root: &Path, name: &str) -> PathBuf {
    let dir = root.join("transactions").join(name);
    fs::create_dir_all(&dir).expect("Failed to create orphan staging directory");
    fs::write(dir.join(encode_key("orphan")), b"null").expect("Failed to write orphan file");
    dir
}

/// Records every corruption report it is handed.
///
/// ```
/// use stagekv_testkit::CorruptionRecorder;
///
/// let recorder = CorruptionRecorder::new();
/// let handler = recorder.handler();
/// assert!(recorder.reports().is_empty());
/// # drop(handler);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CorruptionRecorder {
    reports: Arc<Mutex<Vec<CorruptionReport>>>,
}

impl CorruptionRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handler that appends to this recorder.
    pub fn handler(&self) -> impl Fn(&CorruptionReport) + Send + Sync + 'static {
        let reports = Arc::clone(&self.reports);
        move |report: &CorruptionReport| {
            reports.lock().push(report.clone());
        }
    }

    /// Returns the reports recorded so far.
    pub fn reports(&self) -> Vec<CorruptionReport> {
        self.reports.lock().clone()
    }
}
