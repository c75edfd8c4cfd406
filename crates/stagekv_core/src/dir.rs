//! Store directory management.
//!
//! This module handles the file system layout for StageKV:
//!
//! ```text
//! <root>/
//! ├─ storage/              # one file per live key
//! │  └─ <encoded-key>
//! └─ transactions/         # per-commit staging directories
//!    └─ <counter-hex>/
//!       └─ <encoded-key>
//! ```
//!
//! Neither subdirectory is created when the store is opened. Each commit
//! that needs one creates it if missing, so a store that is only ever read
//! leaves the root untouched and maintenance may remove either directory
//! while the store is open.

use crate::error::{CoreError, CoreResult};
use stagekv_storage::create_dir_all;
use std::path::{Path, PathBuf};

/// Directory holding published entries.
const STORAGE_DIR: &str = "storage";
/// Directory holding staging directories.
const STAGING_DIR: &str = "transactions";

/// Paths of a store root and lazy creation of its subdirectories.
#[derive(Debug)]
pub struct StoreDir {
    /// Root directory path.
    path: PathBuf,
    /// Mode for directories we create.
    dir_mode: u32,
}

impl StoreDir {
    /// Opens a store root.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the root directory
    /// * `create_if_missing` - If false, the root must already exist
    /// * `dir_mode` - Permission bits for directories created later
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The root doesn't exist and `create_if_missing` is false
    /// - The path exists but is not a directory
    pub fn open(path: &Path, create_if_missing: bool, dir_mode: u32) -> CoreResult<Self> {
        if path.exists() {
            if !path.is_dir() {
                return Err(CoreError::invalid_operation(format!(
                    "store root is not a directory: {}",
                    path.display()
                )));
            }
        } else if !create_if_missing {
            return Err(CoreError::invalid_operation(format!(
                "store root does not exist: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            dir_mode,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the storage directory.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.path.join(STORAGE_DIR)
    }

    /// Returns the path of the staging root.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.path.join(STAGING_DIR)
    }

    /// Creates the storage directory (and the root) if missing.
    ///
    /// Checked on every call: the directory may have been removed since the
    /// last commit.
    pub fn ensure_storage(&self) -> CoreResult<()> {
        create_dir_all(&self.storage_path(), self.dir_mode)?;
        Ok(())
    }

    /// Creates the staging root (and the root) if missing.
    pub fn ensure_staging(&self) -> CoreResult<()> {
        create_dir_all(&self.staging_path(), self.dir_mode)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekv_storage::DEFAULT_DIR_MODE;
    use tempfile::tempdir;

    #[test]
    fn open_does_not_create_anything() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("new_store");

        let dir = StoreDir::open(&root, true, DEFAULT_DIR_MODE).unwrap();
        assert!(!root.exists());
        assert_eq!(dir.path(), root);
    }

    #[test]
    fn open_fails_if_not_exists_and_no_create() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("nonexistent");

        let result = StoreDir::open(&root, false, DEFAULT_DIR_MODE);
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));
    }

    #[test]
    fn open_fails_on_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file");
        std::fs::write(&file, b"x").unwrap();

        assert!(StoreDir::open(&file, true, DEFAULT_DIR_MODE).is_err());
    }

    #[test]
    fn ensure_creates_lazily_and_repeatably() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("store");
        let dir = StoreDir::open(&root, true, DEFAULT_DIR_MODE).unwrap();

        dir.ensure_staging().unwrap();
        assert!(dir.staging_path().is_dir());
        assert!(!dir.storage_path().exists());

        dir.ensure_storage().unwrap();
        dir.ensure_storage().unwrap();
        assert!(dir.storage_path().is_dir());
    }

    #[test]
    fn ensure_recreates_removed_directories() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path(), false, DEFAULT_DIR_MODE).unwrap();

        dir.ensure_staging().unwrap();
        dir.ensure_storage().unwrap();
        std::fs::remove_dir_all(dir.staging_path()).unwrap();
        std::fs::remove_dir_all(dir.storage_path()).unwrap();

        dir.ensure_staging().unwrap();
        dir.ensure_storage().unwrap();
        assert!(dir.staging_path().is_dir());
        assert!(dir.storage_path().is_dir());
    }

    #[test]
    fn paths_are_correct() {
        let temp = tempdir().unwrap();
        let dir = StoreDir::open(temp.path(), false, DEFAULT_DIR_MODE).unwrap();

        assert_eq!(dir.storage_path(), temp.path().join("storage"));
        assert_eq!(dir.staging_path(), temp.path().join("transactions"));
    }
}
