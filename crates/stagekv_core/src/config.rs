//! Store configuration.

use stagekv_storage::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the root directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync staged files before publishing them and the storage
    /// directory after each commit (safer but slower).
    pub sync_on_commit: bool,

    /// Permission bits for entry files (unix only).
    pub file_mode: u32,

    /// Permission bits for directories created by the store (unix only).
    pub dir_mode: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_commit: true,
            file_mode: DEFAULT_FILE_MODE, // rw-r-----
            dir_mode: DEFAULT_DIR_MODE,   // rwxr-xr-x
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the root directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to fsync on every commit.
    #[must_use]
    pub const fn sync_on_commit(mut self, value: bool) -> Self {
        self.sync_on_commit = value;
        self
    }

    /// Sets the entry file permission bits.
    #[must_use]
    pub const fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Sets the directory permission bits.
    #[must_use]
    pub const fn dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }
}
