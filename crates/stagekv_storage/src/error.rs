//! Error types for storage operations.

use stagekv_codec::CodecError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
///
/// A missing entry file is not an error; reads report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A stored entry could not be parsed.
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        /// Path of the unreadable entry file.
        path: PathBuf,
        /// The underlying codec error.
        source: CodecError,
    },

    /// A value could not be encoded as a document.
    #[error("encoding error: {0}")]
    Encode(#[source] CodecError),

    /// No free staging directory name was found.
    #[error("no free staging directory after {attempts} attempts")]
    StagingExhausted {
        /// Number of names tried.
        attempts: usize,
    },
}

impl StorageError {
    /// Returns true if this error reports unparseable stored content.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, StorageError::Parse { .. })
    }

    /// Returns true if this error is a plain file system failure.
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, StorageError::Io(_))
    }
}
