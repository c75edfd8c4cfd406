//! CLI error type.

use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The store reported an error.
    #[error(transparent)]
    Store(#[from] stagekv_core::CoreError),

    /// A value could not be converted to JSON.
    #[error(transparent)]
    Codec(#[from] stagekv_codec::CodecError),

    /// A value argument was not valid JSON.
    #[error("invalid JSON value: {0}")]
    InvalidValue(#[from] serde_json::Error),

    /// The command needs `--path`.
    #[error("store path required for {command}")]
    MissingPath {
        /// The command that was run.
        command: &'static str,
    },

    /// The key has no entry.
    #[error("key not found: {key:?}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },
}
