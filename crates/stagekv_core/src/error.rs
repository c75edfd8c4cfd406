//! Error types for StageKV core.

use crate::corruption::CorruptionReport;
use crate::transaction::TransactionState;
use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in StageKV core operations.
///
/// An absent entry is never an error: reads return `Ok(None)`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage error: unparseable entry, encoding failure or file system
    /// failure.
    #[error("storage error: {0}")]
    Storage(#[from] stagekv_storage::StorageError),

    /// I/O error outside of entry handling.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Two pending operations of one commit target the same entry file.
    #[error("duplicate commit target for key {key:?}")]
    DuplicateKey {
        /// The key whose target appeared twice.
        key: String,
    },

    /// The transaction already ended.
    #[error("transaction is not active (state: {state})")]
    InactiveTransaction {
        /// The state the transaction is in.
        state: TransactionState,
    },

    /// Commit was called on a read-only transaction.
    #[error("cannot commit a read-only transaction")]
    ReadOnlyViolation,

    /// The publish phase failed partway, leaving storage partially
    /// committed.
    #[error("storage corrupted: {0}")]
    Corruption(Box<CorruptionReport>),

    /// No unused random key was found.
    #[error("no unused random key after {attempts} attempts")]
    RandomKeyExhausted {
        /// Number of keys tried.
        attempts: usize,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates an inactive transaction error.
    pub fn inactive(state: TransactionState) -> Self {
        Self::InactiveTransaction { state }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::DuplicateKey { key: key.into() }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if stored content could not be parsed.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_parse())
    }

    /// Returns true for file system failures.
    #[must_use]
    pub fn is_io(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_io(),
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Returns true if storage was left partially committed.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corruption(_))
    }
}
