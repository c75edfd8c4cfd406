//! Transaction state and in-memory buffers.

use stagekv_codec::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// State of a transaction.
///
/// ```text
/// Active ──commit──▶ Committing ──▶ Committed
///   │                     └───────▶ Failed
///   └──rollback──▶ RolledBack
/// ```
///
/// Every state except `Active` is final. `Committing` is only observable
/// while `commit` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can perform operations.
    Active,
    /// Commit is in progress.
    Committing,
    /// Transaction has been committed.
    Committed,
    /// Transaction has been rolled back.
    RolledBack,
    /// Commit failed; the transaction is unusable.
    Failed,
}

impl TransactionState {
    /// Returns true for states a transaction can never leave.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active | Self::Committing)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Active => "active",
            Self::Committing => "committing",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Buffered changes and cached reads of one transaction.
///
/// A key is never both in `writes` and `drops`: each insert removes the key
/// from the other set. Writes are kept sorted so commits publish in a
/// deterministic order.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    /// Values to publish: key -> new value.
    pub(crate) writes: BTreeMap<String, Value>,
    /// Keys to delete.
    pub(crate) drops: BTreeSet<String>,
    /// Published state observed by earlier reads (None = observed absent).
    reads: HashMap<String, Option<Value>>,
}

impl Pending {
    /// Buffers a write.
    pub(crate) fn set(&mut self, key: &str, value: Value) {
        self.drops.remove(key);
        self.writes.insert(key.to_string(), value);
    }

    /// Buffers a drop.
    pub(crate) fn drop_key(&mut self, key: &str) {
        self.writes.remove(key);
        self.drops.insert(key.to_string());
    }

    /// Resolves `key` from the buffers.
    ///
    /// Returns `None` if the buffers know nothing about the key and the
    /// published state has to be consulted.
    pub(crate) fn lookup(&self, key: &str) -> Option<Option<Value>> {
        if self.drops.contains(key) {
            return Some(None);
        }
        if let Some(value) = self.writes.get(key) {
            return Some(Some(value.clone()));
        }
        self.reads.get(key).cloned()
    }

    /// Remembers what a read of the published state returned.
    pub(crate) fn cache_read(&mut self, key: &str, value: Option<Value>) {
        self.reads.insert(key.to_string(), value);
    }

    /// Returns true if the transaction itself has a pending change for `key`.
    pub(crate) fn touches(&self, key: &str) -> bool {
        self.writes.contains_key(key) || self.drops.contains(key)
    }

    /// Returns true if nothing would be published.
    pub(crate) fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.drops.is_empty()
    }

    /// Splits off the changes to commit, dropping cached reads.
    pub(crate) fn into_changes(self) -> (BTreeMap<String, Value>, BTreeSet<String>) {
        (self.writes, self.drops)
    }

    /// Discards everything.
    pub(crate) fn clear(&mut self) {
        self.writes.clear();
        self.drops.clear();
        self.reads.clear();
    }
}
