//! The transaction handle.

use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::transaction::commit::{self, CommitSummary};
use crate::transaction::random::{RandomKey, MAX_RANDOM_KEY_ATTEMPTS};
use crate::transaction::state::{Pending, TransactionState};
use stagekv_codec::Value;
use tracing::debug;

/// A unit of work against a [`Store`].
///
/// Changes are buffered in memory and become visible to others only when
/// [`commit`](Transaction::commit) publishes them. Reads see the
/// transaction's own buffered changes first; keys read from storage are
/// cached, so repeated reads of one key return the same result for the rest
/// of the transaction. There is no snapshot across keys and no conflict
/// detection: when two transactions write the same key, the one that
/// publishes last wins.
///
/// A transaction ends exactly once, through `commit` or `rollback`. After
/// that every operation except the state accessors fails with
/// [`CoreError::InactiveTransaction`].
#[derive(Debug)]
pub struct Transaction<'s> {
    store: &'s Store,
    state: TransactionState,
    read_only: bool,
    pending: Pending,
}

impl<'s> Transaction<'s> {
    pub(crate) fn new(store: &'s Store, read_only: bool) -> Self {
        Self {
            store,
            state: TransactionState::Active,
            read_only,
            pending: Pending::default(),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Returns true if this transaction rejects commits.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns the number of buffered writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.pending.writes.len()
    }

    /// Returns the number of buffered drops.
    #[must_use]
    pub fn drop_count(&self) -> usize {
        self.pending.drops.len()
    }

    /// Reads `key`.
    ///
    /// Buffered drops read as absent and buffered writes as their value.
    /// Otherwise the published entry is read and remembered.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is not active, the stored document cannot
    /// be parsed, or the file cannot be read.
    pub fn get(&mut self, key: &str) -> CoreResult<Option<Value>> {
        self.ensure_active()?;

        if let Some(buffered) = self.pending.lookup(key) {
            return Ok(buffered);
        }

        let value = self.store.entries.read(key)?;
        self.pending.cache_read(key, value.clone());
        Ok(value)
    }

    /// Buffers a write of `value` under `key`, replacing any buffered drop.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is not active.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> CoreResult<()> {
        self.ensure_active()?;
        self.pending.set(key, value.into());
        Ok(())
    }

    /// Buffers deletion of `key`, replacing any buffered write.
    ///
    /// Dropping a key that was already dropped or never existed is fine.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is not active.
    pub fn drop(&mut self, key: &str) -> CoreResult<()> {
        self.ensure_active()?;
        self.pending.drop_key(key);
        Ok(())
    }

    /// Allocates a key starting with `prefix` that has no published entry.
    ///
    /// The key is `prefix` followed by 128 random bits in URL-safe base64.
    /// A candidate that is already published or buffered in this
    /// transaction is replaced by a fresh one.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is not active, a candidate cannot be read,
    /// or every candidate was taken.
    pub fn create_random_key(&mut self, prefix: &str) -> CoreResult<RandomKey> {
        self.ensure_active()?;

        for _ in 0..MAX_RANDOM_KEY_ATTEMPTS {
            let candidate = RandomKey::generate(prefix);
            if self.pending.touches(candidate.key()) {
                continue;
            }
            if self.store.entries.read(candidate.key())?.is_none() {
                return Ok(candidate);
            }
            debug!(key = candidate.key(), "random key already taken");
        }

        Err(CoreError::RandomKeyExhausted {
            attempts: MAX_RANDOM_KEY_ATTEMPTS,
        })
    }

    /// Publishes all buffered changes atomically per entry.
    ///
    /// On success every write is visible and every dropped key is gone. On
    /// failure before publishing, storage is unchanged. A failure while
    /// publishing yields [`CoreError::Corruption`] and is also reported to
    /// the store's corruption handler. In every case the transaction ends:
    /// a second `commit` fails with [`CoreError::InactiveTransaction`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::InactiveTransaction`] if the transaction already ended
    /// - [`CoreError::ReadOnlyViolation`] for read-only transactions
    /// - [`CoreError::DuplicateKey`] if two changes target one entry file
    /// - [`CoreError::Storage`] for staging or I/O failures
    /// - [`CoreError::Corruption`] if publishing failed partway
    pub fn commit(&mut self) -> CoreResult<CommitSummary> {
        self.ensure_active()?;

        if self.read_only {
            self.state = TransactionState::Failed;
            return Err(CoreError::ReadOnlyViolation);
        }

        self.state = TransactionState::Committing;
        let pending = std::mem::take(&mut self.pending);

        match commit::run(self.store, pending) {
            Ok(summary) => {
                self.state = TransactionState::Committed;
                debug!(
                    written = summary.written,
                    dropped = summary.dropped,
                    "transaction committed"
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = TransactionState::Failed;
                debug!(error = %e, "transaction failed");
                Err(e)
            }
        }
    }

    /// Discards all buffered changes.
    ///
    /// # Errors
    ///
    /// Fails if the transaction is not active.
    pub fn rollback(&mut self) -> CoreResult<()> {
        self.ensure_active()?;
        self.pending.clear();
        self.state = TransactionState::RolledBack;
        Ok(())
    }

    fn ensure_active(&self) -> CoreResult<()> {
        match self.state {
            TransactionState::Active => Ok(()),
            state => Err(CoreError::inactive(state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn open() -> (TempDir, Store) {
        let temp = tempdir().unwrap();
        let store = Store::open(temp.path()).unwrap();
        (temp, store)
    }

    #[test]
    fn new_transaction_is_active() {
        let (_temp, store) = open();
        let txn = store.begin();
        assert!(txn.is_active());
        assert!(!txn.is_read_only());
        assert_eq!(txn.state(), TransactionState::Active);
    }

    #[test]
    fn get_sees_own_writes_and_drops() {
        let (_temp, store) = open();
        let mut txn = store.begin();

        txn.set("k", 1i64).unwrap();
        assert_eq!(txn.get("k").unwrap(), Some(Value::Integer(1)));

        txn.drop("k").unwrap();
        assert_eq!(txn.get("k").unwrap(), None);
        assert_eq!(txn.write_count(), 0);
        assert_eq!(txn.drop_count(), 1);
    }

    #[test]
    fn reads_are_stable_within_a_transaction() {
        let (_temp, store) = open();
        store.transaction(|txn| txn.set("k", "v1")).unwrap();

        let mut reader = store.begin();
        assert_eq!(reader.get("k").unwrap(), Some(Value::from("v1")));

        store.transaction(|txn| txn.set("k", "v2")).unwrap();

        // Same key: cached result
        assert_eq!(reader.get("k").unwrap(), Some(Value::from("v1")));
        // A fresh transaction sees the new version
        assert_eq!(store.begin().get("k").unwrap(), Some(Value::from("v2")));
    }

    #[test]
    fn absent_reads_are_stable_too() {
        let (_temp, store) = open();

        let mut reader = store.begin();
        assert_eq!(reader.get("k").unwrap(), None);

        store.transaction(|txn| txn.set("k", true)).unwrap();
        assert_eq!(reader.get("k").unwrap(), None);
    }

    #[test]
    fn commit_twice_fails() {
        let (_temp, store) = open();
        let mut txn = store.begin();
        txn.set("k", 1i64).unwrap();

        txn.commit().unwrap();
        assert_eq!(txn.state(), TransactionState::Committed);

        let err = txn.commit().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InactiveTransaction {
                state: TransactionState::Committed
            }
        ));
    }

    #[test]
    fn read_only_commit_rejected_then_inactive() {
        let (_temp, store) = open();
        let mut txn = store.begin_read_only();
        assert!(txn.is_read_only());
        txn.set("k", 1i64).unwrap();

        assert!(matches!(txn.commit(), Err(CoreError::ReadOnlyViolation)));
        assert!(matches!(
            txn.commit(),
            Err(CoreError::InactiveTransaction { .. })
        ));
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn rollback_discards_and_ends() {
        let (_temp, store) = open();
        let mut txn = store.begin();
        txn.set("k", 1i64).unwrap();
        txn.rollback().unwrap();

        assert_eq!(txn.state(), TransactionState::RolledBack);
        assert_eq!(txn.write_count(), 0);
        assert!(txn.rollback().is_err());
        assert!(txn.commit().is_err());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn everything_fails_after_end() {
        let (_temp, store) = open();
        let mut txn = store.begin();
        txn.commit().unwrap();

        assert!(txn.get("k").is_err());
        assert!(txn.set("k", 1i64).is_err());
        assert!(txn.drop("k").is_err());
        assert!(txn.create_random_key("p").is_err());
        assert!(txn.rollback().is_err());
    }

    #[test]
    fn random_keys_are_fresh() {
        let (_temp, store) = open();
        let mut txn = store.begin();

        let a = txn.create_random_key("prefix").unwrap();
        let b = txn.create_random_key("prefix").unwrap();

        assert_ne!(a.key(), b.key());
        assert!(a.key().starts_with("prefix"));
        assert!(b.key().starts_with("prefix"));
        assert_eq!(a.prefix(), "prefix");
        assert_eq!(txn.get(a.key()).unwrap(), None);
        assert_eq!(txn.get(b.key()).unwrap(), None);
    }

    #[test]
    fn failed_staging_leaves_storage_untouched() {
        let (_temp, store) = open();
        store.transaction(|txn| txn.set("keep", 1i64)).unwrap();

        let mut txn = store.begin();
        txn.set("a", 2i64).unwrap();
        txn.set("b", f64::NAN).unwrap();

        let err = txn.commit().unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert_eq!(txn.state(), TransactionState::Failed);

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("keep").unwrap(), Some(Value::Integer(1)));
        assert!(store.staging_orphans().unwrap().is_empty());
    }
}
