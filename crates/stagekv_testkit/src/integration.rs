//! Cross-crate integration test helpers.
//!
//! Provides a harness that mirrors every committed change in an in-memory
//! model, and reusable checks exercising codec, storage and core together.

use crate::fixtures::TestStore;
use crate::generators::Operation;
use stagekv_codec::{encode_key, from_document};
use stagekv_core::{CoreError, CoreResult, Store, Value};
use std::collections::BTreeMap;

/// A test harness for integration testing.
pub struct IntegrationHarness {
    /// The store under test.
    pub store: TestStore,
    /// Expected published state.
    model: BTreeMap<String, Value>,
}

impl IntegrationHarness {
    /// Creates a harness over a fresh temporary store.
    pub fn new() -> Self {
        Self {
            store: TestStore::new(),
            model: BTreeMap::new(),
        }
    }

    /// Sets a key in its own transaction and tracks it.
    pub fn set(&mut self, key: &str, value: Value) {
        self.store
            .transaction(|txn| txn.set(key, value.clone()))
            .expect("Failed to set key");
        self.model.insert(key.to_string(), value);
    }

    /// Drops a key in its own transaction and updates tracking.
    pub fn drop(&mut self, key: &str) {
        self.store
            .transaction(|txn| txn.drop(key))
            .expect("Failed to drop key");
        self.model.remove(key);
    }

    /// Runs `ops` in one transaction and commits.
    ///
    /// Reads are checked against what the transaction should observe: its
    /// own buffered changes on top of the model.
    pub fn apply(&mut self, ops: &[Operation]) {
        let mut view = self.model.clone();

        self.store
            .transaction(|txn| {
                for op in ops {
                    match op {
                        Operation::Set { key, value } => {
                            txn.set(key, value.clone())?;
                            view.insert(key.clone(), value.clone());
                        }
                        Operation::Drop { key } => {
                            txn.drop(key)?;
                            view.remove(key);
                        }
                        Operation::Get { key } => {
                            let actual = txn.get(key)?;
                            assert_eq!(actual.as_ref(), view.get(key), "read mismatch for {key:?}");
                        }
                    }
                }
                Ok(())
            })
            .expect("Failed to apply operations");

        self.model = view;
    }

    /// Verifies the store holds exactly the tracked entries.
    pub fn verify_all(&self) {
        for (key, expected) in &self.model {
            let actual = self.store.get(key).expect("Failed to get key");
            assert_eq!(actual.as_ref(), Some(expected), "value mismatch for {key:?}");
        }

        let tracked: Vec<&String> = self.model.keys().collect();
        let stored = self.store.list().expect("Failed to list store");
        assert_eq!(
            stored.len(),
            tracked.len(),
            "store holds {} entries, expected {tracked:?}",
            stored.len()
        );
    }

    /// Returns the count of tracked entries.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Test codec/storage integration.
pub mod codec_storage {
    use super::*;

    /// Verifies that a committed value lands in its encoded file as a
    /// document that decodes back to the value.
    pub fn check_document_on_disk(store: &Store, key: &str, value: Value) {
        store
            .transaction(|txn| txn.set(key, value.clone()))
            .expect("Failed to set");

        let path = store.root().join("storage").join(encode_key(key));
        let bytes = std::fs::read(&path).expect("Failed to read entry file");
        assert_eq!(from_document(&bytes).expect("Failed to decode"), value);
        assert_eq!(store.get(key).expect("Failed to get"), Some(value));
    }
}

/// Test transaction integration.
pub mod transaction {
    use super::*;

    /// Checks that a transaction keeps returning what it first read for a
    /// key, while new transactions see later commits.
    pub fn check_read_caching(store: &Store) {
        store
            .transaction(|txn| txn.set("cached", "version1"))
            .expect("Failed to put initial data");

        let mut reader = store.begin_read_only();
        let first = reader.get("cached").expect("Failed to get");
        assert_eq!(first, Some(Value::from("version1")));

        store
            .transaction(|txn| txn.set("cached", "version2"))
            .expect("Failed to update");

        assert_eq!(reader.get("cached").expect("Failed to get"), first);
        assert_eq!(
            store.get("cached").expect("Failed to get"),
            Some(Value::from("version2"))
        );
        reader.rollback().expect("Failed to roll back");
    }

    /// Checks that a closure error rolls the transaction back.
    pub fn check_closure_abort(store: &Store) {
        store
            .transaction(|txn| txn.set("abort", "original"))
            .expect("Failed to put initial data");

        let result: CoreResult<()> = store.transaction(|txn| {
            txn.set("abort", "modified")?;
            Err(CoreError::invalid_operation("Simulated abort"))
        });
        assert!(result.is_err());

        assert_eq!(
            store.get("abort").expect("Failed to get"),
            Some(Value::from("original"))
        );
    }
}
