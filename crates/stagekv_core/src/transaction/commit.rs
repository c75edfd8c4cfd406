//! The staged commit protocol.
//!
//! A commit runs in two phases:
//!
//! 1. **Stage**: every buffered write is serialized into a fresh staging
//!    directory. Nothing in storage changes, so any failure here (or in the
//!    duplicate-target validation that follows) aborts the commit cleanly.
//! 2. **Publish**: staged files are renamed into storage one by one, then
//!    dropped keys are unlinked. Each step is atomic on its own; a failure
//!    after the first step leaves storage partially committed and is
//!    reported as corruption.
//!
//! Commits without writes skip the staging phase entirely.

use crate::corruption::CorruptionReport;
use crate::error::{CoreError, CoreResult};
use crate::store::Store;
use crate::transaction::state::Pending;
use stagekv_codec::{encode_key, Value};
use stagekv_storage::{EntryStore, StagedEntry, StagingDir};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Number of entries published.
    pub written: usize,
    /// Number of keys dropped.
    pub dropped: usize,
    /// Number of dropped keys that had a published entry.
    pub removed: usize,
}

/// Runs both commit phases for `pending` against `store`.
pub(crate) fn run(store: &Store, pending: Pending) -> CoreResult<CommitSummary> {
    if pending.is_empty() {
        debug!("empty commit");
        return Ok(CommitSummary::default());
    }

    let (writes, drops) = pending.into_changes();

    if writes.is_empty() {
        validate_targets(&[], &drops)?;
        let removed = publish(store, &[], &drops)?;
        finish(store, removed > 0);
        return Ok(CommitSummary {
            written: 0,
            dropped: drops.len(),
            removed,
        });
    }

    store.dir.ensure_staging()?;
    let staging = store.staging.allocate()?;
    debug!(
        staging = %staging.path().display(),
        writes = writes.len(),
        drops = drops.len(),
        "staging commit"
    );

    let prepared = stage_all(&store.entries, &staging, &writes)
        .and_then(|staged| validate_targets(&staged, &drops).map(|()| staged))
        .and_then(|staged| store.dir.ensure_storage().map(|()| staged));

    let staged = match prepared {
        Ok(staged) => staged,
        Err(e) => {
            store.staging.release(staging);
            return Err(e);
        }
    };

    let published = publish(store, &staged, &drops);
    store.staging.release(staging);
    let removed = published?;

    finish(store, true);
    Ok(CommitSummary {
        written: staged.len(),
        dropped: drops.len(),
        removed,
    })
}

/// Writes every buffered value into the staging directory.
fn stage_all(
    entries: &EntryStore,
    staging: &StagingDir,
    writes: &BTreeMap<String, Value>,
) -> CoreResult<Vec<StagedEntry>> {
    writes
        .iter()
        .map(|(key, value)| entries.stage(staging, key, value).map_err(CoreError::from))
        .collect()
}

/// Checks that no two operations of a commit target the same entry file.
///
/// Writes and drops are disjoint by key, so a clash needs two keys sharing
/// a digest name (a SHA-256 collision).
pub(crate) fn validate_targets(staged: &[StagedEntry], drops: &BTreeSet<String>) -> CoreResult<()> {
    let mut targets = HashSet::with_capacity(staged.len() + drops.len());

    for entry in staged {
        if !targets.insert(entry.name().to_string()) {
            return Err(CoreError::duplicate_key(entry.key()));
        }
    }
    for key in drops {
        if !targets.insert(encode_key(key)) {
            return Err(CoreError::duplicate_key(key.as_str()));
        }
    }
    Ok(())
}

/// Publishes staged entries, then removes dropped keys.
///
/// Returns the number of dropped keys that had a published entry.
fn publish(store: &Store, staged: &[StagedEntry], drops: &BTreeSet<String>) -> CoreResult<usize> {
    let keys = |entries: &[StagedEntry]| -> Vec<String> {
        entries.iter().map(|e| e.key().to_string()).collect()
    };

    for (i, entry) in staged.iter().enumerate() {
        if let Err(e) = store.entries.publish(entry) {
            if i == 0 {
                // Nothing applied yet; storage is unchanged.
                return Err(e.into());
            }
            return Err(corrupted(
                store,
                CorruptionReport {
                    published: keys(&staged[..i]),
                    unpublished: keys(&staged[i..]),
                    removed: Vec::new(),
                    unremoved: drops.iter().cloned().collect(),
                    failed_key: entry.key().to_string(),
                    error: e.to_string(),
                },
            ));
        }
    }

    let mut removed = 0;
    for (i, key) in drops.iter().enumerate() {
        match store.entries.remove(key) {
            Ok(existed) => removed += usize::from(existed),
            Err(e) if staged.is_empty() && i == 0 => return Err(e.into()),
            Err(e) => {
                return Err(corrupted(
                    store,
                    CorruptionReport {
                        published: keys(staged),
                        unpublished: Vec::new(),
                        removed: drops.iter().take(i).cloned().collect(),
                        unremoved: drops.iter().skip(i).cloned().collect(),
                        failed_key: key.clone(),
                        error: e.to_string(),
                    },
                ));
            }
        }
    }

    Ok(removed)
}

/// Escalates a partial publish to the store-wide handler.
fn corrupted(store: &Store, report: CorruptionReport) -> CoreError {
    (store.on_corruption)(&report);
    CoreError::Corruption(Box::new(report))
}

/// Makes published renames durable if configured.
///
/// Every change is already visible at this point, so a failed directory sync
/// is logged rather than failing the commit.
fn finish(store: &Store, changed: bool) {
    if changed && store.config.sync_on_commit {
        if let Err(e) = store.entries.sync_dir() {
            warn!(error = %e, "failed to sync storage directory after commit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagekv_storage::{StagingArea, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
    use tempfile::tempdir;

    #[test]
    fn distinct_targets_pass() {
        let temp = tempdir().unwrap();
        let entries = EntryStore::new(temp.path().join("storage"), DEFAULT_FILE_MODE, false);
        let staging = StagingArea::new(temp.path(), DEFAULT_DIR_MODE);
        let dir = staging.allocate().unwrap();

        let staged = vec![entries.stage(&dir, "a", &Value::Null).unwrap()];
        let drops: BTreeSet<String> = ["b".to_string()].into();

        assert!(validate_targets(&staged, &drops).is_ok());
    }

    #[test]
    fn write_and_drop_of_same_key_is_duplicate() {
        let temp = tempdir().unwrap();
        let entries = EntryStore::new(temp.path().join("storage"), DEFAULT_FILE_MODE, false);
        let staging = StagingArea::new(temp.path(), DEFAULT_DIR_MODE);
        let dir = staging.allocate().unwrap();

        let staged = vec![entries.stage(&dir, "a", &Value::Null).unwrap()];
        let drops: BTreeSet<String> = ["a".to_string()].into();

        let err = validate_targets(&staged, &drops).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { key } if key == "a"));
    }

    #[test]
    fn same_key_staged_twice_is_duplicate() {
        let temp = tempdir().unwrap();
        let entries = EntryStore::new(temp.path().join("storage"), DEFAULT_FILE_MODE, false);
        let staging = StagingArea::new(temp.path(), DEFAULT_DIR_MODE);
        let dir = staging.allocate().unwrap();

        let staged = vec![
            entries.stage(&dir, "a", &Value::Integer(1)).unwrap(),
            entries.stage(&dir, "a", &Value::Integer(2)).unwrap(),
        ];

        let err = validate_targets(&staged, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { .. }));
    }
}
