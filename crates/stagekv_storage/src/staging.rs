//! Staging directory allocation.
//!
//! Every commit attempt writes its new entry versions into a private
//! directory under the staging root before publishing them:
//!
//! ```text
//! <root>/transactions/
//! ├─ 0/            # commit attempt 0
//! ├─ 1/
//! └─ 4a/
//! ```
//!
//! Names come from a per-instance counter rendered in hex. A name that is
//! already taken (typically left behind by an earlier process) makes the
//! counter skip ahead by [`COLLISION_SKIP`], so a run of leftovers is passed
//! over in a few attempts instead of one name at a time.

use crate::error::{StorageError, StorageResult};
use crate::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// How far the counter jumps after a name collision.
pub const COLLISION_SKIP: u64 = 64;

/// Upper bound on names tried by a single [`StagingArea::allocate`] call.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 1024;

/// An exclusively owned staging directory for one commit attempt.
///
/// Returned by [`StagingArea::allocate`] and consumed by
/// [`StagingArea::release`].
#[derive(Debug)]
pub struct StagingDir {
    id: u64,
    path: PathBuf,
}

impl StagingDir {
    /// Returns the counter value this directory was named from.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Hands out fresh staging directories below a staging root.
///
/// # Thread Safety
///
/// `allocate` may be called concurrently. The counter is advanced with an
/// atomic `fetch_add` and the directory is created with an exclusive
/// `create_dir`, so two callers in one process never receive the same
/// directory. Nothing coordinates separate processes sharing a root beyond
/// the exclusive create.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    dir_mode: u32,
    next: AtomicU64,
}

impl StagingArea {
    /// Creates an allocator for `root`. The root itself is not created.
    pub fn new(root: impl Into<PathBuf>, dir_mode: u32) -> Self {
        Self {
            root: root.into(),
            dir_mode,
            next: AtomicU64::new(0),
        }
    }

    /// Returns the staging root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allocates a new, empty staging directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created for a reason
    /// other than a name collision, or [`StorageError::StagingExhausted`] if
    /// every attempted name was taken.
    pub fn allocate(&self) -> StorageResult<StagingDir> {
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let id = self.next.fetch_add(1, Ordering::SeqCst);
            let path = self.root.join(format!("{id:x}"));

            match fs::create_dir(&path, self.dir_mode) {
                Ok(()) => {
                    debug!(staging = %path.display(), "allocated staging directory");
                    return Ok(StagingDir { id, path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!(staging = %path.display(), "staging name taken, skipping ahead");
                    self.next.fetch_add(COLLISION_SKIP, Ordering::SeqCst);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StorageError::StagingExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
        })
    }

    /// Deletes a staging directory and everything in it.
    ///
    /// Best effort: failures are logged and otherwise ignored. Directories
    /// that survive are picked up by [`StagingArea::purge`].
    pub fn release(&self, dir: StagingDir) {
        match std::fs::remove_dir_all(&dir.path) {
            Ok(()) => debug!(staging = %dir.path.display(), "released staging directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                staging = %dir.path.display(),
                error = %e,
                "failed to remove staging directory"
            ),
        }
    }

    /// Lists the staging directories currently present on disk.
    ///
    /// Outside of an in-flight commit these are leftovers from failed
    /// cleanups or crashed processes.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the staging root cannot be read.
    pub fn orphans(&self) -> StorageResult<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    /// Removes every staging directory under the root.
    ///
    /// Only safe while no commit is in flight on this root, in this or any
    /// other process. Returns the number of directories removed.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error encountered.
    pub fn purge(&self) -> StorageResult<usize> {
        let orphans = self.orphans()?;
        for path in &orphans {
            std::fs::remove_dir_all(path)?;
        }
        if !orphans.is_empty() {
            debug!(count = orphans.len(), "purged staging directories");
        }
        Ok(orphans.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::DEFAULT_DIR_MODE;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn area(root: &Path) -> StagingArea {
        StagingArea::new(root.join("transactions"), DEFAULT_DIR_MODE)
    }

    #[test]
    fn allocate_creates_empty_hex_named_dirs() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());
        std::fs::create_dir(area.root()).unwrap();

        let first = area.allocate().unwrap();
        let second = area.allocate().unwrap();

        assert_eq!(first.path(), area.root().join("0"));
        assert_eq!(second.path(), area.root().join("1"));
        assert!(first.path().is_dir());
        assert_eq!(std::fs::read_dir(first.path()).unwrap().count(), 0);
    }

    #[test]
    fn collision_skips_ahead() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());
        std::fs::create_dir(area.root()).unwrap();
        std::fs::create_dir(area.root().join("0")).unwrap();

        let dir = area.allocate().unwrap();

        // 0 was taken; the counter moved to 1 and then skipped COLLISION_SKIP
        assert_eq!(dir.id(), 1 + COLLISION_SKIP);
        assert_eq!(dir.path(), area.root().join(format!("{:x}", 1 + COLLISION_SKIP)));
    }

    #[test]
    fn allocation_gives_up_when_every_name_is_taken() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());
        std::fs::create_dir(area.root()).unwrap();

        // Each collision advances the counter by 1 + COLLISION_SKIP.
        for k in 0..MAX_ALLOCATION_ATTEMPTS as u64 {
            std::fs::create_dir(area.root().join(format!("{:x}", k * (COLLISION_SKIP + 1)))).unwrap();
        }

        let err = area.allocate().unwrap_err();
        assert!(matches!(
            err,
            StorageError::StagingExhausted { attempts } if attempts == MAX_ALLOCATION_ATTEMPTS
        ));
        assert_eq!(std::fs::read_dir(area.root()).unwrap().count(), MAX_ALLOCATION_ATTEMPTS);
    }

    #[test]
    fn missing_root_is_io_error() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());

        let err = area.allocate().unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn release_removes_contents() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());
        std::fs::create_dir(area.root()).unwrap();

        let dir = area.allocate().unwrap();
        let path = dir.path().to_path_buf();
        std::fs::write(path.join("a.json"), b"1").unwrap();

        area.release(dir);
        assert!(!path.exists());
    }

    #[test]
    fn release_of_vanished_dir_is_silent() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());
        std::fs::create_dir(area.root()).unwrap();

        let dir = area.allocate().unwrap();
        std::fs::remove_dir(dir.path()).unwrap();
        area.release(dir);
    }

    #[test]
    fn concurrent_allocations_are_distinct() {
        let temp = tempdir().unwrap();
        let area = Arc::new(area(temp.path()));
        std::fs::create_dir(area.root()).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let area = Arc::clone(&area);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| area.allocate().unwrap().path().to_path_buf())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for path in handle.join().unwrap() {
                assert!(seen.insert(path), "directory handed out twice");
            }
        }
        assert_eq!(seen.len(), 200);
    }

    #[test]
    fn orphans_and_purge() {
        let temp = tempdir().unwrap();
        let area = area(temp.path());

        // No root yet
        assert!(area.orphans().unwrap().is_empty());
        assert_eq!(area.purge().unwrap(), 0);

        std::fs::create_dir(area.root()).unwrap();
        let a = area.allocate().unwrap();
        let _b = area.allocate().unwrap();
        std::fs::write(a.path().join("x.json"), b"1").unwrap();

        assert_eq!(area.orphans().unwrap().len(), 2);
        assert_eq!(area.purge().unwrap(), 2);
        assert!(area.orphans().unwrap().is_empty());
    }
}
