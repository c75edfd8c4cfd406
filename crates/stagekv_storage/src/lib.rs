//! # StageKV Storage
//!
//! File-level building blocks for StageKV's commit protocol.
//!
//! This crate owns every direct file system interaction of the store but
//! knows nothing about transactions:
//!
//! - [`EntryStore`] - point reads of published entries, staging of new
//!   versions, atomic publish via rename, and removal
//! - [`StagingArea`] - allocation and release of per-commit staging
//!   directories
//!
//! ## Design Principles
//!
//! - A published entry file is only ever replaced by a rename, never
//!   rewritten in place
//! - A missing entry is a normal result, not an error
//! - Staging cleanup is best effort; leftovers can be listed and purged
//!   out of band

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod error;
mod fs;
mod staging;

pub use entry::{EntryStore, StagedEntry, StoredName};
pub use error::{StorageError, StorageResult};
pub use fs::{create_dir_all, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
pub use staging::{StagingArea, StagingDir, COLLISION_SKIP, MAX_ALLOCATION_ATTEMPTS};
