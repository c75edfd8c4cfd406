//! Entry files: point reads, staging, atomic publish and removal.

use crate::error::{StorageError, StorageResult};
use crate::fs;
use crate::staging::StagingDir;
use stagekv_codec::{decode_file_name, encode_key, from_document, to_document, DecodedName, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An entry version written to a staging directory, ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    key: String,
    name: String,
    path: PathBuf,
}

impl StagedEntry {
    /// Returns the key this entry was staged for.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the encoded file name, which is also the publish target name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the staged file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A file found in the storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredName {
    /// The file name on disk.
    pub file_name: String,
    /// What the name decodes to.
    pub decoded: DecodedName,
}

/// Reads and writes entry files in a storage directory.
///
/// The storage directory holds exactly one file per live key, named by
/// [`encode_key`]. New versions never get written there directly: they are
/// [staged](EntryStore::stage) elsewhere and [published](EntryStore::publish)
/// with a rename, so readers only ever observe complete documents.
///
/// # Example
///
/// ```no_run
/// use stagekv_codec::Value;
/// use stagekv_storage::{EntryStore, StagingArea, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
///
/// let entries = EntryStore::new("db/storage", DEFAULT_FILE_MODE, true);
/// let staging = StagingArea::new("db/transactions", DEFAULT_DIR_MODE);
///
/// let dir = staging.allocate().unwrap();
/// let staged = entries.stage(&dir, "greeting", &Value::from("hi")).unwrap();
/// entries.publish(&staged).unwrap();
/// staging.release(dir);
///
/// assert_eq!(entries.read("greeting").unwrap(), Some(Value::from("hi")));
/// ```
#[derive(Debug, Clone)]
pub struct EntryStore {
    dir: PathBuf,
    file_mode: u32,
    sync: bool,
}

impl EntryStore {
    /// Creates an entry store over `dir`.
    ///
    /// With `sync` set, staged files are fsynced before they can be
    /// published.
    pub fn new(dir: impl Into<PathBuf>, file_mode: u32, sync: bool) -> Self {
        Self {
            dir: dir.into(),
            file_mode,
            sync,
        }
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the storage path of `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(encode_key(key))
    }

    /// Reads the published entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Parse`] if the file holds an unreadable
    /// document and [`StorageError::Io`] for any failure other than the file
    /// being absent.
    pub fn read(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        from_document(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Parse { path, source })
    }

    /// Serializes `value` into the staging directory under `key`'s name.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded or the file cannot be
    /// written.
    pub fn stage(&self, staging: &StagingDir, key: &str, value: &Value) -> StorageResult<StagedEntry> {
        let bytes = to_document(value).map_err(StorageError::Encode)?;
        let name = encode_key(key);
        let path = staging.path().join(&name);

        let mut file = fs::create_file(&path, self.file_mode)?;
        file.write_all(&bytes)?;
        if self.sync {
            file.sync_all()?;
        }

        Ok(StagedEntry {
            key: key.to_string(),
            name,
            path,
        })
    }

    /// Moves a staged entry into the storage directory.
    ///
    /// The rename replaces any previous version in one atomic step; this is
    /// the point at which the new version becomes visible.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the rename fails.
    pub fn publish(&self, staged: &StagedEntry) -> StorageResult<()> {
        std::fs::rename(&staged.path, self.dir.join(&staged.name))?;
        Ok(())
    }

    /// Deletes the published entry for `key`.
    ///
    /// Returns whether a file was removed; a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be removed.
    pub fn remove(&self, key: &str) -> StorageResult<bool> {
        Ok(fs::remove_file_if_exists(&self.path_for(key))?)
    }

    /// Syncs the storage directory so published renames are durable.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be synced.
    pub fn sync_dir(&self) -> StorageResult<()> {
        Ok(fs::sync_dir(&self.dir)?)
    }

    /// Lists entry files in the storage directory, sorted by file name.
    ///
    /// Files whose names are not entry names are skipped. A storage
    /// directory that does not exist yet lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn list(&self) -> StorageResult<Vec<StoredName>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if let Ok(decoded) = decode_file_name(&file_name) {
                names.push(StoredName { file_name, decoded });
            }
        }
        names.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(names)
    }
}
