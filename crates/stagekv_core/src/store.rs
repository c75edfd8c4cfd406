//! Store facade.

use crate::config::Config;
use crate::corruption::{log_corruption, CorruptionHandler, CorruptionReport};
use crate::dir::StoreDir;
use crate::error::CoreResult;
use crate::transaction::Transaction;
use stagekv_codec::{DecodedName, Value};
use stagekv_storage::{EntryStore, StagingArea, StoredName};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// The main store handle.
///
/// `Store` maps string keys to [`Value`]s, one JSON document per key under
/// `<root>/storage/`. All changes go through a [`Transaction`], whose commit
/// stages new documents under `<root>/transactions/` and renames them into
/// place.
///
/// `Store` is `Send + Sync`; transactions borrow it and may run on
/// different threads at the same time. There is no locking between
/// transactions: concurrent writers to one key race, and the last publish
/// wins.
///
/// # Example
///
/// ```no_run
/// use stagekv_core::{Store, Value};
///
/// let store = Store::open("my_store")?;
///
/// store.transaction(|txn| {
///     txn.set("greeting", Value::map([("value", Value::from("hello"))]))
/// })?;
///
/// assert!(store.get("greeting")?.is_some());
/// # Ok::<(), stagekv_core::CoreError>(())
/// ```
pub struct Store {
    /// Configuration.
    pub(crate) config: Config,
    /// Root directory layout.
    pub(crate) dir: StoreDir,
    /// Published entries.
    pub(crate) entries: EntryStore,
    /// Staging directories for commits.
    pub(crate) staging: StagingArea,
    /// Called when a commit leaves storage partially applied.
    pub(crate) on_corruption: CorruptionHandler,
}

impl Store {
    /// Opens a store rooted at `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` exists but is not a directory.
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a store rooted at `path`.
    ///
    /// Nothing is created on disk here; the root and its subdirectories
    /// appear with the first commit that needs them.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use stagekv_core::{Config, Store};
    ///
    /// let config = Config::default()
    ///     .create_if_missing(false)
    ///     .sync_on_commit(false);
    ///
    /// let store = Store::open_with_config("my_store", config)?;
    /// # Ok::<(), stagekv_core::CoreError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` exists but is not a directory
    /// - `path` does not exist and `create_if_missing` is false
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let dir = StoreDir::open(path.as_ref(), config.create_if_missing, config.dir_mode)?;
        let entries = EntryStore::new(dir.storage_path(), config.file_mode, config.sync_on_commit);
        let staging = StagingArea::new(dir.staging_path(), config.dir_mode);

        info!(path = %dir.path().display(), "opened store");

        Ok(Self {
            config,
            dir,
            entries,
            staging,
            on_corruption: log_corruption(),
        })
    }

    /// Replaces the corruption handler.
    ///
    /// The handler runs once for every commit whose publish phase fails
    /// after applying some of its changes, in addition to the
    /// [`CoreError::Corruption`](crate::CoreError::Corruption) returned by
    /// that commit. The default handler logs the report at error level.
    #[must_use]
    pub fn with_corruption_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CorruptionReport) + Send + Sync + 'static,
    {
        self.on_corruption = Arc::new(handler);
        self
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Begins a read-write transaction.
    #[must_use]
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self, false)
    }

    /// Begins a transaction that can read and buffer changes but never
    /// commit them.
    #[must_use]
    pub fn begin_read_only(&self) -> Transaction<'_> {
        Transaction::new(self, true)
    }

    /// Executes a function within a transaction.
    ///
    /// If the function returns `Ok`, the transaction is committed and the
    /// function's value returned. If it returns `Err`, the transaction is
    /// rolled back and that error returned.
    ///
    /// # Errors
    ///
    /// Returns the function's error or the commit's error.
    pub fn transaction<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        let mut txn = self.begin();
        match f(&mut txn) {
            Ok(result) => {
                txn.commit()?;
                Ok(result)
            }
            Err(e) => {
                if txn.is_active() {
                    // The closure's error wins over a rollback failure.
                    let _ = txn.rollback();
                }
                Err(e)
            }
        }
    }

    /// Reads the published value of `key` outside any transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be read or parsed.
    pub fn get(&self, key: &str) -> CoreResult<Option<Value>> {
        Ok(self.entries.read(key)?)
    }

    /// Lists the files in the storage directory with their decoded names.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be read.
    pub fn list(&self) -> CoreResult<Vec<StoredName>> {
        Ok(self.entries.list()?)
    }

    /// Lists the published keys that can be recovered from file names.
    ///
    /// Keys stored under a digest name cannot be decoded and are left out.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be read.
    pub fn keys(&self) -> CoreResult<Vec<String>> {
        let mut keys: Vec<String> = self
            .entries
            .list()?
            .into_iter()
            .filter_map(|name| match name.decoded {
                DecodedName::Key(key) => Some(key),
                DecodedName::Digest { .. } => None,
            })
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Lists staging directories left behind by failed cleanups.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging root cannot be read.
    pub fn staging_orphans(&self) -> CoreResult<Vec<PathBuf>> {
        Ok(self.staging.orphans()?)
    }

    /// Removes every staging directory.
    ///
    /// Must not run while a commit is in flight against this root, from this
    /// or any other process. Returns the number of directories removed.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error encountered.
    pub fn purge_staging(&self) -> CoreResult<usize> {
        let removed = self.staging.purge()?;
        debug!(removed, "purged staging area");
        Ok(removed)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.dir.path())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
