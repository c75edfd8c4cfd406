//! # StageKV Core
//!
//! A transactional key-value store kept as one JSON document per key.
//!
//! This crate provides:
//! - [`Store`], the handle to a store root directory
//! - [`Transaction`], buffered reads and writes with a staged commit
//! - [`Config`], open-time settings
//! - Corruption reporting for commits that fail partway through publishing
//!
//! ## Example
//!
//! ```no_run
//! use stagekv_core::{Store, Value};
//!
//! let store = Store::open("data")?;
//!
//! let mut txn = store.begin();
//! let key = txn.create_random_key("note/")?;
//! txn.set(key.key(), Value::map([("value", Value::from("hello world!"))]))?;
//! txn.commit()?;
//!
//! assert!(store.get(key.key())?.is_some());
//! # Ok::<(), stagekv_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod corruption;
mod dir;
mod error;
mod store;
mod transaction;

pub use config::Config;
pub use corruption::{CorruptionHandler, CorruptionReport};
pub use dir::StoreDir;
pub use error::{CoreError, CoreResult};
pub use store::Store;
pub use transaction::{
    CommitSummary, RandomKey, Transaction, TransactionState, MAX_RANDOM_KEY_ATTEMPTS,
    RANDOM_SUFFIX_BYTES,
};

pub use stagekv_codec::{DecodedName, Value};
pub use stagekv_storage::StoredName;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
