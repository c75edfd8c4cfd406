//! Transactions over the entry store.
//!
//! A [`Transaction`] buffers writes and drops in memory and publishes them
//! on commit through a staging directory:
//!
//! - **Atomic per entry**: each new version replaces the old one with a
//!   single rename, so readers never see a partial document
//! - **Clean failure before publish**: errors while staging leave storage
//!   untouched
//! - **Surfaced partial commits**: a failure midway through publishing is
//!   reported as corruption to both the caller and the store's handler
//!
//! There is no isolation between transactions beyond per-key read caching;
//! concurrent writers to one key race and the last publish wins.

mod commit;
mod random;
mod state;
mod txn;

pub use commit::CommitSummary;
pub use random::{RandomKey, MAX_RANDOM_KEY_ATTEMPTS, RANDOM_SUFFIX_BYTES};
pub use state::TransactionState;
pub use txn::Transaction;
