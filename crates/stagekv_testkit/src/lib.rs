//! # StageKV Testkit
//!
//! Test utilities for StageKV.
//!
//! This crate provides:
//! - Temporary stores that clean up after themselves
//! - Property-based test generators using proptest
//! - A model-checking harness for cross-crate integration tests
//! - Fault injection against a store root
//! - Stress helpers for concurrent transactions
//! - Encoding vectors for the key and document formats
//!
//! ## Usage
//!
//! ```
//! use stagekv_testkit::prelude::*;
//!
//! with_temp_store(|store| {
//!     store.transaction(|txn| txn.set("k", 1i64)).unwrap();
//!     assert!(store.get("k").unwrap().is_some());
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
pub use vectors::*;
