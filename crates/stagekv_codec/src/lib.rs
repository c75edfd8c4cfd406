//! # StageKV Codec
//!
//! Value model, document encoding and key encoding for StageKV.
//!
//! This crate knows nothing about files or transactions. It provides:
//! - [`Value`], the tagged-variant model of an entry
//! - [`to_document`] / [`from_document`], the JSON document format
//! - [`encode_key`] / [`decode_file_name`], the mapping from opaque keys to
//!   flat, bounded file names
//!
//! ## Usage
//!
//! ```
//! use stagekv_codec::{encode_key, from_document, to_document, Value};
//!
//! let value = Value::map([("value", Value::from("hello world!"))]);
//! let bytes = to_document(&value).unwrap();
//! assert_eq!(from_document(&bytes).unwrap(), value);
//!
//! assert_eq!(encode_key("key"), "a2V5.json");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod document;
mod error;
mod key;
mod value;

pub use document::{from_document, from_json, to_document, to_json, DOCUMENT_SUFFIX};
pub use error::{CodecError, CodecResult};
pub use key::{
    decode_file_name, encode_key, is_entry_file_name, DecodedName, DIGEST_NAME_PREFIX_LEN,
    MAX_PLAIN_NAME_LEN,
};
pub use value::Value;
