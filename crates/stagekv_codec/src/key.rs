//! Key to file-name encoding.
//!
//! Keys are opaque strings; file names must be flat, portable and bounded
//! in length. A key is mapped to a name as follows:
//!
//! 1. The key's UTF-8 bytes are base64 encoded with the standard alphabet
//!    (padded).
//! 2. Every `/` is replaced with `_` so the name never contains a path
//!    separator. `_` is not part of the standard alphabet, so the mapping
//!    stays injective.
//! 3. [`DOCUMENT_SUFFIX`] is appended.
//!
//! Names longer than [`MAX_PLAIN_NAME_LEN`] would exceed common file system
//! limits (255 bytes per component). For those keys the name keeps the first
//! [`DIGEST_NAME_PREFIX_LEN`] encoded characters for readability and appends
//! `-` plus the hex SHA-256 digest of the full key. `-` never occurs in a
//! plain name, so plain and digest names cannot collide.

use crate::document::DOCUMENT_SUFFIX;
use crate::error::{CodecError, CodecResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Longest file name produced without falling back to a digest name.
pub const MAX_PLAIN_NAME_LEN: usize = 240;

/// Number of encoded characters kept in front of the digest in long names.
pub const DIGEST_NAME_PREFIX_LEN: usize = 160;

const DIGEST_SEPARATOR: char = '-';
const DIGEST_HEX_LEN: usize = 64;

/// Result of decoding an entry file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedName {
    /// The name encodes this key exactly.
    Key(String),
    /// The name was shortened with a digest; the key cannot be recovered.
    Digest {
        /// Hex SHA-256 digest of the original key.
        digest: String,
    },
}

impl DecodedName {
    /// Returns the decoded key, if the name is reversible.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            DecodedName::Key(key) => Some(key),
            DecodedName::Digest { .. } => None,
        }
    }
}

/// Encodes a key as a flat entry file name.
#[must_use]
pub fn encode_key(key: &str) -> String {
    let encoded = STANDARD.encode(key.as_bytes()).replace('/', "_");

    if encoded.len() + DOCUMENT_SUFFIX.len() <= MAX_PLAIN_NAME_LEN {
        return encoded + DOCUMENT_SUFFIX;
    }

    let digest = Sha256::digest(key.as_bytes());
    let mut name = String::with_capacity(
        DIGEST_NAME_PREFIX_LEN + 1 + DIGEST_HEX_LEN + DOCUMENT_SUFFIX.len(),
    );
    // base64 output is ASCII, so slicing by byte index is safe
    name.push_str(&encoded[..DIGEST_NAME_PREFIX_LEN]);
    name.push(DIGEST_SEPARATOR);
    for byte in digest {
        let _ = write!(name, "{byte:02x}");
    }
    name.push_str(DOCUMENT_SUFFIX);
    name
}

/// Decodes an entry file name produced by [`encode_key`].
///
/// # Errors
///
/// Returns [`CodecError::InvalidFileName`] if the name does not carry the
/// document suffix, is not valid base64, or does not decode to UTF-8.
pub fn decode_file_name(name: &str) -> CodecResult<DecodedName> {
    let stem = name
        .strip_suffix(DOCUMENT_SUFFIX)
        .ok_or_else(|| CodecError::invalid_file_name(name))?;

    if let Some((_, digest)) = stem.rsplit_once(DIGEST_SEPARATOR) {
        if digest.len() == DIGEST_HEX_LEN && digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(DecodedName::Digest {
                digest: digest.to_string(),
            });
        }
        return Err(CodecError::invalid_file_name(name));
    }

    let bytes = STANDARD
        .decode(stem.replace('_', "/"))
        .map_err(|_| CodecError::invalid_file_name(name))?;
    let key = String::from_utf8(bytes).map_err(|_| CodecError::invalid_file_name(name))?;
    Ok(DecodedName::Key(key))
}

/// Returns true if `name` looks like an entry file name.
#[must_use]
pub fn is_entry_file_name(name: &str) -> bool {
    decode_file_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_names() {
        assert_eq!(encode_key("key"), "a2V5.json");
        assert_eq!(encode_key(""), ".json");
        // "???" encodes to "Pz8_" with the separator substituted
        assert_eq!(encode_key("???"), "Pz8_.json");
    }

    #[test]
    fn name_never_contains_separator() {
        let name = encode_key("___weird:/\\?&=___");
        assert!(!name.contains('/'));
        assert!(!name.contains('\\'));
        assert!(name.ends_with(DOCUMENT_SUFFIX));
    }

    #[test]
    fn plain_name_decodes() {
        let key = "___weird:/\\?&=___";
        let decoded = decode_file_name(&encode_key(key)).unwrap();
        assert_eq!(decoded, DecodedName::Key(key.to_string()));
        assert_eq!(decoded.key(), Some(key));
    }

    #[test]
    fn long_key_gets_bounded_digest_name() {
        let key = "a fragment of text :/ ".repeat(500);
        let name = encode_key(&key);

        assert!(name.len() <= MAX_PLAIN_NAME_LEN);
        assert!(name.contains(DIGEST_SEPARATOR));
        assert!(matches!(
            decode_file_name(&name).unwrap(),
            DecodedName::Digest { .. }
        ));
    }

    #[test]
    fn long_keys_differing_in_last_fragment_differ() {
        let base = "a fragment of text :/ ".repeat(499);
        let a = format!("{base}final fragment number 1");
        let b = format!("{base}final fragment number 2");

        assert_ne!(encode_key(&a), encode_key(&b));
    }

    #[test]
    fn names_at_the_plain_limit() {
        // 174 bytes encode to 232 base64 chars, 237 with the suffix
        let longest_plain = "x".repeat(174);
        let name = encode_key(&longest_plain);
        assert_eq!(name.len(), 237);
        assert!(!name.contains(DIGEST_SEPARATOR));

        // 175 bytes would need 241
        let first_digest = "x".repeat(175);
        assert!(encode_key(&first_digest).contains(DIGEST_SEPARATOR));
    }

    #[test]
    fn invalid_names_rejected() {
        assert!(decode_file_name("a2V5").is_err());
        assert!(decode_file_name("not base64!.json").is_err());
        assert!(decode_file_name("abc-123.json").is_err());
        assert!(!is_entry_file_name("0001"));
        assert!(is_entry_file_name("a2V5.json"));
    }

    proptest! {
        #[test]
        fn distinct_keys_get_distinct_names(a in ".{0,300}", b in ".{0,300}") {
            prop_assume!(a != b);
            prop_assert_ne!(encode_key(&a), encode_key(&b));
        }

        #[test]
        fn short_keys_decode_exactly(key in ".{0,100}") {
            let name = encode_key(&key);
            if !name.contains(DIGEST_SEPARATOR) {
                prop_assert_eq!(decode_file_name(&name).unwrap(), DecodedName::Key(key));
            }
        }

        #[test]
        fn names_fit_in_one_component(key in ".{0,2000}") {
            let name = encode_key(&key);
            prop_assert!(name.len() <= MAX_PLAIN_NAME_LEN);
            prop_assert!(!name.contains('/'));
        }
    }
}
