//! Random key allocation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use std::fmt;

/// Number of random bytes in a key suffix (128 bits).
pub const RANDOM_SUFFIX_BYTES: usize = 16;

/// Upper bound on candidates tried by one `create_random_key` call.
pub const MAX_RANDOM_KEY_ATTEMPTS: usize = 8;

/// A freshly allocated key and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomKey {
    key: String,
    prefix_len: usize,
}

impl RandomKey {
    /// Builds a candidate key from `prefix` and a new random suffix.
    pub(crate) fn generate(prefix: &str) -> Self {
        let mut bytes = [0u8; RANDOM_SUFFIX_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let mut key = String::with_capacity(prefix.len() + 22);
        key.push_str(prefix);
        URL_SAFE_NO_PAD.encode_string(bytes, &mut key);

        Self {
            key,
            prefix_len: prefix.len(),
        }
    }

    /// Returns the full key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the caller-supplied prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.key[..self.prefix_len]
    }

    /// Returns the random suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.key[self.prefix_len..]
    }

    /// Consumes the value, returning the full key.
    #[must_use]
    pub fn into_key(self) -> String {
        self.key
    }
}

impl fmt::Display for RandomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl From<RandomKey> for String {
    fn from(key: RandomKey) -> Self {
        key.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_compose_the_key() {
        let key = RandomKey::generate("user/");
        assert_eq!(key.prefix(), "user/");
        assert_eq!(key.suffix().len(), 22);
        assert_eq!(key.key(), format!("{}{}", key.prefix(), key.suffix()));
        assert_eq!(key.to_string(), key.key());
    }

    #[test]
    fn suffix_is_url_safe() {
        let key = RandomKey::generate("");
        assert!(key
            .suffix()
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn generated_keys_differ() {
        let a = RandomKey::generate("p");
        let b = RandomKey::generate("p");
        assert_ne!(a, b);
    }

    #[test]
    fn multibyte_prefix() {
        let key = RandomKey::generate("clé:");
        assert_eq!(key.prefix(), "clé:");
        assert_eq!(String::from(key.clone()), key.into_key());
    }
}
