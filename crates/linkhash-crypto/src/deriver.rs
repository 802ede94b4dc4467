use linkhash_types::ShortKey;

/// Key length used when none is configured (hex characters).
pub const DEFAULT_KEY_LENGTH: usize = 7;
/// Shortest accepted key length.
pub const MIN_KEY_LENGTH: usize = 4;
/// Longest accepted key length: the full 256-bit digest.
pub const MAX_KEY_LENGTH: usize = 64;

/// Derivation of a candidate key from a link.
///
/// Implementations must be deterministic and free of shared mutable state:
/// the store calls `derive` outside its lock, from any number of threads.
pub trait KeyDerive: Send + Sync {
    /// Derive the candidate key for `value`.
    fn derive(&self, value: &str) -> ShortKey;
}

impl<F> KeyDerive for F
where
    F: Fn(&str) -> ShortKey + Send + Sync,
{
    fn derive(&self, value: &str) -> ShortKey {
        self(value)
    }
}

/// Truncated BLAKE3 key deriver.
///
/// Hashes the raw UTF-8 bytes of the link (no domain tag, so the empty link
/// hashes the empty byte sequence) and keeps the first `key_length` hex
/// characters of the digest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyDeriver {
    key_length: usize,
}

impl KeyDeriver {
    /// Create a deriver producing keys of `key_length` hex characters.
    pub fn new(key_length: usize) -> Result<Self, DeriveError> {
        if !(MIN_KEY_LENGTH..=MAX_KEY_LENGTH).contains(&key_length) {
            return Err(DeriveError::KeyLengthOutOfRange {
                min: MIN_KEY_LENGTH,
                max: MAX_KEY_LENGTH,
                actual: key_length,
            });
        }
        Ok(Self { key_length })
    }

    /// Number of hex characters in derived keys.
    pub fn key_length(&self) -> usize {
        self.key_length
    }

    /// Full hex digest of `value` (for diagnostics).
    pub fn digest_hex(value: &str) -> String {
        blake3::hash(value.as_bytes()).to_hex().to_string()
    }
}

impl Default for KeyDeriver {
    fn default() -> Self {
        Self {
            key_length: DEFAULT_KEY_LENGTH,
        }
    }
}

impl KeyDerive for KeyDeriver {
    fn derive(&self, value: &str) -> ShortKey {
        let digest = blake3::hash(value.as_bytes());
        ShortKey::from_digest(digest.as_bytes(), self.key_length)
    }
}

/// Errors from key deriver construction.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DeriveError {
    #[error("key length {actual} out of range {min}..={max}")]
    KeyLengthOutOfRange {
        min: usize,
        max: usize,
        actual: usize,
    },
}
