use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Separator between a candidate key and its collision counter.
pub const COLLISION_SEPARATOR: char = '-';

/// Upper bound on the textual length of a key: a full 256-bit hex digest,
/// the separator, and a `u64` counter.
pub const MAX_KEY_LEN: usize = 64 + 1 + 20;

/// Short identifier for a stored link.
///
/// A `ShortKey` is a lowercase hex prefix of a content digest. When two links
/// derive the same prefix, later ones get a collision suffix:
/// `<prefix>-<counter>`. The hex alphabet never contains the separator, so a
/// suffixed key can never equal a plain derived key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShortKey(String);

impl ShortKey {
    /// Build a key from the first `len` hex characters of `digest`.
    ///
    /// `len` is clamped to `1..=2 * digest.len()`.
    pub fn from_digest(digest: &[u8], len: usize) -> Self {
        let hex_len = digest.len() * 2;
        let len = len.clamp(1, hex_len.max(1));
        let bytes = (len + 1) / 2;
        let mut encoded = hex::encode(&digest[..bytes.min(digest.len())]);
        encoded.truncate(len);
        Self(encoded)
    }

    /// Parse and validate a key from its textual form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() || s.len() > MAX_KEY_LEN {
            return Err(TypeError::InvalidKeyLength {
                max: MAX_KEY_LEN,
                actual: s.len(),
            });
        }
        for (position, ch) in s.char_indices() {
            let ok = matches!(ch, '0'..='9' | 'a'..='f') || ch == COLLISION_SEPARATOR;
            if !ok {
                return Err(TypeError::InvalidKeyChar { ch, position });
            }
        }
        Ok(Self(s.to_string()))
    }

    /// The key disambiguated with the given collision counter.
    pub fn with_collision_suffix(&self, counter: u64) -> Self {
        Self(format!("{}{COLLISION_SEPARATOR}{counter}", self.0))
    }

    /// The derived portion of the key, without any collision suffix.
    pub fn candidate(&self) -> &str {
        match self.0.split_once(COLLISION_SEPARATOR) {
            Some((prefix, _)) => prefix,
            None => &self.0,
        }
    }

    /// The collision counter, if this key carries one.
    pub fn collision_index(&self) -> Option<u64> {
        self.0
            .split_once(COLLISION_SEPARATOR)
            .and_then(|(_, suffix)| suffix.parse().ok())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortKey({})", self.0)
    }
}

impl fmt::Display for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ShortKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShortKey {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ShortKey> for String {
    fn from(key: ShortKey) -> Self {
        key.0
    }
}

// Lets `HashMap<ShortKey, _>` be queried with a plain `&str`.
impl Borrow<str> for ShortKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ShortKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
