use linkhash_types::{Entry, ShortKey};

/// Content-addressed link store.
///
/// All implementations must satisfy these invariants:
/// - A key, once issued, maps to the same link for the lifetime of the store.
/// - `put` is idempotent: the same link always gets back the same key.
/// - Links whose derived keys collide are both stored, under distinct keys.
/// - Concurrent `put` calls never lose or corrupt an entry.
pub trait LinkStore: Send + Sync {
    /// Store a link and return its short key.
    ///
    /// Never fails: every link, including the empty string, gets a key.
    fn put(&self, value: &str) -> ShortKey;

    /// Look up the link stored under `key`.
    ///
    /// Returns `None` if no such key was ever issued.
    fn resolve(&self, key: &str) -> Option<String>;

    /// Look up the full entry stored under `key`.
    fn entry(&self, key: &str) -> Option<Entry>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Number of entries stored under a suffixed (disambiguated) key.
    fn collision_count(&self) -> usize;

    /// Returns `true` if nothing has been stored yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `key` has been issued.
    fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }
}
