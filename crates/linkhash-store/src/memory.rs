use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

use linkhash_crypto::{DeriveError, KeyDerive, KeyDeriver};
use linkhash_types::{Entry, ShortKey};

use crate::traits::LinkStore;

/// How a `put` was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Claim {
    /// A new entry was published.
    Inserted,
    /// The link was already stored under the returned key.
    Existing,
    /// The candidate belonged to another link; a suffixed key was published.
    Disambiguated { counter: u64 },
}

/// Everything guarded by the store's lock.
#[derive(Default)]
struct LinkTable {
    entries: HashMap<ShortKey, Entry>,
    /// Highest collision counter issued per candidate key.
    collisions: HashMap<ShortKey, u64>,
}

impl LinkTable {
    /// Find or allocate the key for `value`, starting from `candidate`.
    fn claim(&mut self, candidate: ShortKey, value: &str) -> (ShortKey, Claim) {
        match self.entries.get(&candidate).map(|e| e.value == value) {
            None => {
                self.publish(candidate.clone(), value);
                return (candidate, Claim::Inserted);
            }
            Some(true) => return (candidate, Claim::Existing),
            Some(false) => {}
        }

        let issued = self.collisions.get(&candidate).copied().unwrap_or(0);
        for counter in 1..=issued {
            let key = candidate.with_collision_suffix(counter);
            if self.entries.get(&key).is_some_and(|e| e.value == value) {
                return (key, Claim::Existing);
            }
        }

        let mut counter = issued;
        loop {
            counter += 1;
            let key = candidate.with_collision_suffix(counter);
            if !self.entries.contains_key(&key) {
                self.collisions.insert(candidate, counter);
                self.publish(key.clone(), value);
                return (key, Claim::Disambiguated { counter });
            }
        }
    }

    fn publish(&mut self, key: ShortKey, value: &str) {
        let entry = Entry::new(key.clone(), value);
        self.entries.insert(key, entry);
    }
}

/// In-memory, HashMap-based link store.
///
/// All entries are held in memory behind a `RwLock`. `put` derives the
/// candidate key before taking the write lock, then checks and inserts under
/// it; `resolve` only takes the read lock. Data is lost when the store is
/// dropped.
///
/// The deriver is a type parameter so tests can force collisions with a
/// constant deriver.
pub struct InMemoryLinkStore<D = KeyDeriver> {
    deriver: D,
    table: RwLock<LinkTable>,
}

impl InMemoryLinkStore<KeyDeriver> {
    /// Create a new empty store with the default 7-character deriver.
    pub fn new() -> Self {
        Self::with_deriver(KeyDeriver::default())
    }

    /// Create a new empty store deriving keys of `key_length` hex characters.
    pub fn with_key_length(key_length: usize) -> Result<Self, DeriveError> {
        Ok(Self::with_deriver(KeyDeriver::new(key_length)?))
    }
}

impl<D: KeyDerive> InMemoryLinkStore<D> {
    /// Create a new empty store using `deriver` for candidate keys.
    pub fn with_deriver(deriver: D) -> Self {
        Self {
            deriver,
            table: RwLock::new(LinkTable::default()),
        }
    }

    /// The deriver used for candidate keys.
    pub fn deriver(&self) -> &D {
        &self.deriver
    }
}

impl Default for InMemoryLinkStore<KeyDeriver> {
    fn default() -> Self {
        Self::new()
    }
}

// Critical sections never leave the table half-updated (an entry is inserted
// in a single `HashMap::insert`), so a poisoned lock is recovered rather than
// propagated.
impl<D: KeyDerive> LinkStore for InMemoryLinkStore<D> {
    fn put(&self, value: &str) -> ShortKey {
        let candidate = self.deriver.derive(value);
        let (key, claim) = {
            let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
            table.claim(candidate.clone(), value)
        };
        match claim {
            Claim::Inserted => debug!(key = %key, "stored link"),
            Claim::Existing => debug!(key = %key, "link already stored"),
            Claim::Disambiguated { counter } => {
                warn!(candidate = %candidate, key = %key, counter, "derived key collision")
            }
        }
        key
    }

    fn resolve(&self, key: &str) -> Option<String> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        let value = table.entries.get(key).map(|e| e.value.clone());
        debug!(key, found = value.is_some(), "resolved key");
        value
    }

    fn entry(&self, key: &str) -> Option<Entry> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.entries.get(key).cloned()
    }

    fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    fn collision_count(&self) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.collisions.values().sum::<u64>() as usize
    }
}

impl<D> std::fmt::Debug for InMemoryLinkStore<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len();
        f.debug_struct("InMemoryLinkStore")
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::thread;

    /// Deriver that maps every link to the same candidate.
    fn colliding_store() -> InMemoryLinkStore<impl KeyDerive> {
        InMemoryLinkStore::with_deriver(|_: &str| ShortKey::from_digest(&[0xaa; 4], 7))
    }

    // -----------------------------------------------------------------------
    // Put / Resolve
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_resolve() {
        let store = InMemoryLinkStore::new();
        let k1 = store.put("https://example.com/a");
        assert_eq!(store.resolve(k1.as_str()).as_deref(), Some("https://example.com/a"));
        assert_eq!(store.resolve("doesnotexist"), None);
    }

    #[test]
    fn put_returns_derived_key_when_free() {
        let store = InMemoryLinkStore::new();
        let key = store.put("https://example.com/a");
        assert_eq!(key, KeyDeriver::default().derive("https://example.com/a"));
        assert_eq!(key.collision_index(), None);
    }

    #[test]
    fn put_empty_string() {
        let store = InMemoryLinkStore::new();
        let key = store.put("");
        assert_eq!(key.as_str(), "af1349b");
        assert_eq!(store.resolve(key.as_str()).as_deref(), Some(""));
    }

    #[test]
    fn resolve_missing_key() {
        let store = InMemoryLinkStore::new();
        assert!(store.resolve("abcdef0").is_none());
        assert!(store.entry("abcdef0").is_none());
        assert!(!store.contains("abcdef0"));
    }

    #[test]
    fn entry_carries_key_and_value() {
        let store = InMemoryLinkStore::new();
        let key = store.put("https://example.com/e");
        let entry = store.entry(key.as_str()).expect("should exist");
        assert_eq!(entry.key, key);
        assert_eq!(entry.value, "https://example.com/e");
        assert!(!entry.is_collision());
    }

    // -----------------------------------------------------------------------
    // Idempotence
    // -----------------------------------------------------------------------

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryLinkStore::new();
        let k1 = store.put("https://example.com/same");
        let k2 = store.put("https://example.com/same");
        assert_eq!(k1, k2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn colliding_put_is_idempotent() {
        let store = colliding_store();
        let first = store.put("https://one.example");
        let second = store.put("https://two.example");
        let third = store.put("https://three.example");

        assert_eq!(store.put("https://two.example"), second);
        assert_eq!(store.put("https://three.example"), third);
        assert_eq!(store.put("https://one.example"), first);
        assert_eq!(store.len(), 3);
    }

    // -----------------------------------------------------------------------
    // Collisions
    // -----------------------------------------------------------------------

    #[test]
    fn collisions_get_distinct_keys() {
        let store = colliding_store();
        let k1 = store.put("https://one.example");
        let k2 = store.put("https://two.example");

        assert_ne!(k1, k2);
        assert_eq!(k1.as_str(), "aaaaaaa");
        assert_eq!(k2.as_str(), "aaaaaaa-1");
        assert_eq!(k2.candidate(), k1.as_str());
        assert_eq!(store.resolve(k1.as_str()).as_deref(), Some("https://one.example"));
        assert_eq!(store.resolve(k2.as_str()).as_deref(), Some("https://two.example"));
    }

    #[test]
    fn collision_counter_increases() {
        let store = colliding_store();
        let keys: Vec<ShortKey> = (0..5)
            .map(|i| store.put(&format!("https://{i}.example")))
            .collect();
        let suffixes: Vec<Option<u64>> = keys.iter().map(|k| k.collision_index()).collect();
        assert_eq!(suffixes, vec![None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(store.collision_count(), 4);
    }

    #[test]
    fn existing_entries_are_never_overwritten() {
        let store = colliding_store();
        let k1 = store.put("https://first.example");
        store.put("https://second.example");
        assert_eq!(store.resolve(k1.as_str()).as_deref(), Some("https://first.example"));
    }

    #[test]
    fn counters_are_scoped_per_candidate() {
        let store = InMemoryLinkStore::with_deriver(|value: &str| {
            let byte = if value.starts_with('a') { 0x0a } else { 0x0b };
            ShortKey::from_digest(&[byte; 4], 7)
        });
        store.put("a1");
        store.put("b1");
        let a2 = store.put("a2");
        let b2 = store.put("b2");
        assert_eq!(a2.as_str(), "0a0a0a0-1");
        assert_eq!(b2.as_str(), "0b0b0b0-1");
        assert_eq!(store.collision_count(), 2);
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_and_is_empty() {
        let store = InMemoryLinkStore::new();
        assert!(store.is_empty());
        store.put("https://example.com");
        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_key_length() {
        let store = InMemoryLinkStore::with_key_length(10).unwrap();
        assert_eq!(store.deriver().key_length(), 10);
        assert_eq!(store.put("https://example.com").as_str().len(), 10);
        assert!(InMemoryLinkStore::with_key_length(2).is_err());
    }

    #[test]
    fn stores_are_independent() {
        let a = InMemoryLinkStore::new();
        let b = InMemoryLinkStore::new();
        let key = a.put("https://example.com");
        assert!(b.resolve(key.as_str()).is_none());
    }

    #[test]
    fn usable_as_trait_object() {
        let store: Arc<dyn LinkStore> = Arc::new(InMemoryLinkStore::new());
        let key = store.put("https://example.com/dyn");
        assert!(store.contains(key.as_str()));
    }

    #[test]
    fn debug_format() {
        let store = InMemoryLinkStore::new();
        store.put("x");
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryLinkStore"));
        assert!(debug.contains("entry_count"));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_colliding_puts_keep_every_link() {
        const N: usize = 16;
        let store = Arc::new(colliding_store());

        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let value = format!("https://example.com/{i}");
                    (store.put(&value), value)
                })
            })
            .collect();

        let results: Vec<(ShortKey, String)> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();

        let mut keys: Vec<&ShortKey> = results.iter().map(|(k, _)| k).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), N);
        assert_eq!(store.len(), N);
        for (key, value) in &results {
            assert_eq!(store.resolve(key.as_str()).as_ref(), Some(value));
        }
    }

    #[test]
    fn concurrent_puts_of_same_link_store_once() {
        let store = Arc::new(InMemoryLinkStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put("https://example.com/race"))
            })
            .collect();

        let keys: Vec<ShortKey> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_reads_during_writes() {
        let store = Arc::new(InMemoryLinkStore::new());
        let seeded = store.put("https://example.com/seed");

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store.put(&format!("https://example.com/{w}/{i}"));
                    }
                })
            })
            .collect();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let key = seeded.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(
                            store.resolve(key.as_str()).as_deref(),
                            Some("https://example.com/seed")
                        );
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.len(), 201);
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn resolve_returns_what_was_put(values in proptest::collection::vec(".*", 1..20)) {
            let store = InMemoryLinkStore::new();
            for value in &values {
                let key = store.put(value);
                prop_assert_eq!(store.resolve(key.as_str()), Some(value.clone()));
                prop_assert_eq!(store.put(value), key);
            }
        }

        #[test]
        fn colliding_links_all_resolve(
            values in proptest::collection::hash_set("[a-z]{1,12}", 1..20),
        ) {
            let store = colliding_store();
            let keys: Vec<(ShortKey, &String)> = values.iter().map(|v| (store.put(v), v)).collect();
            prop_assert_eq!(store.len(), values.len());
            prop_assert_eq!(store.collision_count(), values.len() - 1);
            for (key, value) in keys {
                let resolved = store.resolve(key.as_str());
                prop_assert_eq!(resolved.as_ref(), Some(value));
            }
        }
    }
}
