//! Content-addressed link storage for linkhash.
//!
//! Links are stored under a short key derived from their own bytes. The store
//! owns the key to link mapping and is the only thing allowed to mutate it.
//!
//! # Storage Backends
//!
//! All backends implement the [`LinkStore`] trait:
//!
//! - [`InMemoryLinkStore`] -- `HashMap`-based store behind a `RwLock`
//!
//! # Design Rules
//!
//! 1. Entries are immutable once written and are never removed.
//! 2. A key maps to exactly one link for the lifetime of the store.
//! 3. Storing the same link twice returns the same key (idempotent).
//! 4. Distinct links whose derived keys collide get distinct suffixed keys.
//! 5. Check-then-insert runs under one exclusive lock; lookups share a read lock.
//! 6. Absence is an ordinary `None`, never an error.

pub mod memory;
pub mod traits;

pub use memory::InMemoryLinkStore;
pub use traits::LinkStore;
