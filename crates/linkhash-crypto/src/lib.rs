//! Key derivation for linkhash.
//!
//! Provides [`KeyDeriver`], a pure function from a link to a short candidate
//! key: the BLAKE3 digest of the link's raw bytes, hex encoded and truncated.
//! Truncation makes collisions between distinct links possible; resolving
//! them is the store's job.

pub mod deriver;

pub use deriver::{
    DeriveError, KeyDerive, KeyDeriver, DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH, MIN_KEY_LENGTH,
};
