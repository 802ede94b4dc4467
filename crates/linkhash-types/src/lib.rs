//! Foundation types for linkhash.
//!
//! Every other linkhash crate depends on `linkhash-types`.
//!
//! # Key Types
//!
//! - [`ShortKey`] -- Short identifier derived from a link (hex digest prefix,
//!   optionally followed by a collision suffix)
//! - [`Entry`] -- A stored key to link association

pub mod entry;
pub mod error;
pub mod key;

pub use entry::Entry;
pub use error::TypeError;
pub use key::{ShortKey, COLLISION_SEPARATOR, MAX_KEY_LEN};
