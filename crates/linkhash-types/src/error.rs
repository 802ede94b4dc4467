use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid short key character {ch:?} at position {position}")]
    InvalidKeyChar { ch: char, position: usize },

    #[error("invalid short key length: expected 1..={max}, got {actual}")]
    InvalidKeyLength { max: usize, actual: usize },
}
