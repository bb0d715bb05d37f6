//! Error types for the card stack crate.

use std::io;

/// Errors that can occur in the card stack.
///
/// Host-delivered events never produce these; they are dropped instead.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// An appended record would break the strictly increasing id order.
    #[error("panel id {id} does not follow current maximum {max:?}")]
    NonIncreasingId {
        /// Offending id.
        id: u32,
        /// Largest id present before the append, if any.
        max: Option<u32>,
    },

    /// Configuration failed to parse or validate.
    #[error("config error: {0}")]
    ConfigError(String),

    /// Snapshot export failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// Convenience type alias for card stack results.
pub type CardResult<T> = Result<T, CardError>;
