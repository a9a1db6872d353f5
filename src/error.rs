//! Error types for packing, envelope handling, and the CLI boundary.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors surfaced by the codecs, the envelope layer, and the CLI.
#[derive(Debug, Error)]
pub enum PackError {
    /// The requested packing variant name is not in the closed set.
    #[error("unknown packing variant '{0}' (expected noncross, cross, overflow, or overflow-noncross)")]
    UnknownCodec(String),

    /// A flag combination or parameter the CLI cannot act on.
    #[error("{0}")]
    Usage(String),

    /// An input element does not fit the 32-bit value domain.
    #[error("value {value} at index {index} exceeds the 32-bit range")]
    ValueTooLarge {
        /// The offending element as parsed.
        value: u64,
        /// Position of the element in the input array.
        index: usize,
    },

    /// Random access outside `[0, n)`.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index (kept signed so negative CLI input reports faithfully).
        index: i64,
        /// Element count of the compressed array.
        len: usize,
    },

    /// `get` or `decompress` was called on a codec with no state.
    #[error("no compressed state; call compress or load first")]
    NotCompressed,

    /// A structurally invalid or internally inconsistent envelope.
    #[error("invalid envelope: {0}")]
    Envelope(String),

    /// File I/O failure at the CLI boundary.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure at the CLI boundary.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
