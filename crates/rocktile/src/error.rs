//! Error types for the high-level crate.

use rocktile_decode::DecodeError;
use rocktile_geo::GeoError;

/// Errors from exporting, indexing or batch decoding tiles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A tile field failed to decode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A coordinate transform could not be built.
    #[error("transform error: {0}")]
    Geo(#[from] GeoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tile path is not a valid index key.
    #[error("invalid tile key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },
}

/// Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
