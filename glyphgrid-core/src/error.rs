//! Error types for surface operations

use thiserror::Error;

/// Surface error type
#[derive(Error, Debug)]
pub enum Error {
    /// Width or height was zero
    #[error("Invalid surface size {width}x{height}: both dimensions must be greater than 0")]
    InvalidSize { width: usize, height: usize },

    /// A coordinate fell outside the surface
    #[error("Position ({x}, {y}) is outside of the {width}x{height} surface")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A flat cell index fell outside the surface
    #[error("Cell index {index} is out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A region did not fit inside the surface it addresses
    #[error("Invalid region x={x}, y={y}, width={width}, height={height}")]
    InvalidRegion {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A gradient could not be built
    #[error("Invalid gradient: {0}")]
    InvalidGradient(String),

    /// No decoder is registered for a serialized effect kind
    #[error("Unknown effect kind: {0}")]
    UnknownEffect(String),

    /// Effect state could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, Error>;
