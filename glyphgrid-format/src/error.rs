//! Errors raised while constructing formatting commands
//!
//! These never leave `Parser::parse`: a command that fails to build is
//! printed as literal text instead.

use thiserror::Error;

/// Why a bracket command could not be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command needs more `:`-separated parts than it was given
    #[error("{command}: missing parameters in {params:?}")]
    MissingParameters {
        command: &'static str,
        params: String,
    },

    /// Color target was not `f` or `b`
    #[error("Unknown color selector: {0:?}")]
    UnknownSelector(String),

    /// A channel list had other than three or four entries
    #[error("Expected 3 or 4 color channels, got {0}")]
    ChannelCount(usize),

    /// A channel was neither `x` nor a byte
    #[error("Invalid color channel: {0:?}")]
    InvalidChannel(String),

    /// Not a known color name
    #[error("Unknown color: {0:?}")]
    UnknownColor(String),

    /// A repeat counter was not a positive integer
    #[error("Invalid counter: {0:?}")]
    InvalidCounter(String),

    #[error("Invalid mirror value: {0:?}")]
    InvalidMirror(String),

    /// Undo target was not one of f, b, g, e, m, a
    #[error("Invalid undo target: {0:?}")]
    InvalidUndoTarget(String),

    /// Any other malformed value
    #[error("{command}: invalid value {value:?}")]
    InvalidValue {
        command: &'static str,
        value: String,
    },
}

/// Result type for command construction
pub type Result<T> = std::result::Result<T, CommandError>;
