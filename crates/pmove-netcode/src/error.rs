//! Error types for pmove-netcode

use pmove_core::Frame;
use thiserror::Error;

/// Netcode error type
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The peer fell too far behind, a fresh baseline is required
    #[error("Replay from frame {from} is out of the command window (oldest {oldest}), resync required")]
    OutOfWindow { from: Frame, oldest: Frame },

    /// Prediction asked for before any authoritative state arrived
    #[error("No authoritative baseline received yet")]
    NoBaseline,

    /// State could not be encoded for checksumming
    #[error("State encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Core(pmove_core::Error),
}

impl From<pmove_core::Error> for Error {
    fn from(err: pmove_core::Error) -> Self {
        match err {
            pmove_core::Error::OutOfWindow { from, oldest } => Error::OutOfWindow { from, oldest },
            other => Error::Core(other),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::Encode(err.to_string())
    }
}

/// Result type for netcode operations
pub type Result<T> = std::result::Result<T, Error>;
