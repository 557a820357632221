//! Error types for pmove-core

use crate::Frame;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid movement parameter: {0}")]
    InvalidParams(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Replay requested from a frame whose command slot has been reused
    #[error("Frame {from} is outside the command window, oldest replayable is {oldest}")]
    OutOfWindow { from: Frame, oldest: Frame },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
