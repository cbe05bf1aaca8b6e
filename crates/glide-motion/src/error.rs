//! Error types for the motion engine.

use thiserror::Error;

/// Result type for motion operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors that can occur in motion operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// A scroll request arrived while another was running and the animator
    /// is configured to reject such requests.
    #[error("scroll animation already in progress")]
    ScrollBusy,

    /// An easing curve name did not match any known curve.
    #[error("unknown easing curve: {0}")]
    UnknownEasing(String),

    /// A timing function token could not be parsed.
    #[error("invalid timing function: {0}")]
    InvalidTimingFunction(String),
}
