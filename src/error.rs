//! Timer error types

use thiserror::Error;

/// Errors surfaced to the user by timer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// The requested duration adds up to zero seconds
    #[error("Please set a time greater than 0")]
    InvalidDuration,

    /// A duration field is outside the range offered by its picker
    #[error("{field} must be between 0 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// The duration can only be changed while the timer is idle
    #[error("Duration can only be changed while the timer is idle")]
    NotIdle,
}
