//! Error types for spatial_animation

use thiserror::Error;

/// Errors raised when building an animation from invalid parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A duration or speed was zero, negative or not finite
    #[error("invalid {what}: {value} ms (must be finite and > 0)")]
    InvalidTiming { what: &'static str, value: f64 },

    /// A delay was negative or not finite
    #[error("invalid {what}: {value} ms (must be finite and >= 0)")]
    InvalidDelay { what: &'static str, value: f64 },

    /// The typewriter needs at least one string to cycle through
    #[error("typewriter needs at least one text")]
    EmptySequence,

    /// The scramble alphabet has no characters to draw from
    #[error("scramble alphabet is empty")]
    EmptyAlphabet,

    /// Input and output stops of a range map differ in length or are too few
    #[error("range map needs matching input/output stops (at least 2), got {inputs} inputs and {outputs} outputs")]
    StopMismatch { inputs: usize, outputs: usize },

    /// Input stops must be finite and non-decreasing
    #[error("range map input stops must be finite and non-decreasing")]
    UnsortedStops,
}

impl AnimationError {
    pub(crate) fn check_timing(what: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(AnimationError::InvalidTiming { what, value })
        }
    }

    pub(crate) fn check_delay(what: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(AnimationError::InvalidDelay { what, value })
        }
    }
}

/// Result type for spatial_animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
