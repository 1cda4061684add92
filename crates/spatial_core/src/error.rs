//! Error types for spatial_core

use thiserror::Error;

/// Errors raised when a timing value cannot drive a schedule
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A duration was zero, negative or not finite
    #[error("invalid duration: {0} ms (must be finite and > 0)")]
    InvalidDuration(f64),

    /// An element had a negative or non-finite height
    #[error("invalid element bounds: top={top}, height={height}")]
    InvalidBounds { top: f64, height: f64 },
}

impl CoreError {
    /// Validate a duration in milliseconds
    pub fn check_duration(ms: f64) -> Result<f64> {
        if ms.is_finite() && ms > 0.0 {
            Ok(ms)
        } else {
            Err(CoreError::InvalidDuration(ms))
        }
    }
}

/// Result type for spatial_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
