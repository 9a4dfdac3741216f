//! Error types for surface and solid construction.

use thiserror::Error;

/// Result type alias for solid operations.
pub type SolidResult<T> = Result<T, SolidError>;

/// Errors that can occur while building a relief solid.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolidError {
    /// The source image has no pixels.
    #[error("image of {width}x{height} pixels has no area")]
    EmptyImage {
        /// Image width.
        width: u32,
        /// Image height.
        height: u32,
    },

    /// The surface boundary cannot be resolved into four chains.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry {
        /// What went wrong.
        reason: String,
    },

    /// Invalid build parameters.
    #[error("invalid solid parameters: {0}")]
    InvalidParams(String),
}

impl SolidError {
    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    /// Create an invalid params error.
    #[must_use]
    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::InvalidParams(details.into())
    }
}
