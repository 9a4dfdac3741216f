//! Error types for the core relief types.

use thiserror::Error;

/// Result type for core type construction and editing.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors raised when building or editing core values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    /// Pixel buffer length does not match `width * height * 4`.
    #[error("pixel buffer of {width}x{height} needs {expected} bytes, got {got}")]
    PixelBufferSize {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        got: usize,
    },

    /// A color string is not of the form `#RRGGBB`.
    #[error("invalid color '{value}': expected #RRGGBB")]
    InvalidColor {
        /// The rejected input.
        value: String,
    },

    /// Layer stack length is outside the supported range.
    #[error("layer stack must hold {min} to {max} layers, got {got}")]
    LayerCount {
        /// Minimum number of layers.
        min: usize,
        /// Maximum number of layers.
        max: usize,
        /// Requested number of layers.
        got: usize,
    },

    /// Layer height fractions violate the stack ordering.
    #[error("invalid layer stack: {message}")]
    InvalidStack {
        /// What went wrong.
        message: String,
    },

    /// A layer edit referenced an index that does not exist.
    #[error("layer index {index} out of range for a stack of {len}")]
    IndexOutOfRange {
        /// Offending index.
        index: usize,
        /// Stack length.
        len: usize,
    },
}

impl TypesError {
    /// Create an `InvalidStack` error with the given message.
    #[must_use]
    pub fn invalid_stack(message: impl Into<String>) -> Self {
        Self::InvalidStack {
            message: message.into(),
        }
    }

    /// Create an `InvalidColor` error for the given input.
    #[must_use]
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }
}
