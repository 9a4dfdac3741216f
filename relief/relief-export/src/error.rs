//! Error types for relief export.

use thiserror::Error;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting a relief solid.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Print settings cannot describe a printable job.
    #[error("invalid print settings: {message}")]
    InvalidSettings {
        /// Which setting was rejected and why.
        message: String,
    },

    /// The mesh has no triangles or references missing vertices.
    #[error("invalid mesh: {message}")]
    InvalidMesh {
        /// Description of the problem.
        message: String,
    },

    /// Unrecognized export target name or file extension.
    #[error("unknown export target: {name}")]
    UnknownTarget {
        /// The name that did not match any target.
        name: String,
    },

    /// XML serialization failed.
    #[error("XML encoding failed: {message}")]
    Xml {
        /// Description of the failure.
        message: String,
    },

    /// ZIP container error.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Thumbnail encoding error.
    #[error("thumbnail encoding failed: {0}")]
    Thumbnail(#[from] image::ImageError),

    /// Slicer configuration could not be serialized.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExportError {
    /// Create an `InvalidSettings` error.
    #[must_use]
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Self::InvalidSettings {
            message: message.into(),
        }
    }

    /// Create an `InvalidMesh` error.
    #[must_use]
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// Create an `Xml` error.
    #[must_use]
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExportError::invalid_settings("layer height must be positive");
        assert_eq!(
            err.to_string(),
            "invalid print settings: layer height must be positive"
        );

        let err = ExportError::UnknownTarget {
            name: "obj".to_string(),
        };
        assert_eq!(err.to_string(), "unknown export target: obj");

        let err = ExportError::invalid_mesh("no triangles");
        assert_eq!(err.to_string(), "invalid mesh: no triangles");
    }
}
