//! Pipeline errors.

use relief_export::ExportError;
use relief_solid::SolidError;
use relief_types::TypesError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Errors from any pipeline stage.
#[derive(Debug, Error)]
pub enum ReliefError {
    /// Malformed input data or a rejected layer edit.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// The solid could not be built.
    #[error("solid construction failed: {0}")]
    Solid(#[from] SolidError),

    /// Encoding or writing the output failed.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}
