//! Parameters for surface and solid construction.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{SolidError, SolidResult};

/// Parameters for the height-field surface grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceParams {
    /// Vertices along the longer image axis. Default: 200
    pub resolution: u32,

    /// Length of the longer model side in millimeters. Default: 100.0
    pub max_dimension_mm: f64,
}

impl Default for SurfaceParams {
    fn default() -> Self {
        Self {
            resolution: 200,
            max_dimension_mm: 100.0,
        }
    }
}

impl SurfaceParams {
    /// Create params with the given resolution.
    #[must_use]
    pub fn with_resolution(resolution: u32) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    /// Coarse grid for quick previews.
    #[must_use]
    pub fn preview() -> Self {
        Self::with_resolution(50)
    }

    /// Dense grid for final prints.
    #[must_use]
    pub fn fine() -> Self {
        Self::with_resolution(400)
    }

    /// Set the longer model side in millimeters.
    #[must_use]
    pub const fn max_dimension(mut self, mm: f64) -> Self {
        self.max_dimension_mm = mm;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SolidError::InvalidParams`] for a zero resolution or a
    /// non-positive dimension.
    pub fn validate(&self) -> SolidResult<()> {
        if self.resolution == 0 {
            return Err(SolidError::invalid_params("resolution must be at least 1"));
        }
        if !(self.max_dimension_mm.is_finite() && self.max_dimension_mm > 0.0) {
            return Err(SolidError::invalid_params(format!(
                "max dimension {} mm must be positive",
                self.max_dimension_mm
            )));
        }
        Ok(())
    }
}

/// Parameters for closing a surface into a solid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtrusionParams {
    /// Depth of the base below z = 0 in millimeters. Zero gives walls down
    /// to the plane of the lowest boundary only. Default: 0.16
    pub base_thickness_mm: f64,

    /// Consecutive cap vertices closer than this are treated as one.
    /// Scale-sensitive. Default: 1e-3
    pub dedup_tolerance_mm: f64,
}

impl Default for ExtrusionParams {
    fn default() -> Self {
        Self {
            base_thickness_mm: 0.16,
            dedup_tolerance_mm: 1e-3,
        }
    }
}

impl ExtrusionParams {
    /// Create params with the given base thickness.
    #[must_use]
    pub fn with_base_thickness(base_thickness_mm: f64) -> Self {
        Self {
            base_thickness_mm,
            ..Default::default()
        }
    }

    /// Set the cap deduplication tolerance.
    #[must_use]
    pub const fn dedup_tolerance(mut self, mm: f64) -> Self {
        self.dedup_tolerance_mm = mm;
        self
    }

    /// Check the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SolidError::InvalidParams`] for a negative or non-finite
    /// thickness or tolerance.
    pub fn validate(&self) -> SolidResult<()> {
        if !(self.base_thickness_mm.is_finite() && self.base_thickness_mm >= 0.0) {
            return Err(SolidError::invalid_params(format!(
                "base thickness {} mm must be zero or positive",
                self.base_thickness_mm
            )));
        }
        if !(self.dedup_tolerance_mm.is_finite() && self.dedup_tolerance_mm >= 0.0) {
            return Err(SolidError::invalid_params(format!(
                "dedup tolerance {} mm must be zero or positive",
                self.dedup_tolerance_mm
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SurfaceParams::default();
        assert_eq!(s.resolution, 200);
        assert!(s.validate().is_ok());

        let e = ExtrusionParams::default();
        assert!((e.dedup_tolerance_mm - 1e-3).abs() < 1e-15);
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(SurfaceParams::with_resolution(0).validate().is_err());
        assert!(SurfaceParams::default().max_dimension(-1.0).validate().is_err());
        assert!(ExtrusionParams::with_base_thickness(-0.1).validate().is_err());
        assert!(ExtrusionParams::with_base_thickness(0.0).validate().is_ok());
        assert!(ExtrusionParams::default().dedup_tolerance(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(SurfaceParams::preview().resolution, 50);
        assert_eq!(SurfaceParams::fine().resolution, 400);
    }
}
