//! Fluent builder API for relief solids.
//!
//! # Example
//!
//! ```
//! use relief_solid::SolidBuilder;
//! use relief_types::MeshTopology;
//!
//! let field = |u: f64, v: f64| 1.0 + u * v;
//! let result = SolidBuilder::new(&field, 640, 480)
//!     .resolution(64)
//!     .max_dimension(80.0)
//!     .base_thickness(0.8)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(result.grid.cols, 64);
//! assert_eq!(result.grid.rows, 48);
//! assert!(result.mesh.face_count() > 0);
//! ```

use relief_height::HeightField;
use relief_types::IndexedMesh;

use crate::error::SolidResult;
use crate::extrude::{ExtrusionStats, extrude_solid};
use crate::params::{ExtrusionParams, SurfaceParams};
use crate::surface::SurfaceGrid;
use crate::validation::{SolidValidation, validate_solid};

/// Result from [`SolidBuilder`].
#[derive(Debug, Clone)]
pub struct SolidBuildResult {
    /// The closed solid.
    pub mesh: IndexedMesh,
    /// Grid the surface was sampled on.
    pub grid: SurfaceGrid,
    /// Face breakdown of the extrusion.
    pub stats: ExtrusionStats,
    /// Validation report, when validation is enabled.
    pub validation: Option<SolidValidation>,
}

/// Fluent builder from a height field to a closed solid.
///
/// Every call to [`build`](Self::build) creates a fresh mesh.
pub struct SolidBuilder<'a, F: HeightField + ?Sized> {
    field: &'a F,
    image_width: u32,
    image_height: u32,
    surface: SurfaceParams,
    extrusion: ExtrusionParams,
    validate: bool,
}

impl<'a, F: HeightField + ?Sized> SolidBuilder<'a, F> {
    /// Create a builder sampling `field` over an image of the given size.
    #[must_use]
    pub fn new(field: &'a F, image_width: u32, image_height: u32) -> Self {
        Self {
            field,
            image_width,
            image_height,
            surface: SurfaceParams::default(),
            extrusion: ExtrusionParams::default(),
            validate: false,
        }
    }

    // =========================================================================
    // Surface Configuration
    // =========================================================================

    /// Vertices along the longer image axis.
    #[must_use]
    pub const fn resolution(mut self, resolution: u32) -> Self {
        self.surface.resolution = resolution;
        self
    }

    /// Length of the longer model side in millimeters.
    #[must_use]
    pub const fn max_dimension(mut self, mm: f64) -> Self {
        self.surface.max_dimension_mm = mm;
        self
    }

    /// Replace all surface parameters.
    #[must_use]
    pub fn surface_params(mut self, params: SurfaceParams) -> Self {
        self.surface = params;
        self
    }

    // =========================================================================
    // Extrusion Configuration
    // =========================================================================

    /// Depth of the base below the surface plane in millimeters.
    #[must_use]
    pub const fn base_thickness(mut self, mm: f64) -> Self {
        self.extrusion.base_thickness_mm = mm;
        self
    }

    /// Distance under which consecutive cap vertices are merged.
    #[must_use]
    pub const fn dedup_tolerance(mut self, mm: f64) -> Self {
        self.extrusion.dedup_tolerance_mm = mm;
        self
    }

    /// Replace all extrusion parameters.
    #[must_use]
    pub fn extrusion_params(mut self, params: ExtrusionParams) -> Self {
        self.extrusion = params;
        self
    }

    /// Validate the solid after building.
    #[must_use]
    pub const fn validate(mut self, enable: bool) -> Self {
        self.validate = enable;
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Sample the surface, extrude it and optionally validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty image, invalid parameters or a grid too
    /// small to close (fewer than two vertices along either axis).
    pub fn build(self) -> SolidResult<SolidBuildResult> {
        let grid = SurfaceGrid::for_image(self.image_width, self.image_height, &self.surface)?;
        let surface = grid.build(self.field);
        let (mesh, stats) = extrude_solid(&surface, &self.extrusion)?;
        let validation = self.validate.then(|| validate_solid(&mesh));
        Ok(SolidBuildResult {
            mesh,
            grid,
            stats,
            validation,
        })
    }

    /// Sample the open surface only, without walls or base.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty image or invalid parameters.
    pub fn build_surface(self) -> SolidResult<IndexedMesh> {
        let grid = SurfaceGrid::for_image(self.image_width, self.image_height, &self.surface)?;
        Ok(grid.build(self.field))
    }
}
