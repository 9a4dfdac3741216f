//! Regular height-field grid over the image rectangle.

use relief_height::HeightField;
use relief_types::{IndexedMesh, Vertex};
use tracing::{debug, info};

use crate::error::{SolidError, SolidResult};
use crate::params::SurfaceParams;

/// Dimensions of a surface grid.
///
/// Rows run along Y from the bottom edge (row 0, min Y) to the top edge.
/// Columns run along X from left to right. The grid is centered on the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGrid {
    /// Vertices per row.
    pub cols: u32,
    /// Vertices per column.
    pub rows: u32,
    /// Model extent along X in millimeters.
    pub width_mm: f64,
    /// Model extent along Y in millimeters.
    pub height_mm: f64,
}

impl SurfaceGrid {
    /// Size a grid for an image.
    ///
    /// The longer image axis gets `resolution` vertices and spans
    /// `max_dimension_mm`; the shorter axis is scaled by the aspect ratio,
    /// with at least two vertices unless the resolution is 1.
    /// The physical extent depends only on the image aspect, never on the
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`SolidError::EmptyImage`] for an image without pixels or
    /// [`SolidError::InvalidParams`] for invalid params.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_solid::{SurfaceGrid, SurfaceParams};
    ///
    /// let grid = SurfaceGrid::for_image(400, 200, &SurfaceParams::with_resolution(100)).unwrap();
    /// assert_eq!((grid.cols, grid.rows), (100, 50));
    /// assert_eq!((grid.width_mm, grid.height_mm), (100.0, 50.0));
    /// ```
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    // The short axis count is bounded by the resolution
    pub fn for_image(width: u32, height: u32, params: &SurfaceParams) -> SolidResult<Self> {
        params.validate()?;
        if width == 0 || height == 0 {
            return Err(SolidError::EmptyImage { width, height });
        }

        let long = f64::from(width.max(height));
        let short = f64::from(width.min(height));
        // At least two vertices per axis whenever the resolution allows it, so
        // very elongated images still close into a solid.
        let short_count = ((f64::from(params.resolution) * short / long).round() as u32)
            .max(params.resolution.min(2));
        let short_mm = params.max_dimension_mm * short / long;

        let grid = if width >= height {
            Self {
                cols: params.resolution,
                rows: short_count,
                width_mm: params.max_dimension_mm,
                height_mm: short_mm,
            }
        } else {
            Self {
                cols: short_count,
                rows: params.resolution,
                width_mm: short_mm,
                height_mm: params.max_dimension_mm,
            }
        };
        debug!(cols = grid.cols, rows = grid.rows, "Sized surface grid");
        Ok(grid)
    }

    /// Number of grid vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Number of surface triangles.
    #[must_use]
    pub const fn triangle_count(&self) -> usize {
        2 * (self.cols as usize).saturating_sub(1) * (self.rows as usize).saturating_sub(1)
    }

    /// Normalized coordinate of index `i` among `n` samples.
    fn unit(i: u32, n: u32) -> f64 {
        if n <= 1 {
            0.5
        } else {
            f64::from(i) / f64::from(n - 1)
        }
    }

    /// Sample `field` at every grid vertex and triangulate each cell.
    ///
    /// Every triangle faces +Z. The result is open: it has no walls and no
    /// base.
    #[must_use]
    pub fn build<F: HeightField + ?Sized>(&self, field: &F) -> IndexedMesh {
        let mut mesh = IndexedMesh::with_capacity(self.vertex_count(), self.triangle_count());

        for row in 0..self.rows {
            let v = Self::unit(row, self.rows);
            let y = (v - 0.5) * self.height_mm;
            for col in 0..self.cols {
                let u = Self::unit(col, self.cols);
                let x = (u - 0.5) * self.width_mm;
                mesh.push_vertex(Vertex::from_coords(x, y, field.height(u, v)));
            }
        }

        let cols = self.cols;
        for row in 0..self.rows.saturating_sub(1) {
            for col in 0..cols.saturating_sub(1) {
                let i = row * cols + col;
                mesh.faces.push([i, i + 1, i + cols]);
                mesh.faces.push([i + 1, i + cols + 1, i + cols]);
            }
        }

        info!(
            vertices = mesh.vertices.len(),
            faces = mesh.faces.len(),
            "Built surface grid"
        );
        mesh
    }
}
