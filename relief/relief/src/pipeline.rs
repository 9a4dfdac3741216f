//! End-to-end pipeline: image to layer stack to solid to print file.
//!
//! ```text
//! PixelBuffer x LayerStack x ReliefParams -> IndexedMesh -> bytes
//! ```
//!
//! A [`Relief`] holds values only. Every solid and every export is built
//! from scratch, so exports never share a mesh and can run in parallel.

use std::path::Path;

use rayon::prelude::*;
use relief_export::{
    ExportRequest, ExportTarget, LayerChangeCalculator, LayerRange, ToolChange, export_bytes,
    export_to_path,
};
use relief_height::HeightMapper;
use relief_solid::{SolidBuildResult, SolidBuilder};
use relief_types::{IndexedMesh, LayerEdit, LayerStack, PixelBuffer};
use tracing::info;

use crate::error::ReliefResult;
use crate::params::ReliefParams;

/// An image with its layer stack and parameters.
///
/// # Example
///
/// ```
/// use relief::{ExportTarget, Relief, ReliefParams};
/// use relief::types::PixelBuffer;
///
/// let image = PixelBuffer::from_fn(64, 48, |x, y| {
///     let v = u8::try_from((x * 4 + y) % 256).unwrap();
///     [v, v, 255 - v, 255]
/// });
/// let relief = Relief::new(&image, ReliefParams::preview());
/// let stl = relief.export(ExportTarget::Stl).unwrap();
/// assert!(stl.len() > 84);
/// ```
#[derive(Debug, Clone)]
pub struct Relief<'a> {
    image: &'a PixelBuffer,
    stack: LayerStack,
    params: ReliefParams,
}

impl<'a> Relief<'a> {
    /// Derive the layer stack from `image` with the configured pattern.
    #[must_use]
    pub fn new(image: &'a PixelBuffer, params: ReliefParams) -> Self {
        let stack = params.pattern.generate(image);
        info!(
            pattern = params.pattern.name(),
            layers = stack.len(),
            "Generated layer stack"
        );
        Self::with_stack(image, stack, params)
    }

    /// Use an explicit layer stack.
    #[must_use]
    pub const fn with_stack(image: &'a PixelBuffer, stack: LayerStack, params: ReliefParams) -> Self {
        Self {
            image,
            stack,
            params,
        }
    }

    /// Source image.
    #[must_use]
    pub const fn image(&self) -> &PixelBuffer {
        self.image
    }

    /// Current layer stack.
    #[must_use]
    pub const fn stack(&self) -> &LayerStack {
        &self.stack
    }

    /// Parameters.
    #[must_use]
    pub const fn params(&self) -> &ReliefParams {
        &self.params
    }

    /// A copy with `edit` applied to the layer stack.
    ///
    /// # Errors
    ///
    /// Returns the stack error when the edit would break its invariants.
    pub fn edited(&self, edit: LayerEdit) -> ReliefResult<Self> {
        Ok(Self {
            stack: self.stack.apply(edit)?,
            ..self.clone()
        })
    }

    /// Height mapper over the image and the current stack.
    #[must_use]
    pub fn mapper(&self) -> HeightMapper<'a> {
        HeightMapper::new(self.image, &self.stack, self.params.height.clone())
    }

    /// Build a fresh closed solid.
    ///
    /// # Errors
    ///
    /// Returns a solid error for an empty image or a grid that cannot close.
    pub fn build_solid(&self) -> ReliefResult<SolidBuildResult> {
        let mapper = self.mapper();
        let result = SolidBuilder::new(&mapper, self.image.width(), self.image.height())
            .surface_params(self.params.surface())
            .extrusion_params(self.params.extrusion())
            .build()?;
        Ok(result)
    }

    fn calculator(&self) -> LayerChangeCalculator {
        LayerChangeCalculator::new(&self.params.print_settings())
    }

    /// Color changes for the current stack.
    #[must_use]
    pub fn tool_changes(&self) -> Vec<ToolChange> {
        self.calculator().tool_changes(&self.stack)
    }

    /// Print layer range of every stack entry.
    #[must_use]
    pub fn layer_ranges(&self) -> Vec<LayerRange> {
        self.calculator().layer_ranges(&self.stack)
    }

    /// Build a solid and encode it for `target`.
    ///
    /// # Errors
    ///
    /// Returns a solid or export error.
    pub fn export(&self, target: ExportTarget) -> ReliefResult<Vec<u8>> {
        let solid = self.build_solid()?;
        Ok(export_bytes(target, &self.request(&solid.mesh))?)
    }

    /// Build a solid, encode it for `target` and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns a solid, export or I/O error.
    pub fn export_to_path<P: AsRef<Path>>(&self, target: ExportTarget, path: P) -> ReliefResult<()> {
        let solid = self.build_solid()?;
        export_to_path(target, &self.request(&solid.mesh), path)?;
        Ok(())
    }

    fn request<'s>(&'s self, mesh: &'s IndexedMesh) -> ExportRequest<'s> {
        ExportRequest::new(mesh, &self.stack)
            .settings(self.params.print_settings())
            .options(self.params.export.clone())
            .thumbnail(self.image)
    }

    /// Export several targets in parallel, each from its own solid.
    ///
    /// Results keep the order of `targets`.
    #[must_use]
    pub fn export_all(&self, targets: &[ExportTarget]) -> Vec<(ExportTarget, ReliefResult<Vec<u8>>)> {
        targets
            .par_iter()
            .map(|&target| (target, self.export(target)))
            .collect()
    }
}
