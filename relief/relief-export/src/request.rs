//! Everything an exporter needs, bundled.

use relief_types::{IndexedMesh, LayerStack, PixelBuffer};

use crate::layer_change::LayerChangeCalculator;
use crate::settings::{ExportOptions, PrintSettings};

/// Input of one export call.
///
/// The mesh is borrowed and never modified: placement on a slicer bed goes
/// into the 3MF build transform instead of the vertex data.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    /// Closed relief solid.
    pub mesh: &'a IndexedMesh,
    /// Colors and their height bands.
    pub stack: &'a LayerStack,
    /// Physical print parameters.
    pub settings: PrintSettings,
    /// Non-geometric options.
    pub options: ExportOptions,
    /// Image used for slicer thumbnails.
    pub thumbnail: Option<&'a PixelBuffer>,
}

impl<'a> ExportRequest<'a> {
    /// Request with default settings and options and no thumbnail.
    #[must_use]
    pub fn new(mesh: &'a IndexedMesh, stack: &'a LayerStack) -> Self {
        Self {
            mesh,
            stack,
            settings: PrintSettings::default(),
            options: ExportOptions::default(),
            thumbnail: None,
        }
    }

    /// Set the print settings.
    #[must_use]
    pub const fn settings(mut self, settings: PrintSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the export options.
    #[must_use]
    pub fn options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the thumbnail source image.
    #[must_use]
    pub const fn thumbnail(mut self, image: &'a PixelBuffer) -> Self {
        self.thumbnail = Some(image);
        self
    }

    /// Layer-change calculator for these settings.
    #[must_use]
    pub fn calculator(&self) -> LayerChangeCalculator {
        LayerChangeCalculator::new(&self.settings)
    }
}
