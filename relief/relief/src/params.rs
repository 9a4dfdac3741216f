//! Parameters for a complete relief run.

use relief_export::{ExportOptions, PrintSettings};
use relief_height::HeightParams;
use relief_palette::PalettePattern;
use relief_solid::{ExtrusionParams, SurfaceParams};
use tracing::warn;

/// Smallest accepted grid resolution.
pub const MIN_RESOLUTION: u32 = 50;

/// Largest accepted grid resolution.
pub const MAX_RESOLUTION: u32 = 800;

/// Everything that shapes a relief, from palette to print file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReliefParams {
    /// How the layer stack is derived from the image. Default: dominant colors
    pub pattern: PalettePattern,

    /// Height mapping. Default: palette distance, 2 mm
    pub height: HeightParams,

    /// Vertices along the longer image axis, clamped to [50, 800]. Default: 200
    pub resolution: u32,

    /// Longer side of the model in millimeters. Default: 100
    pub max_dimension_mm: f64,

    /// Distance under which cap vertices merge. Default: 1e-3 mm
    pub dedup_tolerance_mm: f64,

    /// Layer heights and base thickness.
    pub print: PrintSettings,

    /// Output options.
    pub export: ExportOptions,
}

impl Default for ReliefParams {
    fn default() -> Self {
        Self {
            pattern: PalettePattern::default(),
            height: HeightParams::default(),
            resolution: 200,
            max_dimension_mm: 100.0,
            dedup_tolerance_mm: ExtrusionParams::default().dedup_tolerance_mm,
            print: PrintSettings::default(),
            export: ExportOptions::default(),
        }
    }
}

impl ReliefParams {
    /// Quick preview: the coarsest grid.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            resolution: MIN_RESOLUTION,
            ..Self::default()
        }
    }

    /// Set the grid resolution, clamped to the accepted range.
    #[must_use]
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = clamp_resolution(resolution);
        self
    }

    /// Set the palette pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: PalettePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Set the height parameters.
    #[must_use]
    pub fn with_height(mut self, height: HeightParams) -> Self {
        self.height = height;
        self
    }

    /// Set the print settings.
    #[must_use]
    pub fn with_print(mut self, print: PrintSettings) -> Self {
        self.print = print;
        self
    }

    /// Snap heights to the print layer height, previewing the printed steps.
    #[must_use]
    pub fn stepped(mut self) -> Self {
        self.height = self.height.with_stepped(self.print.layer_height_mm);
        self
    }

    /// Resolution actually used, clamped to [50, 800].
    #[must_use]
    pub fn effective_resolution(&self) -> u32 {
        clamp_resolution(self.resolution)
    }

    pub(crate) fn surface(&self) -> SurfaceParams {
        SurfaceParams::with_resolution(self.effective_resolution())
            .max_dimension(self.max_dimension_mm)
    }

    pub(crate) fn extrusion(&self) -> ExtrusionParams {
        ExtrusionParams::with_base_thickness(self.print.base_thickness_mm)
            .dedup_tolerance(self.dedup_tolerance_mm)
    }

    /// Print settings with the model height taken from the height params.
    #[must_use]
    pub fn print_settings(&self) -> PrintSettings {
        self.print.model_height(self.height.max_height_mm)
    }
}

fn clamp_resolution(resolution: u32) -> u32 {
    let clamped = resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION);
    if clamped != resolution {
        warn!(
            requested = resolution,
            used = clamped,
            "Resolution out of range, clamped"
        );
    }
    clamped
}
