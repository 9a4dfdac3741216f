//! Parameters for height mapping.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a pixel color becomes a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum HeightMode {
    /// Mean channel intensity scaled to the maximum height.
    Luminance,
    /// Height of the nearest color in the extended palette.
    #[default]
    PaletteDistance,
}

/// How the image is sampled at a normalized coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Sampling {
    /// Closest pixel.
    Nearest,
    /// Bilinear blend of the four surrounding pixels.
    #[default]
    Bilinear,
}

/// Parameters for height mapping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeightParams {
    /// Mapping mode. Default: palette distance
    pub mode: HeightMode,

    /// Height of the top layer in millimeters. Default: 2.0
    pub max_height_mm: f64,

    /// Interpolated palette entries between each pair of layers. Default: 5
    pub interpolation_steps: usize,

    /// When set, heights snap down to multiples of this layer height.
    /// Default: None
    pub stepped_layer_height_mm: Option<f64>,

    /// Image sampling filter. Default: bilinear
    pub sampling: Sampling,
}

impl Default for HeightParams {
    fn default() -> Self {
        Self {
            mode: HeightMode::PaletteDistance,
            max_height_mm: 2.0,
            interpolation_steps: 5,
            stepped_layer_height_mm: None,
            sampling: Sampling::Bilinear,
        }
    }
}

impl HeightParams {
    /// Luminance mapping up to `max_height_mm`.
    #[must_use]
    pub fn luminance(max_height_mm: f64) -> Self {
        Self {
            mode: HeightMode::Luminance,
            ..Self::default()
        }
        .with_max_height(max_height_mm)
    }

    /// Palette-distance mapping up to `max_height_mm`.
    #[must_use]
    pub fn palette_distance(max_height_mm: f64) -> Self {
        Self::default().with_max_height(max_height_mm)
    }

    /// Set the maximum height. Negative or non-finite values become zero.
    #[must_use]
    pub fn with_max_height(mut self, max_height_mm: f64) -> Self {
        self.max_height_mm = if max_height_mm.is_finite() {
            max_height_mm.max(0.0)
        } else {
            0.0
        };
        self
    }

    /// Snap heights to multiples of `layer_height_mm`.
    ///
    /// A non-positive layer height disables stepping.
    #[must_use]
    pub fn with_stepped(mut self, layer_height_mm: f64) -> Self {
        self.stepped_layer_height_mm = (layer_height_mm > 0.0).then_some(layer_height_mm);
        self
    }

    /// Set the sampling filter.
    #[must_use]
    pub const fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the number of interpolated palette entries per gap.
    #[must_use]
    pub const fn with_interpolation_steps(mut self, steps: usize) -> Self {
        self.interpolation_steps = steps;
        self
    }

    /// Apply stepped quantization, if enabled, to a height in millimeters.
    #[must_use]
    pub fn quantize(&self, height_mm: f64) -> f64 {
        match self.stepped_layer_height_mm {
            // Tolerance keeps exact multiples from dropping a layer to
            // rounding error.
            Some(lh) if lh > 0.0 => (height_mm / lh + 1e-9).floor() * lh,
            _ => height_mm,
        }
    }
}
