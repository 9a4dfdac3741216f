//! Parameters for palette extraction.

use relief_types::{MAX_LAYERS, MIN_LAYERS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for dominant-color extraction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PaletteParams {
    /// Number of layer colors to produce, clamped to [2, 15]. Default: 5
    pub color_count: usize,

    /// Buckets per RGB channel when building the histogram. Default: 64
    pub quantize_levels: u32,

    /// Weight of the normalized RGB distance term. Default: 0.3
    pub rgb_weight: f64,

    /// Weight of the HSL distance term. Default: 0.7
    pub hsl_weight: f64,

    /// Weight of the hue difference inside the HSL term. Default: 15.0
    pub hue_weight: f64,

    /// Weight of the saturation difference inside the HSL term. Default: 5.0
    pub saturation_weight: f64,

    /// Weight of the lightness difference inside the HSL term. Default: 4.0
    pub lightness_weight: f64,

    /// Samples closer than this are merged. Default: 0.15
    pub similarity_threshold: f64,

    /// Buckets holding at most this share of opaque pixels are dropped as
    /// noise. Default: 0.001
    pub noise_fraction: f64,

    /// Minimum saturation for a sample to compete for a middle slot.
    /// Default: 0.1
    pub min_candidate_saturation: f64,

    /// Build the histogram in parallel. The result does not depend on it.
    /// Default: true
    pub parallel: bool,
}

impl Default for PaletteParams {
    fn default() -> Self {
        Self {
            color_count: 5,
            quantize_levels: 64,
            rgb_weight: 0.3,
            hsl_weight: 0.7,
            hue_weight: 15.0,
            saturation_weight: 5.0,
            lightness_weight: 4.0,
            similarity_threshold: 0.15,
            noise_fraction: 0.001,
            min_candidate_saturation: 0.1,
            parallel: true,
        }
    }
}

impl PaletteParams {
    /// Create params for `count` colors, clamped to the valid stack size.
    #[must_use]
    pub fn with_color_count(count: usize) -> Self {
        Self::default().color_count(count)
    }

    /// Finer buckets and a tighter merge radius, keeping more subtle hues.
    #[must_use]
    pub fn fine() -> Self {
        Self {
            quantize_levels: 128,
            similarity_threshold: 0.1,
            ..Default::default()
        }
    }

    /// Coarse buckets for quick previews of large photos.
    #[must_use]
    pub fn coarse() -> Self {
        Self {
            quantize_levels: 32,
            similarity_threshold: 0.2,
            ..Default::default()
        }
    }

    /// Set the color count, clamped to [2, 15].
    #[must_use]
    pub fn color_count(mut self, count: usize) -> Self {
        self.color_count = count.clamp(MIN_LAYERS, MAX_LAYERS);
        self
    }

    /// Set the merge threshold.
    #[must_use]
    pub const fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Set the per-channel quantization levels, clamped to [2, 256].
    #[must_use]
    pub fn with_quantize_levels(mut self, levels: u32) -> Self {
        self.quantize_levels = levels.clamp(2, 256);
        self
    }

    /// Disable parallel histogram accumulation.
    #[must_use]
    pub const fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Color count after clamping, for params built by struct literal.
    #[must_use]
    pub fn effective_color_count(&self) -> usize {
        self.color_count.clamp(MIN_LAYERS, MAX_LAYERS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = PaletteParams::default();
        assert_eq!(params.color_count, 5);
        assert_eq!(params.quantize_levels, 64);
        assert!((params.similarity_threshold - 0.15).abs() < 1e-12);
        assert!(params.parallel);
    }

    #[test]
    fn test_color_count_clamping() {
        assert_eq!(PaletteParams::with_color_count(1).color_count, 2);
        assert_eq!(PaletteParams::with_color_count(40).color_count, 15);
        assert_eq!(PaletteParams::with_color_count(7).color_count, 7);

        let raw = PaletteParams {
            color_count: 0,
            ..Default::default()
        };
        assert_eq!(raw.effective_color_count(), 2);
    }

    #[test]
    fn test_presets() {
        assert_eq!(PaletteParams::fine().quantize_levels, 128);
        assert_eq!(PaletteParams::coarse().quantize_levels, 32);
        assert!(!PaletteParams::default().sequential().parallel);
        assert_eq!(
            PaletteParams::default().with_quantize_levels(1000).quantize_levels,
            256
        );
    }
}
