//! Weighted color samples and the perceptual metric used to compare them.

use std::f64::consts::TAU;

use relief_types::Rgb;

use crate::params::PaletteParams;

/// Hue, saturation and lightness, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue as a fraction of a full turn.
    pub hue: f64,
    /// Saturation.
    pub saturation: f64,
    /// Lightness.
    pub lightness: f64,
}

impl Hsl {
    /// Convert RGB channels in the 0-255 range to HSL.
    #[must_use]
    pub fn from_rgb(r: f64, g: f64, b: f64) -> Self {
        let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = (max + min) / 2.0;

        let d = max - min;
        if d <= f64::EPSILON {
            return Self {
                hue: 0.0,
                saturation: 0.0,
                lightness,
            };
        }

        let saturation = if lightness > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        #[allow(clippy::float_cmp)]
        let sector = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self {
            hue: sector / 6.0,
            saturation,
            lightness,
        }
    }
}

/// A color bucket: mean RGB of the pixels it stands for, plus their count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorSample {
    /// Mean channel values in the 0-255 range.
    pub rgb: [f64; 3],
    /// Number of pixels represented.
    pub count: u64,
    /// Cached HSL of `rgb`.
    pub hsl: Hsl,
}

impl ColorSample {
    /// Create a sample, computing its HSL.
    #[must_use]
    pub fn new(rgb: [f64; 3], count: u64) -> Self {
        Self {
            rgb,
            count,
            hsl: Hsl::from_rgb(rgb[0], rgb[1], rgb[2]),
        }
    }

    /// Count-weighted mean of a group of samples.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn weighted_mean(group: &[Self]) -> Self {
        let total: u64 = group.iter().map(|s| s.count).sum();
        if total == 0 {
            return group.first().copied().unwrap_or_else(|| Self::new([0.0; 3], 0));
        }
        let mut rgb = [0.0; 3];
        for s in group {
            for (acc, c) in rgb.iter_mut().zip(s.rgb) {
                *acc += c * s.count as f64;
            }
        }
        for c in &mut rgb {
            *c /= total as f64;
        }
        Self::new(rgb, total)
    }

    /// The sample as an 8-bit color.
    #[must_use]
    pub fn color(&self) -> Rgb {
        Rgb::from_f64(self.rgb[0], self.rgb[1], self.rgb[2])
    }

    /// Perceptual distance: a weighted blend of normalized RGB distance and
    /// an HSL distance in which hue differences count in proportion to the
    /// more saturated of the two colors.
    #[must_use]
    pub fn distance(&self, other: &Self, params: &PaletteParams) -> f64 {
        let rgb = self
            .rgb
            .iter()
            .zip(other.rgb)
            .map(|(a, b)| {
                let d = (a - b) / 255.0;
                d * d
            })
            .sum::<f64>()
            .sqrt();

        let raw_hue = (self.hsl.hue - other.hsl.hue).abs();
        let hue = raw_hue.min(1.0 - raw_hue);
        let sat = (self.hsl.saturation - other.hsl.saturation).abs();
        let light = (self.hsl.lightness - other.hsl.lightness).abs();
        let max_sat = self.hsl.saturation.max(other.hsl.saturation);

        let hsl = (hue * hue * params.hue_weight * max_sat
            + sat * sat * params.saturation_weight
            + light * light * params.lightness_weight)
            .sqrt();

        rgb * params.rgb_weight + hsl * params.hsl_weight
    }

    /// How strongly a sample deserves a palette slot: frequent and saturated
    /// colors score high, hues are given a mild periodic bonus and colors far
    /// from mid lightness are slightly penalized.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn importance(&self) -> f64 {
        let frequency = (self.count as f64 + 1.0).log10().powi(2) * 5.0;
        let saturation = self.hsl.saturation.powi(2) * 2.0;
        let hue_bonus = (self.hsl.hue * TAU).sin().mul_add(0.3, 1.0);
        let lightness_penalty = (self.hsl.lightness - 0.5).powi(2);
        (frequency + saturation) * hue_bonus - lightness_penalty
    }
}
