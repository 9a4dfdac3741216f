//! Preset layer patterns.

use relief_types::{LayerSpec, LayerStack, PixelBuffer, Rgb};
use tracing::{info, warn};

use crate::dominant::extract_palette;
use crate::params::PaletteParams;

/// Number of luminance levels in the posterized pattern.
const POSTERIZE_LEVELS: usize = 5;

/// How a layer stack is derived from an image.
#[derive(Debug, Clone, PartialEq)]
pub enum PalettePattern {
    /// Dominant colors extracted from the image.
    DominantColors(PaletteParams),
    /// Four fixed grays on a quadratic height curve.
    GrayscaleFixed,
    /// Four fixed grays at even quarter heights.
    GrayscaleDistributed,
    /// Five luminance quantile bands, each colored with its mean color.
    Posterized,
}

impl Default for PalettePattern {
    fn default() -> Self {
        Self::DominantColors(PaletteParams::default())
    }
}

impl PalettePattern {
    /// Short identifier, as used on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DominantColors(_) => "dominant",
            Self::GrayscaleFixed => "grayscale",
            Self::GrayscaleDistributed => "grayscale-distributed",
            Self::Posterized => "posterized",
        }
    }

    /// Derive a layer stack from `image`.
    ///
    /// The grayscale patterns ignore the image.
    #[must_use]
    pub fn generate(&self, image: &PixelBuffer) -> LayerStack {
        match self {
            Self::DominantColors(params) => extract_palette(image, params),
            Self::GrayscaleFixed => grayscale_fixed(),
            Self::GrayscaleDistributed => grayscale_distributed(),
            Self::Posterized => posterized(image),
        }
    }
}

/// Rounded percentage of `((index + 1) / total) ^ exponent`, as a fraction.
#[allow(clippy::cast_precision_loss)]
fn curve_fraction(index: usize, total: usize, exponent: f64) -> f64 {
    let t = (index + 1) as f64 / total as f64;
    (t.powf(exponent) * 100.0).round().min(100.0) / 100.0
}

fn from_table(table: &[(Rgb, f64, f64)]) -> LayerStack {
    let layers = table
        .iter()
        .map(|&(color, fraction, td)| LayerSpec::new(color, fraction, td))
        .collect();
    LayerStack::new(layers).unwrap_or_default()
}

fn grayscale_fixed() -> LayerStack {
    let grays = [(0x00, 0.6), (0x66, 1.4), (0xcc, 2.8), (0xff, 5.0)];
    let table: Vec<_> = grays
        .iter()
        .enumerate()
        .map(|(i, &(gray, td))| (Rgb::gray(gray), curve_fraction(i, grays.len(), 2.0), td))
        .collect();
    from_table(&table)
}

fn grayscale_distributed() -> LayerStack {
    from_table(&[
        (Rgb::gray(0x00), 0.25, 0.6),
        (Rgb::gray(0x40), 0.50, 1.4),
        (Rgb::gray(0x80), 0.75, 2.0),
        (Rgb::gray(0xff), 1.00, 5.0),
    ])
}

/// TD for a normalized brightness.
fn brightness_td(brightness: f64) -> f64 {
    if brightness < 0.25 {
        0.6
    } else if brightness < 0.5 {
        1.4
    } else if brightness < 0.75 {
        2.8
    } else {
        5.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Level {
    sum: [f64; 3],
    luma: f64,
    count: u64,
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
// Luma of 8-bit channels lies in [0, 255]
fn posterized(image: &PixelBuffer) -> LayerStack {
    let opaque: Vec<[u8; 4]> = image.pixels().filter(|&p| PixelBuffer::is_opaque(p)).collect();
    if opaque.is_empty() {
        warn!("No opaque pixels, using default grayscale stack");
        return LayerStack::default();
    }

    let luma = |p: [u8; 4]| Rgb::new(p[0], p[1], p[2]).luma() * 255.0;

    let mut histogram = [0u64; 256];
    for &p in &opaque {
        histogram[luma(p).round() as usize] += 1;
    }

    // Upper luma bound of each level but the last.
    let per_level = opaque.len() as f64 / POSTERIZE_LEVELS as f64;
    let mut thresholds = Vec::with_capacity(POSTERIZE_LEVELS - 1);
    let mut running = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        if thresholds.len() == POSTERIZE_LEVELS - 1 {
            break;
        }
        running += count;
        while thresholds.len() < POSTERIZE_LEVELS - 1
            && running as f64 >= per_level * (thresholds.len() + 1) as f64
        {
            thresholds.push(value as f64);
        }
    }

    let mut levels = [Level::default(); POSTERIZE_LEVELS];
    for &p in &opaque {
        let y = luma(p);
        let index = thresholds.iter().take_while(|&&t| y > t).count();
        let level = &mut levels[index];
        for (acc, c) in level.sum.iter_mut().zip([p[0], p[1], p[2]]) {
            *acc += f64::from(c);
        }
        level.luma += y;
        level.count += 1;
    }

    let mut bands: Vec<(Rgb, f64)> = levels
        .iter()
        .enumerate()
        .map(|(i, level)| {
            if level.count == 0 {
                let gray = (i as f64 / (POSTERIZE_LEVELS - 1) as f64 * 255.0).round() as u8;
                (Rgb::gray(gray), brightness_td(f64::from(gray) / 255.0))
            } else {
                let n = level.count as f64;
                let color = Rgb::from_f64(level.sum[0] / n, level.sum[1] / n, level.sum[2] / n);
                (color, brightness_td(level.luma / n / 255.0))
            }
        })
        .collect();
    bands.sort_by(|a, b| a.0.luma().total_cmp(&b.0.luma()));

    let table: Vec<_> = bands
        .iter()
        .enumerate()
        .map(|(i, &(color, td))| (color, curve_fraction(i, POSTERIZE_LEVELS, 1.8), td))
        .collect();
    let stack = from_table(&table);
    info!(
        pixels = opaque.len(),
        thresholds = ?thresholds,
        "Built posterized stack"
    );
    stack
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn fractions(stack: &LayerStack) -> Vec<f64> {
        stack.iter().map(LayerSpec::height_fraction).collect()
    }

    #[test]
    fn grayscale_fixed_uses_quadratic_heights() {
        let stack = PalettePattern::GrayscaleFixed.generate(&PixelBuffer::filled(1, 1, [0; 4]));
        assert_eq!(fractions(&stack), vec![0.06, 0.25, 0.56, 1.0]);
        assert_eq!(stack.layers()[1].color(), Rgb::gray(0x66));
        assert_eq!(stack.layers()[2].transmission_distance(), 2.8);
    }

    #[test]
    fn grayscale_distributed_quarters() {
        let stack = grayscale_distributed();
        assert_eq!(fractions(&stack), vec![0.25, 0.5, 0.75, 1.0]);
        assert_eq!(stack.layers()[3].color(), Rgb::WHITE);
    }

    #[test]
    fn posterized_heights_follow_curve() {
        let img = PixelBuffer::from_fn(50, 10, |x, _| {
            let v = (x * 5) as u8;
            [v, v, v, 255]
        });
        let stack = PalettePattern::Posterized.generate(&img);
        assert_eq!(stack.len(), 5);
        assert_eq!(fractions(&stack), vec![0.06, 0.19, 0.4, 0.67, 1.0]);
        let lumas: Vec<f64> = stack.colors().iter().map(|c| c.luma()).collect();
        assert!(lumas.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(stack.layers()[0].transmission_distance(), 0.6);
        assert_eq!(stack.layers()[4].transmission_distance(), 5.0);
    }

    #[test]
    fn posterized_flat_image_fills_empty_levels_with_gray() {
        let img = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
        let stack = posterized(&img);
        assert_eq!(stack.len(), 5);
        assert_eq!(stack.layers()[4].color(), Rgb::WHITE);
    }

    #[test]
    fn posterized_transparent_image_falls_back() {
        let img = PixelBuffer::filled(4, 4, [255, 0, 0, 10]);
        assert_eq!(posterized(&img), LayerStack::default());
    }

    #[test]
    fn pattern_names() {
        assert_eq!(PalettePattern::default().name(), "dominant");
        assert_eq!(PalettePattern::Posterized.name(), "posterized");
    }
}
