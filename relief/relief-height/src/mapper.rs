//! Height fields sampled from an image.

use relief_types::{LayerStack, PixelBuffer, Rgb};
use tracing::debug;

use crate::palette::ExtendedPalette;
use crate::params::{HeightMode, HeightParams, Sampling};

/// A scalar height in millimeters over normalized image coordinates.
///
/// `u` runs left to right and `v` bottom to top, both in [0, 1].
pub trait HeightField {
    /// Height at `(u, v)` in millimeters.
    fn height(&self, u: f64, v: f64) -> f64;
}

impl<F> HeightField for F
where
    F: Fn(f64, f64) -> f64,
{
    fn height(&self, u: f64, v: f64) -> f64 {
        self(u, v)
    }
}

/// Maps image pixels to heights using a layer stack.
///
/// The mapper borrows the image and is immutable once built, so it can be
/// shared across threads.
///
/// # Example
///
/// ```
/// use relief_height::{HeightField, HeightMapper, HeightParams};
/// use relief_types::{LayerStack, PixelBuffer};
///
/// let img = PixelBuffer::filled(4, 4, [255, 255, 255, 255]);
/// let stack = LayerStack::default();
/// let mapper = HeightMapper::new(&img, &stack, HeightParams::palette_distance(3.0));
///
/// assert!((mapper.height(0.5, 0.5) - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct HeightMapper<'a> {
    image: &'a PixelBuffer,
    params: HeightParams,
    palette: ExtendedPalette,
}

impl<'a> HeightMapper<'a> {
    /// Create a mapper over `image` for `stack`.
    #[must_use]
    pub fn new(image: &'a PixelBuffer, stack: &LayerStack, params: HeightParams) -> Self {
        let palette = ExtendedPalette::new(stack, params.interpolation_steps);
        debug!(
            mode = ?params.mode,
            entries = palette.len(),
            max_height_mm = params.max_height_mm,
            "Created height mapper"
        );
        Self {
            image,
            params,
            palette,
        }
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &HeightParams {
        &self.params
    }

    /// The extended palette used in palette-distance mode.
    #[must_use]
    pub const fn palette(&self) -> &ExtendedPalette {
        &self.palette
    }

    /// Height in millimeters for a color, independent of position.
    #[must_use]
    pub fn height_for_color(&self, color: Rgb) -> f64 {
        let fraction = match self.params.mode {
            HeightMode::Luminance => color.mean_intensity(),
            HeightMode::PaletteDistance => self.palette.fraction_for(color),
        };
        self.params.quantize(fraction * self.params.max_height_mm)
    }

    /// Color of the image at `(u, v)` with the configured filter.
    #[must_use]
    pub fn sample(&self, u: f64, v: f64) -> Rgb {
        match self.params.sampling {
            Sampling::Nearest => self.image.sample_nearest(u, v),
            Sampling::Bilinear => self.image.sample_bilinear(u, v),
        }
    }
}

impl HeightField for HeightMapper<'_> {
    fn height(&self, u: f64, v: f64) -> f64 {
        self.height_for_color(self.sample(u, v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use relief_types::LayerSpec;

    fn two_tone() -> PixelBuffer {
        // Left half black, right half white.
        PixelBuffer::from_fn(10, 4, |x, _| if x < 5 { [0, 0, 0, 255] } else { [255; 4] })
    }

    #[test]
    fn luminance_mode_scales_mean_intensity() {
        let img = PixelBuffer::filled(2, 2, [255, 0, 0, 255]);
        let stack = LayerStack::default();
        let mapper = HeightMapper::new(&img, &stack, HeightParams::luminance(3.0));
        assert_relative_eq!(mapper.height(0.3, 0.3), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mapper.height_for_color(Rgb::WHITE), 3.0);
        assert_eq!(mapper.height_for_color(Rgb::BLACK), 0.0);
    }

    #[test]
    fn palette_mode_uses_layer_fractions() {
        let img = two_tone();
        let stack = LayerStack::new(vec![
            LayerSpec::new(Rgb::BLACK, 0.25, 1.0),
            LayerSpec::new(Rgb::WHITE, 1.0, 3.0),
        ])
        .unwrap();
        let params = HeightParams::palette_distance(2.0).with_sampling(Sampling::Nearest);
        let mapper = HeightMapper::new(&img, &stack, params);
        assert_relative_eq!(mapper.height(0.0, 0.5), 0.5);
        assert_relative_eq!(mapper.height(1.0, 0.5), 2.0);
    }

    #[test]
    fn stepped_mode_snaps_to_layers() {
        let img = PixelBuffer::filled(2, 2, [128, 128, 128, 255]);
        let stack = LayerStack::default();
        let params = HeightParams::luminance(1.0).with_stepped(0.1);
        let mapper = HeightMapper::new(&img, &stack, params);
        // 128 / 255 = 0.502
        assert_relative_eq!(mapper.height(0.5, 0.5), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn image_top_is_high_v() {
        let img = PixelBuffer::from_fn(3, 3, |_, y| if y == 0 { [255; 4] } else { [0, 0, 0, 255] });
        let stack = LayerStack::default();
        let params = HeightParams::luminance(1.0).with_sampling(Sampling::Nearest);
        let mapper = HeightMapper::new(&img, &stack, params);
        assert_eq!(mapper.height(0.5, 1.0), 1.0);
        assert_eq!(mapper.height(0.5, 0.0), 0.0);
    }

    #[test]
    fn closures_are_height_fields() {
        let flat = |_: f64, _: f64| 1.5;
        assert_eq!(flat.height(0.2, 0.9), 1.5);
    }
}
