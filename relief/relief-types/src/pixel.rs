//! Decoded RGBA8 image data.

use crate::color::Rgb;
use crate::error::{TypesError, TypesResult};

/// Alpha at or above which a pixel counts as opaque (about 98%).
pub const OPAQUE_ALPHA_THRESHOLD: u8 = 250;

/// A row-major RGBA8 image.
///
/// Row 0 is the top of the image. Normalized sampling coordinates put
/// `v = 0` on the bottom row and `v = 1` on the top row so that the
/// image appears upright on the XY plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::PixelBufferSize`] if `data.len()` is not
    /// `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> TypesResult<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TypesError::PixelBufferSize {
                width,
                height,
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_types::PixelBuffer;
    ///
    /// let img = PixelBuffer::from_fn(4, 2, |x, _| [x as u8 * 60, 0, 0, 255]);
    /// assert_eq!(img.pixel(3, 1), [180, 0, 0, 255]);
    /// ```
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// A single-color image.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Image width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Number of pixels.
    #[inline]
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the image has no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA value at `(x, y)`. Coordinates are clamped into the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let i = (y * self.width as usize + x) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Iterate over all RGBA pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Whether an RGBA sample passes the opacity gate.
    #[inline]
    #[must_use]
    pub const fn is_opaque(rgba: [u8; 4]) -> bool {
        rgba[3] >= OPAQUE_ALPHA_THRESHOLD
    }

    /// Nearest-pixel color at normalized `(u, v)`.
    ///
    /// Returns black for an empty image.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    // Coordinates are clamped to the image before the cast
    pub fn sample_nearest(&self, u: f64, v: f64) -> Rgb {
        if self.is_empty() {
            return Rgb::BLACK;
        }
        let (fx, fy) = self.to_pixel_space(u, v);
        let [r, g, b, _] = self.pixel(fx.round() as u32, fy.round() as u32);
        Rgb::new(r, g, b)
    }

    /// Bilinearly filtered color at normalized `(u, v)`.
    ///
    /// Returns black for an empty image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Coordinates are clamped to the image before the cast
    pub fn sample_bilinear(&self, u: f64, v: f64) -> Rgb {
        if self.is_empty() {
            return Rgb::BLACK;
        }
        let (fx, fy) = self.to_pixel_space(u, v);
        let (x0, y0) = (fx.floor() as u32, fy.floor() as u32);
        let (tx, ty) = (fx - fx.floor(), fy - fy.floor());

        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x0 + 1, y0);
        let p01 = self.pixel(x0, y0 + 1);
        let p11 = self.pixel(x0 + 1, y0 + 1);

        let channel = |c: usize| {
            let top = f64::from(p00[c]).mul_add(1.0 - tx, f64::from(p10[c]) * tx);
            let bottom = f64::from(p01[c]).mul_add(1.0 - tx, f64::from(p11[c]) * tx);
            top.mul_add(1.0 - ty, bottom * ty)
        };
        Rgb::from_f64(channel(0), channel(1), channel(2))
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_pixel_space(&self, u: f64, v: f64) -> (f64, f64) {
        let max_x = f64::from(self.width - 1);
        let max_y = f64::from(self.height - 1);
        let fx = (u.clamp(0.0, 1.0) * max_x).clamp(0.0, max_x);
        let fy = ((1.0 - v.clamp(0.0, 1.0)) * max_y).clamp(0.0, max_y);
        (fx, fy)
    }
}
