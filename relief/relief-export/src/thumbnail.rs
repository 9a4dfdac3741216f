//! Square PNG thumbnails for slicer projects.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use relief_types::PixelBuffer;
use tracing::{debug, warn};

use crate::error::ExportResult;

/// Render a `size` x `size` PNG of `source`, scaled to fit and centered on a
/// transparent background.
///
/// Without a source image a fully transparent placeholder is produced, so a
/// missing thumbnail never fails an export.
///
/// # Errors
///
/// Returns [`ExportError::Thumbnail`](crate::ExportError::Thumbnail) if PNG
/// encoding fails.
pub fn render_thumbnail(source: Option<&PixelBuffer>, size: u32) -> ExportResult<Vec<u8>> {
    let size = size.max(1);
    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));

    match source.and_then(to_rgba_image) {
        Some(image) => {
            let (width, height) = fit(image.width(), image.height(), size);
            let scaled = imageops::resize(&image, width, height, FilterType::Triangle);
            let x = i64::from((size - width) / 2);
            let y = i64::from((size - height) / 2);
            imageops::overlay(&mut canvas, &scaled, x, y);
            debug!(size, width, height, "Rendered thumbnail");
        }
        None => warn!(size, "Thumbnail unavailable, embedding a transparent placeholder"),
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn to_rgba_image(buffer: &PixelBuffer) -> Option<RgbaImage> {
    if buffer.is_empty() {
        return None;
    }
    RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_raw().to_vec())
}

/// Largest size with the same aspect ratio that fits in `bound` x `bound`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
// Both results are clamped into [1, bound]
fn fit(width: u32, height: u32, bound: u32) -> (u32, u32) {
    let scale = f64::from(bound) / f64::from(width.max(height));
    let w = (f64::from(width) * scale).round() as u32;
    let h = (f64::from(height) * scale).round() as u32;
    (w.clamp(1, bound), h.clamp(1, bound))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> RgbaImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8()
    }

    #[test]
    fn fit_keeps_aspect() {
        assert_eq!(fit(400, 200, 256), (256, 128));
        assert_eq!(fit(10, 1000, 128), (1, 128));
        assert_eq!(fit(64, 64, 256), (256, 256));
    }

    #[test]
    fn wide_image_is_letterboxed() {
        let source = PixelBuffer::filled(40, 20, [255, 0, 0, 255]);
        let png = render_thumbnail(Some(&source), 64).unwrap();
        let image = decode(&png);

        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(32, 32).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(32, 2).0[3], 0);
    }

    #[test]
    fn missing_source_gives_placeholder() {
        let png = render_thumbnail(None, 32).unwrap();
        let image = decode(&png);
        assert_eq!(image.dimensions(), (32, 32));
        assert!(image.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn rendering_is_deterministic() {
        let source = PixelBuffer::from_fn(30, 17, |x, y| {
            [u8::try_from(x * 8).unwrap(), u8::try_from(y * 15).unwrap(), 90, 255]
        });
        assert_eq!(
            render_thumbnail(Some(&source), 128).unwrap(),
            render_thumbnail(Some(&source), 128).unwrap()
        );
    }
}
