//! Quantized color histogram of the opaque pixels of an image.

use hashbrown::HashMap;
use rayon::prelude::*;
use relief_types::{OPAQUE_ALPHA_THRESHOLD, PixelBuffer};
use tracing::debug;

use crate::sample::ColorSample;

/// Pixels per work item when accumulating in parallel.
const CHUNK_PIXELS: usize = 16 * 1024;

/// Pixels that share a quantized color, with the sum of their real colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
}

impl Bucket {
    fn add(&mut self, other: Self) {
        self.count += other.count;
        for (acc, s) in self.sum.iter_mut().zip(other.sum) {
            *acc += s;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    // Channel sums stay far below 2^53 for any image that fits in memory
    fn mean(&self) -> [f64; 3] {
        let n = self.count.max(1) as f64;
        self.sum.map(|s| s as f64 / n)
    }
}

/// A histogram keyed by quantized RGB.
///
/// Quantization only groups pixels; each bucket keeps the mean of the colors
/// that fell into it.
#[derive(Debug, Clone, Default)]
pub struct ColorHistogram {
    buckets: HashMap<[u8; 3], Bucket>,
    opaque_pixels: u64,
}

impl ColorHistogram {
    /// Count the opaque pixels of `image`, snapping each channel to one of
    /// `levels` evenly spaced values.
    ///
    /// The result is the same whether `parallel` is set or not.
    #[must_use]
    pub fn build(image: &PixelBuffer, levels: u32, parallel: bool) -> Self {
        let step = 256.0 / f64::from(levels.clamp(2, 256));
        let raw = image.as_raw();

        let histogram = if parallel {
            raw.par_chunks(CHUNK_PIXELS * 4)
                .fold(Self::default, |mut acc, chunk| {
                    acc.accumulate(chunk, step);
                    acc
                })
                .reduce(Self::default, Self::merge)
        } else {
            let mut acc = Self::default();
            acc.accumulate(raw, step);
            acc
        };

        debug!(
            opaque = histogram.opaque_pixels,
            buckets = histogram.buckets.len(),
            "Built color histogram"
        );
        histogram
    }

    fn accumulate(&mut self, bytes: &[u8], step: f64) {
        for px in bytes.chunks_exact(4) {
            if px[3] < OPAQUE_ALPHA_THRESHOLD {
                continue;
            }
            let key = [
                quantize(px[0], step),
                quantize(px[1], step),
                quantize(px[2], step),
            ];
            self.buckets.entry(key).or_default().add(Bucket {
                count: 1,
                sum: [u64::from(px[0]), u64::from(px[1]), u64::from(px[2])],
            });
            self.opaque_pixels += 1;
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (key, bucket) in other.buckets {
            self.buckets.entry(key).or_default().add(bucket);
        }
        self.opaque_pixels += other.opaque_pixels;
        self
    }

    /// Number of opaque pixels counted.
    #[must_use]
    pub const fn opaque_pixels(&self) -> u64 {
        self.opaque_pixels
    }

    /// Number of distinct buckets.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Buckets as samples at their mean color, sorted by quantized color so
    /// that downstream processing never depends on hash order.
    #[must_use]
    pub fn samples(&self) -> Vec<ColorSample> {
        let mut entries: Vec<_> = self.buckets.iter().map(|(k, b)| (*k, *b)).collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries
            .into_iter()
            .map(|(_, bucket)| ColorSample::new(bucket.mean(), bucket.count))
            .collect()
    }
}

/// Snap a channel to the nearest multiple of `step`, capped at 255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Result is clamped to [0, 255] before the cast
fn quantize(value: u8, step: f64) -> u8 {
    ((f64::from(value) / step).round() * step).min(255.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn quantize_snaps_to_grid() {
        let step = 256.0 / 64.0;
        assert_eq!(quantize(0, step), 0);
        assert_eq!(quantize(1, step), 0);
        assert_eq!(quantize(2, step), 4);
        assert_eq!(quantize(130, step), 132);
        assert_eq!(quantize(255, step), 255);
    }

    #[test]
    fn skips_transparent_pixels() {
        let img = PixelBuffer::from_fn(4, 4, |x, _| {
            if x < 2 {
                [10, 20, 30, 255]
            } else {
                [200, 200, 200, 100]
            }
        });
        let h = ColorHistogram::build(&img, 64, false);
        assert_eq!(h.opaque_pixels(), 8);
        assert_eq!(h.bucket_count(), 1);
    }

    #[test]
    fn samples_keep_the_mean_color() {
        let img = PixelBuffer::from_fn(4, 1, |x, _| {
            if x % 2 == 0 {
                [201, 99, 37, 255]
            } else {
                [199, 99, 37, 255]
            }
        });
        let h = ColorHistogram::build(&img, 64, false);
        let samples = h.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].count, 4);
        assert_eq!(samples[0].rgb, [200.0, 99.0, 37.0]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let img = PixelBuffer::from_fn(300, 200, |x, y| {
            [(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8, 255]
        });
        let seq = ColorHistogram::build(&img, 32, false);
        let par = ColorHistogram::build(&img, 32, true);
        assert_eq!(seq.opaque_pixels(), par.opaque_pixels());
        assert_eq!(seq.samples(), par.samples());
    }
}
