//! Dominant-color extraction.
//!
//! The extractor builds a quantized histogram, drops noise buckets, merges
//! perceptually similar samples and then picks the darkest sample, the
//! lightest sample and up to `K - 2` distinct, important colors in between.

use relief_types::{LayerSpec, LayerStack, PixelBuffer, Rgb};
use tracing::{debug, info, warn};

use crate::histogram::ColorHistogram;
use crate::params::PaletteParams;
use crate::sample::ColorSample;

/// TD assigned to the bottom layer and used as the base of the jump heuristic.
const BASE_TRANSMISSION_DISTANCE: f64 = 1.5;

/// Extract an ordered layer stack of dominant colors from an image.
///
/// Layers are sorted darkest first with evenly spaced height fractions
/// `i / N`. An image without opaque pixels yields [`LayerStack::default`].
///
/// # Example
///
/// ```
/// use relief_palette::{PaletteParams, extract_palette};
/// use relief_types::{PixelBuffer, Rgb};
///
/// let img = PixelBuffer::from_fn(32, 32, |x, _| {
///     if x < 16 { [10, 10, 10, 255] } else { [240, 240, 240, 255] }
/// });
/// let stack = extract_palette(&img, &PaletteParams::with_color_count(2));
///
/// assert_eq!(stack.len(), 2);
/// assert!(stack.layers()[0].color().luma() < stack.layers()[1].color().luma());
/// ```
#[must_use]
pub fn extract_palette(image: &PixelBuffer, params: &PaletteParams) -> LayerStack {
    let color_count = params.effective_color_count();
    let histogram = ColorHistogram::build(image, params.quantize_levels, params.parallel);

    if histogram.opaque_pixels() == 0 {
        warn!(
            width = image.width(),
            height = image.height(),
            "No opaque pixels, using default grayscale stack"
        );
        return LayerStack::default();
    }

    let samples = drop_noise(histogram.samples(), histogram.opaque_pixels(), params);
    let merged = merge_similar(samples, params);
    let selected = select_colors(&merged, color_count, params);

    let stack = build_stack(selected);
    info!(
        opaque = histogram.opaque_pixels(),
        buckets = histogram.bucket_count(),
        merged = merged.len(),
        layers = stack.len(),
        "Extracted dominant palette"
    );
    stack
}

#[allow(clippy::cast_precision_loss)]
fn drop_noise(samples: Vec<ColorSample>, opaque: u64, params: &PaletteParams) -> Vec<ColorSample> {
    let cutoff = opaque as f64 * params.noise_fraction;
    let kept: Vec<_> = samples
        .iter()
        .copied()
        .filter(|s| s.count as f64 > cutoff)
        .collect();

    if kept.is_empty() {
        warn!(
            buckets = samples.len(),
            "Every bucket is below the noise cutoff, keeping all of them"
        );
        return samples;
    }
    debug!(
        kept = kept.len(),
        dropped = samples.len() - kept.len(),
        "Dropped noise buckets"
    );
    kept
}

fn sort_by_importance(samples: &mut [ColorSample]) {
    samples.sort_by(|a, b| {
        b.importance()
            .total_cmp(&a.importance())
            .then_with(|| a.rgb[0].total_cmp(&b.rgb[0]))
            .then_with(|| a.rgb[1].total_cmp(&b.rgb[1]))
            .then_with(|| a.rgb[2].total_cmp(&b.rgb[2]))
    });
}

/// Greedily fold samples into their most important near neighbour until a
/// full pass makes no merge.
fn merge_similar(mut samples: Vec<ColorSample>, params: &PaletteParams) -> Vec<ColorSample> {
    let mut passes = 0;
    loop {
        sort_by_importance(&mut samples);
        passes += 1;

        let mut absorbed = vec![false; samples.len()];
        let mut merged = Vec::with_capacity(samples.len());
        let mut changed = false;

        for i in 0..samples.len() {
            if absorbed[i] {
                continue;
            }
            absorbed[i] = true;
            let mut group = vec![samples[i]];
            for j in (i + 1)..samples.len() {
                if absorbed[j] {
                    continue;
                }
                if samples[i].distance(&samples[j], params) < params.similarity_threshold {
                    absorbed[j] = true;
                    group.push(samples[j]);
                }
            }
            if group.len() > 1 {
                changed = true;
                merged.push(ColorSample::weighted_mean(&group));
            } else {
                merged.push(samples[i]);
            }
        }

        samples = merged;
        if !changed {
            break;
        }
    }
    debug!(samples = samples.len(), passes, "Merged similar samples");
    samples
}

/// Darkest and lightest samples plus up to `color_count - 2` picks.
fn select_colors(
    samples: &[ColorSample],
    color_count: usize,
    params: &PaletteParams,
) -> Vec<ColorSample> {
    let darkest = samples
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.hsl.lightness.total_cmp(&b.hsl.lightness));
    let lightest = samples
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.hsl.lightness.total_cmp(&b.hsl.lightness));
    let (Some((dark_index, &dark)), Some((light_index, &light))) = (darkest, lightest) else {
        return Vec::new();
    };

    let mut candidates: Vec<ColorSample> = samples
        .iter()
        .enumerate()
        .filter(|&(i, s)| {
            i != dark_index
                && i != light_index
                && s.hsl.saturation > params.min_candidate_saturation
        })
        .map(|(_, s)| *s)
        .collect();

    let mut chosen = vec![dark, light];
    let mut picks = Vec::new();
    while picks.len() + 2 < color_count && !candidates.is_empty() {
        let best = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let nearest = chosen
                    .iter()
                    .map(|s| c.distance(s, params))
                    .fold(f64::INFINITY, f64::min);
                (i, c.importance() * nearest.powf(1.5))
            })
            .fold(None::<(usize, f64)>, |best, (i, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((i, score)),
            });
        let Some((index, _)) = best else { break };

        let pick = candidates.swap_remove(index);
        candidates.retain(|c| c.distance(&pick, params) >= params.similarity_threshold);
        chosen.push(pick);
        picks.push(pick);
    }
    debug!(picks = picks.len(), "Selected middle colors");

    let mut selection = Vec::with_capacity(picks.len() + 2);
    selection.push(dark);
    selection.extend(picks);
    selection.push(light);
    selection
}

#[allow(clippy::cast_precision_loss)]
fn build_stack(mut selection: Vec<ColorSample>) -> LayerStack {
    selection.sort_by(|a, b| a.hsl.lightness.total_cmp(&b.hsl.lightness));

    let mut entries: Vec<(Rgb, ColorSample)> = Vec::with_capacity(selection.len());
    for sample in selection {
        let color = sample.color();
        if entries.last().is_some_and(|(last, _)| *last == color) {
            continue;
        }
        entries.push((color, sample));
    }
    if let [only] = entries.as_slice() {
        // A single-color image still needs a bottom and a top layer.
        let only = *only;
        entries.push(only);
    }

    let n = entries.len() as f64;
    let layers = entries
        .iter()
        .enumerate()
        .map(|(i, (color, sample))| {
            let td = if i == 0 {
                BASE_TRANSMISSION_DISTANCE
            } else {
                let previous = &entries[i - 1].1.hsl;
                let lightness_jump = sample.hsl.lightness - previous.lightness;
                let saturation_jump = (sample.hsl.saturation - previous.saturation).abs();
                BASE_TRANSMISSION_DISTANCE + lightness_jump * 0.5 + saturation_jump * 0.3
            };
            LayerSpec::new(*color, (i + 1) as f64 / n, td)
        })
        .collect();

    LayerStack::new(layers).unwrap_or_else(|err| {
        warn!(%err, "Extracted palette is not a valid stack, using default");
        LayerStack::default()
    })
}
