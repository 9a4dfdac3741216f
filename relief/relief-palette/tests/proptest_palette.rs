//! Property-based tests for palette extraction.
//!
//! Run with: cargo test -p relief-palette -- proptest

use proptest::prelude::*;
use relief_palette::{Hsl, PaletteParams, PalettePattern, extract_palette};
use relief_types::{LayerSpec, PixelBuffer, Rgb};

// =============================================================================
// Strategies
// =============================================================================

/// A small image built from a handful of random opaque colors, plus some
/// transparent pixels.
fn arb_image() -> impl Strategy<Value = PixelBuffer> {
    (
        prop::collection::vec(prop::array::uniform3(any::<u8>()), 1..6),
        4u32..24,
        4u32..24,
    )
        .prop_map(|(colors, width, height)| {
            PixelBuffer::from_fn(width, height, |x, y| {
                let i = (x * 7 + y * 3) as usize % (colors.len() + 1);
                match colors.get(i) {
                    Some(&[r, g, b]) => [r, g, b, 255],
                    None => [0, 0, 0, 0],
                }
            })
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Extracted fractions are strictly increasing and end at 1.0.
    #[test]
    fn proptest_monotonic_palette(img in arb_image(), k in 2usize..=15) {
        let stack = extract_palette(&img, &PaletteParams::with_color_count(k));
        let fractions: Vec<f64> = stack.iter().map(LayerSpec::height_fraction).collect();

        prop_assert!(stack.len() >= 2 && stack.len() <= k.max(2));
        prop_assert!(fractions.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(fractions.last().copied(), Some(1.0));
    }

    /// Lightness never decreases up the stack of extracted colors.
    #[test]
    fn proptest_dark_to_light(img in arb_image()) {
        let stack = extract_palette(&img, &PaletteParams::default());
        let lightness = |c: Rgb| Hsl::from_rgb(f64::from(c.r), f64::from(c.g), f64::from(c.b)).lightness;
        let first = lightness(stack.layers()[0].color());
        let last = lightness(stack.layers()[stack.len() - 1].color());
        prop_assert!(first <= last + 1.0 / 255.0);
    }

    /// A single opaque color yields a two-layer stack of that color when K = 2.
    #[test]
    fn proptest_single_color_extremes(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let color = Rgb::new(r, g, b);
        let img = PixelBuffer::filled(9, 7, [color.r, color.g, color.b, 255]);
        let stack = extract_palette(&img, &PaletteParams::with_color_count(2));

        prop_assert_eq!(stack.len(), 2);
        prop_assert_eq!(stack.layers()[0].color(), color);
        prop_assert_eq!(stack.layers()[1].color(), color);
    }

    /// Presets are valid stacks for any image.
    #[test]
    fn proptest_posterized_is_valid(img in arb_image()) {
        let stack = PalettePattern::Posterized.generate(&img);
        let fractions: Vec<f64> = stack.iter().map(LayerSpec::height_fraction).collect();
        prop_assert!(fractions.windows(2).all(|w| w[0] < w[1]));
    }
}
