//! Extended palette: layer colors plus blended in-between colors.

use relief_types::{LayerStack, MIN_TRANSMISSION_DISTANCE, Rgb};

/// One color of the extended palette and the height fraction it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    /// Color to match against.
    pub color: Rgb,
    /// Height fraction in (0, 1].
    pub fraction: f64,
}

/// Layer colors followed by `steps` interpolated entries per adjacent pair.
///
/// Interpolated colors lean toward the more translucent neighbour: the blend
/// ratio is scaled by `td_a / (td_a + td_b)`. Interpolated heights are plain
/// linear interpolations of the two fractions.
///
/// Original layer colors come first so an exact tie resolves to a real layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedPalette {
    entries: Vec<PaletteEntry>,
}

impl ExtendedPalette {
    /// Build the extended palette of `stack`.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_height::ExtendedPalette;
    /// use relief_types::LayerStack;
    ///
    /// let stack = LayerStack::default();
    /// let palette = ExtendedPalette::new(&stack, 5);
    /// assert_eq!(palette.len(), 5 + 4 * 5);
    /// ```
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(stack: &LayerStack, steps: usize) -> Self {
        let layers = stack.layers();
        let mut entries: Vec<PaletteEntry> = layers
            .iter()
            .map(|l| PaletteEntry {
                color: l.color(),
                fraction: l.height_fraction(),
            })
            .collect();

        for pair in layers.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let td_a = a.transmission_distance().max(MIN_TRANSMISSION_DISTANCE);
            let td_b = b.transmission_distance().max(MIN_TRANSMISSION_DISTANCE);
            let reach = td_a / (td_a + td_b);
            for k in 1..=steps {
                let ratio = k as f64 / (steps + 1) as f64;
                entries.push(PaletteEntry {
                    color: a.color().mix(b.color(), ratio * reach),
                    fraction: (b.height_fraction() - a.height_fraction())
                        .mul_add(ratio, a.height_fraction()),
                });
            }
        }

        Self { entries }
    }

    /// All entries, originals first.
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry nearest to `color` in RGB space. The first of equally
    /// near entries wins.
    #[must_use]
    pub fn nearest(&self, color: Rgb) -> Option<&PaletteEntry> {
        self.entries
            .iter()
            .min_by_key(|e| e.color.distance_squared(color))
    }

    /// Height fraction of the entry nearest to `color`, or 0 for an empty
    /// palette.
    #[must_use]
    pub fn fraction_for(&self, color: Rgb) -> f64 {
        self.nearest(color).map_or(0.0, |e| e.fraction)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use relief_types::LayerSpec;

    fn black_white(td_black: f64, td_white: f64) -> LayerStack {
        LayerStack::new(vec![
            LayerSpec::new(Rgb::BLACK, 0.5, td_black),
            LayerSpec::new(Rgb::WHITE, 1.0, td_white),
        ])
        .unwrap()
    }

    #[test]
    fn originals_come_first() {
        let palette = ExtendedPalette::new(&black_white(1.0, 1.0), 3);
        assert_eq!(palette.len(), 5);
        assert_eq!(palette.entries()[0].color, Rgb::BLACK);
        assert_eq!(palette.entries()[1].color, Rgb::WHITE);
    }

    #[test]
    fn interpolated_heights_are_linear() {
        let palette = ExtendedPalette::new(&black_white(1.0, 1.0), 3);
        let fractions: Vec<f64> = palette.entries()[2..].iter().map(|e| e.fraction).collect();
        assert_relative_eq!(fractions[0], 0.625);
        assert_relative_eq!(fractions[1], 0.75);
        assert_relative_eq!(fractions[2], 0.875);
    }

    #[test]
    fn blend_is_scaled_by_transmission_distance() {
        // Equal TDs halve the blend ratio: the midpoint entry sits a quarter
        // of the way from black to white.
        let palette = ExtendedPalette::new(&black_white(1.0, 1.0), 1);
        assert_eq!(palette.entries()[2].color, Rgb::gray(64));

        // A much more translucent lower layer reaches nearly all the way.
        let palette = ExtendedPalette::new(&black_white(99.0, 1.0), 1);
        assert_eq!(palette.entries()[2].color, Rgb::gray(126));
    }

    #[test]
    fn zero_transmission_distances_blend_like_equal_ones() {
        let palette = ExtendedPalette::new(&black_white(0.0, 0.0), 1);
        assert_eq!(palette.entries()[2].color, Rgb::gray(64));
        assert!(palette.entries().iter().all(|e| e.fraction.is_finite()));
    }

    #[test]
    fn zero_steps_keeps_only_layers() {
        let palette = ExtendedPalette::new(&LayerStack::default(), 0);
        assert_eq!(palette.len(), 5);
    }

    #[test]
    fn nearest_prefers_exact_layer_color() {
        let palette = ExtendedPalette::new(&black_white(1.0, 1.0), 5);
        assert_eq!(palette.fraction_for(Rgb::BLACK), 0.5);
        assert_eq!(palette.fraction_for(Rgb::WHITE), 1.0);
        assert_eq!(palette.fraction_for(Rgb::gray(10)), 0.5);
    }
}
