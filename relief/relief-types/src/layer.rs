//! Filament layer stacks.
//!
//! A [`LayerStack`] is the ordered list of filament colors that make up a
//! relief print, bottom (darkest) first. Each [`LayerSpec`] color starts at
//! the print layer nearest its own height fraction and runs up to the layer
//! where the next color starts. The top color covers the last layer.
//!
//! Stacks are immutable values. Edits are expressed as [`LayerEdit`]
//! operations that produce a new, re-validated stack.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{TypesError, TypesResult};

/// Fewest layers a stack may hold.
pub const MIN_LAYERS: usize = 2;

/// Most layers a stack may hold.
pub const MAX_LAYERS: usize = 15;

/// Transmission distances at or below zero are raised to this value.
pub const MIN_TRANSMISSION_DISTANCE: f64 = 1e-3;

/// Smallest gap kept between neighbouring dividers when one is moved.
pub const MIN_DIVIDER_GAP: f64 = 1e-3;

/// Tolerance used when checking that the top layer ends at 1.0.
const TOP_FRACTION_EPSILON: f64 = 1e-9;

/// One filament band of the print.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawLayerSpec"))]
pub struct LayerSpec {
    color: Rgb,
    height_fraction: f64,
    transmission_distance: f64,
}

/// Deserialized fields, passed through [`LayerSpec::new`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawLayerSpec {
    color: Rgb,
    height_fraction: f64,
    transmission_distance: f64,
}

#[cfg(feature = "serde")]
impl From<RawLayerSpec> for LayerSpec {
    fn from(raw: RawLayerSpec) -> Self {
        Self::new(raw.color, raw.height_fraction, raw.transmission_distance)
    }
}

impl LayerSpec {
    /// Create a layer.
    ///
    /// A non-positive or non-finite transmission distance is clamped to
    /// [`MIN_TRANSMISSION_DISTANCE`] so that blend ratios never divide by zero.
    #[must_use]
    pub fn new(color: Rgb, height_fraction: f64, transmission_distance: f64) -> Self {
        let transmission_distance = if transmission_distance.is_finite() {
            transmission_distance.max(MIN_TRANSMISSION_DISTANCE)
        } else {
            MIN_TRANSMISSION_DISTANCE
        };
        Self {
            color,
            height_fraction,
            transmission_distance,
        }
    }

    /// Filament color.
    #[inline]
    #[must_use]
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Cumulative height fraction in (0, 1] at which this band ends.
    #[inline]
    #[must_use]
    pub const fn height_fraction(&self) -> f64 {
        self.height_fraction
    }

    /// Transmission distance (TD), always positive.
    #[inline]
    #[must_use]
    pub const fn transmission_distance(&self) -> f64 {
        self.transmission_distance
    }

    const fn with_fraction(mut self, height_fraction: f64) -> Self {
        self.height_fraction = height_fraction;
        self
    }
}

/// A user edit applied to a [`LayerStack`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayerEdit {
    /// Append a color on top. Existing bands are compressed to make room.
    AddLayer {
        /// Filament color of the new top band.
        color: Rgb,
        /// Its transmission distance.
        transmission_distance: f64,
    },
    /// Remove the band at `index`.
    RemoveLayer {
        /// Index into the stack, bottom is 0.
        index: usize,
    },
    /// Move the upper divider of band `index` to `fraction`.
    MoveDivider {
        /// Index of the band whose top edge moves.
        index: usize,
        /// Requested new height fraction.
        fraction: f64,
    },
}

/// Ordered, validated list of layers.
///
/// Invariants:
/// - holds between [`MIN_LAYERS`] and [`MAX_LAYERS`] layers
/// - height fractions are finite, positive and strictly increasing
/// - the last fraction is exactly 1.0
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LayerStack {
    layers: Vec<LayerSpec>,
}

impl LayerStack {
    /// Validate and wrap a list of layers.
    ///
    /// A top fraction within `1e-9` of 1.0 is snapped to exactly 1.0 and
    /// transmission distances are clamped as in [`LayerSpec::new`].
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::LayerCount`] or [`TypesError::InvalidStack`]
    /// when an invariant does not hold.
    pub fn new(mut layers: Vec<LayerSpec>) -> TypesResult<Self> {
        if !(MIN_LAYERS..=MAX_LAYERS).contains(&layers.len()) {
            return Err(TypesError::LayerCount {
                min: MIN_LAYERS,
                max: MAX_LAYERS,
                got: layers.len(),
            });
        }

        let mut previous = 0.0;
        for (i, layer) in layers.iter().enumerate() {
            let f = layer.height_fraction;
            if !f.is_finite() || f <= 0.0 || f > 1.0 + TOP_FRACTION_EPSILON {
                return Err(TypesError::invalid_stack(format!(
                    "layer {i} fraction {f} outside (0, 1]"
                )));
            }
            if f <= previous {
                return Err(TypesError::invalid_stack(format!(
                    "layer {i} fraction {f} does not exceed {previous}"
                )));
            }
            previous = f;
        }

        if (previous - 1.0).abs() > TOP_FRACTION_EPSILON {
            return Err(TypesError::invalid_stack(format!(
                "top layer ends at {previous}, expected 1.0"
            )));
        }
        if let Some(top) = layers.last_mut() {
            top.height_fraction = 1.0;
        }
        for layer in &mut layers {
            *layer = LayerSpec::new(layer.color, layer.height_fraction, layer.transmission_distance);
        }

        Ok(Self { layers })
    }

    /// Build a stack with evenly spaced fractions `i / N` from colors and TDs.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::LayerCount`] if the color count is out of range.
    #[allow(clippy::cast_precision_loss)]
    pub fn evenly_spaced(colors: &[(Rgb, f64)]) -> TypesResult<Self> {
        let n = colors.len() as f64;
        Self::new(
            colors
                .iter()
                .enumerate()
                .map(|(i, &(color, td))| LayerSpec::new(color, (i + 1) as f64 / n, td))
                .collect(),
        )
    }

    /// The layers, bottom first.
    #[inline]
    #[must_use]
    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Always false; a valid stack holds at least two layers.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterate over the layers, bottom first.
    pub fn iter(&self) -> std::slice::Iter<'_, LayerSpec> {
        self.layers.iter()
    }

    /// Layer colors, bottom first.
    #[must_use]
    pub fn colors(&self) -> Vec<Rgb> {
        self.layers.iter().map(LayerSpec::color).collect()
    }

    /// Apply an edit, returning the new stack.
    ///
    /// # Errors
    ///
    /// Fails when the edit would break a stack invariant (too many or too few
    /// layers, moving the pinned top divider, a divider with no room to move)
    /// or references a missing layer.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_types::{LayerEdit, LayerStack, Rgb};
    ///
    /// let stack = LayerStack::default();
    /// let bigger = stack
    ///     .apply(LayerEdit::AddLayer { color: Rgb::new(200, 40, 40), transmission_distance: 3.0 })
    ///     .unwrap();
    /// assert_eq!(bigger.len(), stack.len() + 1);
    /// assert_eq!(stack.len(), 5); // the original is untouched
    /// ```
    pub fn apply(&self, edit: LayerEdit) -> TypesResult<Self> {
        match edit {
            LayerEdit::AddLayer {
                color,
                transmission_distance,
            } => self.add_layer(color, transmission_distance),
            LayerEdit::RemoveLayer { index } => self.remove_layer(index),
            LayerEdit::MoveDivider { index, fraction } => self.move_divider(index, fraction),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn add_layer(&self, color: Rgb, transmission_distance: f64) -> TypesResult<Self> {
        let n = self.layers.len();
        if n >= MAX_LAYERS {
            return Err(TypesError::LayerCount {
                min: MIN_LAYERS,
                max: MAX_LAYERS,
                got: n + 1,
            });
        }
        let scale = n as f64 / (n + 1) as f64;
        let mut layers: Vec<LayerSpec> = self
            .layers
            .iter()
            .map(|l| l.with_fraction(l.height_fraction * scale))
            .collect();
        layers.push(LayerSpec::new(color, 1.0, transmission_distance));
        Self::new(layers)
    }

    fn remove_layer(&self, index: usize) -> TypesResult<Self> {
        let n = self.layers.len();
        if index >= n {
            return Err(TypesError::IndexOutOfRange { index, len: n });
        }
        if n <= MIN_LAYERS {
            return Err(TypesError::LayerCount {
                min: MIN_LAYERS,
                max: MAX_LAYERS,
                got: n - 1,
            });
        }
        let mut layers = self.layers.clone();
        layers.remove(index);
        if let Some(top) = layers.last_mut() {
            top.height_fraction = 1.0;
        }
        Self::new(layers)
    }

    fn move_divider(&self, index: usize, fraction: f64) -> TypesResult<Self> {
        let n = self.layers.len();
        if index >= n {
            return Err(TypesError::IndexOutOfRange { index, len: n });
        }
        if index == n - 1 {
            return Err(TypesError::invalid_stack("the top divider is pinned at 1.0"));
        }
        if !fraction.is_finite() {
            return Err(TypesError::invalid_stack(format!(
                "divider fraction {fraction} is not finite"
            )));
        }

        let below = if index == 0 {
            0.0
        } else {
            self.layers[index - 1].height_fraction
        };
        let lower = below + MIN_DIVIDER_GAP;
        let upper = self.layers[index + 1].height_fraction - MIN_DIVIDER_GAP;
        if lower > upper {
            return Err(TypesError::invalid_stack(format!(
                "no room to move divider {index}"
            )));
        }

        let mut layers = self.layers.clone();
        layers[index].height_fraction = fraction.clamp(lower, upper);
        Self::new(layers)
    }
}

impl Default for LayerStack {
    /// Five evenly spaced grays from black to white.
    fn default() -> Self {
        let grays = [
            (Rgb::BLACK, 0.2, 0.6),
            (Rgb::gray(0x40), 0.4, 1.4),
            (Rgb::gray(0x80), 0.6, 2.0),
            (Rgb::gray(0xc0), 0.8, 2.8),
            (Rgb::WHITE, 1.0, 5.0),
        ];
        Self {
            layers: grays
                .iter()
                .map(|&(color, fraction, td)| LayerSpec::new(color, fraction, td))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LayerStack {
    type Item = &'a LayerSpec;
    type IntoIter = std::slice::Iter<'a, LayerSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

/// Interchange form of a layer: `{ color: "#RRGGBB", heightPercentage, td }`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct LayerConfig {
    /// Hex color string.
    pub color: String,
    /// Cumulative height in percent (0-100).
    pub height_percentage: f64,
    /// Transmission distance.
    pub td: f64,
}

impl From<&LayerSpec> for LayerConfig {
    fn from(spec: &LayerSpec) -> Self {
        Self {
            color: spec.color.to_hex(),
            height_percentage: spec.height_fraction * 100.0,
            td: spec.transmission_distance,
        }
    }
}

impl TryFrom<&LayerConfig> for LayerSpec {
    type Error = TypesError;

    fn try_from(config: &LayerConfig) -> TypesResult<Self> {
        Ok(Self::new(
            Rgb::from_hex(&config.color)?,
            config.height_percentage / 100.0,
            config.td,
        ))
    }
}

impl LayerStack {
    /// Build a stack from its interchange form.
    ///
    /// # Errors
    ///
    /// Fails on malformed colors or when the resulting stack is invalid.
    pub fn from_configs(configs: &[LayerConfig]) -> TypesResult<Self> {
        let layers = configs
            .iter()
            .map(LayerSpec::try_from)
            .collect::<TypesResult<Vec<_>>>()?;
        Self::new(layers)
    }

    /// Convert to the interchange form.
    #[must_use]
    pub fn to_configs(&self) -> Vec<LayerConfig> {
        self.layers.iter().map(LayerConfig::from).collect()
    }
}
