//! Layer-change calculator.
//!
//! Every exporter derives color-change heights from [`LayerChangeCalculator`],
//! so STL notes, PrusaSlicer and Bambu Studio projects always agree.
//!
//! # Formula
//!
//! ```text
//! total  = floor((print_height - first_layer) / layer_height) + 1
//! index  = round(height_fraction * total), clamped to [1, total]
//! z      = first_layer + layer_height * (index - 1)
//! ```
//!
//! Rounding is half away from zero.

use relief_types::{LayerStack, Rgb};
use tracing::debug;

use crate::settings::PrintSettings;

/// Slack for layer counts that land a hair below an integer.
const LAYER_EPSILON: f64 = 1e-9;

/// A filament switch at an absolute print height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolChange {
    /// Print Z at which the new color starts, in millimeters.
    pub z_mm: f64,
    /// One-based print layer index.
    pub layer_index: u32,
    /// Color loaded from this layer on.
    pub color: Rgb,
    /// One-based extruder (filament slot) number.
    pub extruder: u32,
}

/// The inclusive print layers occupied by one stack entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerRange {
    /// Filament color.
    pub color: Rgb,
    /// First layer printed in this color.
    pub start: u32,
    /// Last layer printed in this color.
    pub end: u32,
}

impl LayerRange {
    /// Number of layers in the range. Zero when a neighbour swallowed it.
    #[must_use]
    pub const fn layer_count(&self) -> u32 {
        (self.end + 1).saturating_sub(self.start)
    }
}

/// Maps stack height fractions to print layers.
///
/// # Example
///
/// ```
/// use relief_export::LayerChangeCalculator;
///
/// let calc = LayerChangeCalculator::with_layer_count(0.08, 0.16, 25);
/// assert_eq!(calc.layer_index(0.5), 13);
/// assert!((calc.z_for_layer(13) - 1.12).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerChangeCalculator {
    layer_height_mm: f64,
    first_layer_height_mm: f64,
    total_layers: u32,
}

impl LayerChangeCalculator {
    /// Calculator for a print of `settings.total_print_height()`.
    #[must_use]
    pub fn new(settings: &PrintSettings) -> Self {
        let total = count_layers(
            settings.total_print_height(),
            settings.layer_height_mm,
            settings.first_layer_height_mm,
        );
        Self::with_layer_count(
            settings.layer_height_mm,
            settings.first_layer_height_mm,
            total,
        )
    }

    /// Calculator with a known layer count.
    #[must_use]
    pub fn with_layer_count(layer_height_mm: f64, first_layer_height_mm: f64, total: u32) -> Self {
        Self {
            layer_height_mm,
            first_layer_height_mm,
            total_layers: total.max(1),
        }
    }

    /// Number of print layers, first layer included.
    #[must_use]
    pub const fn total_layers(&self) -> u32 {
        self.total_layers
    }

    /// Print layer at which a band ending at `fraction` of the height starts
    /// showing its color.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // The product is clamped into [0, total] before the cast
    pub fn layer_index(&self, fraction: f64) -> u32 {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let index = (fraction * f64::from(self.total_layers)).round() as u32;
        index.clamp(1, self.total_layers)
    }

    /// Print Z of a one-based layer index.
    #[must_use]
    pub fn z_for_layer(&self, index: u32) -> f64 {
        self.first_layer_height_mm + self.layer_height_mm * f64::from(index.max(1) - 1)
    }

    /// One tool change per stack entry above the first, in stack order.
    #[must_use]
    pub fn tool_changes(&self, stack: &LayerStack) -> Vec<ToolChange> {
        let changes: Vec<ToolChange> = stack
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, layer)| {
                let layer_index = self.layer_index(layer.height_fraction());
                ToolChange {
                    z_mm: self.z_for_layer(layer_index),
                    layer_index,
                    color: layer.color(),
                    extruder: u32::try_from(i + 1).unwrap_or(u32::MAX),
                }
            })
            .collect();

        for change in &changes {
            debug!(
                layer = change.layer_index,
                z_mm = change.z_mm,
                color = %change.color,
                extruder = change.extruder,
                "Tool change"
            );
        }
        changes
    }

    /// Inclusive print layer range of every stack entry.
    ///
    /// Entry 0 starts at layer 1, every other entry starts at its tool
    /// change, and each range ends right before the next one starts.
    #[must_use]
    pub fn layer_ranges(&self, stack: &LayerStack) -> Vec<LayerRange> {
        let changes = self.tool_changes(stack);
        let starts: Vec<u32> = std::iter::once(1)
            .chain(changes.iter().map(|c| c.layer_index))
            .collect();

        stack
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let start = starts[i];
                let end = starts
                    .get(i + 1)
                    .map_or(self.total_layers, |next| next.saturating_sub(1));
                LayerRange {
                    color: layer.color(),
                    start,
                    end,
                }
            })
            .collect()
    }
}

/// Layers needed to reach `print_height`, first layer included.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
// Negative and non-finite quotients are filtered before the cast
fn count_layers(print_height: f64, layer_height: f64, first_layer_height: f64) -> u32 {
    let extra = (print_height - first_layer_height) / layer_height;
    if !extra.is_finite() || extra <= 0.0 {
        return 1;
    }
    let extra = (extra + LAYER_EPSILON).floor();
    if extra >= f64::from(u32::MAX - 1) {
        u32::MAX
    } else {
        extra as u32 + 1
    }
}
