//! 8-bit RGB color.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{TypesError, TypesResult};

/// RGB color with 8-bit components.
///
/// Used both for layer filament colors and for pixel lookups during
/// height mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
}

impl Rgb {
    /// Black color (0, 0, 0).
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// White color (255, 255, 255).
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Create a new color from RGB components.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_types::Rgb;
    ///
    /// let red = Rgb::new(255, 0, 0);
    /// assert_eq!(red.r, 255);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a gray with all three channels set to `value`.
    #[inline]
    #[must_use]
    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value)
    }

    /// Create a color from floating point channel values in the 0-255 range.
    ///
    /// Values are rounded and clamped.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Truncation and sign loss are safe: values are clamped to [0, 255] first
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Parse a `#RRGGBB` (or `RRGGBB`) hex string.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::InvalidColor`] if the string is not six hex digits.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_types::Rgb;
    ///
    /// let c = Rgb::from_hex("#8d7b70").unwrap();
    /// assert_eq!(c, Rgb::new(0x8d, 0x7b, 0x70));
    /// ```
    pub fn from_hex(value: &str) -> TypesResult<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypesError::invalid_color(value));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| TypesError::invalid_color(value))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Format as a lowercase `#rrggbb` string.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to floating point values in [0, 1] range.
    #[inline]
    #[must_use]
    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    /// Mean of the three channels, normalized to [0, 1].
    #[inline]
    #[must_use]
    pub fn mean_intensity(self) -> f64 {
        (f64::from(self.r) + f64::from(self.g) + f64::from(self.b)) / (3.0 * 255.0)
    }

    /// Rec.601 luma, normalized to [0, 1].
    #[inline]
    #[must_use]
    pub fn luma(self) -> f64 {
        0.114f64.mul_add(
            f64::from(self.b),
            0.299f64.mul_add(f64::from(self.r), 0.587 * f64::from(self.g)),
        ) / 255.0
    }

    /// Squared Euclidean distance in RGB space.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let v = i32::from(a) - i32::from(b);
            v.unsigned_abs() * v.unsigned_abs()
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    /// Blend toward `other` by `t` (0 keeps `self`, 1 gives `other`), rounding
    /// each channel to the nearest integer.
    #[must_use]
    pub fn mix(self, other: Self, t: f64) -> Self {
        let lerp = |a: u8, b: u8| f64::from(a).mul_add(1.0 - t, f64::from(b) * t);
        Self::from_f64(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}
