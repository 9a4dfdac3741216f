//! Built-in filament color library.
//!
//! A read-only table of common PLA colors with measured transmission
//! distances. Callers use it to snap extracted palette colors to filaments
//! they can actually buy.

use crate::color::Rgb;

/// A catalogued filament.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilamentColor {
    /// Manufacturer or line.
    pub brand: &'static str,
    /// Marketing color name.
    pub name: &'static str,
    /// Nominal color.
    pub color: Rgb,
    /// Transmission distance in millimeters.
    pub transmission_distance: f64,
}

const fn filament(brand: &'static str, name: &'static str, hex: u32, td: f64) -> FilamentColor {
    #[allow(clippy::cast_possible_truncation)]
    let color = Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8);
    FilamentColor {
        brand,
        name,
        color,
        transmission_distance: td,
    }
}

/// The filament table, ordered by brand then by lightness.
pub const FILAMENTS: &[FilamentColor] = &[
    filament("Bambu Lab", "PLA Basic Black", 0x00_0000, 0.6),
    filament("Bambu Lab", "PLA Basic Charcoal", 0x18_1c20, 0.8),
    filament("Bambu Lab", "PLA Basic Dark Gray", 0x53_4d47, 1.4),
    filament("Bambu Lab", "PLA Basic Gray", 0x8d_7b70, 2.0),
    filament("Bambu Lab", "PLA Basic Silver", 0xb7_b2a9, 2.8),
    filament("Bambu Lab", "PLA Basic Ivory", 0xe3_e4de, 4.0),
    filament("Bambu Lab", "PLA Basic Jade White", 0xff_ffff, 5.0),
    filament("Bambu Lab", "PLA Basic Red", 0xc1_2e1f, 2.2),
    filament("Bambu Lab", "PLA Basic Orange", 0xff_6a13, 3.0),
    filament("Bambu Lab", "PLA Basic Yellow", 0xf4_ee2a, 4.5),
    filament("Bambu Lab", "PLA Basic Bambu Green", 0x00_ae42, 2.4),
    filament("Bambu Lab", "PLA Basic Cyan", 0x00_86d6, 2.6),
    filament("Bambu Lab", "PLA Basic Blue", 0x0a_2989, 1.2),
    filament("Bambu Lab", "PLA Basic Purple", 0x5e_43b7, 1.6),
    filament("Bambu Lab", "PLA Basic Magenta", 0xec_008c, 2.8),
    filament("Bambu Lab", "PLA Basic Brown", 0x9d_432c, 1.8),
    filament("Prusament", "PLA Jet Black", 0x1b_1b1b, 0.5),
    filament("Prusament", "PLA Galaxy Black", 0x2a_2a33, 0.7),
    filament("Prusament", "PLA Prusa Galaxy Silver", 0xa1_a4a8, 2.6),
    filament("Prusament", "PLA Signal White", 0xf4_f4f4, 4.8),
    filament("Prusament", "PLA Prusa Orange", 0xfa_6831, 3.1),
    filament("Prusament", "PLA Lipstick Red", 0xb0_1b2e, 1.9),
    filament("Prusament", "PLA Azure Blue", 0x2d_6fbd, 2.3),
    filament("Generic", "PLA Natural", 0xf0_ead6, 6.0),
];

/// All catalogued filaments.
#[must_use]
pub const fn filaments() -> &'static [FilamentColor] {
    FILAMENTS
}

/// The catalogued filament closest to `color` in RGB space.
///
/// # Example
///
/// ```
/// use relief_types::{Rgb, nearest_filament};
///
/// let f = nearest_filament(Rgb::new(250, 250, 250));
/// assert!(f.color.r > 240);
/// ```
#[must_use]
pub fn nearest_filament(color: Rgb) -> &'static FilamentColor {
    FILAMENTS
        .iter()
        .min_by_key(|f| f.color.distance_squared(color))
        .unwrap_or(&FILAMENTS[0])
}
