//! Height mapping for relief prints.
//!
//! Converts image colors into extrusion heights, either from luminance or by
//! matching each color against an extended layer palette.
//!
//! # Layer 0 Crate
//!
//! This crate has no GUI or I/O dependencies. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//!
//! # Modes
//!
//! - [`HeightMode::Luminance`]: `mean(R, G, B) / 255 * max_height`
//! - [`HeightMode::PaletteDistance`]: height fraction of the nearest entry of
//!   the [`ExtendedPalette`], times `max_height`
//!
//! Either mode can be stepped to multiples of a print layer height.
//!
//! # Example
//!
//! ```
//! use relief_height::{HeightField, HeightMapper, HeightParams};
//! use relief_types::{LayerStack, PixelBuffer};
//!
//! let img = PixelBuffer::filled(8, 8, [0, 0, 0, 255]);
//! let stack = LayerStack::default();
//! let mapper = HeightMapper::new(&img, &stack, HeightParams::palette_distance(2.0));
//!
//! // Black is the bottom layer of the default stack, at 20% of the height.
//! assert!((mapper.height(0.5, 0.5) - 0.4).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod mapper;
mod palette;
mod params;

pub use mapper::{HeightField, HeightMapper};
pub use palette::{ExtendedPalette, PaletteEntry};
pub use params::{HeightMode, HeightParams, Sampling};
