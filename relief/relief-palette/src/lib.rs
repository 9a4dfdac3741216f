//! Layer palettes for relief prints.
//!
//! This crate turns a photo into an ordered [`LayerStack`](relief_types::LayerStack):
//! the filament colors a multi-material printer stacks from the base up.
//!
//! # Features
//!
//! - **Dominant colors**: histogram, merge and greedy selection of distinct,
//!   important colors spanning the darkest and lightest tones
//! - **Perceptual metric**: blended RGB and HSL distance with circular hue
//! - **Presets**: fixed and distributed grayscale ramps, posterized bands
//! - **Parallel histogram**: map-reduce over pixel chunks with rayon
//!
//! # Layer 0 Crate
//!
//! This crate has no GUI or I/O dependencies. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//!
//! # Example
//!
//! ```
//! use relief_palette::{PaletteParams, PalettePattern, extract_palette};
//! use relief_types::PixelBuffer;
//!
//! let img = PixelBuffer::from_fn(64, 64, |x, y| [(x * 4) as u8, (y * 4) as u8, 90, 255]);
//!
//! let stack = extract_palette(&img, &PaletteParams::with_color_count(4));
//! assert!(stack.len() >= 2 && stack.len() <= 4);
//!
//! let gray = PalettePattern::GrayscaleDistributed.generate(&img);
//! assert_eq!(gray.len(), 4);
//! ```
//!
//! # Algorithm
//!
//! 1. Quantize opaque pixels into a histogram and drop buckets below the
//!    noise cutoff
//! 2. Merge samples closer than the similarity threshold, repeating until a
//!    pass makes no merge
//! 3. Seed the selection with the darkest and lightest samples, then pick
//!    the candidate maximizing `importance * min_distance^1.5`
//! 4. Sort by lightness and space the height fractions evenly

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod dominant;
mod histogram;
mod params;
mod presets;
mod sample;

pub use dominant::extract_palette;
pub use histogram::ColorHistogram;
pub use params::PaletteParams;
pub use presets::PalettePattern;
pub use sample::{ColorSample, Hsl};
