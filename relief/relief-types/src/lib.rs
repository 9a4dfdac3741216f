//! Core types for the relief pipeline.
//!
//! This crate provides the values every other stage passes around:
//!
//! - [`PixelBuffer`] - decoded RGBA8 image data with an opacity gate
//! - [`Rgb`] - 8-bit color with hex parsing
//! - [`LayerSpec`] / [`LayerStack`] - the ordered filament bands of a print,
//!   with [`LayerEdit`] operations and the [`LayerConfig`] interchange form
//! - [`FilamentColor`] - a static library of purchasable filament colors
//! - [`IndexedMesh`] / [`Vertex`] / [`Aabb`] - triangle meshes in millimeters
//!
//! # Layer 0 Crate
//!
//! This crate has no GUI or I/O dependencies. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//!
//! # Coordinate System
//!
//! Right-handed, millimeters:
//! - X: image width (left/right)
//! - Y: image height (bottom/top, image row 0 at max Y)
//! - Z: relief height
//!
//! Face winding is counter-clockwise when viewed from outside.
//!
//! # Example
//!
//! ```
//! use relief_types::{LayerEdit, LayerStack, Rgb};
//!
//! let stack = LayerStack::default();
//! let edited = stack
//!     .apply(LayerEdit::RemoveLayer { index: 2 })
//!     .unwrap();
//!
//! assert_eq!(edited.len(), 4);
//! assert_eq!(edited.layers()[3].height_fraction(), 1.0);
//! assert_eq!(edited.layers()[0].color(), Rgb::BLACK);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod color;
mod error;
mod filament;
mod layer;
mod mesh;
mod pixel;
mod traits;
mod triangle;
mod vertex;

pub use bounds::Aabb;
pub use color::Rgb;
pub use error::{TypesError, TypesResult};
pub use filament::{FILAMENTS, FilamentColor, filaments, nearest_filament};
pub use layer::{
    LayerConfig, LayerEdit, LayerSpec, LayerStack, MAX_LAYERS, MIN_DIVIDER_GAP, MIN_LAYERS,
    MIN_TRANSMISSION_DISTANCE,
};
pub use mesh::IndexedMesh;
pub use pixel::{OPAQUE_ALPHA_THRESHOLD, PixelBuffer};
pub use traits::{MeshBounds, MeshTopology};
pub use triangle::Triangle;
pub use vertex::Vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
