//! Photo to multi-color relief solids, ready for a slicer.
//!
//! This umbrella crate re-exports the relief-* crates and adds [`Relief`],
//! which runs the whole pipeline from a decoded image to print-file bytes.
//! All crates are Layer 0 (no engine dependencies) and can be used from CLI
//! tools, servers or bindings.
//!
//! # Quick Start
//!
//! ```no_run
//! use relief::prelude::*;
//!
//! # let image = PixelBuffer::filled(640, 480, [90, 140, 200, 255]);
//! let params = ReliefParams::default().with_resolution(300);
//! let relief = Relief::new(&image, params);
//!
//! for range in relief.layer_ranges() {
//!     println!("{}: layers {}-{}", range.color, range.start, range.end);
//! }
//! relief.export_to_path(ExportTarget::Bambu3mf, "portrait.bambu.3mf").unwrap();
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Colors, layer stacks, pixel buffers, indexed meshes
//! - [`palette`] - Dominant-color extraction and stack presets
//! - [`height`] - Pixel to height mapping over the extended palette
//! - [`solid`] - Surface grid, watertight extrusion, validation
//! - [`export`] - Layer changes, STL and the three 3MF flavors
//!
//! # Feature Flags
//!
//! - `serde` - Serialize and deserialize parameters and layer configs

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod params;
mod pipeline;

pub use error::{ReliefError, ReliefResult};
pub use params::{MAX_RESOLUTION, MIN_RESOLUTION, ReliefParams};
pub use pipeline::Relief;

// =============================================================================
// Re-exports
// =============================================================================

/// Colors, layer stacks, pixel buffers and indexed meshes.
pub use relief_types as types;

/// Dominant-color extraction and stack presets.
pub use relief_palette as palette;

/// Pixel to height mapping.
pub use relief_height as height;

/// Surface grid, watertight extrusion and validation.
pub use relief_solid as solid;

/// Layer-change calculation and print-file export.
pub use relief_export as export;

pub use relief_export::ExportTarget;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for building reliefs.
///
/// ```
/// use relief::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use relief_types::{
        IndexedMesh, LayerEdit, LayerSpec, LayerStack, MeshBounds, MeshTopology, PixelBuffer, Rgb,
    };
    // Stack generation and heights
    pub use relief_height::{HeightMode, HeightParams};
    pub use relief_palette::{PaletteParams, PalettePattern};
    // Geometry
    pub use relief_solid::{SolidBuilder, validate_solid};
    // Export
    pub use relief_export::{ExportOptions, ExportTarget, LayerRange, PrintSettings, ToolChange};
    // Pipeline
    pub use crate::{Relief, ReliefParams};
}

// =============================================================================
// Tests
// =============================================================================
