//! Layer-change calculation and export for relief solids.
//!
//! This crate turns a closed relief mesh plus its [`LayerStack`] into the
//! bytes of a print file:
//!
//! - [`LayerChangeCalculator`] - the single source of color-change layers
//!   and heights, shared by every format
//! - [`write_stl`] - binary or ASCII triangle soup
//! - [`write_generic_3mf`] - core-schema 3MF with readable color notes
//! - [`write_prusa_3mf`] - PrusaSlicer project with `M600` color changes
//! - [`write_bambu_3mf`] - Bambu Studio project with tool changes
//!
//! All 3MF variants write the model through the same vertex/triangle
//! encoder, and the mesh is never modified: bed placement is carried by the
//! build item transform.
//!
//! # Example
//!
//! ```
//! use relief_export::{ExportOptions, ExportRequest, ExportTarget, PrintSettings, export_bytes};
//! use relief_types::{IndexedMesh, LayerStack, Vertex};
//!
//! let mesh = IndexedMesh::from_parts(
//!     vec![
//!         Vertex::from_coords(0.0, 0.0, 0.0),
//!         Vertex::from_coords(1.0, 0.0, 0.0),
//!         Vertex::from_coords(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//! let stack = LayerStack::default();
//! let request = ExportRequest::new(&mesh, &stack)
//!     .settings(PrintSettings::default())
//!     .options(ExportOptions::reproducible("2024-01-01"));
//!
//! let bytes = export_bytes(ExportTarget::Generic3mf, &request).unwrap();
//! assert_eq!(&bytes[..2], b"PK");
//! ```
//!
//! [`LayerStack`]: relief_types::LayerStack

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bambu;
mod encode;
mod error;
mod export;
mod generic;
mod layer_change;
mod model;
mod package;
mod prusa;
mod request;
mod settings;
mod stl;
mod thumbnail;

pub use bambu::write_bambu_3mf;
pub use error::{ExportError, ExportResult};
pub use export::{export_bytes, export_to_path};
pub use generic::write_generic_3mf;
pub use layer_change::{LayerChangeCalculator, LayerRange, ToolChange};
pub use prusa::write_prusa_3mf;
pub use request::ExportRequest;
pub use settings::{ExportOptions, ExportTarget, PrintSettings, StlFormat};
pub use stl::write_stl;
pub use thumbnail::render_thumbnail;
