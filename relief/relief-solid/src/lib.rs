//! Watertight relief solids from height fields.
//!
//! This crate samples a [`HeightField`](relief_height::HeightField) on a
//! regular grid and closes the resulting open surface into a printable
//! solid:
//!
//! - [`SurfaceGrid`] - an `R x R'` vertex grid sized by the image aspect
//! - [`BoundaryChains`] - the four perimeter chains of the grid
//! - [`extrude_solid`] - side walls down to the base plane plus a fan cap
//! - [`validate_solid`] - watertight, manifold and winding checks
//! - [`SolidBuilder`] - fluent API over all of the above
//!
//! # Layer 0 Crate
//!
//! This crate has no GUI or I/O dependencies. It can be used in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//!
//! # Face Count
//!
//! For a `c x r` grid the solid has `2(c-1)(r-1)` surface triangles,
//! `4(c-1) + 4(r-1)` wall triangles and `2(c-1) + 2(r-1)` cap triangles.

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod boundary;
mod builder;
mod error;
mod extrude;
mod params;
mod surface;
mod validation;

pub use boundary::BoundaryChains;
pub use builder::{SolidBuildResult, SolidBuilder};
pub use error::{SolidError, SolidResult};
pub use extrude::{ExtrusionStats, extrude_solid};
pub use params::{ExtrusionParams, SurfaceParams};
pub use surface::SurfaceGrid;
pub use validation::{SolidValidation, validate_solid};
