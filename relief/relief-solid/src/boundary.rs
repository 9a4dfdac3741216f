//! Boundary chains of a rectangular surface.

use relief_types::{IndexedMesh, MeshBounds};
use tracing::debug;

use crate::error::{SolidError, SolidResult};

/// Relative tolerance for matching a coordinate to a bounding-box side.
const SIDE_EPSILON: f64 = 1e-9;

/// The four perimeter chains of an axis-aligned rectangular surface.
///
/// Each chain is sorted ascending along its running coordinate: `bottom`
/// and `top` by X, `left` and `right` by Y. Corner vertices appear in both
/// chains that meet there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryChains {
    /// Vertices at min Y.
    pub bottom: Vec<u32>,
    /// Vertices at max X.
    pub right: Vec<u32>,
    /// Vertices at max Y.
    pub top: Vec<u32>,
    /// Vertices at min X.
    pub left: Vec<u32>,
}

impl BoundaryChains {
    /// Find the chains of `surface` by matching vertex coordinates against
    /// the bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`SolidError::DegenerateGeometry`] if the surface has no
    /// extent along X or Y, or if any chain has fewer than two vertices.
    pub fn find(surface: &IndexedMesh) -> SolidResult<Self> {
        let bounds = surface.bounds();
        if bounds.is_empty() {
            return Err(SolidError::degenerate("surface has no vertices"));
        }
        let size = bounds.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(SolidError::degenerate(format!(
                "surface footprint {:.3} x {:.3} mm has no area",
                size.x, size.y
            )));
        }
        let tol = SIDE_EPSILON * size.x.max(size.y).max(1.0);

        let mut chains = Self {
            bottom: Vec::new(),
            right: Vec::new(),
            top: Vec::new(),
            left: Vec::new(),
        };
        for (i, vertex) in (0u32..).zip(&surface.vertices) {
            let p = vertex.position;
            if (p.y - bounds.min.y).abs() <= tol {
                chains.bottom.push(i);
            }
            if (p.x - bounds.max.x).abs() <= tol {
                chains.right.push(i);
            }
            if (p.y - bounds.max.y).abs() <= tol {
                chains.top.push(i);
            }
            if (p.x - bounds.min.x).abs() <= tol {
                chains.left.push(i);
            }
        }

        let by_x = |a: &u32, b: &u32| surface.position(*a).x.total_cmp(&surface.position(*b).x);
        let by_y = |a: &u32, b: &u32| surface.position(*a).y.total_cmp(&surface.position(*b).y);
        chains.bottom.sort_by(by_x);
        chains.top.sort_by(by_x);
        chains.right.sort_by(by_y);
        chains.left.sort_by(by_y);

        for (name, chain) in chains.named() {
            if chain.len() < 2 {
                return Err(SolidError::degenerate(format!(
                    "{name} boundary chain has {} vertex(es)",
                    chain.len()
                )));
            }
        }

        debug!(
            bottom = chains.bottom.len(),
            right = chains.right.len(),
            top = chains.top.len(),
            left = chains.left.len(),
            "Resolved boundary chains"
        );
        Ok(chains)
    }

    fn named(&self) -> [(&'static str, &[u32]); 4] {
        [
            ("bottom", self.bottom.as_slice()),
            ("right", self.right.as_slice()),
            ("top", self.top.as_slice()),
            ("left", self.left.as_slice()),
        ]
    }

    /// Total number of boundary edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.named().iter().map(|(_, c)| c.len().saturating_sub(1)).sum()
    }

    /// The closed perimeter, counter-clockwise seen from +Z: bottom forward,
    /// right forward, top reversed, left reversed. Shared corners appear once.
    #[must_use]
    pub fn perimeter(&self) -> Vec<u32> {
        let mut ring = Vec::with_capacity(self.edge_count());
        let walk = self
            .bottom
            .iter()
            .chain(&self.right)
            .chain(self.top.iter().rev())
            .chain(self.left.iter().rev());
        for &i in walk {
            if ring.last() != Some(&i) {
                ring.push(i);
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        ring
    }
}
