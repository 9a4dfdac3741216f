//! Solid validation.
//!
//! Checks that an extruded relief is a closed, consistently wound
//! 2-manifold, which is what slicers need to print it.

use hashbrown::HashMap;
use relief_types::{IndexedMesh, MeshTopology};
use tracing::{debug, warn};

/// Result of solid validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidValidation {
    /// Total vertex count.
    pub vertex_count: usize,
    /// Total face count.
    pub face_count: usize,
    /// Edges used by exactly one face.
    pub boundary_edge_count: usize,
    /// Edges used by more than two faces.
    pub non_manifold_edge_count: usize,
    /// Directed edges used twice in the same direction.
    pub inconsistent_edge_count: usize,
    /// Faces with a repeated vertex index.
    pub degenerate_face_count: usize,
    /// Signed volume in cubic millimeters.
    pub signed_volume: f64,
}

impl SolidValidation {
    /// No boundary edges.
    #[must_use]
    pub const fn is_watertight(&self) -> bool {
        self.boundary_edge_count == 0
    }

    /// No edge shared by more than two faces.
    #[must_use]
    pub const fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Every edge is traversed once in each direction.
    #[must_use]
    pub const fn has_consistent_winding(&self) -> bool {
        self.inconsistent_edge_count == 0
    }

    /// Closed, manifold, consistently wound and outward facing.
    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.face_count > 0
            && self.is_watertight()
            && self.is_manifold()
            && self.has_consistent_winding()
            && self.degenerate_face_count == 0
            && self.signed_volume > 0.0
    }
}

impl std::fmt::Display for SolidValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yes_no = |ok: bool| if ok { "yes" } else { "NO" };
        writeln!(f, "Solid Validation:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(
            f,
            "  Watertight: {} (boundary edges: {})",
            yes_no(self.is_watertight()),
            self.boundary_edge_count
        )?;
        writeln!(
            f,
            "  Manifold: {} (non-manifold edges: {})",
            yes_no(self.is_manifold()),
            self.non_manifold_edge_count
        )?;
        writeln!(
            f,
            "  Consistent winding: {} (repeated directed edges: {})",
            yes_no(self.has_consistent_winding()),
            self.inconsistent_edge_count
        )?;
        writeln!(f, "  Volume: {:.3} mm^3", self.signed_volume)?;
        write!(f, "  Printable: {}", yes_no(self.is_printable()))
    }
}

/// Count boundary, non-manifold and misoriented edges of `mesh`.
///
/// # Example
///
/// ```
/// use relief_solid::validate_solid;
/// use relief_types::{IndexedMesh, Vertex};
///
/// let mut mesh = IndexedMesh::new();
/// for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
///     mesh.push_vertex(Vertex::from(p));
/// }
/// mesh.faces.push([0, 1, 2]);
///
/// let report = validate_solid(&mesh);
/// assert_eq!(report.boundary_edge_count, 3);
/// assert!(!report.is_printable());
/// ```
#[must_use]
pub fn validate_solid(mesh: &IndexedMesh) -> SolidValidation {
    let mut undirected: HashMap<(u32, u32), usize> = HashMap::new();
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    let mut degenerate_face_count = 0;

    for [a, b, c] in mesh.faces() {
        if a == b || b == c || c == a {
            degenerate_face_count += 1;
            continue;
        }
        for (from, to) in [(a, b), (b, c), (c, a)] {
            *undirected.entry(normalize_edge(from, to)).or_insert(0) += 1;
            *directed.entry((from, to)).or_insert(0) += 1;
        }
    }

    let boundary_edge_count = undirected.values().filter(|&&n| n == 1).count();
    let non_manifold_edge_count = undirected.values().filter(|&&n| n > 2).count();
    let inconsistent_edge_count = directed.values().filter(|&&n| n > 1).count();

    let report = SolidValidation {
        vertex_count: mesh.vertex_count(),
        face_count: mesh.face_count(),
        boundary_edge_count,
        non_manifold_edge_count,
        inconsistent_edge_count,
        degenerate_face_count,
        signed_volume: mesh.signed_volume(),
    };

    if report.is_printable() {
        debug!(faces = report.face_count, "Solid is closed and manifold");
    } else {
        warn!(
            boundary = report.boundary_edge_count,
            non_manifold = report.non_manifold_edge_count,
            inconsistent = report.inconsistent_edge_count,
            degenerate = report.degenerate_face_count,
            "Solid failed validation"
        );
    }
    report
}

const fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
