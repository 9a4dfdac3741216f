//! Closing an open height-field surface into a watertight solid.

use hashbrown::HashMap;
use relief_types::{IndexedMesh, MeshTopology, Point3, Vertex};
use tracing::{debug, info, warn};

use crate::boundary::BoundaryChains;
use crate::error::{SolidError, SolidResult};
use crate::params::ExtrusionParams;

/// Statistics from an extrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtrusionStats {
    /// Triangles of the original surface.
    pub surface_faces: usize,
    /// Triangles of the four side walls.
    pub wall_faces: usize,
    /// Triangles of the base cap.
    pub cap_faces: usize,
    /// Skirt vertices added at the base plane.
    pub skirt_vertices: usize,
}

impl std::fmt::Display for ExtrusionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "surface {} + walls {} + cap {} faces ({} skirt vertices)",
            self.surface_faces, self.wall_faces, self.cap_faces, self.skirt_vertices
        )
    }
}

/// Close `surface` into a solid with side walls down to `z = -T` and a
/// flat base.
///
/// The surface must be an axis-aligned rectangular grid whose triangles face
/// +Z. Walls and cap are wound so every face normal points out of the
/// solid, and skirt vertices are shared between the walls meeting at each
/// corner, so every edge of the result is used by exactly two faces.
///
/// # Errors
///
/// Returns [`SolidError::DegenerateGeometry`] if the boundary cannot be
/// resolved into four chains of at least two vertices, or
/// [`SolidError::InvalidParams`] for invalid params.
///
/// # Example
///
/// ```
/// use relief_solid::{ExtrusionParams, SurfaceGrid, extrude_solid};
/// use relief_types::MeshTopology;
///
/// let grid = SurfaceGrid { cols: 3, rows: 3, width_mm: 10.0, height_mm: 10.0 };
/// let surface = grid.build(&|_: f64, _: f64| 1.0);
/// let (solid, stats) = extrude_solid(&surface, &ExtrusionParams::with_base_thickness(2.0)).unwrap();
///
/// assert_eq!(stats.surface_faces, 8);
/// assert_eq!(solid.face_count(), 8 + 16 + 8);
/// ```
pub fn extrude_solid(
    surface: &IndexedMesh,
    params: &ExtrusionParams,
) -> SolidResult<(IndexedMesh, ExtrusionStats)> {
    params.validate()?;
    let chains = BoundaryChains::find(surface)?;
    check_spacing(&chains, surface, params.dedup_tolerance_mm);
    let base_z = -params.base_thickness_mm;

    let mut mesh = surface.clone();
    mesh.clear_normals();
    let surface_faces = mesh.face_count();

    // One skirt vertex per boundary vertex, shared by both walls at a corner.
    let mut skirt: HashMap<u32, u32> = HashMap::new();
    let mut skirt_of = |mesh: &mut IndexedMesh, top: u32| -> u32 {
        *skirt.entry(top).or_insert_with(|| {
            let p = mesh.position(top);
            mesh.push_vertex(Vertex::from_coords(p.x, p.y, base_z))
        })
    };

    let mut walls = Vec::with_capacity(2 * chains.edge_count());
    for pair in chains.bottom.windows(2).chain(chains.right.windows(2)) {
        let (t0, t1) = (pair[0], pair[1]);
        let (s0, s1) = (skirt_of(&mut mesh, t0), skirt_of(&mut mesh, t1));
        walls.push([t1, t0, s0]);
        walls.push([t1, s0, s1]);
    }
    // Top and left run against the perimeter direction, so the winding is
    // mirrored.
    for pair in chains.top.windows(2).chain(chains.left.windows(2)) {
        let (t0, t1) = (pair[0], pair[1]);
        let (s0, s1) = (skirt_of(&mut mesh, t0), skirt_of(&mut mesh, t1));
        walls.push([t0, t1, s1]);
        walls.push([t0, s1, s0]);
    }
    let wall_faces = walls.len();
    mesh.faces.extend(walls);

    let ring: Vec<u32> = chains
        .perimeter()
        .into_iter()
        .map(|top| skirt_of(&mut mesh, top))
        .collect();
    let ring = dedup_ring(&mesh, ring, params.dedup_tolerance_mm);
    if ring.len() < 3 {
        return Err(SolidError::degenerate(format!(
            "base outline collapsed to {} vertex(es)",
            ring.len()
        )));
    }

    let cap_faces = cap_fan(&mut mesh, &ring, base_z);
    mesh.compute_vertex_normals();

    let stats = ExtrusionStats {
        surface_faces,
        wall_faces,
        cap_faces,
        skirt_vertices: skirt.len(),
    };
    info!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        base_thickness_mm = params.base_thickness_mm,
        "Extruded solid: {stats}"
    );
    Ok((mesh, stats))
}

/// Drop ring vertices that repeat or sit within `tolerance` of the previous
/// kept vertex, including the wrap from last to first.
fn dedup_ring(mesh: &IndexedMesh, ring: Vec<u32>, tolerance: f64) -> Vec<u32> {
    let close = |a: u32, b: u32| a == b || (mesh.position(a) - mesh.position(b)).norm() < tolerance;

    let mut kept: Vec<u32> = Vec::with_capacity(ring.len());
    for i in ring {
        match kept.last() {
            Some(&last) if close(last, i) => {}
            _ => kept.push(i),
        }
    }
    while kept.len() > 1 {
        match (kept.first(), kept.last()) {
            (Some(&first), Some(&last)) if close(first, last) => {
                kept.pop();
            }
            _ => break,
        }
    }
    kept
}

/// Fan-triangulate `ring` around its centroid at `base_z`, facing -Z.
fn cap_fan(mesh: &mut IndexedMesh, ring: &[u32], base_z: f64) -> usize {
    #[allow(clippy::cast_precision_loss)]
    let n = ring.len() as f64;
    let (sx, sy) = ring.iter().fold((0.0, 0.0), |(sx, sy), &i| {
        let p = mesh.position(i);
        (sx + p.x, sy + p.y)
    });
    let center = mesh.push_vertex(Vertex::new(Point3::new(sx / n, sy / n, base_z)));

    let before = mesh.faces.len();
    for (k, &a) in ring.iter().enumerate() {
        let b = ring[(k + 1) % ring.len()];
        mesh.faces.push([center, b, a]);
    }
    let added = mesh.faces.len() - before;
    debug!(ring = ring.len(), faces = added, "Capped base");
    added
}

/// Warn when the grid spacing is below the cap deduplication tolerance,
/// since distinct boundary vertices would then be merged in the cap.
fn check_spacing(chains: &BoundaryChains, surface: &IndexedMesh, tolerance: f64) {
    let spacing = chains
        .bottom
        .windows(2)
        .chain(chains.left.windows(2))
        .map(|p| (surface.position(p[1]) - surface.position(p[0])).norm())
        .fold(f64::INFINITY, f64::min);
    if spacing < tolerance {
        warn!(
            spacing_mm = spacing,
            tolerance_mm = tolerance,
            "Grid spacing below cap dedup tolerance; base may not close"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::surface::SurfaceGrid;
    use crate::validation::validate_solid;
    use approx::assert_relative_eq;
    use relief_types::MeshBounds;

    fn flat(cols: u32, rows: u32, h: f64) -> IndexedMesh {
        SurfaceGrid {
            cols,
            rows,
            width_mm: 20.0,
            height_mm: 10.0,
        }
        .build(&move |_: f64, _: f64| h)
    }

    fn expected_faces(cols: usize, rows: usize) -> usize {
        2 * (cols - 1) * (rows - 1) + 6 * (cols - 1) + 6 * (rows - 1)
    }

    #[test]
    fn flat_slab_face_count_and_bounds() {
        let (solid, stats) =
            extrude_solid(&flat(5, 4, 1.5), &ExtrusionParams::with_base_thickness(2.0)).unwrap();
        assert_eq!(solid.face_count(), expected_faces(5, 4));
        assert_eq!(stats.wall_faces, 4 * (4 + 3));
        assert_eq!(stats.cap_faces, 2 * (4 + 3));
        assert_eq!(stats.skirt_vertices, 2 * (4 + 3));

        let b = solid.bounds();
        assert_relative_eq!(b.size().x, 20.0);
        assert_relative_eq!(b.size().y, 10.0);
        assert_relative_eq!(b.size().z, 3.5);
        assert_eq!(b.min.z, -2.0);
    }

    #[test]
    fn flat_slab_is_closed_manifold_with_positive_volume() {
        let (solid, _) =
            extrude_solid(&flat(6, 3, 1.0), &ExtrusionParams::with_base_thickness(1.0)).unwrap();
        let report = validate_solid(&solid);
        assert!(report.is_watertight(), "{report}");
        assert!(report.is_manifold(), "{report}");
        assert!(report.has_consistent_winding(), "{report}");
        assert_relative_eq!(solid.signed_volume(), 20.0 * 10.0 * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_thickness_still_closes() {
        let surface = SurfaceGrid {
            cols: 4,
            rows: 4,
            width_mm: 9.0,
            height_mm: 9.0,
        }
        .build(&|u: f64, v: f64| 1.0 + u * v);
        let (solid, _) = extrude_solid(&surface, &ExtrusionParams::with_base_thickness(0.0)).unwrap();
        assert!(validate_solid(&solid).is_printable());
        assert_eq!(solid.bounds().min.z, 0.0);
        assert!(solid.signed_volume() > 0.0);
    }

    #[test]
    fn minimal_two_by_two_grid() {
        let (solid, stats) =
            extrude_solid(&flat(2, 2, 1.0), &ExtrusionParams::default()).unwrap();
        assert_eq!(stats.surface_faces, 2);
        assert_eq!(solid.face_count(), expected_faces(2, 2));
        assert!(validate_solid(&solid).is_printable());
    }

    #[test]
    fn degenerate_surface_is_rejected() {
        let err = extrude_solid(&flat(1, 1, 1.0), &ExtrusionParams::default()).unwrap_err();
        assert!(matches!(err, SolidError::DegenerateGeometry { .. }));
    }

    #[test]
    fn negative_thickness_is_rejected() {
        let err =
            extrude_solid(&flat(3, 3, 1.0), &ExtrusionParams::with_base_thickness(-1.0)).unwrap_err();
        assert!(matches!(err, SolidError::InvalidParams(_)));
    }

    #[test]
    fn all_normals_recomputed() {
        let (solid, _) = extrude_solid(&flat(3, 3, 1.0), &ExtrusionParams::default()).unwrap();
        assert!(solid.vertices.iter().all(|v| v.normal.is_some()));
    }

    #[test]
    fn coarse_tolerance_merges_cap_vertices() {
        let ring = vec![0, 1, 2, 3];
        let mesh = IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(0.0005, 0.0, 0.0),
                Vertex::from_coords(1.0, 1.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
            ],
            Vec::new(),
        );
        assert_eq!(dedup_ring(&mesh, ring.clone(), 1e-3), vec![0, 2, 3]);
        assert_eq!(dedup_ring(&mesh, ring, 0.0), vec![0, 1, 2, 3]);
    }
}
