//! STL output.
//!
//! STL carries geometry only: one facet per triangle with its face normal,
//! in millimeters, without color or layer information.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    - Header
//! UINT32       - Number of triangles
//! foreach triangle
//!     REAL32[3] - Normal vector
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count (0)
//! end
//! ```

use std::io::Write;

use relief_types::{IndexedMesh, Point3, Vector3};
use tracing::info;

use crate::encode::{Facet, check_mesh, facets};
use crate::error::{ExportError, ExportResult};
use crate::settings::StlFormat;

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL.
const TRIANGLE_SIZE: usize = 50;

/// Solid name used by ASCII output.
const SOLID_NAME: &str = "relief";

/// Encode `mesh` as STL.
///
/// # Errors
///
/// Returns [`ExportError::InvalidMesh`] for a mesh without triangles or with
/// out-of-range indices.
///
/// # Example
///
/// ```
/// use relief_export::{StlFormat, write_stl};
/// use relief_types::{IndexedMesh, Vertex};
///
/// let mesh = IndexedMesh::from_parts(
///     vec![
///         Vertex::from_coords(0.0, 0.0, 0.0),
///         Vertex::from_coords(1.0, 0.0, 0.0),
///         Vertex::from_coords(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// );
/// let bytes = write_stl(&mesh, StlFormat::Binary).unwrap();
/// assert_eq!(bytes.len(), 84 + 50);
/// ```
pub fn write_stl(mesh: &IndexedMesh, format: StlFormat) -> ExportResult<Vec<u8>> {
    check_mesh(mesh)?;
    let mut bytes = Vec::new();
    match format {
        StlFormat::Binary => {
            bytes.reserve(HEADER_SIZE + 4 + mesh.faces.len() * TRIANGLE_SIZE);
            write_binary(mesh, &mut bytes)?;
        }
        StlFormat::Ascii => write_ascii(mesh, &mut bytes)?,
    }
    info!(
        faces = mesh.faces.len(),
        bytes = bytes.len(),
        format = ?format,
        "Encoded STL"
    );
    Ok(bytes)
}

fn write_binary<W: Write>(mesh: &IndexedMesh, mut writer: W) -> ExportResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by relief-export";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    let face_count = u32::try_from(mesh.faces.len())
        .map_err(|_| ExportError::invalid_mesh("too many triangles for binary STL"))?;
    writer.write_all(&face_count.to_le_bytes())?;

    for Facet { normal, vertices } in facets(mesh) {
        write_vector_binary(&mut writer, &normal)?;
        for v in &vertices {
            write_point_binary(&mut writer, v)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: STL stores single precision
fn write_vector_binary<W: Write>(writer: &mut W, v: &Vector3<f64>) -> ExportResult<()> {
    writer.write_all(&(v.x as f32).to_le_bytes())?;
    writer.write_all(&(v.y as f32).to_le_bytes())?;
    writer.write_all(&(v.z as f32).to_le_bytes())?;
    Ok(())
}

fn write_point_binary<W: Write>(writer: &mut W, p: &Point3<f64>) -> ExportResult<()> {
    write_vector_binary(writer, &p.coords)
}

fn write_ascii<W: Write>(mesh: &IndexedMesh, mut writer: W) -> ExportResult<()> {
    writeln!(writer, "solid {SOLID_NAME}")?;
    for Facet { normal, vertices } in facets(mesh) {
        writeln!(
            writer,
            "  facet normal {:.6e} {:.6e} {:.6e}",
            normal.x, normal.y, normal.z
        )?;
        writeln!(writer, "    outer loop")?;
        for v in &vertices {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {SOLID_NAME}")?;
    Ok(())
}
