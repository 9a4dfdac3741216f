//! Mesh serialization shared by the STL and 3MF writers.

use std::fmt::Display;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use relief_types::{IndexedMesh, MeshTopology, Point3, Triangle, Vector3};

use crate::error::{ExportError, ExportResult};

/// One resolved triangle with its face normal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Facet {
    /// Unit normal, zero for degenerate triangles.
    pub normal: Vector3<f64>,
    pub vertices: [Point3<f64>; 3],
}

/// Reject meshes that cannot be written.
pub(crate) fn check_mesh(mesh: &IndexedMesh) -> ExportResult<()> {
    if mesh.face_count() == 0 {
        return Err(ExportError::invalid_mesh("mesh has no triangles"));
    }
    let vertex_count = mesh.vertex_count();
    if let Some(face) = mesh
        .faces
        .iter()
        .find(|face| face.iter().any(|&i| i as usize >= vertex_count))
    {
        return Err(ExportError::invalid_mesh(format!(
            "face {face:?} references a vertex past {vertex_count}"
        )));
    }
    Ok(())
}

/// Triangles with positions and face normals, in face order.
pub(crate) fn facets(mesh: &IndexedMesh) -> impl Iterator<Item = Facet> + '_ {
    mesh.triangles().map(|tri: Triangle| Facet {
        normal: tri.normal().unwrap_or_else(Vector3::zeros),
        vertices: [tri.v0, tri.v1, tri.v2],
    })
}

/// Coordinate text with micrometer precision and no negative zero.
pub(crate) fn format_coord(value: f64) -> String {
    let text = format!("{value:.6}");
    if text == "-0.000000" {
        "0.000000".to_string()
    } else {
        text
    }
}

/// Short decimal text for settings and heights: `0.08`, `1.12`, `2`.
pub(crate) fn format_number(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Map a writer error into [`ExportError::Xml`] with context.
pub(crate) fn xml_error<E: Display>(context: &'static str) -> impl FnOnce(E) -> ExportError {
    move |e| ExportError::xml(format!("failed to write {context}: {e}"))
}

/// Indented XML writer over `buffer`, with the declaration already written.
pub(crate) fn xml_writer<'a>(
    buffer: &'a mut Vec<u8>,
    encoding: &str,
) -> ExportResult<Writer<&'a mut Vec<u8>>> {
    let mut writer = Writer::new_with_indent(buffer, b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some(encoding), None)))
        .map_err(xml_error("XML declaration"))?;
    Ok(writer)
}

pub(crate) fn start_element<W: Write>(
    writer: &mut Writer<W>,
    element: BytesStart<'_>,
) -> ExportResult<()> {
    writer
        .write_event(Event::Start(element))
        .map_err(xml_error("element"))?;
    Ok(())
}

pub(crate) fn end_element<W: Write>(writer: &mut Writer<W>, name: &str) -> ExportResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error("element end"))?;
    Ok(())
}

/// Write a childless element such as `<mode value="..."/>`.
pub(crate) fn empty_element<W: Write>(
    writer: &mut Writer<W>,
    element: BytesStart<'_>,
) -> ExportResult<()> {
    writer
        .write_event(Event::Empty(element))
        .map_err(xml_error("empty element"))?;
    Ok(())
}

/// Write the `<mesh>` element: every vertex, then every triangle.
pub(crate) fn write_mesh<W: Write>(writer: &mut Writer<W>, mesh: &IndexedMesh) -> ExportResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new("mesh")))
        .map_err(xml_error("mesh element"))?;

    writer
        .write_event(Event::Start(BytesStart::new("vertices")))
        .map_err(xml_error("vertices element"))?;
    for v in &mesh.vertices {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("x", format_coord(v.position.x).as_str()));
        vertex.push_attribute(("y", format_coord(v.position.y).as_str()));
        vertex.push_attribute(("z", format_coord(v.position.z).as_str()));
        writer
            .write_event(Event::Empty(vertex))
            .map_err(xml_error("vertex"))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("vertices")))
        .map_err(xml_error("vertices end"))?;

    writer
        .write_event(Event::Start(BytesStart::new("triangles")))
        .map_err(xml_error("triangles element"))?;
    for &[v1, v2, v3] in &mesh.faces {
        let mut triangle = BytesStart::new("triangle");
        triangle.push_attribute(("v1", v1.to_string().as_str()));
        triangle.push_attribute(("v2", v2.to_string().as_str()));
        triangle.push_attribute(("v3", v3.to_string().as_str()));
        writer
            .write_event(Event::Empty(triangle))
            .map_err(xml_error("triangle"))?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("triangles")))
        .map_err(xml_error("triangles end"))?;

    writer
        .write_event(Event::End(BytesEnd::new("mesh")))
        .map_err(xml_error("mesh end"))?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use relief_types::Vertex;
    use std::io::Cursor;

    fn triangle() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, -0.0000001),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(0.08), "0.08");
        assert_eq!(format_number(0.16 + 0.08 * 12.0), "1.12");
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_coord(-0.0000001), "0.000000");
        assert_eq!(format_coord(-1.5), "-1.500000");
    }

    #[test]
    fn rejects_unwritable_meshes() {
        assert!(check_mesh(&IndexedMesh::new()).is_err());
        let mut mesh = triangle();
        mesh.faces.push([0, 1, 3]);
        assert!(matches!(
            check_mesh(&mesh),
            Err(ExportError::InvalidMesh { .. })
        ));
        assert!(check_mesh(&triangle()).is_ok());
    }

    #[test]
    fn facet_normals() {
        let facets: Vec<_> = facets(&triangle()).collect();
        assert_eq!(facets.len(), 1);
        assert!((facets[0].normal.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mesh_element_text() {
        let mut buffer = Vec::new();
        let mut writer = Writer::new(Cursor::new(&mut buffer));
        write_mesh(&mut writer, &triangle()).unwrap();
        let xml = String::from_utf8(buffer).unwrap();

        assert!(xml.starts_with("<mesh><vertices>"));
        assert!(xml.contains(r#"<vertex x="1.000000" y="0.000000" z="0.000000"/>"#));
        assert!(xml.contains(r#"<triangle v1="0" v2="1" v3="2"/>"#));
        assert!(xml.ends_with("</triangles></mesh>"));
    }

    #[test]
    fn xml_writer_escapes_attributes() {
        let mut buffer = Vec::new();
        let mut writer = xml_writer(&mut buffer, "UTF-8").unwrap();
        start_element(&mut writer, BytesStart::new("root")).unwrap();
        let mut note = BytesStart::new("note");
        note.push_attribute(("text", r#"a "quoted" <name> & more"#));
        empty_element(&mut writer, note).unwrap();
        end_element(&mut writer, "root").unwrap();
        let xml = String::from_utf8(buffer).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"text="a &quot;quoted&quot; &lt;name&gt; &amp; more""#));
        assert!(xml.trim_end().ends_with("</root>"));
    }
}
