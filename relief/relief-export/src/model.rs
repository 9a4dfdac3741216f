//! The `3D/3dmodel.model` document.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use relief_types::{IndexedMesh, MeshBounds, Vector3};
use tracing::warn;

use crate::encode::{format_number, write_mesh, xml_error};
use crate::error::ExportResult;

/// 3MF core namespace URI.
pub(crate) const NAMESPACE_3MF: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// Rectangular print bed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bed {
    pub width_mm: f64,
    pub depth_mm: f64,
}

impl Bed {
    /// Offset that centers the footprint of `mesh` on the bed and puts its
    /// lowest point on the build plate.
    ///
    /// Warns when the footprint leaves less than `padding_mm` to an edge.
    pub(crate) fn placement(&self, mesh: &IndexedMesh, padding_mm: f64) -> Vector3<f64> {
        let bounds = mesh.bounds();
        let size = bounds.size();
        let usable_x = self.width_mm - 2.0 * padding_mm;
        let usable_y = self.depth_mm - 2.0 * padding_mm;
        if size.x > usable_x || size.y > usable_y {
            warn!(
                width = size.x,
                depth = size.y,
                usable_x,
                usable_y,
                "Model footprint exceeds the padded bed area"
            );
        }
        let center = bounds.center();
        Vector3::new(
            self.width_mm / 2.0 - center.x,
            self.depth_mm / 2.0 - center.y,
            -bounds.min.z,
        )
    }
}

/// What goes around the mesh in a model document.
#[derive(Debug, Clone, Default)]
pub(crate) struct ModelDocument {
    /// Extra `xmlns:*` declarations.
    pub namespaces: Vec<(&'static str, &'static str)>,
    /// `<metadata name=..>` entries, in order.
    pub metadata: Vec<(String, String)>,
    /// Name attribute of the single object.
    pub object_name: String,
    /// Translation applied by the build item.
    pub placement: Option<Vector3<f64>>,
}

impl ModelDocument {
    pub(crate) fn push_metadata(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.metadata.push((name.into(), value.into()));
    }

    /// Build item transform: 3x3 identity followed by the translation.
    fn transform(&self) -> String {
        let t = self.placement.unwrap_or_else(Vector3::zeros);
        format!(
            "1 0 0 0 1 0 0 0 1 {} {} {}",
            format_number(t.x),
            format_number(t.y),
            format_number(t.z)
        )
    }

    /// Serialize the document with `mesh` as object 1.
    pub(crate) fn write(&self, mesh: &IndexedMesh) -> ExportResult<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error("XML declaration"))?;

        let mut model = BytesStart::new("model");
        model.push_attribute(("unit", "millimeter"));
        model.push_attribute(("xml:lang", "en-US"));
        model.push_attribute(("xmlns", NAMESPACE_3MF));
        for (prefix, uri) in &self.namespaces {
            model.push_attribute((format!("xmlns:{prefix}").as_str(), *uri));
        }
        writer
            .write_event(Event::Start(model))
            .map_err(xml_error("model element"))?;

        for (name, value) in &self.metadata {
            let mut metadata = BytesStart::new("metadata");
            metadata.push_attribute(("name", name.as_str()));
            writer
                .write_event(Event::Start(metadata))
                .map_err(xml_error("metadata"))?;
            writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(xml_error("metadata value"))?;
            writer
                .write_event(Event::End(BytesEnd::new("metadata")))
                .map_err(xml_error("metadata end"))?;
        }

        writer
            .write_event(Event::Start(BytesStart::new("resources")))
            .map_err(xml_error("resources element"))?;
        let mut object = BytesStart::new("object");
        object.push_attribute(("id", "1"));
        object.push_attribute(("name", self.object_name.as_str()));
        object.push_attribute(("type", "model"));
        writer
            .write_event(Event::Start(object))
            .map_err(xml_error("object element"))?;

        write_mesh(&mut writer, mesh)?;

        writer
            .write_event(Event::End(BytesEnd::new("object")))
            .map_err(xml_error("object end"))?;
        writer
            .write_event(Event::End(BytesEnd::new("resources")))
            .map_err(xml_error("resources end"))?;

        writer
            .write_event(Event::Start(BytesStart::new("build")))
            .map_err(xml_error("build element"))?;
        let transform = self.transform();
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", "1"));
        item.push_attribute(("transform", transform.as_str()));
        item.push_attribute(("printable", "1"));
        writer
            .write_event(Event::Empty(item))
            .map_err(xml_error("build item"))?;
        writer
            .write_event(Event::End(BytesEnd::new("build")))
            .map_err(xml_error("build end"))?;

        writer
            .write_event(Event::End(BytesEnd::new("model")))
            .map_err(xml_error("model end"))?;

        Ok(buffer)
    }
}
