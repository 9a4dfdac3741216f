//! Core-schema 3MF.

use tracing::info;

use crate::encode::{check_mesh, format_number};
use crate::error::ExportResult;
use crate::layer_change::LayerChangeCalculator;
use crate::model::ModelDocument;
use crate::package::{MODEL_PATH, MODEL_RELATIONSHIP, Package, relationships};
use crate::request::ExportRequest;

/// Application name written into 3MF metadata.
pub(crate) const APPLICATION: &str = concat!("relief-export ", env!("CARGO_PKG_VERSION"));

/// Encode a plain 3MF package.
///
/// Color changes are listed as readable `ColorChanges` metadata only; no
/// slicer interprets them.
///
/// # Errors
///
/// Returns an error for invalid settings, an unwritable mesh or a failure
/// while assembling the archive.
pub fn write_generic_3mf(request: &ExportRequest<'_>) -> ExportResult<Vec<u8>> {
    request.settings.validate()?;
    check_mesh(request.mesh)?;

    let calc = request.calculator();
    let mut doc = ModelDocument {
        object_name: request.options.object_name.clone(),
        ..ModelDocument::default()
    };
    doc.push_metadata("Application", APPLICATION);
    doc.push_metadata("CreationDate", request.options.creation_date());
    doc.push_metadata("Description", "Multi-color relief model");
    doc.push_metadata("LayerHeight", format_number(request.settings.layer_height_mm));
    doc.push_metadata(
        "FirstLayerHeight",
        format_number(request.settings.first_layer_height_mm),
    );
    doc.push_metadata("ColorChanges", color_change_notes(&calc, request));

    let mut package = Package::new();
    package.add_opc_parts(&relationships(&[(MODEL_PATH, MODEL_RELATIONSHIP)])?)?;
    package.add(MODEL_PATH, &doc.write(request.mesh)?)?;
    let bytes = package.finish()?;

    info!(
        vertices = request.mesh.vertices.len(),
        faces = request.mesh.faces.len(),
        bytes = bytes.len(),
        "Encoded generic 3MF"
    );
    Ok(bytes)
}

/// `Start with #111111; Layer 13 (Z 1.12 mm): #c81e1e; ...`
fn color_change_notes(calc: &LayerChangeCalculator, request: &ExportRequest<'_>) -> String {
    let mut notes = Vec::with_capacity(request.stack.len());
    if let Some(first) = request.stack.layers().first() {
        notes.push(format!("Start with {}", first.color()));
    }
    for change in calc.tool_changes(request.stack) {
        notes.push(format!(
            "Layer {} (Z {} mm): {}",
            change.layer_index,
            format_number(change.z_mm),
            change.color
        ));
    }
    notes.join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::settings::{ExportOptions, PrintSettings};
    use relief_types::{IndexedMesh, LayerSpec, LayerStack, Rgb, Vertex};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn triangle() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.0, 0.0, 0.0),
                Vertex::from_coords(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn two_colors() -> LayerStack {
        LayerStack::new(vec![
            LayerSpec::new(Rgb::new(0x11, 0x11, 0x11), 0.5, 1.0),
            LayerSpec::new(Rgb::new(0xC8, 0x1E, 0x1E), 1.0, 2.0),
        ])
        .unwrap()
    }

    #[test]
    fn package_contents() {
        let mesh = triangle();
        let stack = two_colors();
        let settings = PrintSettings::default().base_thickness(0.08);
        let request = ExportRequest::new(&mesh, &stack)
            .settings(settings)
            .options(ExportOptions::reproducible("2024-02-19"));
        let bytes = write_generic_3mf(&request).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            vec!["3D/3dmodel.model", "[Content_Types].xml", "_rels/.rels"]
        );

        let mut model = String::new();
        archive
            .by_name(MODEL_PATH)
            .unwrap()
            .read_to_string(&mut model)
            .unwrap();
        assert!(model.contains(r#"<metadata name="CreationDate">2024-02-19</metadata>"#));
        assert!(model.contains(r#"<metadata name="LayerHeight">0.08</metadata>"#));
        assert!(model.contains("Start with #111111; Layer 13 (Z 1.12 mm): #c81e1e"));
    }

    #[test]
    fn invalid_settings_fail() {
        let mesh = triangle();
        let stack = two_colors();
        let request =
            ExportRequest::new(&mesh, &stack).settings(PrintSettings::with_layer_height(-1.0));
        assert!(write_generic_3mf(&request).is_err());
    }
}
