//! Export round trips through files on disk.
//!
//! Run with: cargo test -p relief-export --test export_roundtrip

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use relief_export::{
    ExportOptions, ExportRequest, ExportTarget, LayerChangeCalculator, PrintSettings, StlFormat,
    export_bytes, export_to_path,
};
use relief_solid::{SolidBuilder, validate_solid};
use relief_types::{IndexedMesh, LayerStack, MeshTopology, PixelBuffer, Vertex};
use zip::ZipArchive;

// =============================================================================
// Readers
// =============================================================================

fn read_binary_stl(path: &Path) -> IndexedMesh {
    let mut bytes = Vec::new();
    File::open(path).unwrap().read_to_end(&mut bytes).unwrap();
    let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), 84 + count * 50);

    let mut mesh = IndexedMesh::new();
    for face in 0..count {
        let base = 84 + face * 50 + 12;
        let mut ids = [0u32; 3];
        for (k, id) in ids.iter_mut().enumerate() {
            let at = base + k * 12;
            let coord = |o: usize| {
                f64::from(f32::from_le_bytes(bytes[at + o..at + o + 4].try_into().unwrap()))
            };
            *id = mesh.push_vertex(Vertex::from_coords(coord(0), coord(4), coord(8)));
        }
        mesh.faces.push(ids);
    }
    mesh
}

fn read_ascii_stl(path: &Path) -> IndexedMesh {
    let reader = BufReader::new(File::open(path).unwrap());
    let mut mesh = IndexedMesh::new();
    let mut corners = Vec::with_capacity(3);
    for line in reader.lines() {
        let line = line.unwrap();
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.first().copied() {
            Some("vertex") => {
                let x: f64 = parts[1].parse().unwrap();
                let y: f64 = parts[2].parse().unwrap();
                let z: f64 = parts[3].parse().unwrap();
                corners.push(mesh.push_vertex(Vertex::from_coords(x, y, z)));
            }
            Some("endfacet") => {
                mesh.faces.push([corners[0], corners[1], corners[2]]);
                corners.clear();
            }
            _ => {}
        }
    }
    mesh
}

fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path).unwrap())).unwrap();
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn attribute(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> String {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8(a.value.into_owned()).unwrap())
        .unwrap()
}

fn parse_model(content: &str) -> IndexedMesh {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);
    let mut mesh = IndexedMesh::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"vertex" => {
                    let coord = |k: &[u8]| attribute(e, k).parse::<f64>().unwrap();
                    mesh.push_vertex(Vertex::from_coords(coord(b"x"), coord(b"y"), coord(b"z")));
                }
                b"triangle" => {
                    let index = |k: &[u8]| attribute(e, k).parse::<u32>().unwrap();
                    mesh.faces.push([index(b"v1"), index(b"v2"), index(b"v3")]);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    mesh
}

/// The `<resources>` section, which holds all geometry.
fn geometry_section(model: &str) -> &str {
    let start = model.find("<resources>").unwrap();
    let end = model.find("</resources>").unwrap();
    &model[start..end]
}

// =============================================================================
// Fixtures
// =============================================================================

fn photo() -> PixelBuffer {
    PixelBuffer::from_fn(48, 32, |x, y| {
        let v = u8::try_from((x * 5 + y * 3) % 256).unwrap();
        [v, 255 - v, v / 2, 255]
    })
}

fn solid(base_thickness: f64) -> IndexedMesh {
    let field = |u: f64, v: f64| 0.4 + 1.6 * u * v;
    SolidBuilder::new(&field, 48, 32)
        .resolution(24)
        .max_dimension(60.0)
        .base_thickness(base_thickness)
        .build()
        .unwrap()
        .mesh
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn stl_files_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = solid(0.16);
    let stack = LayerStack::default();

    for (format, name) in [(StlFormat::Binary, "b.stl"), (StlFormat::Ascii, "a.stl")] {
        let path = dir.path().join(name);
        let request = ExportRequest::new(&mesh, &stack)
            .options(ExportOptions::default().with_stl_format(format));
        export_to_path(ExportTarget::Stl, &request, &path).unwrap();

        let loaded = match format {
            StlFormat::Binary => read_binary_stl(&path),
            StlFormat::Ascii => read_ascii_stl(&path),
        };
        assert_eq!(loaded.face_count(), mesh.face_count());
        let volume = loaded.signed_volume();
        assert!(
            (volume - mesh.signed_volume()).abs() < 1e-2 * mesh.signed_volume(),
            "{format:?}: {volume}"
        );
    }
}

#[test]
fn every_3mf_target_keeps_the_solid_intact() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = solid(0.16);
    let stack = LayerStack::default();
    let image = photo();

    for target in [
        ExportTarget::Generic3mf,
        ExportTarget::Prusa3mf,
        ExportTarget::Bambu3mf,
    ] {
        let path = dir.path().join(format!("relief{}", target.file_suffix()));
        let request = ExportRequest::new(&mesh, &stack).thumbnail(&image);
        export_to_path(target, &request, &path).unwrap();
        assert_eq!(ExportTarget::from_path(&path), Some(target));

        let loaded = parse_model(&read_entry(&path, "3D/3dmodel.model"));
        assert_eq!(loaded.vertex_count(), mesh.vertex_count(), "{target}");
        assert_eq!(loaded.faces, mesh.faces, "{target}");

        let report = validate_solid(&loaded);
        assert!(report.is_printable(), "{target}: {report}");
    }
}

#[test]
fn slicer_color_changes_agree() {
    let dir = tempfile::tempdir().unwrap();
    let mesh = solid(0.16);
    let stack = LayerStack::default();
    let settings = PrintSettings::default();
    let changes = LayerChangeCalculator::new(&settings).tool_changes(&stack);

    let prusa = dir.path().join("a.prusa.3mf");
    let bambu = dir.path().join("a.bambu.3mf");
    let request = ExportRequest::new(&mesh, &stack).settings(settings);
    export_to_path(ExportTarget::Prusa3mf, &request, &prusa).unwrap();
    export_to_path(ExportTarget::Bambu3mf, &request, &bambu).unwrap();

    let prusa_xml = read_entry(&prusa, "Metadata/Prusa_Slicer_custom_gcode_per_print_z.xml");
    let bambu_xml = read_entry(&bambu, "Metadata/custom_gcode_per_layer.xml");

    let heights = |xml: &str, attr: &str| -> Vec<f64> {
        let needle = format!("{attr}=\"");
        xml.match_indices(&needle)
            .map(|(i, _)| {
                let rest = &xml[i + needle.len()..];
                rest[..rest.find('"').unwrap()].parse().unwrap()
            })
            .collect()
    };
    let prusa_z = heights(&prusa_xml, "print_z");
    let bambu_z = heights(&bambu_xml, "top_z");

    assert_eq!(prusa_z.len(), changes.len());
    assert_eq!(prusa_z, bambu_z);
    for (z, change) in prusa_z.iter().zip(&changes) {
        assert!((z - change.z_mm).abs() < 1e-4);
    }
}

#[test]
fn exports_are_deterministic() {
    let stack = LayerStack::default();
    let image = photo();

    for target in ExportTarget::ALL {
        // Fresh solids, as separate export calls would build them.
        let first_mesh = solid(0.16);
        let second_mesh = solid(0.16);

        let fixed = ExportOptions::reproducible("2024-02-19");
        let a = export_bytes(
            target,
            &ExportRequest::new(&first_mesh, &stack)
                .options(fixed.clone())
                .thumbnail(&image),
        )
        .unwrap();
        let b = export_bytes(
            target,
            &ExportRequest::new(&second_mesh, &stack)
                .options(fixed)
                .thumbnail(&image),
        )
        .unwrap();
        assert_eq!(a, b, "{target}");
    }
}

#[test]
fn geometry_is_stable_without_fixed_dates() {
    let dir = tempfile::tempdir().unwrap();
    let stack = LayerStack::default();
    let first = dir.path().join("first.3mf");
    let second = dir.path().join("second.3mf");

    let mesh = solid(0.5);
    export_to_path(ExportTarget::Generic3mf, &ExportRequest::new(&mesh, &stack), &first).unwrap();
    let mesh = solid(0.5);
    export_to_path(ExportTarget::Generic3mf, &ExportRequest::new(&mesh, &stack), &second).unwrap();

    let a = read_entry(&first, "3D/3dmodel.model");
    let b = read_entry(&second, "3D/3dmodel.model");
    assert_eq!(geometry_section(&a), geometry_section(&b));
}

#[test]
fn base_thickness_changes_wall_height() {
    let stack = LayerStack::default();
    let thin = solid(0.16);
    let thick = solid(1.0);
    let thin_stl = export_bytes(ExportTarget::Stl, &ExportRequest::new(&thin, &stack)).unwrap();
    let thick_stl = export_bytes(ExportTarget::Stl, &ExportRequest::new(&thick, &stack)).unwrap();
    assert_eq!(thin_stl.len(), thick_stl.len());
    assert_ne!(thin_stl, thick_stl);
}
