//! PrusaSlicer project 3MF.
//!
//! Besides the model the package carries:
//! - `Metadata/Slic3r_PE.config` with layer, filament and printer settings
//! - `Metadata/Prusa_Slicer_custom_gcode_per_print_z.xml` with one `M600`
//!   color change per tool change
//! - `Metadata/thumbnail.png`, 256 x 256

use std::fmt::Write as _;

use quick_xml::events::BytesStart;
use relief_types::Rgb;
use tracing::info;

use crate::encode::{
    check_mesh, empty_element, end_element, format_number, start_element, xml_writer,
};
use crate::error::ExportResult;
use crate::generic::APPLICATION;
use crate::layer_change::ToolChange;
use crate::model::{Bed, ModelDocument};
use crate::package::{
    MODEL_PATH, MODEL_RELATIONSHIP, Package, THUMBNAIL_RELATIONSHIP, relationships,
};
use crate::request::ExportRequest;
use crate::thumbnail::render_thumbnail;

const CONFIG_PATH: &str = "Metadata/Slic3r_PE.config";
const CUSTOM_GCODE_PATH: &str = "Metadata/Prusa_Slicer_custom_gcode_per_print_z.xml";
const THUMBNAIL_PATH: &str = "Metadata/thumbnail.png";
const THUMBNAIL_SIZE: u32 = 256;

/// Original Prusa i3 MK3S bed.
const BED: Bed = Bed {
    width_mm: 250.0,
    depth_mm: 210.0,
};

/// Encode a PrusaSlicer project.
///
/// The build item centers the model on the MK3S bed; vertex data is the
/// same as in the generic package.
///
/// # Errors
///
/// Returns an error for invalid settings, an unwritable mesh or a failure
/// while encoding the thumbnail or the archive.
pub fn write_prusa_3mf(request: &ExportRequest<'_>) -> ExportResult<Vec<u8>> {
    request.settings.validate()?;
    check_mesh(request.mesh)?;

    let changes = request.calculator().tool_changes(request.stack);
    let first_color = request
        .stack
        .layers()
        .first()
        .map_or(Rgb::WHITE, |layer| layer.color());

    let mut doc = ModelDocument {
        namespaces: vec![("slic3rpe", "http://schemas.slic3r.org/3mf/2017/06")],
        object_name: request.options.object_name.clone(),
        placement: Some(BED.placement(request.mesh, request.options.bed_padding_mm)),
        ..ModelDocument::default()
    };
    doc.push_metadata("slic3rpe:Version3mf", "1");
    doc.push_metadata("Application", APPLICATION);
    doc.push_metadata("CreationDate", request.options.creation_date());
    doc.push_metadata("Title", request.options.object_name.as_str());

    let mut package = Package::new();
    package.add_opc_parts(&relationships(&[
        (MODEL_PATH, MODEL_RELATIONSHIP),
        (THUMBNAIL_PATH, THUMBNAIL_RELATIONSHIP),
    ])?)?;
    package.add(MODEL_PATH, &doc.write(request.mesh)?)?;
    package.add(
        THUMBNAIL_PATH,
        &render_thumbnail(request.thumbnail, THUMBNAIL_SIZE)?,
    )?;
    package.add(CONFIG_PATH, print_config(request, first_color).as_bytes())?;
    package.add(CUSTOM_GCODE_PATH, &custom_gcode_xml(&changes)?)?;
    let bytes = package.finish()?;

    info!(
        faces = request.mesh.faces.len(),
        color_changes = changes.len(),
        bytes = bytes.len(),
        "Encoded PrusaSlicer 3MF"
    );
    Ok(bytes)
}

/// `; key = value` lines in the Slic3r config dialect.
fn print_config(request: &ExportRequest<'_>, first_color: Rgb) -> String {
    let settings = &request.settings;
    let entries = [
        ("bed_shape", "0x0,250x0,250x210,0x210".to_string()),
        ("bed_temperature", "60".to_string()),
        ("color_change_gcode", "M600".to_string()),
        ("extruder_colour", first_color.to_hex()),
        ("filament_colour", first_color.to_hex()),
        ("filament_type", "PLA".to_string()),
        ("fill_density", "20%".to_string()),
        (
            "first_layer_height",
            format_number(settings.first_layer_height_mm),
        ),
        ("gcode_flavor", "marlin2".to_string()),
        ("layer_height", format_number(settings.layer_height_mm)),
        ("nozzle_diameter", "0.4".to_string()),
        ("perimeters", "3".to_string()),
        ("printer_model", "MK3S".to_string()),
        ("support_material", "0".to_string()),
        ("temperature", "210".to_string()),
    ];

    let mut config = format!(
        "; generated by {APPLICATION} on {}\n\n",
        request.options.creation_date()
    );
    for (key, value) in entries {
        let _ = writeln!(config, "; {key} = {value}");
    }
    config
}

/// One `M600` entry per tool change, for a single-extruder printer.
fn custom_gcode_xml(changes: &[ToolChange]) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = xml_writer(&mut buffer, "utf-8")?;
    start_element(&mut writer, BytesStart::new("custom_gcodes_per_print_z"))?;
    for change in changes {
        let print_z = format_number(change.z_mm);
        let color = change.color.to_hex();
        let mut code = BytesStart::new("code");
        code.push_attribute(("print_z", print_z.as_str()));
        code.push_attribute(("type", "0"));
        code.push_attribute(("extruder", "1"));
        code.push_attribute(("color", color.as_str()));
        code.push_attribute(("extra", ""));
        code.push_attribute(("gcode", "M600"));
        empty_element(&mut writer, code)?;
    }
    let mut mode = BytesStart::new("mode");
    mode.push_attribute(("value", "SingleExtruder"));
    empty_element(&mut writer, mode)?;
    end_element(&mut writer, "custom_gcodes_per_print_z")?;
    Ok(buffer)
}
