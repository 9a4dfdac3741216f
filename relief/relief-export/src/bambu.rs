//! Bambu Studio project 3MF.
//!
//! The package layout follows what Bambu Studio writes for a single plate:
//!
//! | Entry                                 | Content                                  |
//! |---------------------------------------|------------------------------------------|
//! | `3D/3dmodel.model`                    | geometry, placed on the A1 bed           |
//! | `Metadata/project_settings.config`    | A1 printer/filament profile, JSON        |
//! | `Metadata/model_settings.config`      | object, plate and assembly description   |
//! | `Metadata/custom_gcode_per_layer.xml` | one tool change per color                |
//! | `Metadata/plate_1.png` and variants   | plate, small, top and pick thumbnails    |

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::BytesStart;
use relief_types::Vector3;
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::encode::{
    check_mesh, empty_element, end_element, format_number, start_element, xml_writer,
};
use crate::error::ExportResult;
use crate::layer_change::ToolChange;
use crate::model::{Bed, ModelDocument};
use crate::package::{
    MODEL_PATH, MODEL_RELATIONSHIP, Package, THUMBNAIL_RELATIONSHIP, relationships,
};
use crate::request::ExportRequest;
use crate::thumbnail::render_thumbnail;

const PROJECT_SETTINGS_PATH: &str = "Metadata/project_settings.config";
const MODEL_SETTINGS_PATH: &str = "Metadata/model_settings.config";
const CUSTOM_GCODE_PATH: &str = "Metadata/custom_gcode_per_layer.xml";
const PLATE_THUMBNAIL_PATH: &str = "Metadata/plate_1.png";
const PLATE_SMALL_PATH: &str = "Metadata/plate_1_small.png";
const TOP_THUMBNAIL_PATH: &str = "Metadata/top_1.png";
const PICK_THUMBNAIL_PATH: &str = "Metadata/pick_1.png";

const THUMBNAIL_SIZE: u32 = 512;
const SMALL_THUMBNAIL_SIZE: u32 = 128;

/// Bambu Studio refuses project settings from other applications.
const BAMBU_APPLICATION: &str = "BambuStudio-01.10.02.76";

const COVER_MIDDLE_RELATIONSHIP: &str =
    "http://schemas.bambulab.com/package/2021/cover-thumbnail-middle";
const COVER_SMALL_RELATIONSHIP: &str =
    "http://schemas.bambulab.com/package/2021/cover-thumbnail-small";

/// Bambu Lab A1 bed.
const BED: Bed = Bed {
    width_mm: 256.0,
    depth_mm: 256.0,
};

/// Profile keys holding one value per filament slot.
const PER_FILAMENT_KEYS: &[&str] = &[
    "filament_settings_id",
    "filament_type",
    "filament_diameter",
    "nozzle_temperature",
    "nozzle_temperature_initial_layer",
    "bed_temperature",
    "bed_temperature_initial_layer",
    "fan_speed",
    "min_fan_speed",
    "max_fan_speed",
];

/// Encode a Bambu Studio project.
///
/// # Errors
///
/// Returns an error for invalid settings, an unwritable mesh or a failure
/// while encoding JSON, XML, thumbnails or the archive.
pub fn write_bambu_3mf(request: &ExportRequest<'_>) -> ExportResult<Vec<u8>> {
    request.settings.validate()?;
    check_mesh(request.mesh)?;

    let changes = request.calculator().tool_changes(request.stack);
    let placement = BED.placement(request.mesh, request.options.bed_padding_mm);
    let date = request.options.creation_date();

    let mut doc = ModelDocument {
        namespaces: vec![
            ("BambuStudio", "http://schemas.bambulab.com/package/2021"),
            (
                "p",
                "http://schemas.microsoft.com/3dmanufacturing/production/2015/06",
            ),
        ],
        object_name: request.options.object_name.clone(),
        placement: Some(placement),
        ..ModelDocument::default()
    };
    doc.push_metadata("Application", BAMBU_APPLICATION);
    doc.push_metadata("BambuStudio:3mfVersion", "1");
    doc.push_metadata("CreationDate", date.as_str());
    doc.push_metadata("ModificationDate", date.as_str());
    doc.push_metadata("Title", request.options.object_name.as_str());

    let plate = render_thumbnail(request.thumbnail, THUMBNAIL_SIZE)?;
    let small = render_thumbnail(request.thumbnail, SMALL_THUMBNAIL_SIZE)?;

    let mut package = Package::new();
    package.add_opc_parts(&relationships(&[
        (MODEL_PATH, MODEL_RELATIONSHIP),
        (PLATE_THUMBNAIL_PATH, THUMBNAIL_RELATIONSHIP),
        (PLATE_THUMBNAIL_PATH, COVER_MIDDLE_RELATIONSHIP),
        (PLATE_SMALL_PATH, COVER_SMALL_RELATIONSHIP),
    ])?)?;
    package.add(MODEL_PATH, &doc.write(request.mesh)?)?;
    package.add(PROJECT_SETTINGS_PATH, &project_settings(request)?)?;
    package.add(
        MODEL_SETTINGS_PATH,
        &model_settings(&request.options.object_name, placement)?,
    )?;
    package.add(CUSTOM_GCODE_PATH, &custom_gcode_xml(&changes)?)?;
    package.add(PLATE_THUMBNAIL_PATH, &plate)?;
    package.add(PLATE_SMALL_PATH, &small)?;
    package.add(TOP_THUMBNAIL_PATH, &plate)?;
    package.add(PICK_THUMBNAIL_PATH, &plate)?;
    let bytes = package.finish()?;

    info!(
        faces = request.mesh.faces.len(),
        tool_changes = changes.len(),
        bytes = bytes.len(),
        "Encoded Bambu Studio 3MF"
    );
    Ok(bytes)
}

/// A1 "0.08mm Extra Fine" profile with generic PLA.
fn a1_defaults() -> Value {
    json!({
        "printer_model": "Bambu Lab A1",
        "printer_settings_id": "Bambu Lab A1 0.4 nozzle",
        "print_settings_id": "0.08mm Extra Fine @BBL A1",
        "default_print_profile": "0.20mm Standard @BBL A1",
        "printable_area": ["0x0", "256x0", "256x256", "0x256"],
        "printable_height": "256",
        "nozzle_diameter": ["0.4"],
        "layer_height": "0.08",
        "initial_layer_print_height": "0.16",
        "wall_loops": "2",
        "outer_wall_line_width": "0.42",
        "inner_wall_line_width": "0.45",
        "sparse_infill_density": "100%",
        "sparse_infill_pattern": "zig-zag",
        "sparse_infill_line_width": "0.45",
        "filament_settings_id": ["Generic PLA @BBL A1"],
        "filament_colour": ["#181c20", "#534d47", "#8d7b70", "#b7b2a9", "#e3e4de"],
        "filament_type": ["PLA", "PLA", "PLA", "PLA"],
        "filament_diameter": ["1.75"],
        "nozzle_temperature": ["220"],
        "nozzle_temperature_initial_layer": ["220"],
        "bed_temperature": ["65"],
        "bed_temperature_initial_layer": ["65"],
        "fan_speed": ["70"],
        "min_fan_speed": ["60"],
        "max_fan_speed": ["80"],
        "enable_support": "0",
        "print_sequence": "by layer",
        "gcode_flavor": "marlin",
        "version": "01.10.02.76",
        "different_settings_to_system": [
            "initial_layer_print_height;layer_height",
            "", "", "", "", ""
        ]
    })
}

/// The A1 profile with this job's layer heights and one slot per color.
fn project_settings(request: &ExportRequest<'_>) -> ExportResult<Vec<u8>> {
    let colors: Vec<String> = request.stack.colors().iter().map(|c| c.to_hex()).collect();
    let slots = colors.len();

    let mut config = a1_defaults();
    if let Value::Object(map) = &mut config {
        map.insert(
            "layer_height".to_string(),
            json!(format_number(request.settings.layer_height_mm)),
        );
        map.insert(
            "initial_layer_print_height".to_string(),
            json!(format_number(request.settings.first_layer_height_mm)),
        );
        map.insert("filament_colour".to_string(), json!(colors));
        for key in PER_FILAMENT_KEYS {
            resize_slots(map, key, slots);
        }
    }
    debug!(slots, "Merged Bambu project settings");
    Ok(serde_json::to_vec_pretty(&config)?)
}

/// Repeat the last value of a per-filament array until it has `slots` entries.
fn resize_slots(map: &mut Map<String, Value>, key: &str, slots: usize) {
    if let Some(Value::Array(values)) = map.get_mut(key) {
        let fill = values.last().cloned().unwrap_or(Value::Null);
        values.resize(slots, fill);
    }
}

fn metadata<W: Write>(writer: &mut Writer<W>, key: &str, value: &str) -> ExportResult<()> {
    let mut element = BytesStart::new("metadata");
    element.push_attribute(("key", key));
    element.push_attribute(("value", value));
    empty_element(writer, element)
}

/// Object, plate and assembly description.
fn model_settings(object_name: &str, placement: Vector3<f64>) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = xml_writer(&mut buffer, "UTF-8")?;

    start_element(&mut writer, BytesStart::new("config"))?;

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", "1"));
    start_element(&mut writer, object)?;
    metadata(&mut writer, "name", object_name)?;
    metadata(&mut writer, "extruder", "1")?;
    let mut part = BytesStart::new("part");
    part.push_attribute(("id", "1"));
    part.push_attribute(("subtype", "normal_part"));
    start_element(&mut writer, part)?;
    metadata(&mut writer, "name", object_name)?;
    metadata(&mut writer, "matrix", "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1")?;
    end_element(&mut writer, "part")?;
    end_element(&mut writer, "object")?;

    start_element(&mut writer, BytesStart::new("plate"))?;
    metadata(&mut writer, "plater_id", "1")?;
    metadata(&mut writer, "plater_name", "")?;
    metadata(&mut writer, "locked", "false")?;
    metadata(&mut writer, "thumbnail_file", PLATE_THUMBNAIL_PATH)?;
    metadata(&mut writer, "top_file", TOP_THUMBNAIL_PATH)?;
    metadata(&mut writer, "pick_file", PICK_THUMBNAIL_PATH)?;
    start_element(&mut writer, BytesStart::new("model_instance"))?;
    metadata(&mut writer, "object_id", "1")?;
    metadata(&mut writer, "instance_id", "0")?;
    metadata(&mut writer, "identify_id", "1")?;
    end_element(&mut writer, "model_instance")?;
    end_element(&mut writer, "plate")?;

    start_element(&mut writer, BytesStart::new("assemble"))?;
    let transform = format!(
        "1 0 0 0 1 0 0 0 1 {} {} {}",
        format_number(placement.x),
        format_number(placement.y),
        format_number(placement.z)
    );
    let mut item = BytesStart::new("assemble_item");
    item.push_attribute(("object_id", "1"));
    item.push_attribute(("instance_id", "0"));
    item.push_attribute(("transform", transform.as_str()));
    item.push_attribute(("offset", "0 0 0"));
    empty_element(&mut writer, item)?;
    end_element(&mut writer, "assemble")?;

    end_element(&mut writer, "config")?;
    Ok(buffer)
}

/// One tool change per color on plate 1, printed as a single object.
fn custom_gcode_xml(changes: &[ToolChange]) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = xml_writer(&mut buffer, "utf-8")?;
    start_element(&mut writer, BytesStart::new("custom_gcodes_per_layer"))?;
    start_element(&mut writer, BytesStart::new("plate"))?;
    let mut info = BytesStart::new("plate_info");
    info.push_attribute(("id", "1"));
    empty_element(&mut writer, info)?;
    for change in changes {
        let top_z = format_number(change.z_mm);
        let extruder = change.extruder.to_string();
        let color = change.color.to_hex();
        let mut layer = BytesStart::new("layer");
        layer.push_attribute(("top_z", top_z.as_str()));
        layer.push_attribute(("type", "2"));
        layer.push_attribute(("extruder", extruder.as_str()));
        layer.push_attribute(("color", color.as_str()));
        layer.push_attribute(("extra", ""));
        layer.push_attribute(("gcode", "tool_change"));
        empty_element(&mut writer, layer)?;
    }
    let mut mode = BytesStart::new("mode");
    mode.push_attribute(("value", "MultiAsSingle"));
    empty_element(&mut writer, mode)?;
    end_element(&mut writer, "plate")?;
    end_element(&mut writer, "custom_gcodes_per_layer")?;
    Ok(buffer)
}
