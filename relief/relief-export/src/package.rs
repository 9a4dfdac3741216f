//! In-memory ZIP container for 3MF packages.

use std::io::{Cursor, Write};

use quick_xml::events::BytesStart;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::encode::{empty_element, end_element, start_element, xml_writer};
use crate::error::ExportResult;

/// Content types shared by every 3MF package.
pub(crate) const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
  <Default Extension="png" ContentType="image/png"/>
</Types>"#;

/// Relationship type of the 3D model part.
pub(crate) const MODEL_RELATIONSHIP: &str =
    "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Relationship type of the package thumbnail.
pub(crate) const THUMBNAIL_RELATIONSHIP: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/thumbnail";

/// Path of the model part inside the package.
pub(crate) const MODEL_PATH: &str = "3D/3dmodel.model";

/// Build a `_rels/.rels` document from `(target, type)` pairs.
pub(crate) fn relationships(entries: &[(&str, &str)]) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = xml_writer(&mut buffer, "UTF-8")?;
    let mut root = BytesStart::new("Relationships");
    root.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/package/2006/relationships",
    ));
    start_element(&mut writer, root)?;
    for (i, (target, kind)) in entries.iter().enumerate() {
        let target = format!("/{target}");
        let id = format!("rel{i}");
        let mut relationship = BytesStart::new("Relationship");
        relationship.push_attribute(("Target", target.as_str()));
        relationship.push_attribute(("Id", id.as_str()));
        relationship.push_attribute(("Type", *kind));
        empty_element(&mut writer, relationship)?;
    }
    end_element(&mut writer, "Relationships")?;
    Ok(buffer)
}

/// A ZIP archive assembled in memory.
///
/// Entry timestamps are fixed so equal inputs give equal bytes.
pub(crate) struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    pub(crate) fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default()),
        }
    }

    /// Add one file.
    pub(crate) fn add(&mut self, name: &str, contents: &[u8]) -> ExportResult<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(contents)?;
        debug!(entry = name, bytes = contents.len(), "Added package entry");
        Ok(())
    }

    /// Add the content types and relationships every 3MF reader expects.
    pub(crate) fn add_opc_parts(&mut self, relationships_xml: &[u8]) -> ExportResult<()> {
        self.add("[Content_Types].xml", CONTENT_TYPES_XML.as_bytes())?;
        self.add("_rels/.rels", relationships_xml)
    }

    /// Finish the central directory and return the archive bytes.
    pub(crate) fn finish(self) -> ExportResult<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn archive_round_trip() {
        let mut package = Package::new();
        package
            .add_opc_parts(&relationships(&[(MODEL_PATH, MODEL_RELATIONSHIP)]).unwrap())
            .unwrap();
        package.add("Metadata/note.txt", b"hello").unwrap();
        let bytes = package.finish().unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);
        let mut text = String::new();
        archive
            .by_name("Metadata/note.txt")
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn equal_inputs_give_equal_bytes() {
        let build = || {
            let mut package = Package::new();
            package.add("a.txt", b"same").unwrap();
            package.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn relationship_ids_are_sequential() {
        let xml = relationships(&[
            (MODEL_PATH, MODEL_RELATIONSHIP),
            ("Metadata/thumbnail.png", THUMBNAIL_RELATIONSHIP),
        ])
        .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains(r#"Target="/3D/3dmodel.model" Id="rel0""#));
        assert!(xml.contains(r#"Target="/Metadata/thumbnail.png" Id="rel1""#));
    }
}
