//! Target dispatch and file output.

use std::path::Path;

use tracing::info;

use crate::bambu::write_bambu_3mf;
use crate::error::ExportResult;
use crate::generic::write_generic_3mf;
use crate::prusa::write_prusa_3mf;
use crate::request::ExportRequest;
use crate::settings::ExportTarget;
use crate::stl::write_stl;

/// Encode `request` for `target`.
///
/// # Errors
///
/// Returns the error of the target's writer.
pub fn export_bytes(target: ExportTarget, request: &ExportRequest<'_>) -> ExportResult<Vec<u8>> {
    match target {
        ExportTarget::Stl => {
            request.settings.validate()?;
            write_stl(request.mesh, request.options.stl_format)
        }
        ExportTarget::Generic3mf => write_generic_3mf(request),
        ExportTarget::Prusa3mf => write_prusa_3mf(request),
        ExportTarget::Bambu3mf => write_bambu_3mf(request),
    }
}

/// Encode `request` for `target` and write it to `path`.
///
/// # Errors
///
/// Returns an encoding error or the I/O error of writing the file.
pub fn export_to_path<P: AsRef<Path>>(
    target: ExportTarget,
    request: &ExportRequest<'_>,
    path: P,
) -> ExportResult<()> {
    let path = path.as_ref();
    let bytes = export_bytes(target, request)?;
    std::fs::write(path, &bytes)?;
    info!(
        target = %target,
        path = %path.display(),
        bytes = bytes.len(),
        "Wrote export"
    );
    Ok(())
}
