//! Print settings, export options and export targets.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// Physical print parameters shared by every exporter.
///
/// # Example
///
/// ```
/// use relief_export::PrintSettings;
///
/// let settings = PrintSettings::with_layer_height(0.1);
/// assert!((settings.first_layer_height_mm - 0.2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrintSettings {
    /// Regular layer height in millimeters.
    pub layer_height_mm: f64,

    /// First layer height in millimeters. Twice the layer height by convention.
    pub first_layer_height_mm: f64,

    /// Solid base below the relief surface in millimeters.
    pub base_thickness_mm: f64,

    /// Tallest possible relief height above the base in millimeters.
    pub model_height_mm: f64,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            layer_height_mm: 0.08,
            first_layer_height_mm: 0.16,
            base_thickness_mm: 0.16,
            model_height_mm: 2.0,
        }
    }
}

impl PrintSettings {
    /// Settings for the given layer height, with a first layer twice as tall.
    #[must_use]
    pub fn with_layer_height(layer_height_mm: f64) -> Self {
        Self {
            layer_height_mm,
            first_layer_height_mm: 2.0 * layer_height_mm,
            ..Self::default()
        }
    }

    /// 0.20 mm layers, the usual draft profile.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_layer_height(0.2)
    }

    /// Override the first layer height.
    #[must_use]
    pub const fn first_layer_height(mut self, mm: f64) -> Self {
        self.first_layer_height_mm = mm;
        self
    }

    /// Set the base thickness.
    #[must_use]
    pub const fn base_thickness(mut self, mm: f64) -> Self {
        self.base_thickness_mm = mm;
        self
    }

    /// Set the relief height above the base.
    #[must_use]
    pub const fn model_height(mut self, mm: f64) -> Self {
        self.model_height_mm = mm;
        self
    }

    /// Base thickness plus relief height.
    #[must_use]
    pub fn total_print_height(&self) -> f64 {
        self.base_thickness_mm + self.model_height_mm
    }

    /// Check the settings describe a printable job.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidSettings`] for non-positive layer
    /// heights or negative thicknesses.
    pub fn validate(&self) -> ExportResult<()> {
        if !(self.layer_height_mm.is_finite() && self.layer_height_mm > 0.0) {
            return Err(ExportError::invalid_settings(format!(
                "layer height must be positive, got {}",
                self.layer_height_mm
            )));
        }
        if !(self.first_layer_height_mm.is_finite() && self.first_layer_height_mm > 0.0) {
            return Err(ExportError::invalid_settings(format!(
                "first layer height must be positive, got {}",
                self.first_layer_height_mm
            )));
        }
        if !(self.base_thickness_mm.is_finite() && self.base_thickness_mm >= 0.0) {
            return Err(ExportError::invalid_settings(format!(
                "base thickness must be non-negative, got {}",
                self.base_thickness_mm
            )));
        }
        if !(self.model_height_mm.is_finite() && self.model_height_mm >= 0.0) {
            return Err(ExportError::invalid_settings(format!(
                "model height must be non-negative, got {}",
                self.model_height_mm
            )));
        }
        Ok(())
    }
}

/// STL encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StlFormat {
    /// 80-byte header, little-endian triangles.
    #[default]
    Binary,
    /// Human-readable `facet`/`vertex` text.
    Ascii,
}

/// Options that do not change the geometry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExportOptions {
    /// Encoding used for STL output.
    pub stl_format: StlFormat,

    /// Fixed `CreationDate` metadata. The current UTC date is used when unset.
    pub creation_date: Option<String>,

    /// Object name written into 3MF metadata.
    pub object_name: String,

    /// Margin kept free around the model on slicer beds, in millimeters.
    pub bed_padding_mm: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            stl_format: StlFormat::Binary,
            creation_date: None,
            object_name: "relief".to_string(),
            bed_padding_mm: 10.0,
        }
    }
}

impl ExportOptions {
    /// Options with a fixed creation date, for reproducible archives.
    #[must_use]
    pub fn reproducible(date: impl Into<String>) -> Self {
        Self {
            creation_date: Some(date.into()),
            ..Self::default()
        }
    }

    /// Set the STL encoding.
    #[must_use]
    pub fn with_stl_format(mut self, format: StlFormat) -> Self {
        self.stl_format = format;
        self
    }

    /// The creation date to embed, `YYYY-MM-DD`.
    #[must_use]
    pub fn creation_date(&self) -> String {
        self.creation_date
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string())
    }
}

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExportTarget {
    /// Plain triangle soup.
    Stl,
    /// Core-schema 3MF with human-readable color notes.
    Generic3mf,
    /// PrusaSlicer project with color changes.
    Prusa3mf,
    /// Bambu Studio project with tool changes.
    Bambu3mf,
}

impl ExportTarget {
    /// Every target, in menu order.
    pub const ALL: [Self; 4] = [Self::Stl, Self::Generic3mf, Self::Prusa3mf, Self::Bambu3mf];

    /// Short name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Generic3mf => "3mf",
            Self::Prusa3mf => "prusa",
            Self::Bambu3mf => "bambu",
        }
    }

    /// File name suffix, including the leading dot.
    #[must_use]
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::Stl => ".stl",
            Self::Generic3mf => ".3mf",
            Self::Prusa3mf => ".prusa.3mf",
            Self::Bambu3mf => ".bambu.3mf",
        }
    }

    /// Whether the target embeds a thumbnail.
    #[must_use]
    pub const fn needs_thumbnail(self) -> bool {
        matches!(self, Self::Prusa3mf | Self::Bambu3mf)
    }

    /// Detect the target from a file name.
    ///
    /// `.prusa.3mf` and `.build.3mf` select PrusaSlicer, `.bambu.3mf`
    /// selects Bambu Studio and any other `.3mf` is generic.
    ///
    /// # Example
    ///
    /// ```
    /// use relief_export::ExportTarget;
    ///
    /// assert_eq!(ExportTarget::from_path("cat.bambu.3mf"), Some(ExportTarget::Bambu3mf));
    /// assert_eq!(ExportTarget::from_path("cat.STL"), Some(ExportTarget::Stl));
    /// assert_eq!(ExportTarget::from_path("cat.obj"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".stl") {
            Some(Self::Stl)
        } else if name.ends_with(".prusa.3mf") || name.ends_with(".build.3mf") {
            Some(Self::Prusa3mf)
        } else if name.ends_with(".bambu.3mf") {
            Some(Self::Bambu3mf)
        } else if name.ends_with(".3mf") {
            Some(Self::Generic3mf)
        } else {
            None
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportTarget {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "3mf" | "generic" | "generic3mf" => Ok(Self::Generic3mf),
            "prusa" | "prusa3mf" | "prusaslicer" => Ok(Self::Prusa3mf),
            "bambu" | "bambu3mf" | "bambustudio" => Ok(Self::Bambu3mf),
            _ => Err(ExportError::UnknownTarget {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let s = PrintSettings::default();
        assert_eq!(s.layer_height_mm, 0.08);
        assert_eq!(s.first_layer_height_mm, 0.16);
        assert!((s.total_print_height() - 2.16).abs() < 1e-12);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(PrintSettings::with_layer_height(0.0).validate().is_err());
        assert!(PrintSettings::default().base_thickness(-1.0).validate().is_err());
        assert!(PrintSettings::default().first_layer_height(f64::NAN).validate().is_err());
        assert!(PrintSettings::default().model_height(-0.1).validate().is_err());
    }

    #[test]
    fn target_detection() {
        assert_eq!(ExportTarget::from_path("a/b/model.stl"), Some(ExportTarget::Stl));
        assert_eq!(ExportTarget::from_path("model.3mf"), Some(ExportTarget::Generic3mf));
        assert_eq!(ExportTarget::from_path("model.build.3mf"), Some(ExportTarget::Prusa3mf));
        assert_eq!(ExportTarget::from_path("model.Prusa.3MF"), Some(ExportTarget::Prusa3mf));
        assert_eq!(ExportTarget::from_path("model.bambu.3mf"), Some(ExportTarget::Bambu3mf));
        assert_eq!(ExportTarget::from_path("model"), None);
    }

    #[test]
    fn target_names_round_trip() {
        for target in ExportTarget::ALL {
            assert_eq!(target.name().parse::<ExportTarget>().unwrap(), target);
            assert_eq!(
                ExportTarget::from_path(format!("x{}", target.file_suffix())),
                Some(target)
            );
        }
        assert!("obj".parse::<ExportTarget>().is_err());
    }

    #[test]
    fn creation_date_override() {
        let options = ExportOptions::reproducible("2024-02-19");
        assert_eq!(options.creation_date(), "2024-02-19");
        assert_eq!(ExportOptions::default().creation_date().len(), 10);
    }
}
