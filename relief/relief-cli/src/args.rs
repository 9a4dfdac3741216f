//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use relief::export::StlFormat;
use relief::prelude::*;

/// Turn a photo into a multi-color relief for FDM printing.
#[derive(Debug, Parser)]
#[command(name = "relief")]
#[command(about = "Photo to multi-color relief: STL and slicer-ready 3MF", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a relief and write one or more print files
    Build {
        #[command(flatten)]
        stack: StackArgs,

        #[command(flatten)]
        geometry: GeometryArgs,

        #[command(flatten)]
        print: PrintArgs,

        /// Output files; the format follows the extension
        /// (.stl, .3mf, .prusa.3mf, .bambu.3mf)
        #[arg(short, long = "output", value_name = "PATH")]
        outputs: Vec<PathBuf>,

        /// Write ASCII instead of binary STL
        #[arg(long)]
        ascii: bool,

        /// Fixed creation date (YYYY-MM-DD) for reproducible archives
        #[arg(long, value_name = "DATE")]
        date: Option<String>,
    },

    /// Print the layer stack derived from an image
    Palette {
        #[command(flatten)]
        stack: StackArgs,

        /// Print the stack as JSON, readable by --layers
        #[arg(long)]
        json: bool,
    },

    /// Print the layer range and color change of every stack entry
    Layers {
        #[command(flatten)]
        stack: StackArgs,

        #[command(flatten)]
        print: PrintArgs,

        /// Model height in millimeters, without the base
        #[arg(long, default_value_t = 2.0)]
        max_height: f64,
    },
}

/// Where the layer stack comes from.
#[derive(Debug, Args)]
pub struct StackArgs {
    /// Source image (PNG or JPEG)
    #[arg(value_name = "IMAGE")]
    pub image: PathBuf,

    /// How the stack is derived from the image
    #[arg(long, value_enum, default_value_t = PatternArg::Dominant)]
    pub pattern: PatternArg,

    /// Number of dominant colors (2-15)
    #[arg(short = 'k', long, default_value_t = 5)]
    pub colors: usize,

    /// JSON layer stack: [{"color": "#RRGGBB", "heightPercentage": 50, "td": 1.2}, ...]
    #[arg(long, value_name = "FILE", conflicts_with = "pattern")]
    pub layers: Option<PathBuf>,
}

impl StackArgs {
    pub fn pattern(&self) -> PalettePattern {
        match self.pattern {
            PatternArg::Dominant => {
                PalettePattern::DominantColors(PaletteParams::with_color_count(self.colors))
            }
            PatternArg::Grayscale => PalettePattern::GrayscaleFixed,
            PatternArg::GrayscaleDistributed => PalettePattern::GrayscaleDistributed,
            PatternArg::Posterized => PalettePattern::Posterized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternArg {
    Dominant,
    Grayscale,
    GrayscaleDistributed,
    Posterized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Luminance,
    Palette,
}

/// Mesh shape.
#[derive(Debug, Args)]
pub struct GeometryArgs {
    /// Grid vertices along the longer image axis (50-800)
    #[arg(short, long, default_value_t = 200)]
    pub resolution: u32,

    /// Longer side of the model in millimeters
    #[arg(long, default_value_t = 100.0)]
    pub size: f64,

    /// Model height in millimeters, without the base
    #[arg(long, default_value_t = 2.0)]
    pub max_height: f64,

    /// How pixels map to heights
    #[arg(long, value_enum, default_value_t = ModeArg::Palette)]
    pub mode: ModeArg,

    /// Snap heights to whole print layers
    #[arg(long)]
    pub stepped: bool,
}

/// Print settings shared by the layer report and the exporters.
#[derive(Debug, Args)]
pub struct PrintArgs {
    /// Layer height in millimeters; the first layer is twice as tall
    #[arg(long, default_value_t = 0.08)]
    pub layer_height: f64,

    /// Solid base under the relief, in millimeters
    #[arg(long, default_value_t = 0.16)]
    pub base: f64,
}

impl PrintArgs {
    pub fn settings(&self, model_height_mm: f64) -> PrintSettings {
        PrintSettings::with_layer_height(self.layer_height)
            .base_thickness(self.base)
            .model_height(model_height_mm)
    }
}

impl GeometryArgs {
    pub fn height(&self) -> HeightParams {
        match self.mode {
            ModeArg::Luminance => HeightParams::luminance(self.max_height),
            ModeArg::Palette => HeightParams::palette_distance(self.max_height),
        }
    }
}

pub fn stl_format(ascii: bool) -> StlFormat {
    if ascii { StlFormat::Ascii } else { StlFormat::Binary }
}
