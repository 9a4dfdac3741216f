//! `relief` command-line tool.
//!
//! # Commands
//!
//! - `relief build <image> -o out.bambu.3mf` - build a relief and export it
//! - `relief palette <image>` - show the derived layer stack
//! - `relief layers <image>` - show the print layers of every color
//!
//! Outputs pick their format from the extension, so one run can write an
//! STL and slicer projects side by side:
//!
//! ```text
//! relief build cat.jpg -k 6 -o cat.stl -o cat.prusa.3mf -o cat.bambu.3mf
//! ```

mod args;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use relief::prelude::*;
use relief::types::{LayerConfig, nearest_filament};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::args::{Cli, Command, StackArgs, stl_format};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build {
            stack,
            geometry,
            print,
            outputs,
            ascii,
            date,
        } => {
            let image = load_image(&stack.image)?;
            let mut params = ReliefParams::default()
                .with_pattern(stack.pattern())
                .with_height(geometry.height())
                .with_resolution(geometry.resolution)
                .with_print(print.settings(geometry.max_height));
            params.max_dimension_mm = geometry.size;
            params.export.stl_format = stl_format(ascii);
            params.export.creation_date = date;
            if geometry.stepped {
                params = params.stepped();
            }

            let relief = relief_for(&image, &stack, params)?;
            let outputs = if outputs.is_empty() {
                vec![stack.image.with_extension("stl")]
            } else {
                outputs
            };
            build(&relief, &outputs)
        }
        Command::Palette { stack, json } => {
            let image = load_image(&stack.image)?;
            let params = ReliefParams::default().with_pattern(stack.pattern());
            let relief = relief_for(&image, &stack, params)?;
            print_palette(relief.stack(), json)
        }
        Command::Layers {
            stack,
            print,
            max_height,
        } => {
            let image = load_image(&stack.image)?;
            let params = ReliefParams::default()
                .with_pattern(stack.pattern())
                .with_height(HeightParams::default().with_max_height(max_height))
                .with_print(print.settings(max_height));
            let relief = relief_for(&image, &stack, params)?;
            print_layers(&relief);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Decode an image file into RGBA pixels.
fn load_image(path: &Path) -> Result<PixelBuffer> {
    let rgba = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        bail!("{} has no pixels", path.display());
    }
    info!(path = %path.display(), width, height, "Loaded image");
    Ok(PixelBuffer::new(width, height, rgba.into_raw())?)
}

fn load_layers(path: &Path) -> Result<LayerStack> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let configs: Vec<LayerConfig> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a layer list", path.display()))?;
    let stack = LayerStack::from_configs(&configs)
        .with_context(|| format!("invalid layer stack in {}", path.display()))?;
    debug!(layers = stack.len(), "Loaded layer stack");
    Ok(stack)
}

fn relief_for<'a>(
    image: &'a PixelBuffer,
    stack: &StackArgs,
    params: ReliefParams,
) -> Result<Relief<'a>> {
    Ok(match &stack.layers {
        Some(path) => Relief::with_stack(image, load_layers(path)?, params),
        None => Relief::new(image, params),
    })
}

fn build(relief: &Relief<'_>, outputs: &[PathBuf]) -> Result<()> {
    let targets = outputs
        .iter()
        .map(|path| {
            ExportTarget::from_path(path)
                .with_context(|| format!("unknown output format for {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    for (path, (target, bytes)) in outputs.iter().zip(relief.export_all(&targets)) {
        let bytes = bytes.with_context(|| format!("{target} export failed"))?;
        fs::write(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
        info!(target = %target, path = %path.display(), bytes = bytes.len(), "Wrote");
    }

    print_layers(relief);
    Ok(())
}

fn print_palette(stack: &LayerStack, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&stack.to_configs())?);
        return Ok(());
    }
    for (i, layer) in stack.iter().enumerate() {
        let filament = nearest_filament(layer.color());
        println!(
            "{i:>2}  {}  {:>5.1}%  td {:.1}  ~ {} {}",
            layer.color(),
            layer.height_fraction() * 100.0,
            layer.transmission_distance(),
            filament.brand,
            filament.name,
        );
    }
    Ok(())
}

fn print_layers(relief: &Relief<'_>) {
    let changes = relief.tool_changes();
    for (i, range) in relief.layer_ranges().iter().enumerate() {
        let z = i
            .checked_sub(1)
            .and_then(|k| changes.get(k))
            .map_or_else(|| "start".to_string(), |c| format!("Z {:.2} mm", c.z_mm));
        println!(
            "{}  layers {:>3}-{:<3} ({} layers, {z})",
            range.color,
            range.start,
            range.end,
            range.layer_count(),
        );
    }
}
