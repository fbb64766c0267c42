//! Detector pixel plotter.
//!
//! Reads a det.pix file (header parameters, a `#--` sentinel, then a table of
//! per-pixel measurements), bins the selected quantity into a grid with a
//! fixed margin and renders it as a false-color heat map with a colorbar.
//! The figure is written as PNG and optionally shown with a viewer command.

mod args;
mod config;
mod display;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use det_pix::{DensityGrid, GridBounds};
use renderer::{render_figure, FigureCounter, PhysicalExtent};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use args::{Invocation, Resolution, USAGE};
use config::Settings;

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let invocation = match args::resolve(std::env::args().skip(1)) {
        Resolution::Run(invocation) => invocation,
        Resolution::Usage => {
            print!("{USAGE}");
            return Ok(());
        }
    };

    let settings = Settings::from_env()?;
    init_tracing(&settings)?;

    let path = plot(&invocation, &settings)?;
    display::show(&path, settings.viewer())
}

fn init_tracing(settings: &Settings) -> Result<()> {
    let builder = FmtSubscriber::builder()
        .with_max_level(settings.level())
        .with_writer(std::io::stderr)
        .with_target(false);

    if settings.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Load, bin and render one file. Returns the path of the written figure.
fn plot(invocation: &Invocation, settings: &Settings) -> Result<PathBuf> {
    info!(
        input = %invocation.input.display(),
        quantity = %invocation.quantity,
        scale = invocation.scale,
        "Plotting detector pixels"
    );

    let file = det_pix::load(&invocation.input, invocation.quantity, |line| {
        println!("{line}")
    })
    .with_context(|| format!("Failed to read {}", invocation.input.display()))?;

    let bounds = GridBounds::from_geometry(&file.geometry).context("Failed to size the grid")?;
    println!("nx min/max: {}, {}", bounds.nx_min, bounds.nx_max);
    println!("ny min/max: {}, {}", bounds.ny_min, bounds.ny_max);

    let grid = DensityGrid::bin(bounds, &file.records).context("Failed to bin pixel data")?;
    let extent = PhysicalExtent::new(&bounds, &file.geometry, invocation.scale)
        .context("Failed to compute plot extent")?;

    let stem = figure_stem(&invocation.input);
    let title = format!("{stem}: {}", invocation.quantity.description());
    let counter = FigureCounter::after_existing(&settings.output_dir, &stem)
        .context("Failed to scan for existing figures")?;
    let options = settings.figure_options(Some(title));
    let (figure, _counter) =
        render_figure(&grid, &extent, &options, counter).context("Failed to render figure")?;

    figure
        .write_to(&settings.output_dir, &stem)
        .with_context(|| {
            format!(
                "Failed to write figure to {}",
                settings.output_dir.display()
            )
        })
}

/// Output name stem: the input file name without its extension.
fn figure_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "det_pix".to_string())
}
