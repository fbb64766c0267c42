//! Tests for figure rendering, numbering and output.
//!
//! Pixel-level checks render without labels so the results do not depend on
//! the fonts installed on the machine running the tests.

use det_pix::{load_from_reader, DensityGrid, GridBounds, PixelRecord, Quantity};
use renderer::{font_available, render_figure, FigureCounter, FigureOptions, PhysicalExtent};
use std::collections::HashSet;
use std::io::Cursor;
use test_utils::{create_gaussian_spot, fixtures, list_files, temp_test_dir, DetPixBuilder};

// ============================================================================
// Helper functions
// ============================================================================

fn unlabelled(width: u32, height: u32) -> FigureOptions {
    FigureOptions {
        width,
        height,
        labels: false,
        title: None,
    }
}

fn gaussian_grid() -> (DensityGrid, PhysicalExtent) {
    let content = DetPixBuilder::new(fixtures::geometry::SMALL_SQUARE)
        .rows(create_gaussian_spot(5, 2.0, 100.0))
        .build();
    let file = load_from_reader(Cursor::new(content), Quantity::Intensity, |_| {}).unwrap();
    let bounds = GridBounds::from_geometry(&file.geometry).unwrap();
    let grid = DensityGrid::bin(bounds, &file.records).unwrap();
    let extent = PhysicalExtent::new(&bounds, &file.geometry, 1e3).unwrap();
    (grid, extent)
}

fn decode(bytes: &[u8]) -> image::RgbImage {
    image::load_from_memory(bytes)
        .expect("figure is a valid PNG")
        .to_rgb8()
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_figure_has_requested_size() {
    let (grid, extent) = gaussian_grid();
    let (figure, _) =
        render_figure(&grid, &extent, &unlabelled(640, 480), FigureCounter::new()).unwrap();

    assert_eq!((figure.width, figure.height), (640, 480));
    let image = decode(&figure.png);
    assert_eq!(image.dimensions(), (640, 480));
}

#[test]
fn test_figure_shows_heat_map_and_colorbar() {
    let (grid, extent) = gaussian_grid();
    let (figure, _) =
        render_figure(&grid, &extent, &unlabelled(800, 640), FigureCounter::new()).unwrap();

    let image = decode(&figure.png);
    let colors: HashSet<[u8; 3]> = image.pixels().map(|p| p.0).collect();
    assert!(colors.len() > 50, "only {} colors", colors.len());
    assert!(colors.contains(&[0, 0, 0]));
    assert!(colors.contains(&[255, 255, 255]));
}

#[test]
fn test_origin_is_lower_left() {
    let bounds = GridBounds::from_geometry(&det_pix::DetectorGeometry {
        nx_active_min: -5,
        nx_active_max: 5,
        ny_active_min: -5,
        ny_active_max: 5,
        dx_pixel: 0.01,
        dy_pixel: 0.01,
    })
    .unwrap();
    // Bright pixel right of center and below it, dimmer one mirrored.
    let records = [
        PixelRecord::new(5.0, -5.0, 1.0),
        PixelRecord::new(-5.0, 5.0, 0.5),
    ];
    let grid = DensityGrid::bin(bounds, &records).unwrap();
    let extent = PhysicalExtent {
        x_min: -15.0,
        x_max: 15.0,
        y_min: -15.0,
        y_max: 15.0,
    };
    let (figure, _) =
        render_figure(&grid, &extent, &unlabelled(800, 640), FigureCounter::new()).unwrap();
    let image = decode(&figure.png);

    // Plot area spans x 10..740 and y 10..630 with 31 cells per axis.
    let center = |i: u32, j: u32| {
        let x = 10.0 + (i as f64 + 0.5) * 730.0 / 31.0;
        let y = 630.0 - (j as f64 + 0.5) * 620.0 / 31.0;
        (x.round() as u32, y.round() as u32)
    };

    let (x, y) = center(20, 10);
    assert_eq!(image.get_pixel(x, y).0, [255, 255, 255]);
    let (x, y) = center(10, 20);
    assert_eq!(image.get_pixel(x, y).0, [199, 41, 214]);
    let (x, y) = center(15, 15);
    assert_eq!(image.get_pixel(x, y).0, [0, 0, 0]);
}

#[test]
fn test_uniform_grid_renders() {
    let bounds = GridBounds {
        nx_min: -15,
        nx_max: 15,
        ny_min: -15,
        ny_max: 15,
    };
    let grid = DensityGrid::zeros(bounds).unwrap();
    let extent = PhysicalExtent {
        x_min: -1.5,
        x_max: 1.5,
        y_min: -1.5,
        y_max: 1.5,
    };

    let (figure, counter) =
        render_figure(&grid, &extent, &unlabelled(400, 300), FigureCounter::new()).unwrap();
    assert_eq!(counter.last(), 1);
    assert_eq!(decode(&figure.png).dimensions(), (400, 300));
}

#[test]
fn test_labelled_figure_renders_with_or_without_fonts() {
    let (mut grid, extent) = gaussian_grid();
    grid.insert(&PixelRecord::new(1.0, 1.0, f64::NAN)).unwrap();
    let options = FigureOptions {
        title: Some("det: Total intensity".to_string()),
        ..FigureOptions::default()
    };

    let (figure, counter) = render_figure(&grid, &extent, &options, FigureCounter::new()).unwrap();
    assert_eq!(counter.last(), 1);
    assert_eq!(decode(&figure.png).dimensions(), (800, 640));
}

#[test]
fn test_labelled_figure_draws_tick_labels() {
    if !font_available() {
        eprintln!("no usable font, skipping labelled drawing check");
        return;
    }
    let (grid, extent) = gaussian_grid();
    let labelled = FigureOptions::default();
    let (figure, _) = render_figure(&grid, &extent, &labelled, FigureCounter::new()).unwrap();
    let image = decode(&figure.png);

    // The y label area sits between the left margin and the axis; only tick
    // text draws dark pixels there.
    let dark = |x: u32, y: u32| image.get_pixel(x, y).0.iter().all(|c| *c < 128);
    let has_text = (12..60).any(|x| (60..560).any(|y| dark(x, y)));
    assert!(has_text, "no tick label text left of the plot area");

    let (plain, _) =
        render_figure(&grid, &extent, &unlabelled(800, 640), FigureCounter::new()).unwrap();
    assert_ne!(figure.png, plain.png);
}

// ============================================================================
// Numbering and output
// ============================================================================

#[test]
fn test_repeated_renders_get_new_numbers() {
    let (grid, extent) = gaussian_grid();
    let options = unlabelled(320, 240);

    let counter = FigureCounter::new();
    let (first, counter) = render_figure(&grid, &extent, &options, counter).unwrap();
    let (second, counter) = render_figure(&grid, &extent, &options, counter).unwrap();

    assert_eq!(first.number, 1);
    assert_eq!(second.number, 2);
    assert_eq!(counter.last(), 2);
    assert_eq!(second.file_name("det"), "det_fig2.png");
}

#[test]
fn test_write_to_creates_directory() {
    let (grid, extent) = gaussian_grid();
    let (figure, _) =
        render_figure(&grid, &extent, &unlabelled(320, 240), FigureCounter::new()).unwrap();

    let dir = temp_test_dir();
    let out_dir = dir.path().join("figures");
    let path = figure.write_to(&out_dir, "det").unwrap();

    assert_eq!(path, out_dir.join("det_fig1.png"));
    assert_eq!(list_files(&out_dir), vec!["det_fig1.png".to_string()]);
    assert_eq!(std::fs::read(&path).unwrap(), figure.png);
}

#[test]
fn test_counter_resumes_after_existing_figures() {
    let dir = temp_test_dir();
    let counter = FigureCounter::after_existing(dir.path().join("absent"), "det").unwrap();
    assert_eq!(counter.last(), 0);

    for name in [
        "det_fig1.png",
        "det_fig4.png",
        "det_figx.png",
        "scan_fig9.png",
        "det_fig7.txt",
    ] {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    let counter = FigureCounter::after_existing(dir.path(), "det").unwrap();
    assert_eq!(counter.last(), 4);

    let (grid, extent) = gaussian_grid();
    let (figure, _) = render_figure(&grid, &extent, &unlabelled(320, 240), counter).unwrap();
    let path = figure.write_to(dir.path(), "det").unwrap();
    assert_eq!(path, dir.path().join("det_fig5.png"));
}
