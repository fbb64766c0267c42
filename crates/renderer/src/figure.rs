//! Heat-map figures with a colorbar.
//!
//! A binned [`DensityGrid`] is drawn over its [`PhysicalExtent`] with the
//! `gnuplot2` color map, the origin at the lower left and a vertical colorbar
//! on the right. The frame is rasterized with `plotters` into an RGB buffer
//! and encoded with this crate's PNG encoder.
//!
//! Axis labels need a system font. When none can be loaded the figure is
//! drawn without text (frame and tick marks only).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use det_pix::DensityGrid;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{drawing_error, RenderError, Result};
use crate::extent::{format_tick, nice_ticks, PhysicalExtent, TickPlan};
use crate::gradient::{gnuplot2_color, render_grid};
use crate::png::{encode_rgb, PngEncoding};

/// Smallest canvas the layout fits in.
pub const MIN_WIDTH: u32 = 160;
pub const MIN_HEIGHT: u32 = 120;

const COLORBAR_STEPS: usize = 256;
const LABEL_FONT: &str = "sans-serif";

/// Number of the last figure produced in a session.
///
/// Passed into [`render_figure`] and handed back advanced, so repeated renders
/// get fresh numbers without any global state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FigureCounter {
    last: u32,
}

impl FigureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of the most recent figure, 0 before the first.
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Counter positioned after the highest `<stem>_fig<N>.png` in `dir`.
    ///
    /// A missing directory counts as empty.
    pub fn after_existing(dir: impl AsRef<Path>, stem: &str) -> Result<Self> {
        let entries = match fs::read_dir(dir.as_ref()) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(err.into()),
        };

        let prefix = format!("{stem}_fig");
        let mut last = 0;
        for entry in entries {
            let name = entry?.file_name();
            let number = name
                .to_str()
                .and_then(|name| name.strip_prefix(prefix.as_str()))
                .and_then(|rest| rest.strip_suffix(".png"))
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<u32>().ok());
            if let Some(number) = number {
                last = last.max(number);
            }
        }
        Ok(Self { last })
    }

    /// Claim the next figure number.
    pub fn advance(self) -> (u32, FigureCounter) {
        let next = self.last.saturating_add(1);
        (next, FigureCounter { last: next })
    }
}

/// Canvas and decoration settings.
#[derive(Debug, Clone)]
pub struct FigureOptions {
    pub width: u32,
    pub height: u32,
    /// Draw tick labels and the title. Ignored when no font is available.
    pub labels: bool,
    pub title: Option<String>,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 640,
            labels: true,
            title: None,
        }
    }
}

/// A rendered, PNG-encoded figure.
#[derive(Debug, Clone)]
pub struct Figure {
    pub number: u32,
    pub width: u32,
    pub height: u32,
    pub encoding: PngEncoding,
    pub png: Vec<u8>,
}

impl Figure {
    /// `<stem>_fig<N>.png`
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}_fig{}.png", self.number)
    }

    /// Write the PNG into `dir`, creating it if needed.
    pub fn write_to(&self, dir: impl AsRef<Path>, stem: &str) -> Result<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(stem));
        fs::write(&path, &self.png)?;
        info!(path = %path.display(), bytes = self.png.len(), "Wrote figure");
        Ok(path)
    }
}

/// Render `grid` over `extent` and encode it as PNG.
///
/// Returns the figure together with the advanced counter.
pub fn render_figure(
    grid: &DensityGrid,
    extent: &PhysicalExtent,
    options: &FigureOptions,
    counter: FigureCounter,
) -> Result<(Figure, FigureCounter)> {
    if options.width < MIN_WIDTH || options.height < MIN_HEIGHT {
        return Err(RenderError::Drawing(format!(
            "figure {}x{} is smaller than the minimum {MIN_WIDTH}x{MIN_HEIGHT}",
            options.width, options.height
        )));
    }

    let labelled = options.labels && font_available();
    if options.labels && !labelled {
        warn!(font = LABEL_FONT, "No usable font; drawing figure without labels");
    }

    let pixels = match rasterize(grid, extent, options, labelled) {
        Err(err) if labelled => {
            warn!(error = %err, "Labelled drawing failed; retrying without labels");
            rasterize(grid, extent, options, false)?
        }
        other => other?,
    };

    let encoded = encode_rgb(&pixels, options.width as usize, options.height as usize)?;
    let (number, counter) = counter.advance();
    debug!(
        figure = number,
        width = options.width,
        height = options.height,
        encoding = ?encoded.encoding,
        bytes = encoded.bytes.len(),
        "Rendered figure"
    );

    Ok((
        Figure {
            number,
            width: options.width,
            height: options.height,
            encoding: encoded.encoding,
            png: encoded.bytes,
        },
        counter,
    ))
}

/// Whether the label font can be loaded and measured.
pub fn font_available() -> bool {
    (LABEL_FONT, 12).into_font().box_size("0").is_ok()
}

fn rasterize(
    grid: &DensityGrid,
    extent: &PhysicalExtent,
    options: &FigureOptions,
    labelled: bool,
) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; options.width as usize * options.height as usize * 3];
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (options.width, options.height))
                .into_drawing_area();
        draw(&root, grid, extent, options, labelled)?;
        root.present().map_err(drawing_error)?;
    }
    Ok(buffer)
}

fn draw(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    grid: &DensityGrid,
    extent: &PhysicalExtent,
    options: &FigureOptions,
    labelled: bool,
) -> Result<()> {
    root.fill(&WHITE).map_err(drawing_error)?;

    let area = match (&options.title, labelled) {
        (Some(title), true) => root
            .titled(title, (LABEL_FONT, 20))
            .map_err(drawing_error)?,
        _ => root.clone(),
    };

    let colorbar_width = if labelled { 110 } else { 50 };
    let (plot_area, bar_area) =
        area.split_horizontally(options.width as i32 - colorbar_width);

    let (x_label_size, y_label_size) = if labelled { (40, 60) } else { (0, 0) };
    let mut chart = ChartBuilder::on(&plot_area)
        .margin(10)
        .x_label_area_size(x_label_size)
        .y_label_area_size(y_label_size)
        .build_cartesian_2d(extent.x_min..extent.x_max, extent.y_min..extent.y_max)
        .map_err(drawing_error)?;

    let (value_min, value_max) = grid.value_range();
    let (width, height) = (grid.width(), grid.height());
    let colors = render_grid(grid.values(), width, height, value_min, value_max, gnuplot2_color);
    let (cell_w, cell_h) = extent.cell_size(width, height);

    // Row 0 is the lowest y, so cells stack upward from y_min.
    chart
        .draw_series(
            (0..height)
                .flat_map(|j| (0..width).map(move |i| (i, j)))
                .filter_map(|(i, j)| {
                    let px = &colors[(j * width + i) * 4..(j * width + i + 1) * 4];
                    if px[3] == 0 {
                        return None;
                    }
                    let x0 = extent.x_min + i as f64 * cell_w;
                    let y0 = extent.y_min + j as f64 * cell_h;
                    Some(Rectangle::new(
                        [(x0, y0), (x0 + cell_w, y0 + cell_h)],
                        RGBColor(px[0], px[1], px[2]).filled(),
                    ))
                }),
        )
        .map_err(drawing_error)?;

    let plan = TickPlan::for_extent(extent);
    if labelled {
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(plan.x)
            .y_labels(plan.y)
            .x_label_formatter(&format_tick)
            .y_label_formatter(&format_tick)
            .label_style((LABEL_FONT, 14))
            .draw()
            .map_err(drawing_error)?;
    } else {
        let tick_x = extent.y_span() * 0.02;
        let tick_y = extent.x_span() * 0.02;
        let x_ticks = nice_ticks(extent.x_min, extent.x_max, plan.x);
        let y_ticks = nice_ticks(extent.y_min, extent.y_max, plan.y);
        chart
            .draw_series(
                x_ticks
                    .iter()
                    .map(|&x| vec![(x, extent.y_min), (x, extent.y_min + tick_x)])
                    .chain(
                        y_ticks
                            .iter()
                            .map(|&y| vec![(extent.x_min, y), (extent.x_min + tick_y, y)]),
                    )
                    .map(|points| PathElement::new(points, BLACK)),
            )
            .map_err(drawing_error)?;
        chart
            .plotting_area()
            .draw(&Rectangle::new(
                [(extent.x_min, extent.y_min), (extent.x_max, extent.y_max)],
                BLACK.stroke_width(1),
            ))
            .map_err(drawing_error)?;
    }

    draw_colorbar(&bar_area, value_min, value_max, labelled, x_label_size)
}

fn draw_colorbar(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    value_min: f64,
    value_max: f64,
    labelled: bool,
    bottom_label_size: u32,
) -> Result<()> {
    let (low, high) = if value_max > value_min {
        (value_min, value_max)
    } else {
        (value_min - 0.5, value_max + 0.5)
    };

    let mut bar = ChartBuilder::on(area)
        .margin_top(10)
        .margin_bottom(10 + bottom_label_size)
        .margin_left(10)
        .margin_right(if labelled { 5 } else { 20 })
        .set_label_area_size(LabelAreaPosition::Right, if labelled { 60 } else { 0 })
        .build_cartesian_2d(0.0..1.0, low..high)
        .map_err(drawing_error)?;

    let delta = (high - low) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|step| {
        let v0 = low + delta * step as f64;
        let color = gnuplot2_color((step as f64 + 0.5) / COLORBAR_STEPS as f64);
        Rectangle::new(
            [(0.0, v0), (1.0, v0 + delta)],
            RGBColor(color.r, color.g, color.b).filled(),
        )
    }))
    .map_err(drawing_error)?;

    if labelled {
        bar.configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(6)
            .y_label_formatter(&format_tick)
            .label_style((LABEL_FONT, 14))
            .draw()
            .map_err(drawing_error)?;
    } else {
        bar.plotting_area()
            .draw(&Rectangle::new([(0.0, low), (1.0, high)], BLACK.stroke_width(1)))
            .map_err(drawing_error)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_advances() {
        let counter = FigureCounter::new();
        assert_eq!(counter.last(), 0);
        let (first, counter) = counter.advance();
        let (second, counter) = counter.advance();
        assert_eq!((first, second), (1, 2));
        assert_eq!(counter.last(), 2);
    }

    #[test]
    fn test_file_name() {
        let figure = Figure {
            number: 3,
            width: 1,
            height: 1,
            encoding: PngEncoding::Truecolor,
            png: Vec::new(),
        };
        assert_eq!(figure.file_name("det"), "det_fig3.png");
    }

    #[test]
    fn test_rejects_tiny_canvas() {
        let grid = DensityGrid::zeros(det_pix::GridBounds {
            nx_min: -1,
            nx_max: 1,
            ny_min: -1,
            ny_max: 1,
        })
        .unwrap();
        let extent = PhysicalExtent {
            x_min: -1.0,
            x_max: 1.0,
            y_min: -1.0,
            y_max: 1.0,
        };
        let options = FigureOptions {
            width: 20,
            height: 20,
            labels: false,
            title: None,
        };
        let err = render_figure(&grid, &extent, &options, FigureCounter::new()).unwrap_err();
        assert!(matches!(err, RenderError::Drawing(_)));
    }
}
