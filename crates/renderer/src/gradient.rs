//! Color mapping for binned detector grids.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from unit-range channels, clipped to [0, 1].
    pub fn from_unit(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(r), channel(g), channel(b), 255)
    }
}

/// The `gnuplot2` color map (gnuplot rgbformulae 30, 31, 32).
///
/// Runs black → blue → purple → orange → yellow → white as `t` goes from
/// 0 to 1.
pub fn gnuplot2_color(t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let r = t / 0.32 - 0.78125;
    let g = 2.0 * t - 0.84;
    let b = if t < 0.25 {
        4.0 * t
    } else if t < 0.92 {
        -2.0 * t + 1.84
    } else {
        t / 0.08 - 11.5
    };
    Color::from_unit(r, g, b)
}

/// Normalize `value` into [0, 1] over `min_val..=max_val`.
///
/// A zero-width range maps everything to 0.
pub fn normalize(value: f64, min_val: f64, max_val: f64) -> f64 {
    let range = max_val - min_val;
    if range.abs() <= f64::EPSILON * min_val.abs().max(max_val.abs()).max(1.0) {
        return 0.0;
    }
    ((value - min_val) / range).clamp(0.0, 1.0)
}

/// Render grid data as a color-mapped RGBA image
///
/// # Arguments
/// - `data`: 2D grid of values (row-major order)
/// - `width`: Number of columns
/// - `height`: Number of rows
/// - `min_val`: Value mapped to the bottom of the color map
/// - `max_val`: Value mapped to the top of the color map
/// - `color_fn`: Function to convert a normalized value (0-1) to a color
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel), in the same order as `data`.
/// Non-finite values are transparent.
pub fn render_grid<F>(
    data: &[f64],
    width: usize,
    height: usize,
    min_val: f64,
    max_val: f64,
    color_fn: F,
) -> Vec<u8>
where
    F: Fn(f64) -> Color,
{
    let mut pixels = vec![0u8; width * height * 4];

    for (idx, &value) in data.iter().take(width * height).enumerate() {
        if !value.is_finite() {
            continue;
        }
        let color = color_fn(normalize(value, min_val, max_val));

        let pixel_idx = idx * 4;
        pixels[pixel_idx] = color.r;
        pixels[pixel_idx + 1] = color.g;
        pixels[pixel_idx + 2] = color.b;
        pixels[pixel_idx + 3] = color.a;
    }

    pixels
}
