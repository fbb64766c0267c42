//! Physical plot extents and tick planning.

use det_pix::{DetectorGeometry, GridBounds};

use crate::error::{RenderError, Result};

/// Ticks on the axis with the larger physical span.
pub const MAJOR_TICKS: usize = 8;

/// Physical coordinates of the plotted grid's edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalExtent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl PhysicalExtent {
    /// Grid bounds times pixel pitch times `scale`, per axis.
    pub fn new(bounds: &GridBounds, geometry: &DetectorGeometry, scale: f64) -> Result<Self> {
        let extent = Self {
            x_min: scale * bounds.nx_min as f64 * geometry.dx_pixel,
            x_max: scale * bounds.nx_max as f64 * geometry.dx_pixel,
            y_min: scale * bounds.ny_min as f64 * geometry.dy_pixel,
            y_max: scale * bounds.ny_max as f64 * geometry.dy_pixel,
        };
        extent.validate()?;
        Ok(extent)
    }

    fn validate(&self) -> Result<()> {
        let finite = [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.x_max <= self.x_min || self.y_max <= self.y_min {
            return Err(RenderError::InvalidExtent(format!(
                "x {}..{}, y {}..{}",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        Ok(())
    }

    pub fn x_span(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn y_span(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Physical size of one cell when `width × height` cells fill the extent.
    pub fn cell_size(&self, width: usize, height: usize) -> (f64, f64) {
        (
            self.x_span() / width.max(1) as f64,
            self.y_span() / height.max(1) as f64,
        )
    }
}

/// Tick counts per axis.
///
/// The longer axis gets [`MAJOR_TICKS`]; the shorter one proportionally
/// fewer, never less than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    pub x: usize,
    pub y: usize,
}

impl TickPlan {
    pub fn for_extent(extent: &PhysicalExtent) -> Self {
        let (x_span, y_span) = (extent.x_span(), extent.y_span());
        if x_span > y_span {
            Self {
                x: MAJOR_TICKS,
                y: proportional_ticks(y_span, x_span),
            }
        } else {
            Self {
                x: proportional_ticks(x_span, y_span),
                y: MAJOR_TICKS,
            }
        }
    }
}

fn proportional_ticks(short_span: f64, long_span: f64) -> usize {
    ((short_span * MAJOR_TICKS as f64 / long_span) as usize).max(1)
}

/// Round tick positions covering `min..=max`, at most `max_ticks` intervals.
///
/// Steps are 1, 2, 2.5 or 5 times a power of ten.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    if !(max > min) || max_ticks == 0 {
        return Vec::new();
    }

    let raw_step = (max - min) / max_ticks as f64;
    let exponent = raw_step.log10().floor() as i32;
    let multiplier = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|m| scale_pow10(*m, exponent) >= raw_step * (1.0 - 1e-9))
        .unwrap_or(10.0);
    let step = scale_pow10(multiplier, exponent);

    let tolerance = step * 1e-9;
    let mut k = (min / step - 1e-9).ceil() as i64;
    let mut ticks = Vec::new();
    loop {
        let value = scale_pow10(k as f64 * multiplier, exponent);
        if value > max + tolerance {
            break;
        }
        // Avoid printing -0.
        ticks.push(if value.abs() < tolerance { 0.0 } else { value });
        k += 1;
    }
    ticks
}

/// `value × 10^exponent`, dividing for negative exponents so decimal steps
/// like 0.25 come out exact.
fn scale_pow10(value: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        value * 10f64.powi(exponent)
    } else {
        value / 10f64.powi(-exponent)
    }
}

/// Format a tick value compactly for axis labels.
pub fn format_tick(value: &f64) -> String {
    let v = *value;
    if v == 0.0 {
        return "0".to_string();
    }
    let magnitude = v.abs();
    if !(1e-3..1e5).contains(&magnitude) {
        return format!("{v:.2e}");
    }
    let text = format!("{v:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
