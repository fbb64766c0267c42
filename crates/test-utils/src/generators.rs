//! Generators for synthetic det.pix content.
//!
//! These build complete files as strings so tests can feed them to the
//! reader directly or write them to disk with [`crate::write_temp_file`].

use std::fmt::Write;

/// Geometry written into a generated header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderSpec {
    pub nx_active_min: i64,
    pub nx_active_max: i64,
    pub ny_active_min: i64,
    pub ny_active_max: i64,
    pub dx_pixel: f64,
    pub dy_pixel: f64,
}

impl HeaderSpec {
    /// Square active area `-n..=n` in both axes.
    pub fn square(n: i64, pitch: f64) -> Self {
        Self {
            nx_active_min: -n,
            nx_active_max: n,
            ny_active_min: -n,
            ny_active_max: n,
            dx_pixel: pitch,
            dy_pixel: pitch,
        }
    }
}

/// One generated data row. The unused columns are filled with zeros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSpec {
    pub x: f64,
    pub y: f64,
    pub x_intensity: f64,
    pub y_intensity: f64,
    pub energy: f64,
}

impl RowSpec {
    /// Row whose total intensity is `x_intensity + y_intensity`.
    pub fn new(x: f64, y: f64, x_intensity: f64, y_intensity: f64, energy: f64) -> Self {
        Self {
            x,
            y,
            x_intensity,
            y_intensity,
            energy,
        }
    }

    /// Row whose total intensity is `intensity`, split evenly between
    /// polarizations, with zero energy.
    pub fn with_intensity(x: f64, y: f64, intensity: f64) -> Self {
        Self::new(x, y, intensity / 2.0, intensity / 2.0, 0.0)
    }

    /// 11-column table line in det.pix layout.
    pub fn to_line(&self) -> String {
        let total = self.x_intensity + self.y_intensity;
        format!(
            "{:>6} {:>6} {:>12} {:>12} {:>14} {:>12} {:>14} {:>12} {:>14} {:>12} {:>14}",
            self.x,
            self.y,
            0.0,
            0.0,
            self.x_intensity,
            0.0,
            self.y_intensity,
            0.0,
            total,
            0.0,
            self.energy
        )
    }
}

/// Builder for complete det.pix file content.
#[derive(Debug, Clone)]
pub struct DetPixBuilder {
    header: HeaderSpec,
    extra_header: Vec<String>,
    omitted: Vec<&'static str>,
    rows: Vec<RowSpec>,
}

impl DetPixBuilder {
    pub fn new(header: HeaderSpec) -> Self {
        Self {
            header,
            extra_header: Vec::new(),
            omitted: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a raw header line before the geometry.
    pub fn header_line(mut self, line: impl Into<String>) -> Self {
        self.extra_header.push(line.into());
        self
    }

    /// Leave a geometry parameter out of the header.
    pub fn omit(mut self, name: &'static str) -> Self {
        self.omitted.push(name);
        self
    }

    pub fn row(mut self, row: RowSpec) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = RowSpec>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Number of header lines before the sentinel.
    pub fn header_line_count(&self) -> usize {
        self.extra_header.len() + 6 - self.omitted.len()
    }

    pub fn build(&self) -> String {
        let h = &self.header;
        let geometry = [
            ("nx_active_min", h.nx_active_min.to_string()),
            ("nx_active_max", h.nx_active_max.to_string()),
            ("ny_active_min", h.ny_active_min.to_string()),
            ("ny_active_max", h.ny_active_max.to_string()),
            ("dx_pixel", format!("{:e}", h.dx_pixel)),
            ("dy_pixel", format!("{:e}", h.dy_pixel)),
        ];

        let mut out = String::new();
        for line in &self.extra_header {
            let _ = writeln!(out, "{line}");
        }
        for (name, value) in geometry {
            if !self.omitted.contains(&name) {
                let _ = writeln!(out, "{name:<16}= {value}");
            }
        }
        let _ = writeln!(out, "#--------------------------------------------------------");
        let _ = writeln!(
            out,
            "#    ix     iy   x_pos   y_pos   x_intens   x_phase   y_intens   y_phase   intens   e_ave   e_rms"
        );
        for row in &self.rows {
            let _ = writeln!(out, "{}", row.to_line());
        }
        out
    }
}

/// Rows forming a Gaussian spot centered at the origin.
///
/// Every pixel in `-radius..=radius` gets a row, with total intensity
/// `peak * exp(-r² / (2 σ²))` and energy rising linearly with x.
pub fn create_gaussian_spot(radius: i64, sigma: f64, peak: f64) -> Vec<RowSpec> {
    let mut rows = Vec::new();
    for iy in -radius..=radius {
        for ix in -radius..=radius {
            let r2 = (ix * ix + iy * iy) as f64;
            let intensity = peak * (-r2 / (2.0 * sigma * sigma)).exp();
            let x_share = 0.5 + 0.4 * (ix as f64 / radius.max(1) as f64);
            rows.push(RowSpec::new(
                ix as f64,
                iy as f64,
                intensity * x_share,
                intensity * (1.0 - x_share),
                10.0 + ix as f64,
            ));
        }
    }
    rows
}
