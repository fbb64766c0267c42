//! Dense binning of pixel records.

use std::fmt;

use tracing::debug;

use crate::data::PixelRecord;
use crate::error::{DetPixError, Result};
use crate::header::DetectorGeometry;

/// Border, in pixels, added around the active range on every side.
pub const MARGIN: i64 = 10;

/// Largest number of cells a grid may hold (2 GiB of `f64`).
pub const MAX_CELLS: usize = 1 << 28;

/// Inclusive pixel-index bounds of the display grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub nx_min: i64,
    pub nx_max: i64,
    pub ny_min: i64,
    pub ny_max: i64,
}

impl GridBounds {
    /// Active range plus [`MARGIN`] on each side.
    pub fn from_geometry(geometry: &DetectorGeometry) -> Result<Self> {
        Self::with_margin(geometry, MARGIN)
    }

    pub fn with_margin(geometry: &DetectorGeometry, margin: i64) -> Result<Self> {
        let widen = |name: &str, value: i64, delta: i64| {
            value.checked_add(delta).ok_or_else(|| {
                DetPixError::invalid_parameter(name, format!("{value} leaves no room for a margin"))
            })
        };
        Ok(Self {
            nx_min: widen("nx_active_min", geometry.nx_active_min, -margin)?,
            nx_max: widen("nx_active_max", geometry.nx_active_max, margin)?,
            ny_min: widen("ny_active_min", geometry.ny_active_min, -margin)?,
            ny_max: widen("ny_active_max", geometry.ny_active_max, margin)?,
        })
    }

    /// Total cell count, if it fits within [`MAX_CELLS`].
    pub fn cell_count(&self) -> Result<usize> {
        let span = |min: i64, max: i64| {
            max.checked_sub(min)
                .and_then(|d| d.checked_add(1))
                .and_then(|n| usize::try_from(n).ok())
        };
        span(self.nx_min, self.nx_max)
            .zip(span(self.ny_min, self.ny_max))
            .and_then(|(w, h)| w.checked_mul(h))
            .filter(|cells| *cells <= MAX_CELLS)
            .ok_or(DetPixError::GridTooLarge { bounds: *self })
    }

    /// Number of cells along x.
    pub fn width(&self) -> usize {
        (self.nx_max - self.nx_min + 1) as usize
    }

    /// Number of cells along y.
    pub fn height(&self) -> usize {
        (self.ny_max - self.ny_min + 1) as usize
    }

    /// Grid cell `(i, j)` of pixel `(x, y)`, if inside the bounds.
    pub fn cell_of(&self, x: i64, y: i64) -> Option<(usize, usize)> {
        if (self.nx_min..=self.nx_max).contains(&x) && (self.ny_min..=self.ny_max).contains(&y) {
            Some(((x - self.nx_min) as usize, (y - self.ny_min) as usize))
        } else {
            None
        }
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x {}..={}, y {}..={}",
            self.nx_min, self.nx_max, self.ny_min, self.ny_max
        )
    }
}

/// Dense 2D grid of binned values.
///
/// Stored row by row with row 0 at `ny_min`, so cell `(i, j)` lives at
/// `values[j * width + i]` and maps to pixel `(i + nx_min, j + ny_min)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    bounds: GridBounds,
    values: Vec<f64>,
}

impl DensityGrid {
    /// All-zero grid covering `bounds`.
    pub fn zeros(bounds: GridBounds) -> Result<Self> {
        Ok(Self {
            values: vec![0.0; bounds.cell_count()?],
            bounds,
        })
    }

    /// Scatter `records` into a fresh grid. Later records overwrite earlier
    /// ones that land in the same cell.
    pub fn bin(bounds: GridBounds, records: &[PixelRecord]) -> Result<Self> {
        let mut grid = Self::zeros(bounds)?;
        for record in records {
            grid.insert(record)?;
        }
        debug!(
            width = grid.width(),
            height = grid.height(),
            records = records.len(),
            "Binned pixel records"
        );
        Ok(grid)
    }

    /// Write one record into its cell.
    pub fn insert(&mut self, record: &PixelRecord) -> Result<()> {
        let (x, y) = record.pixel();
        let (i, j) = self
            .bounds
            .cell_of(x, y)
            .ok_or(DetPixError::OutOfBounds {
                x,
                y,
                bounds: self.bounds,
            })?;
        let width = self.width();
        self.values[j * width + i] = record.value;
        Ok(())
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn width(&self) -> usize {
        self.bounds.width()
    }

    pub fn height(&self) -> usize {
        self.bounds.height()
    }

    /// `(width, height)` in cells.
    pub fn shape(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Value of cell `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.width() && j < self.height() {
            Some(self.values[j * self.width() + i])
        } else {
            None
        }
    }

    /// Row-major values, bottom row first.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest and largest finite cell values.
    pub fn value_range(&self) -> (f64, f64) {
        let (min, max) = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        if min.is_finite() {
            (min, max)
        } else {
            (0.0, 0.0)
        }
    }
}
