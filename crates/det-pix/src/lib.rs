//! Reader and binner for detector-pixel (det.pix) files.
//!
//! A det.pix file has two parts:
//!
//! - a header of `name = value` lines defining the detector geometry
//!   (`nx_active_min`, `nx_active_max`, `ny_active_min`, `ny_active_max`,
//!   `dx_pixel`, `dy_pixel`), terminated by a line starting with `#--`;
//! - a whitespace-delimited table with one row per pixel. Columns 0 and 1
//!   hold the pixel indices, columns 4, 6, 8 and 10 the x-polarized
//!   intensity, y-polarized intensity, total intensity and energy.
//!
//! # Usage
//!
//! ```ignore
//! use det_pix::{load, DensityGrid, GridBounds, Quantity};
//!
//! let file = load("det.pix", Quantity::Intensity, |line| println!("{line}"))?;
//! let bounds = GridBounds::from_geometry(&file.geometry)?;
//! let grid = DensityGrid::bin(bounds, &file.records)?;
//! ```

pub mod data;
pub mod error;
pub mod grid;
pub mod header;
pub mod quantity;

pub use data::{load, load_from_reader, read_records, DetPixFile, PixelRecord};
pub use error::{DetPixError, Result};
pub use grid::{DensityGrid, GridBounds, MARGIN, MAX_CELLS};
pub use header::{
    read_header, DetectorGeometry, Header, HeaderValue, MAX_HEADER_LINES, MAX_PIXEL_INDEX, SENTINEL,
};
pub use quantity::Quantity;
