//! Figure rendering for binned detector-pixel grids.
//!
//! - `extent`: physical axis extents and tick planning
//! - `gradient`: the `gnuplot2` color map
//! - `figure`: heat map plus colorbar, drawn with `plotters`
//! - `png`: indexed/truecolor PNG encoding

pub mod error;
pub mod extent;
pub mod figure;
pub mod gradient;
pub mod png;

pub use error::{RenderError, Result};
pub use extent::{nice_ticks, PhysicalExtent, TickPlan, MAJOR_TICKS};
pub use figure::{font_available, render_figure, Figure, FigureCounter, FigureOptions};
pub use png::{encode_rgb, EncodedPng, PngEncoding};
