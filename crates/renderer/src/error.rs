//! Error types for figure rendering.

use thiserror::Error;

/// Result type for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering or encoding a figure.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The plotting backend failed.
    #[error("drawing failed: {0}")]
    Drawing(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encoding(String),

    /// The physical extent cannot be plotted.
    #[error("invalid plot extent: {0}")]
    InvalidExtent(String),

    /// Writing the figure failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Map any plotters error into a [`RenderError::Drawing`].
pub(crate) fn drawing_error<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}
