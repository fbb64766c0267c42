//! Error types for det.pix reading and binning.

use thiserror::Error;

use crate::grid::GridBounds;

/// Result type for det.pix operations.
pub type Result<T> = std::result::Result<T, DetPixError>;

/// Errors that can occur while reading or binning a det.pix file.
#[derive(Error, Debug)]
pub enum DetPixError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header never reached its `#--` terminator.
    #[error("no '#--' header terminator found within the first {lines} lines")]
    MissingSentinel { lines: usize },

    /// A header line is not a `name = value` assignment.
    #[error("header line {line}: not a valid assignment: {text:?}")]
    Syntax { line: usize, text: String },

    /// A required header parameter was never assigned.
    #[error("missing required header parameter '{0}'")]
    MissingParameter(String),

    /// A header parameter has an unusable value.
    #[error("invalid header parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A data row could not be read.
    #[error("data line {line}: {reason}")]
    Data { line: usize, reason: String },

    /// The display grid would be too large to allocate.
    #[error("grid {bounds} is too large")]
    GridTooLarge { bounds: GridBounds },

    /// A pixel falls outside the display grid.
    #[error("pixel ({x}, {y}) is outside the grid {bounds}")]
    OutOfBounds { x: i64, y: i64, bounds: GridBounds },
}

impl DetPixError {
    /// Create a Syntax error.
    pub fn syntax(line: usize, text: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            text: text.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Data error.
    pub fn data(line: usize, reason: impl Into<String>) -> Self {
        Self::Data {
            line,
            reason: reason.into(),
        }
    }
}
