//! det.pix header parsing.
//!
//! The header is a block of `name = value` lines terminated by a line that
//! starts with `#--`. Values are numeric literals, `T`/`F` booleans or quoted
//! strings. Blank lines and `#` comment lines are accepted and ignored.
//! Anything else is rejected; the header is data, never code.

use std::io::BufRead;

use tracing::debug;

use crate::error::{DetPixError, Result};

/// Prefix of the line that ends the header block.
pub const SENTINEL: &str = "#--";

/// Maximum number of lines searched for the sentinel.
pub const MAX_HEADER_LINES: usize = 999;

/// Largest magnitude accepted for an active pixel index.
pub const MAX_PIXEL_INDEX: i64 = i32::MAX as i64;

/// A scalar value assigned in the header.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Number(f64),
    Bool(bool),
    Text(String),
}

impl HeaderValue {
    /// Numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// Parsed header block.
#[derive(Debug, Clone, Default)]
pub struct Header {
    entries: Vec<(String, HeaderValue)>,
    line_count: usize,
}

impl Header {
    /// Value of `name`. A later assignment replaces an earlier one.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Number of lines before the sentinel.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Number of distinct names assigned.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn assign(&mut self, name: String, value: HeaderValue) {
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    fn require(&self, name: &str) -> Result<f64> {
        let value = self
            .get(name)
            .ok_or_else(|| DetPixError::MissingParameter(name.to_string()))?;
        value
            .as_f64()
            .ok_or_else(|| DetPixError::invalid_parameter(name, format!("{value:?} is not a number")))
    }

    fn require_index(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(DetPixError::invalid_parameter(
                name,
                format!("{value} is not an integer pixel index"),
            ));
        }
        if value.abs() > MAX_PIXEL_INDEX as f64 {
            return Err(DetPixError::invalid_parameter(
                name,
                format!("{value} is outside +/-{MAX_PIXEL_INDEX}"),
            ));
        }
        Ok(value as i64)
    }

    fn require_pitch(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        if !value.is_finite() || value <= 0.0 {
            return Err(DetPixError::invalid_parameter(
                name,
                format!("pixel pitch must be positive, got {value}"),
            ));
        }
        Ok(value)
    }
}

/// Detector geometry taken from the header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorGeometry {
    pub nx_active_min: i64,
    pub nx_active_max: i64,
    pub ny_active_min: i64,
    pub ny_active_max: i64,
    /// Pixel pitch along x
    pub dx_pixel: f64,
    /// Pixel pitch along y
    pub dy_pixel: f64,
}

impl DetectorGeometry {
    /// Extract the geometry parameters from a parsed header.
    ///
    /// Fails on the first missing parameter, in declaration order.
    pub fn from_header(header: &Header) -> Result<Self> {
        let geometry = Self {
            nx_active_min: header.require_index("nx_active_min")?,
            nx_active_max: header.require_index("nx_active_max")?,
            ny_active_min: header.require_index("ny_active_min")?,
            ny_active_max: header.require_index("ny_active_max")?,
            dx_pixel: header.require_pitch("dx_pixel")?,
            dy_pixel: header.require_pitch("dy_pixel")?,
        };

        if geometry.nx_active_min > geometry.nx_active_max {
            return Err(DetPixError::invalid_parameter(
                "nx_active_min",
                format!(
                    "{} exceeds nx_active_max {}",
                    geometry.nx_active_min, geometry.nx_active_max
                ),
            ));
        }
        if geometry.ny_active_min > geometry.ny_active_max {
            return Err(DetPixError::invalid_parameter(
                "ny_active_min",
                format!(
                    "{} exceeds ny_active_max {}",
                    geometry.ny_active_min, geometry.ny_active_max
                ),
            ));
        }

        Ok(geometry)
    }
}

/// Read the header block, leaving `reader` positioned after the sentinel.
///
/// Each interpreted line is passed, trimmed, to `on_line` before parsing.
pub fn read_header<R: BufRead>(reader: &mut R, mut on_line: impl FnMut(&str)) -> Result<Header> {
    let mut header = Header::default();
    let mut buf = String::new();

    for line_no in 1..=MAX_HEADER_LINES {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            return Err(DetPixError::MissingSentinel { lines: line_no - 1 });
        }
        if buf.starts_with(SENTINEL) {
            header.line_count = line_no - 1;
            debug!(
                lines = header.line_count,
                parameters = header.len(),
                "Header parsed"
            );
            return Ok(header);
        }

        let text = buf.trim();
        on_line(text);
        if let Some((name, value)) = parse_assignment(text, line_no)? {
            header.assign(name, value);
        }
    }

    Err(DetPixError::MissingSentinel {
        lines: MAX_HEADER_LINES,
    })
}

/// Parse one trimmed header line.
///
/// Returns `None` for blank and comment lines.
pub fn parse_assignment(text: &str, line_no: usize) -> Result<Option<(String, HeaderValue)>> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let (name, rhs) = text
        .split_once('=')
        .ok_or_else(|| DetPixError::syntax(line_no, text))?;
    let name = name.trim();
    if !is_identifier(name) {
        return Err(DetPixError::syntax(line_no, text));
    }

    let value = parse_value(rhs.trim()).ok_or_else(|| DetPixError::syntax(line_no, text))?;
    Ok(Some((name.to_string(), value)))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_value(rhs: &str) -> Option<HeaderValue> {
    if let Some(quote) = rhs.chars().next().filter(|c| *c == '"' || *c == '\'') {
        let body = &rhs[1..];
        let end = body.find(quote)?;
        if !is_trailing_comment(&body[end + 1..]) {
            return None;
        }
        return Some(HeaderValue::Text(body[..end].to_string()));
    }

    let literal = match rhs.find('#') {
        Some(pos) => rhs[..pos].trim_end(),
        None => rhs,
    };

    match literal {
        "T" | "True" => Some(HeaderValue::Bool(true)),
        "F" | "False" => Some(HeaderValue::Bool(false)),
        _ => parse_number(literal).map(HeaderValue::Number),
    }
}

fn is_trailing_comment(rest: &str) -> bool {
    let rest = rest.trim();
    rest.is_empty() || rest.starts_with('#')
}

// Only plain decimal literals; `f64::from_str` would also take "inf" and "nan".
fn parse_number(literal: &str) -> Option<f64> {
    let plain = !literal.is_empty()
        && literal
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && literal.chars().any(|c| c.is_ascii_digit());
    if !plain {
        return None;
    }
    literal.parse::<f64>().ok().filter(|v| v.is_finite())
}
