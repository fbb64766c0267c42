//! det.pix data table reading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{DetPixError, Result};
use crate::header::{read_header, DetectorGeometry, Header};
use crate::quantity::{Quantity, X_INDEX_COLUMN, Y_INDEX_COLUMN};

/// One row of the data table, reduced to the columns being plotted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRecord {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl PixelRecord {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Integer pixel coordinates, rounding halves to even.
    pub fn pixel(&self) -> (i64, i64) {
        (
            self.x.round_ties_even() as i64,
            self.y.round_ties_even() as i64,
        )
    }
}

/// A fully read det.pix file.
#[derive(Debug, Clone)]
pub struct DetPixFile {
    pub header: Header,
    pub geometry: DetectorGeometry,
    pub quantity: Quantity,
    pub records: Vec<PixelRecord>,
}

/// Read a det.pix file from disk.
///
/// Interpreted header lines are passed to `on_header_line` as they are read.
pub fn load<P: AsRef<Path>>(
    path: P,
    quantity: Quantity,
    on_header_line: impl FnMut(&str),
) -> Result<DetPixFile> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let parsed = load_from_reader(BufReader::new(file), quantity, on_header_line)?;

    info!(
        path = %path.display(),
        quantity = %quantity,
        records = parsed.records.len(),
        "Loaded det.pix file"
    );
    Ok(parsed)
}

/// Read det.pix content from any buffered reader.
pub fn load_from_reader<R: BufRead>(
    mut reader: R,
    quantity: Quantity,
    on_header_line: impl FnMut(&str),
) -> Result<DetPixFile> {
    let header = read_header(&mut reader, on_header_line)?;
    let geometry = DetectorGeometry::from_header(&header)?;
    // Header lines, then the sentinel, then data.
    let first_data_line = header.line_count() + 2;
    let records = read_records(reader, quantity, first_data_line)?;

    Ok(DetPixFile {
        header,
        geometry,
        quantity,
        records,
    })
}

/// Read the data table.
///
/// `first_line` is the 1-based file line number of the first row, used in
/// error messages. Blank lines and `#` comments are skipped.
pub fn read_records<R: BufRead>(
    reader: R,
    quantity: Quantity,
    first_line: usize,
) -> Result<Vec<PixelRecord>> {
    let column = quantity.column();
    let mut records = Vec::new();

    for (offset, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = first_line + offset;
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line.as_str(),
        };
        if content.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() <= column {
            return Err(DetPixError::data(
                line_no,
                format!(
                    "expected at least {} columns, found {}",
                    column + 1,
                    fields.len()
                ),
            ));
        }

        let x = parse_field(&fields, X_INDEX_COLUMN, line_no)?;
        let y = parse_field(&fields, Y_INDEX_COLUMN, line_no)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(DetPixError::data(
                line_no,
                format!("pixel index ({x}, {y}) is not finite"),
            ));
        }
        let value = parse_field(&fields, column, line_no)?;
        records.push(PixelRecord::new(x, y, value));
    }

    debug!(records = records.len(), column, "Data table read");
    Ok(records)
}

fn parse_field(fields: &[&str], column: usize, line_no: usize) -> Result<f64> {
    fields[column].parse::<f64>().map_err(|_| {
        DetPixError::data(
            line_no,
            format!("column {column} value {:?} is not a number", fields[column]),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pixel_rounds_half_to_even() {
        assert_eq!(PixelRecord::new(2.5, -2.5, 0.0).pixel(), (2, -2));
        assert_eq!(PixelRecord::new(3.5, 0.49, 0.0).pixel(), (4, 0));
        assert_eq!(PixelRecord::new(-0.6, 1.2, 0.0).pixel(), (-1, 1));
    }

    #[test]
    fn test_read_records_selects_column() {
        let table = "0 1 2 3 4 5 6 7 8 9 10\n-3 4 0 0 1.5 0 2.5 0 4.0 0 7.25\n";
        let records = read_records(Cursor::new(table), Quantity::Energy, 10).unwrap();
        assert_eq!(
            records,
            vec![
                PixelRecord::new(0.0, 1.0, 10.0),
                PixelRecord::new(-3.0, 4.0, 7.25)
            ]
        );

        let records = read_records(Cursor::new(table), Quantity::YIntensity, 10).unwrap();
        assert_eq!(records[1].value, 2.5);
    }

    #[test]
    fn test_read_records_skips_blank_and_comment_lines() {
        let table = "\n# comment\n1 1 0 0 1 0 2 0 3 0 4  # trailing\n   \n";
        let records = read_records(Cursor::new(table), Quantity::Intensity, 1).unwrap();
        assert_eq!(records, vec![PixelRecord::new(1.0, 1.0, 3.0)]);
    }

    #[test]
    fn test_short_row_reports_file_line() {
        let table = "1 1 0 0 1 0 2 0 3 0 4\n1 2 3\n";
        let err = read_records(Cursor::new(table), Quantity::Intensity, 5).unwrap_err();
        match err {
            DetPixError::Data { line, .. } => assert_eq!(line, 6),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_field_rejected() {
        let table = "1 one 0 0 1 0 2 0 3 0 4\n";
        assert!(matches!(
            read_records(Cursor::new(table), Quantity::Intensity, 1),
            Err(DetPixError::Data { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_from_reader_numbers_data_lines_after_sentinel() {
        let content = "nx_active_min = -5\nnx_active_max = 5\nny_active_min = -5\n\
                       ny_active_max = 5\ndx_pixel = 0.01\ndy_pixel = 0.01\n#--------\n\
                       0 0 0 0 1 0 2 0 7.5 0 4\nbad row\n";
        let err = load_from_reader(Cursor::new(content), Quantity::Intensity, |_| {}).unwrap_err();
        assert!(matches!(err, DetPixError::Data { line: 9, .. }));
    }
}
