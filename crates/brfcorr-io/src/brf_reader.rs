//! Reader for fitted barometric response function files.

use std::io::Read;
use std::path::{Path, PathBuf};

use brfcorr_core::BarometricResponse;
use tracing::{debug, instrument};

use crate::reader::{parse_cell, skip_preamble};
use crate::IoError;

/// Number of metadata lines preceding the coefficient table header.
pub const BRF_HEADER_ROW: usize = 14;

/// Reads one station's BRF export.
///
/// Expected CSV format:
/// - [`BRF_HEADER_ROW`] lines of well metadata (skipped, blank lines included)
/// - Header row containing at least `A` and `B` columns, in any position
/// - One row per lag `0..=N`; empty and `nan` cells read as NaN and are
///   zeroed by [`BarometricResponse::new`]
/// - A blank line inside the table is a lag whose coefficients are both
///   missing; blank lines after the last row are ignored
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | No `A` or no `B` column in the header |
/// | [`IoError::EmptyDataset`] | Zero coefficient rows |
/// | [`IoError::InvalidValue`] | Coefficient cell is not a float |
pub struct BrfReader {
    path: PathBuf,
}

impl BrfReader {
    /// Create a new reader for the given BRF file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the `A` and `B` columns into a [`BarometricResponse`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<BarometricResponse, IoError> {
        let table = self.coefficient_table()?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(table.as_bytes());

        let header = rdr
            .headers()
            .map_err(|e| IoError::csv_parse(&self.path, e))?
            .clone();
        let col_a = self.find_column(&header, "A")?;
        let col_b = self.find_column(&header, "B")?;

        let mut a = Vec::new();
        let mut b = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::csv_parse(&self.path, e))?;
            a.push(self.coefficient(&record, row_index, col_a, "A")?);
            b.push(self.coefficient(&record, row_index, col_b, "B")?);
        }

        if a.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let brf = BarometricResponse::new(a, b).map_err(|e| IoError::InvalidResponse {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(max_lag = brf.max_lag(), "response function loaded");
        Ok(brf)
    }

    /// Text after the metadata block, with interior blank lines kept as
    /// empty records so that every lag keeps its row.
    fn coefficient_table(&self) -> Result<String, IoError> {
        let mut text = String::new();
        skip_preamble(&self.path, BRF_HEADER_ROW)?
            .read_to_string(&mut text)
            .map_err(|e| IoError::FileNotFound {
                path: self.path.clone(),
                source: e,
            })?;

        let lines: Vec<&str> = text.lines().collect();
        let n_lines = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        let mut table = String::with_capacity(text.len());
        for line in &lines[..n_lines] {
            table.push_str(if line.trim().is_empty() { "," } else { line });
            table.push('\n');
        }
        Ok(table)
    }

    fn find_column(&self, header: &csv::StringRecord, name: &'static str) -> Result<usize, IoError> {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| IoError::MissingColumn {
                path: self.path.clone(),
                column: name,
            })
    }

    fn coefficient(
        &self,
        record: &csv::StringRecord,
        row_index: usize,
        col: usize,
        name: &str,
    ) -> Result<f64, IoError> {
        let raw = record.get(col).unwrap_or("");
        parse_cell(raw).ok_or_else(|| IoError::InvalidValue {
            path: self.path.clone(),
            row_index,
            column: name.to_string(),
            raw: raw.to_string(),
        })
    }
}
