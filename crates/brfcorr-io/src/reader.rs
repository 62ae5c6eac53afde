//! Wide-format CSV reader for water levels, pressure and Earth tides.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use brfcorr_core::StationId;
use chrono::NaiveDateTime;
use tracing::{debug, info, instrument};

use crate::domain::WideDataset;
use crate::IoError;

/// Timestamp format of the `Date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reads a wide table of station readings from a CSV file.
///
/// Expected CSV format:
/// - Optional free-form preamble lines, skipped with [`WideSeriesReader::with_preamble_lines`]
/// - Header row: `Date,<station_id>,<station_id>,...`
/// - One row per timestamp, `Date` formatted as `%Y-%m-%d %H:%M:%S`
/// - Empty cells and `nan` are missing readings
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | First header column is not `Date` |
/// | [`IoError::BlankStationId`] | A station header cell is blank |
/// | [`IoError::DuplicateStation`] | Same station ID appears in two columns |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InvalidTimestamp`] | `Date` cell does not match the format |
/// | [`IoError::InvalidValue`] | Cell is neither empty, `nan`, nor a float |
pub struct WideSeriesReader {
    path: PathBuf,
    preamble_lines: usize,
}

impl WideSeriesReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            preamble_lines: 0,
        }
    }

    /// Skip `n` lines before the header row.
    #[must_use]
    pub fn with_preamble_lines(mut self, n: usize) -> Self {
        self.preamble_lines = n;
        self
    }

    /// Read and validate the CSV file, returning a [`WideDataset`].
    #[instrument(skip(self), fields(path = %self.path.display(), preamble = self.preamble_lines))]
    pub fn read(&self) -> Result<WideDataset, IoError> {
        let mut rdr = open_csv(&self.path, self.preamble_lines)?;

        let header = rdr
            .headers()
            .map_err(|e| IoError::csv_parse(&self.path, e))?
            .clone();
        if header.get(0).map(str::trim) != Some("Date") {
            return Err(IoError::MissingColumn {
                path: self.path.clone(),
                column: "Date",
            });
        }

        let mut station_ids = Vec::with_capacity(header.len() - 1);
        let mut seen: HashMap<StationId, usize> = HashMap::new();
        for (col_index, raw) in header.iter().enumerate().skip(1) {
            let id = StationId::parse(raw).ok_or_else(|| IoError::BlankStationId {
                path: self.path.clone(),
                row_index: 0,
            })?;
            if let Some(&first) = seen.get(&id) {
                return Err(IoError::DuplicateStation {
                    path: self.path.clone(),
                    station_id: id.to_string(),
                    first_row: first,
                    second_row: col_index,
                });
            }
            seen.insert(id.clone(), col_index);
            station_ids.push(id);
        }
        debug!(n_stations = station_ids.len(), "read CSV header");

        let mut timestamps = Vec::new();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); station_ids.len()];

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::csv_parse(&self.path, e))?;

            let raw_date = record.get(0).unwrap_or("").trim();
            let t = NaiveDateTime::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
                IoError::InvalidTimestamp {
                    path: self.path.clone(),
                    row_index,
                    raw: raw_date.to_string(),
                }
            })?;
            timestamps.push(t);

            for (j, column) in columns.iter_mut().enumerate() {
                let raw = record.get(j + 1).unwrap_or("");
                let value = parse_cell(raw).ok_or_else(|| IoError::InvalidValue {
                    path: self.path.clone(),
                    row_index,
                    column: station_ids[j].to_string(),
                    raw: raw.to_string(),
                })?;
                column.push(value);
            }
        }

        if timestamps.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_stations = station_ids.len(),
            n_rows = timestamps.len(),
            "dataset loaded"
        );

        Ok(WideDataset {
            path: self.path.clone(),
            timestamps,
            station_ids,
            columns,
        })
    }
}

/// Open `path`, skip `preamble_lines` raw lines, and wrap the rest in a CSV reader.
pub(crate) fn open_csv(
    path: &Path,
    preamble_lines: usize,
) -> Result<csv::Reader<BufReader<File>>, IoError> {
    let buf = skip_preamble(path, preamble_lines)?;

    // flexible(true): short rows read as missing cells instead of failing.
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(buf))
}

/// Open `path` positioned just after its first `preamble_lines` raw lines.
///
/// Preamble lines are skipped byte-wise so that blank lines and free-form
/// metadata count toward the total without being parsed as CSV.
pub(crate) fn skip_preamble(
    path: &Path,
    preamble_lines: usize,
) -> Result<BufReader<File>, IoError> {
    let not_found = |e: std::io::Error| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    };
    let mut buf = BufReader::new(File::open(path).map_err(not_found)?);
    let mut line = Vec::new();
    for _ in 0..preamble_lines {
        line.clear();
        if buf.read_until(b'\n', &mut line).map_err(not_found)? == 0 {
            break;
        }
    }
    Ok(buf)
}

/// Parse one numeric cell. Empty and `nan` cells are NaN; anything else
/// unparseable is `None`.
pub(crate) fn parse_cell(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}
