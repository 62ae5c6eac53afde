//! I/O error types for brfcorr-io.

use std::path::PathBuf;

use brfcorr_core::{CorrectionError, SeriesError};

/// Errors from reading station inputs and writing corrected outputs.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a required column is absent from the header.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the expected column.
        column: &'static str,
    },

    /// Returned when a date cell does not match the expected format.
    #[error("invalid timestamp in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidTimestamp {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw string that failed to parse.
        raw: String,
    },

    /// Returned when a numeric cell is neither empty, `nan`, nor a float.
    #[error("invalid value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Header name of the offending column.
        column: String,
        /// The raw string that failed to parse.
        raw: String,
    },

    /// Returned when a station row has a blank identifier.
    #[error("blank station ID in {path} at row {row_index}")]
    BlankStationId {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
    },

    /// Returned when the same station ID appears more than once.
    #[error("duplicate station ID \"{station_id}\" in {path}: first at row {first_row}, again at row {second_row}")]
    DuplicateStation {
        /// Path to the CSV file.
        path: PathBuf,
        /// The duplicated station ID.
        station_id: String,
        /// Zero-based row index (or column index for wide files) of the first occurrence.
        first_row: usize,
        /// Zero-based row index (or column index for wide files) of the second occurrence.
        second_row: usize,
    },

    /// Returned when a dataset has no column for the requested station.
    #[error("station \"{station_id}\" not found in {path}")]
    UnknownStation {
        /// Path the dataset was read from.
        path: PathBuf,
        /// The requested station ID.
        station_id: String,
    },

    /// Returned when a station column holds no usable readings.
    #[error("station \"{station_id}\" in {path}: {source}")]
    Series {
        /// Path the dataset was read from.
        path: PathBuf,
        /// The station whose series could not be built.
        station_id: String,
        /// Underlying series error.
        source: SeriesError,
    },

    /// Returned when BRF coefficients cannot form a valid response function.
    #[error("invalid response function in {path}: {source}")]
    InvalidResponse {
        /// Path to the BRF file.
        path: PathBuf,
        /// Underlying validation error.
        source: CorrectionError,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Directory path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an output file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// File path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV record cannot be written.
    #[error("cannot write CSV record to {path}")]
    WriteCsv {
        /// File path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

impl IoError {
    pub(crate) fn csv_parse(path: &std::path::Path, e: csv::Error) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}
