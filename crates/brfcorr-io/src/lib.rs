//! File I/O, validation, and serialization for the brfcorr pipeline.

mod brf_reader;
mod domain;
mod error;
mod reader;
mod station_reader;
mod writer;

pub use brf_reader::{BrfReader, BRF_HEADER_ROW};
pub use domain::WideDataset;
pub use error::IoError;
pub use reader::{WideSeriesReader, DATE_FORMAT};
pub use station_reader::StationReader;
pub use writer::{BatchSummary, CorrectedWriter, StationSummary, SUMMARY_FILE_NAME};
