//! Station metadata reader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use brfcorr_core::{StationId, StationRecord};
use tracing::{info, instrument};

use crate::reader::{open_csv, parse_cell};
use crate::IoError;

const COLUMNS: [&str; 5] = ["station_id", "name", "latitude", "longitude", "elevation"];

/// Reads the station list from a CSV file.
///
/// Expected CSV format:
/// - Header row naming `station_id,name,latitude,longitude,elevation` (any order)
/// - One row per station; `elevation` may be empty when unsurveyed
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent |
/// | [`IoError::BlankStationId`] | `station_id` cell is blank |
/// | [`IoError::DuplicateStation`] | Same station ID appears twice |
/// | [`IoError::InvalidValue`] | Coordinate is missing or not a float |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
pub struct StationReader {
    path: PathBuf,
}

impl StationReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the station list, in file order.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<StationRecord>, IoError> {
        let mut rdr = open_csv(&self.path, 0)?;
        let header = rdr
            .headers()
            .map_err(|e| IoError::csv_parse(&self.path, e))?
            .clone();

        let mut index = [0usize; 5];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column: name,
                })?;
        }
        let [i_id, i_name, i_lat, i_lon, i_elev] = index;

        let mut records = Vec::new();
        let mut seen: HashMap<StationId, usize> = HashMap::new();

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::csv_parse(&self.path, e))?;
            let cell = |i: usize| record.get(i).unwrap_or("");

            let id = StationId::parse(cell(i_id)).ok_or_else(|| IoError::BlankStationId {
                path: self.path.clone(),
                row_index,
            })?;
            if let Some(&first_row) = seen.get(&id) {
                return Err(IoError::DuplicateStation {
                    path: self.path.clone(),
                    station_id: id.to_string(),
                    first_row,
                    second_row: row_index,
                });
            }
            seen.insert(id.clone(), row_index);

            let latitude = self.coordinate(cell(i_lat), row_index, "latitude")?;
            let longitude = self.coordinate(cell(i_lon), row_index, "longitude")?;
            let elevation = self.number(cell(i_elev), row_index, "elevation")?;

            records.push(StationRecord {
                id,
                name: cell(i_name).trim().to_string(),
                latitude,
                longitude,
                elevation: (!elevation.is_nan()).then_some(elevation),
            });
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(n_stations = records.len(), "stations loaded");
        Ok(records)
    }

    fn number(&self, raw: &str, row_index: usize, column: &str) -> Result<f64, IoError> {
        parse_cell(raw).ok_or_else(|| IoError::InvalidValue {
            path: self.path.clone(),
            row_index,
            column: column.to_string(),
            raw: raw.to_string(),
        })
    }

    /// Like [`Self::number`], but a missing coordinate is an error.
    fn coordinate(&self, raw: &str, row_index: usize, column: &str) -> Result<f64, IoError> {
        let value = self.number(raw, row_index, column)?;
        if value.is_nan() {
            return Err(IoError::InvalidValue {
                path: self.path.clone(),
                row_index,
                column: column.to_string(),
                raw: raw.to_string(),
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_stations() {
        let csv = "station_id,name,latitude,longitude,elevation\n\
                   03040018,Saint-Lin,45.856,-73.763,57.2\n\
                   03090006,Saint-Guillaume,45.885,-72.768,\n";
        let f = write_csv(csv);
        let stations = StationReader::new(f.path()).read().unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id.as_str(), "03040018");
        assert_eq!(stations[0].name, "Saint-Lin");
        assert_eq!(stations[0].elevation, Some(57.2));
        assert_eq!(stations[1].elevation, None);
        assert!((stations[1].longitude + 72.768).abs() < 1e-12);
    }

    #[test]
    fn columns_in_any_order() {
        let csv = "name,elevation,station_id,longitude,latitude\nWell,10,X1,-70.0,46.0\n";
        let f = write_csv(csv);
        let stations = StationReader::new(f.path()).read().unwrap();
        assert_eq!(stations[0].id.as_str(), "X1");
        assert_eq!(stations[0].latitude, 46.0);
    }

    #[test]
    fn duplicate_station() {
        let csv = "station_id,name,latitude,longitude,elevation\nA,a,1,1,\nB,b,1,1,\nA,c,1,1,\n";
        let f = write_csv(csv);
        let err = StationReader::new(f.path()).read().unwrap_err();
        match err {
            IoError::DuplicateStation {
                station_id,
                first_row,
                second_row,
                ..
            } => {
                assert_eq!(station_id, "A");
                assert_eq!(first_row, 0);
                assert_eq!(second_row, 2);
            }
            other => panic!("expected DuplicateStation, got {other:?}"),
        }
    }

    #[test]
    fn missing_column() {
        let csv = "station_id,name,latitude,elevation\nA,a,1,\n";
        let f = write_csv(csv);
        let err = StationReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::MissingColumn { column: "longitude", .. }));
    }

    #[test]
    fn missing_latitude_is_invalid() {
        let csv = "station_id,name,latitude,longitude,elevation\nA,a,,1,\n";
        let f = write_csv(csv);
        let err = StationReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::InvalidValue { .. }));
    }

    #[test]
    fn blank_id() {
        let csv = "station_id,name,latitude,longitude,elevation\n  ,a,1,1,\n";
        let f = write_csv(csv);
        let err = StationReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::BlankStationId { row_index: 0, .. }));
    }
}
