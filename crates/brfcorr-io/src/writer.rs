//! Writers for corrected water levels and the batch summary.

use std::fs;
use std::path::{Path, PathBuf};

use brfcorr_core::{BatchReport, CorrectionResult, StationOutcome, StationRecord};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::reader::DATE_FORMAT;
use crate::IoError;

/// File name of the batch summary inside the output directory.
pub const SUMMARY_FILE_NAME: &str = "batch_summary.json";

const DATA_HEADER: [&str; 4] = ["Date", "WL(masl)", "dWL(m)", "WLcorr(masl)"];

/// Writes corrected station series and the batch summary.
///
/// Creates the output directory on construction if it does not exist.
/// Station files are named `{station_id}_{name}.csv`; see
/// [`CorrectedWriter::station_file_name`].
pub struct CorrectedWriter {
    output_dir: PathBuf,
}

impl CorrectedWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the output file name for a station.
    ///
    /// Characters of the well name that are not alphanumeric, `-` or `_`
    /// are replaced by `_`.
    #[must_use]
    pub fn station_file_name(record: &StationRecord) -> String {
        let name: String = record
            .name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_{name}.csv", record.id)
    }

    /// Write one corrected station to `{station_id}_{name}.csv`.
    ///
    /// The file starts with a metadata block (`Well Name`, `Well ID`,
    /// `Latitude`, `Longitude`, `Altitude`) and a blank line, followed by the
    /// table `Date,WL(masl),dWL(m),WLcorr(masl)`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::WriteCsv`] | A record cannot be serialized |
    /// | [`IoError::WriteFile`] | The file cannot be written |
    #[instrument(skip_all, fields(station = %record.id))]
    pub fn write_station(
        &self,
        record: &StationRecord,
        result: &CorrectionResult,
    ) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(Self::station_file_name(record));

        let mut preamble = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        let latitude = record.latitude.to_string();
        let longitude = record.longitude.to_string();
        let altitude = record.elevation.map(|e| e.to_string()).unwrap_or_default();
        let rows: [[&str; 2]; 5] = [
            ["Well Name", record.name.as_str()],
            ["Well ID", record.id.as_str()],
            ["Latitude", latitude.as_str()],
            ["Longitude", longitude.as_str()],
            ["Altitude", altitude.as_str()],
        ];
        for row in rows {
            preamble
                .write_record(row)
                .map_err(|e| write_csv_error(&path, e))?;
        }

        let mut table = csv::Writer::from_writer(Vec::new());
        table
            .write_record(DATA_HEADER)
            .map_err(|e| write_csv_error(&path, e))?;
        for sample in &result.corrected {
            table
                .write_record([
                    sample.timestamp.format(DATE_FORMAT).to_string(),
                    sample.raw.to_string(),
                    sample.correction.to_string(),
                    sample.corrected.to_string(),
                ])
                .map_err(|e| write_csv_error(&path, e))?;
        }

        let mut bytes = into_bytes(preamble, &path)?;
        bytes.push(b'\n');
        bytes.extend(into_bytes(table, &path)?);

        fs::write(&path, &bytes).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        debug!(path = %path.display(), n_rows = result.n_corrected(), "station written");
        Ok(path)
    }

    /// Write every corrected station of a batch, then the summary.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`Self::write_station`] or
    /// [`Self::write_summary`].
    #[instrument(skip_all, fields(n_stations = report.stations.len()))]
    pub fn write_batch(&self, report: &BatchReport) -> Result<BatchSummary, IoError> {
        for (record, result) in report.corrected() {
            self.write_station(record, result)?;
        }
        let summary = BatchSummary::from_report(report);
        self.write_summary(&summary)?;
        Ok(summary)
    }

    /// Write the batch summary to [`SUMMARY_FILE_NAME`].
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_summary(&self, summary: &BatchSummary) -> Result<(), IoError> {
        let path = self.output_dir.join(SUMMARY_FILE_NAME);
        let json = serde_json::to_string_pretty(summary).expect("serialization cannot fail");
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "batch summary written");
        Ok(())
    }
}

fn write_csv_error(path: &Path, e: csv::Error) -> IoError {
    IoError::WriteCsv {
        path: path.to_path_buf(),
        source: e,
    }
}

fn into_bytes(wtr: csv::Writer<Vec<u8>>, path: &Path) -> Result<Vec<u8>, IoError> {
    wtr.into_inner().map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: std::io::Error::new(e.error().kind(), e.to_string()),
    })
}

/// Outcome of a batch, as written to [`SUMMARY_FILE_NAME`] and printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Number of stations in the batch.
    pub n_stations: usize,
    /// Number of corrected stations.
    pub n_corrected: usize,
    /// Number of skipped stations.
    pub n_skipped: usize,
    /// Number of failed stations.
    pub n_failed: usize,
    /// One entry per station, in batch order.
    pub stations: Vec<StationSummary>,
}

/// One station's line in a [`BatchSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct StationSummary {
    /// Station identifier.
    pub station_id: String,
    /// Well name.
    pub name: String,
    /// `corrected`, `skipped` or `failed`.
    pub status: &'static str,
    /// Skip reason or error message, absent for corrected stations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Output file name, for corrected stations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Maximum BRF lag in grid steps, for corrected stations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lag: Option<usize>,
    /// Number of corrected readings, for corrected stations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_corrected: Option<usize>,
    /// First corrected timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<NaiveDateTime>,
    /// Last corrected timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<NaiveDateTime>,
}

impl BatchSummary {
    /// Summarize a batch report.
    #[must_use]
    pub fn from_report(report: &BatchReport) -> Self {
        let stations = report
            .stations
            .iter()
            .map(|s| {
                let mut entry = StationSummary {
                    station_id: s.record.id.to_string(),
                    name: s.record.name.clone(),
                    status: "",
                    detail: None,
                    file: None,
                    max_lag: None,
                    n_corrected: None,
                    first: None,
                    last: None,
                };
                match &s.outcome {
                    StationOutcome::Corrected(result) => {
                        let rows = result.corrected.samples();
                        entry.status = "corrected";
                        entry.file = Some(CorrectedWriter::station_file_name(&s.record));
                        entry.max_lag = Some(result.max_lag);
                        entry.n_corrected = Some(rows.len());
                        entry.first = rows.first().map(|r| r.timestamp);
                        entry.last = rows.last().map(|r| r.timestamp);
                    }
                    StationOutcome::Skipped(reason) => {
                        entry.status = "skipped";
                        entry.detail = Some(reason.to_string());
                    }
                    StationOutcome::Failed(e) => {
                        entry.status = "failed";
                        entry.detail = Some(e.to_string());
                    }
                }
                entry
            })
            .collect();

        Self {
            n_stations: report.stations.len(),
            n_corrected: report.n_corrected(),
            n_skipped: report.n_skipped(),
            n_failed: report.n_failed(),
            stations,
        }
    }
}

#[cfg(test)]
mod tests {
    use brfcorr_core::{
        BarometricResponse, BatchConfig, CorrectionConfig, Masl, MetersOfWater,
        NanometersPerSecondSquared, StationId, StationInputs, TimeSeries,
    };
    use chrono::{NaiveDate, TimeDelta};
    use tempfile::TempDir;

    use super::*;

    fn hour(i: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::hours(i)
    }

    fn record(id: &str, name: &str) -> StationRecord {
        StationRecord {
            id: StationId::parse(id).unwrap(),
            name: name.to_string(),
            latitude: 45.856,
            longitude: -73.763,
            elevation: Some(57.2),
        }
    }

    fn inputs(id: &str, name: &str, brf: Option<BarometricResponse>) -> StationInputs {
        let n = 12;
        let ts: Vec<_> = (0..n).map(hour).collect();
        StationInputs {
            record: record(id, name),
            water_levels: TimeSeries::<Masl>::new(ts.clone(), vec![20.0; n as usize]).unwrap(),
            pressure: TimeSeries::<MetersOfWater>::new(
                ts.clone(),
                (0..n).map(|i| 10.0 + 0.1 * (i as f64).sin()).collect(),
            )
            .unwrap(),
            tide: TimeSeries::<NanometersPerSecondSquared>::new(ts, vec![0.0; n as usize])
                .unwrap(),
            brf,
        }
    }

    fn report() -> BatchReport {
        let brf = BarometricResponse::new(vec![0.5, 0.2], vec![0.0, 0.0]).unwrap();
        BatchConfig::new(CorrectionConfig::new(TimeDelta::hours(1)).unwrap()).run(&[
            inputs("03040018", "Saint-Lin", Some(brf)),
            inputs("03090006", "Saint-Guillaume", None),
        ])
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        CorrectedWriter::new(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn file_name_replaces_unsafe_characters() {
        let r = record("03040018", "St-Lin/Laurentides (P2)");
        assert_eq!(
            CorrectedWriter::station_file_name(&r),
            "03040018_St-Lin_Laurentides__P2_.csv"
        );
        let r = record("03040018", "Sainte-Béatrix");
        assert_eq!(CorrectedWriter::station_file_name(&r), "03040018_Sainte-Béatrix.csv");
    }

    #[test]
    fn station_file_layout() {
        let dir = TempDir::new().unwrap();
        let writer = CorrectedWriter::new(dir.path()).unwrap();
        let report = report();
        let (rec, result) = report.corrected().next().unwrap();
        let path = writer.write_station(rec, result).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Well Name,Saint-Lin");
        assert_eq!(lines[1], "Well ID,03040018");
        assert_eq!(lines[2], "Latitude,45.856");
        assert_eq!(lines[3], "Longitude,-73.763");
        assert_eq!(lines[4], "Altitude,57.2");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Date,WL(masl),dWL(m),WLcorr(masl)");
        assert!(lines[7].starts_with("2017-06-01 01:00:00,20,"));
        assert_eq!(lines.len(), 7 + result.n_corrected());
    }

    #[test]
    fn batch_writes_corrected_stations_and_summary() {
        let dir = TempDir::new().unwrap();
        let writer = CorrectedWriter::new(dir.path()).unwrap();
        let summary = writer.write_batch(&report()).unwrap();

        assert!(dir.path().join("03040018_Saint-Lin.csv").is_file());
        assert!(!dir.path().join("03090006_Saint-Guillaume.csv").exists());

        let json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join(SUMMARY_FILE_NAME)).unwrap(),
        )
        .unwrap();
        assert_eq!(json["n_stations"], 2);
        assert_eq!(json["n_corrected"], 1);
        assert_eq!(json["n_skipped"], 1);
        assert_eq!(json["stations"][0]["status"], "corrected");
        assert_eq!(json["stations"][0]["max_lag"], 1);
        assert_eq!(json["stations"][0]["first"], "2017-06-01T01:00:00");
        assert_eq!(json["stations"][1]["status"], "skipped");
        assert_eq!(json["stations"][1]["detail"], "no response function");
        assert!(json["stations"][1].get("file").is_none());
        assert_eq!(summary.n_failed, 0);
    }
}
