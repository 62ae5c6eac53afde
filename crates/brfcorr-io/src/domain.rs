//! Domain types for brfcorr-io.

use std::path::PathBuf;

use brfcorr_core::{StationId, TimeSeries, Unit};
use chrono::NaiveDateTime;

use crate::IoError;

/// A wide table of readings: one `Date` column, one column per station.
///
/// Cells that were empty or `nan` in the file are held as NaN. Timestamps
/// are kept in file order and may repeat; [`WideDataset::series`] sorts and
/// deduplicates them.
#[derive(Debug, Clone)]
pub struct WideDataset {
    /// Path the dataset was read from, used in error messages.
    pub(crate) path: PathBuf,
    /// Row timestamps, in file order.
    pub(crate) timestamps: Vec<NaiveDateTime>,
    /// Station IDs, in header order.
    pub(crate) station_ids: Vec<StationId>,
    /// Column-major values: `columns[j][i]` is station `j` at row `i`.
    pub(crate) columns: Vec<Vec<f64>>,
}

impl WideDataset {
    /// Return the station IDs in header order.
    #[must_use]
    pub fn station_ids(&self) -> &[StationId] {
        &self.station_ids
    }

    /// Return the row timestamps in file order.
    #[must_use]
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Return the number of data rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.timestamps.len()
    }

    /// Return true if the dataset has a column for `id`.
    #[must_use]
    pub fn contains(&self, id: &StationId) -> bool {
        self.station_ids.contains(id)
    }

    /// Return the raw column for `id`, NaN where the reading was missing.
    #[must_use]
    pub fn column(&self, id: &StationId) -> Option<&[f64]> {
        self.station_ids
            .iter()
            .position(|s| s == id)
            .map(|j| self.columns[j].as_slice())
    }

    /// Build the series for one station.
    ///
    /// Missing readings are dropped. Rows are sorted by timestamp; when a
    /// timestamp repeats, the first row in file order wins.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::UnknownStation`] | No column for `id` |
    /// | [`IoError::Series`] | The column holds no readings at all |
    pub fn series<U: Unit>(&self, id: &StationId) -> Result<TimeSeries<U>, IoError> {
        let column = self.column(id).ok_or_else(|| IoError::UnknownStation {
            path: self.path.clone(),
            station_id: id.to_string(),
        })?;
        let samples: Vec<(NaiveDateTime, f64)> = self
            .timestamps
            .iter()
            .zip(column)
            .filter(|(_, v)| !v.is_nan())
            .map(|(&t, &v)| (t, v))
            .collect();
        TimeSeries::from_samples(samples).map_err(|e| IoError::Series {
            path: self.path.clone(),
            station_id: id.to_string(),
            source: e,
        })
    }
}
