//! Correction assembly: combine components and apply them to the water level.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CorrectionError;
use crate::series::{RegularTimeSeries, TimeSeries};
use crate::unit::{Masl, Meters};

/// How the predicted displacement `dWL` is applied to the raw water level.
///
/// The monitoring-network scripts add `dWL`, treating it as the signed
/// displacement that compensates the loading. Not yet confirmed against an
/// independent calibration well, hence the switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// `WL_corr = WL + dWL`.
    #[default]
    Add,
    /// `WL_corr = WL − dWL`.
    Subtract,
}

impl Polarity {
    /// Apply `correction` to `raw` with this polarity.
    #[must_use]
    pub fn apply(self, raw: f64, correction: f64) -> f64 {
        match self {
            Self::Add => raw + correction,
            Self::Subtract => raw - correction,
        }
    }
}

/// One row of the corrected output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrectedSample {
    /// Timestamp of the water-level reading.
    pub timestamp: NaiveDateTime,
    /// Raw water level (masl).
    pub raw: f64,
    /// Predicted barometric + tidal displacement `dWL` (m).
    pub correction: f64,
    /// Corrected water level (masl).
    pub corrected: f64,
}

/// Water-level readings that received a correction, in time order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrectedSeries(Vec<CorrectedSample>);

impl CorrectedSeries {
    /// Return the rows.
    #[must_use]
    pub fn samples(&self) -> &[CorrectedSample] {
        &self.0
    }

    /// Return the number of corrected readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if no reading could be corrected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, CorrectedSample> {
        self.0.iter()
    }

    /// Return the corrected values as a water-level series.
    ///
    /// Returns `None` when the series is empty.
    #[must_use]
    pub fn to_corrected_series(&self) -> Option<TimeSeries<Masl>> {
        let (timestamps, values) = self.0.iter().map(|s| (s.timestamp, s.corrected)).unzip();
        TimeSeries::new(timestamps, values).ok()
    }
}

impl<'a> IntoIterator for &'a CorrectedSeries {
    type Item = &'a CorrectedSample;
    type IntoIter = std::slice::Iter<'a, CorrectedSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sum the barometric and tidal components index by index.
///
/// # Errors
///
/// Returns [`CorrectionError::ShapeMismatch`] if the lengths differ.
pub fn combine(baro: &[f64], tide: &[f64]) -> Result<Vec<f64>, CorrectionError> {
    if baro.len() != tide.len() {
        return Err(CorrectionError::ShapeMismatch {
            baro: baro.len(),
            tide: tide.len(),
        });
    }
    Ok(baro.iter().zip(tide).map(|(b, t)| b + t).collect())
}

/// Apply `correction` to the water levels it shares a timestamp with.
///
/// Inner join: readings off the correction grid, and grid slots with no
/// reading, are dropped. A NaN correction is dropped as well; an undefined
/// correction is never treated as zero.
#[must_use]
pub fn apply(
    water_levels: &TimeSeries<Masl>,
    correction: &RegularTimeSeries<Meters>,
    polarity: Polarity,
) -> CorrectedSeries {
    let rows: Vec<CorrectedSample> = water_levels
        .iter()
        .filter_map(|(timestamp, raw)| {
            let dwl = correction.values()[correction.index_of(timestamp)?];
            (!dwl.is_nan()).then(|| CorrectedSample {
                timestamp,
                raw,
                correction: dwl,
                corrected: polarity.apply(raw, dwl),
            })
        })
        .collect();

    if rows.is_empty() {
        warn!(
            n_readings = water_levels.len(),
            n_slots = correction.len(),
            "no water-level reading falls on the correction grid"
        );
    } else {
        debug!(n_joined = rows.len(), n_readings = water_levels.len(), "correction applied");
    }
    CorrectedSeries(rows)
}
