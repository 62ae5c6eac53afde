//! Output of a single-station correction.

use chrono::TimeDelta;

use crate::assemble::CorrectedSeries;
use crate::series::RegularTimeSeries;
use crate::unit::Meters;

/// Result of [`CorrectionConfig::correct`](crate::CorrectionConfig::correct).
///
/// The three component series share one grid, starting `max_lag` slots after
/// the start of the aligned forcing: the first `max_lag` slots have no full
/// lag window and are not represented.
#[derive(Debug, Clone)]
pub struct CorrectionResult {
    /// Maximum lag `N` of the response function, in grid steps.
    pub max_lag: usize,
    /// Barometric displacement `dWL_baro` (m).
    pub baro_component: RegularTimeSeries<Meters>,
    /// Earth-tide displacement `dWL_tide` (m), already unit-converted.
    pub tide_component: RegularTimeSeries<Meters>,
    /// Total displacement `dWL = dWL_baro + dWL_tide` (m).
    pub correction: RegularTimeSeries<Meters>,
    /// Raw, correction and corrected values for every joined reading.
    pub corrected: CorrectedSeries,
}

impl CorrectionResult {
    /// Return the correction on the full aligned grid, NaN over the first `max_lag` slots.
    #[must_use]
    pub fn padded_correction(&self) -> RegularTimeSeries<Meters> {
        let step = self.correction.step();
        let lead = TimeDelta::milliseconds(step.num_milliseconds() * self.max_lag as i64);
        let mut values = vec![f64::NAN; self.max_lag];
        values.extend_from_slice(self.correction.values());
        // Step comes from an already validated grid
        RegularTimeSeries::new(self.correction.start() - lead, step, values)
            .expect("correction grid step is positive")
    }

    /// Return the number of water-level readings that were corrected.
    #[must_use]
    pub fn n_corrected(&self) -> usize {
        self.corrected.len()
    }
}
