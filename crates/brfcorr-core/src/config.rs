//! Configuration builder for the water-level correction.

use chrono::TimeDelta;

use crate::assemble::Polarity;
use crate::brf::TIDE_UNIT_DIVISOR;
use crate::error::CorrectionError;

/// Offset, in hours, from the UTC-referenced atmospheric and Earth-tide grids
/// to the local standard time of the monitoring-network station records.
pub const LOCAL_TIME_OFFSET_HOURS: i64 = -5;

/// Configuration for a single-station correction.
///
/// Construct via [`CorrectionConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `utc_offset`        | 0                     |
/// | `tide_unit_divisor` | [`TIDE_UNIT_DIVISOR`] |
/// | `polarity`          | [`Polarity::Add`]     |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionConfig {
    pub(crate) sampling_interval: TimeDelta,
    pub(crate) utc_offset: TimeDelta,
    pub(crate) tide_unit_divisor: f64,
    pub(crate) polarity: Polarity,
}

impl CorrectionConfig {
    /// Create a configuration resampling the forcing onto `sampling_interval`.
    ///
    /// The interval is also the unit of the BRF lags: a response fitted on
    /// hourly data must be applied with a one-hour interval.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::InvalidSamplingInterval`] if the interval is
    /// shorter than one millisecond.
    pub fn new(sampling_interval: TimeDelta) -> Result<Self, CorrectionError> {
        if sampling_interval.num_milliseconds() <= 0 {
            return Err(CorrectionError::InvalidSamplingInterval {
                interval: sampling_interval,
            });
        }
        Ok(Self {
            sampling_interval,
            utc_offset: TimeDelta::zero(),
            tide_unit_divisor: TIDE_UNIT_DIVISOR,
            polarity: Polarity::Add,
        })
    }

    /// Set the shift applied to the pressure and Earth-tide timestamps before alignment.
    ///
    /// Use `TimeDelta::hours(LOCAL_TIME_OFFSET_HOURS)` for UTC sources feeding
    /// station records kept in local standard time.
    #[must_use]
    pub fn with_utc_offset(mut self, utc_offset: TimeDelta) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Set the divisor converting the Earth-tide response to meters.
    #[must_use]
    pub fn with_tide_unit_divisor(mut self, tide_unit_divisor: f64) -> Self {
        self.tide_unit_divisor = tide_unit_divisor;
        self
    }

    /// Set how the predicted displacement is applied to the raw water level.
    #[must_use]
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Return the sampling interval of the regular grid.
    #[must_use]
    pub fn sampling_interval(&self) -> TimeDelta {
        self.sampling_interval
    }

    /// Return the time-zone shift applied to the forcing series.
    #[must_use]
    pub fn utc_offset(&self) -> TimeDelta {
        self.utc_offset
    }

    /// Return the Earth-tide unit divisor.
    #[must_use]
    pub fn tide_unit_divisor(&self) -> f64 {
        self.tide_unit_divisor
    }

    /// Return the correction polarity.
    #[must_use]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub(crate) fn validate(&self) -> Result<(), CorrectionError> {
        let divisor = self.tide_unit_divisor;
        if !divisor.is_finite() || divisor == 0.0 {
            return Err(CorrectionError::InvalidDivisor { divisor });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CorrectionConfig::new(TimeDelta::hours(1)).unwrap();
        assert_eq!(config.sampling_interval(), TimeDelta::hours(1));
        assert_eq!(config.utc_offset(), TimeDelta::zero());
        assert_eq!(config.tide_unit_divisor(), 3.281);
        assert_eq!(config.polarity(), Polarity::Add);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_overrides() {
        let config = CorrectionConfig::new(TimeDelta::minutes(15))
            .unwrap()
            .with_utc_offset(TimeDelta::hours(LOCAL_TIME_OFFSET_HOURS))
            .with_tide_unit_divisor(1.0)
            .with_polarity(Polarity::Subtract);
        assert_eq!(config.utc_offset(), TimeDelta::hours(-5));
        assert_eq!(config.tide_unit_divisor(), 1.0);
        assert_eq!(config.polarity(), Polarity::Subtract);
    }

    #[test]
    fn rejects_zero_interval() {
        let result = CorrectionConfig::new(TimeDelta::zero());
        assert!(matches!(
            result,
            Err(CorrectionError::InvalidSamplingInterval { .. })
        ));
    }

    #[test]
    fn rejects_negative_interval() {
        let result = CorrectionConfig::new(TimeDelta::hours(-1));
        assert!(matches!(
            result,
            Err(CorrectionError::InvalidSamplingInterval { .. })
        ));
    }

    #[test]
    fn validate_rejects_zero_divisor() {
        let config = CorrectionConfig::new(TimeDelta::hours(1))
            .unwrap()
            .with_tide_unit_divisor(0.0);
        assert!(matches!(
            config.validate(),
            Err(CorrectionError::InvalidDivisor { .. })
        ));
    }
}
