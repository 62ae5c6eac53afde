//! Single-station correction: alignment, detrended convolution, assembly.

use tracing::{debug, info, instrument};

use crate::align::{inner_join, lagged_coverage, resample};
use crate::assemble::{apply, combine};
use crate::brf::BarometricResponse;
use crate::config::CorrectionConfig;
use crate::error::CorrectionError;
use crate::result::CorrectionResult;
use crate::series::{RegularTimeSeries, TimeSeries};
use crate::unit::{Masl, Meters, MetersOfWater, NanometersPerSecondSquared};

impl CorrectionConfig {
    /// Correct a water-level record for barometric and Earth-tide loading.
    ///
    /// 1. Shift the pressure and tide sources by the configured UTC offset,
    ///    resample each onto the sampling grid and inner-join them.
    /// 2. Detrend both forcing grids and convolve them with the `A` and `B`
    ///    responses; the tide response is divided by the tide unit divisor.
    /// 3. Sum both components into `dWL`, inner-join it with the water levels
    ///    and apply it with the configured polarity.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CorrectionError::InvalidDivisor`] | Tide unit divisor is zero or not finite |
    /// | [`CorrectionError::Series`] | A forcing series has fewer than 2 readings |
    /// | [`CorrectionError::InsufficientData`] | Fewer than `max_lag + 1` aligned slots cover the water levels |
    /// | [`CorrectionError::DataGap`] | An aligned forcing grid still holds a NaN |
    /// | [`CorrectionError::ShapeMismatch`] | Component lengths differ |
    #[instrument(skip_all, fields(
        n_levels = water_levels.len(),
        n_pressure = pressure.len(),
        n_tide = tide.len(),
        max_lag = brf.max_lag(),
    ))]
    pub fn correct(
        &self,
        water_levels: &TimeSeries<Masl>,
        pressure: &TimeSeries<MetersOfWater>,
        tide: &TimeSeries<NanometersPerSecondSquared>,
        brf: &BarometricResponse,
    ) -> Result<CorrectionResult, CorrectionError> {
        self.validate()?;
        let step = self.sampling_interval;
        let max_lag = brf.max_lag();

        // 1. Alignment
        let pressure_grid = resample(&pressure.shift(self.utc_offset), step)?;
        let tide_grid = resample(&tide.shift(self.utc_offset), step)?;
        let (pressure_grid, tide_grid) = inner_join(&pressure_grid, &tide_grid)?;

        let available = lagged_coverage(&pressure_grid, water_levels, max_lag);
        if available < max_lag + 1 {
            return Err(CorrectionError::InsufficientData {
                required: max_lag + 1,
                available,
            });
        }
        debug!(
            n_aligned = pressure_grid.len(),
            n_covering = available,
            "forcing aligned"
        );

        // 2. Detrended convolution
        let baro = brf.predict_baro(&pressure_grid)?;
        let tidal = brf.predict_tide(&tide_grid, self.tide_unit_divisor)?;

        // 3. Assembly
        let dwl = combine(&baro, &tidal)?;
        let start = pressure_grid.timestamp(max_lag);
        let baro_component = RegularTimeSeries::<Meters>::new(start, step, baro)?;
        let tide_component = RegularTimeSeries::<Meters>::new(start, step, tidal)?;
        let correction = RegularTimeSeries::<Meters>::new(start, step, dwl)?;
        let corrected = apply(water_levels, &correction, self.polarity);

        info!(
            n_correction = correction.len(),
            n_corrected = corrected.len(),
            "water levels corrected"
        );

        Ok(CorrectionResult {
            max_lag,
            baro_component,
            tide_component,
            correction,
            corrected,
        })
    }
}
