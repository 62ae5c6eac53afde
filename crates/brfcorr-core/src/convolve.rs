//! Causal convolution of detrended forcing series with the BRF.
//!
//! For a response `c` of length `N + 1` and an input `x` of length `M`, the
//! output has `M − N` samples:
//!
//! ```text
//! y[j] = Σ_{k=0}^{N} c[k] · x[j + N − k]
//! ```
//!
//! Output index `j` corresponds to input index `j + N`. `c[0]` weights the
//! current sample and `c[N]` the oldest lag.

use tracing::{debug, instrument};

use crate::brf::BarometricResponse;
use crate::detrend::detrend;
use crate::error::CorrectionError;
use crate::series::RegularTimeSeries;
use crate::unit::{MetersOfWater, NanometersPerSecondSquared, Unit};

/// Convolve `x` with the impulse response `c`.
///
/// NaN propagates: an output sample whose lag window contains a NaN is NaN,
/// whatever the weight at that lag.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`CorrectionError::MalformedCoefficients`] | `c` is empty |
/// | [`CorrectionError::InsufficientData`] | `x` is shorter than `c` |
pub fn convolve(x: &[f64], c: &[f64]) -> Result<Vec<f64>, CorrectionError> {
    if c.is_empty() {
        return Err(CorrectionError::MalformedCoefficients { a_len: 0, b_len: 0 });
    }
    if x.len() < c.len() {
        return Err(CorrectionError::InsufficientData {
            required: c.len(),
            available: x.len(),
        });
    }

    let n_lag = c.len() - 1;
    let out = (n_lag..x.len())
        .map(|t| c.iter().enumerate().map(|(k, &ck)| ck * x[t - k]).sum::<f64>())
        .collect();
    Ok(out)
}

/// Barometric component from an already detrended pressure signal, in meters.
///
/// # Errors
///
/// Same conditions as [`convolve`].
pub fn baro_component(detrended: &[f64], a: &[f64]) -> Result<Vec<f64>, CorrectionError> {
    convolve(detrended, a)
}

/// Earth-tide component from an already detrended tide signal, in meters.
///
/// The raw convolution is divided by `divisor`, normally
/// [`TIDE_UNIT_DIVISOR`](crate::TIDE_UNIT_DIVISOR).
///
/// # Errors
///
/// Same conditions as [`convolve`].
pub fn tide_component(
    detrended: &[f64],
    b: &[f64],
    divisor: f64,
) -> Result<Vec<f64>, CorrectionError> {
    let mut out = convolve(detrended, b)?;
    for y in &mut out {
        *y /= divisor;
    }
    Ok(out)
}

/// Detrend a regular series after checking it has no undefined samples.
///
/// # Errors
///
/// Returns [`CorrectionError::DataGap`] at the first NaN slot.
pub fn checked_detrend<U: Unit>(series: &RegularTimeSeries<U>) -> Result<Vec<f64>, CorrectionError> {
    if let Some(index) = series.nan_position() {
        return Err(CorrectionError::DataGap {
            label: U::QUANTITY,
            index,
        });
    }
    Ok(detrend(series.values()))
}

impl BarometricResponse {
    /// Predict the barometric displacement from a regular pressure series.
    ///
    /// Returns `len − max_lag` samples, the first aligned with grid slot `max_lag`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CorrectionError::DataGap`] | Pressure grid contains a NaN |
    /// | [`CorrectionError::InsufficientData`] | Grid shorter than `max_lag + 1` |
    #[instrument(skip_all, fields(n = pressure.len(), max_lag = self.max_lag()))]
    pub fn predict_baro(
        &self,
        pressure: &RegularTimeSeries<MetersOfWater>,
    ) -> Result<Vec<f64>, CorrectionError> {
        let detrended = checked_detrend(pressure)?;
        let out = baro_component(&detrended, self.baro_coefficients())?;
        debug!(n_out = out.len(), "barometric component computed");
        Ok(out)
    }

    /// Predict the Earth-tide displacement from a regular tide series.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CorrectionError::DataGap`] | Tide grid contains a NaN |
    /// | [`CorrectionError::InsufficientData`] | Grid shorter than `max_lag + 1` |
    #[instrument(skip_all, fields(n = tide.len(), max_lag = self.max_lag()))]
    pub fn predict_tide(
        &self,
        tide: &RegularTimeSeries<NanometersPerSecondSquared>,
        divisor: f64,
    ) -> Result<Vec<f64>, CorrectionError> {
        let detrended = checked_detrend(tide)?;
        let out = tide_component(&detrended, self.tide_coefficients(), divisor)?;
        debug!(n_out = out.len(), "earth tide component computed");
        Ok(out)
    }
}
