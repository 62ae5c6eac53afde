//! Barometric response function coefficients.

use crate::error::CorrectionError;

/// Divisor applied to the Earth-tide response to obtain meters.
///
/// A property of the tool that fits the response functions: its Earth-tide
/// coefficients are expressed in that tool's internal length unit. The
/// barometric coefficients need no conversion.
pub const TIDE_UNIT_DIVISOR: f64 = 3.281;

/// A fitted barometric response function: two impulse responses of equal length.
///
/// `baro[k]` (column `A`) and `tide[k]` (column `B`) weight the detrended
/// pressure and Earth-tide inputs `k` grid steps in the past. Index 0 is the
/// zero-lag weight, index `max_lag` the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct BarometricResponse {
    baro: Vec<f64>,
    tide: Vec<f64>,
}

impl BarometricResponse {
    /// Build a response function from the `A` and `B` coefficient columns.
    ///
    /// NaN coefficients (blank cells in the fitted file) are replaced by zero.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectionError::MalformedCoefficients`] if the columns differ
    /// in length or are both empty.
    pub fn new(a: Vec<f64>, b: Vec<f64>) -> Result<Self, CorrectionError> {
        if a.len() != b.len() || a.is_empty() {
            return Err(CorrectionError::MalformedCoefficients {
                a_len: a.len(),
                b_len: b.len(),
            });
        }
        Ok(Self {
            baro: zero_nan(a),
            tide: zero_nan(b),
        })
    }

    /// Return the maximum lag `N`, in grid steps.
    #[must_use]
    pub fn max_lag(&self) -> usize {
        self.baro.len() - 1
    }

    /// Return the barometric coefficients `A[0..=N]`.
    #[must_use]
    pub fn baro_coefficients(&self) -> &[f64] {
        &self.baro
    }

    /// Return the Earth-tide coefficients `B[0..=N]`.
    #[must_use]
    pub fn tide_coefficients(&self) -> &[f64] {
        &self.tide
    }
}

fn zero_nan(mut coefficients: Vec<f64>) -> Vec<f64> {
    for c in &mut coefficients {
        if c.is_nan() {
            *c = 0.0;
        }
    }
    coefficients
}
