//! Linear detrending against sample index.

/// Ordinary least-squares line `intercept + slope * i` fit against sample index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Value of the line at index 0.
    pub intercept: f64,
    /// Change per sample.
    pub slope: f64,
}

impl LinearFit {
    /// Evaluate the line at sample index `i`.
    #[must_use]
    pub fn at(&self, i: usize) -> f64 {
        self.intercept + self.slope * i as f64
    }
}

/// Fit a straight line to `values` by least squares against their index.
///
/// Uses the centred formulation (index minus its mean) to keep the sums well
/// conditioned on long records. A series shorter than two samples has zero
/// slope.
#[must_use]
pub fn linear_fit(values: &[f64]) -> LinearFit {
    let n = values.len();
    if n == 0 {
        return LinearFit {
            intercept: 0.0,
            slope: 0.0,
        };
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = values.iter().sum::<f64>() / nf;

    let (sxy, sxx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    LinearFit {
        intercept: y_mean - slope * x_mean,
        slope,
    }
}

/// Subtract the least-squares line from `values`.
///
/// Callers must reject NaN beforehand: a single NaN poisons the fit and
/// therefore every output sample.
#[must_use = "returns a new detrended vector; the input is unchanged"]
pub fn detrend(values: &[f64]) -> Vec<f64> {
    let fit = linear_fit(values);
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| y - fit.at(i))
        .collect()
}
