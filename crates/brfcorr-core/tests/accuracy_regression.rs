//! Accuracy regression tests for brfcorr-core.
//!
//! These tests pin the numerical behaviour of the correction: lag ordering,
//! unit conversion, detrending and the timestamp join. Reference values are
//! worked out by hand from the convolution definition.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use brfcorr_core::{
    BarometricResponse, CorrectionConfig, Masl, Meters, MetersOfWater, NanometersPerSecondSquared,
    Polarity, RegularTimeSeries, TIDE_UNIT_DIVISOR, TimeSeries, apply, baro_component, detrend,
    linear_fit, tide_component,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hour(i: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 9, 12)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + TimeDelta::hours(i)
}

fn hourly<U: brfcorr_core::Unit>(values: &[f64]) -> TimeSeries<U> {
    let ts = (0..values.len() as i64).map(hour).collect();
    TimeSeries::new(ts, values.to_vec()).expect("valid test series")
}

/// A zero-trend signal (already detrended) with a few superposed periods.
fn zero_trend_signal(n: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            0.08 * (t * 2.0 * std::f64::consts::PI / 12.4).sin()
                + 0.03 * (t * 2.0 * std::f64::consts::PI / 24.0).cos()
                + 0.01 * (t * 0.37).sin()
        })
        .collect();
    detrend(&raw)
}

/// `signal` plus a linear drift the pipeline is expected to remove.
fn with_drift(signal: &[f64], intercept: f64, slope: f64) -> Vec<f64> {
    signal
        .iter()
        .enumerate()
        .map(|(i, v)| v + intercept + slope * i as f64)
        .collect()
}

fn config() -> CorrectionConfig {
    CorrectionConfig::new(TimeDelta::hours(1)).unwrap()
}

// ---------------------------------------------------------------------------
// a) weighted_lags_match_hand_computed_values
// ---------------------------------------------------------------------------

/// With `A = [0.5, 0.3, 0.2]` and input `[1, 2, 3, 4, 5]`, output 0 sits on
/// input index 2: `0.5·3 + 0.3·2 + 0.2·1 = 2.3`, then `3.3`, `4.3`.
#[test]
fn weighted_lags_match_hand_computed_values() {
    let y = baro_component(&[1.0, 2.0, 3.0, 4.0, 5.0], &[0.5, 0.3, 0.2]).unwrap();
    assert_eq!(y.len(), 3);
    for (got, exp) in y.iter().zip([2.3, 3.3, 4.3]) {
        assert!((got - exp).abs() < 1e-12, "got {got}, expected {exp}");
    }
}

// ---------------------------------------------------------------------------
// b) zero_lag_impulse_returns_detrended_pressure
// ---------------------------------------------------------------------------

#[test]
fn zero_lag_impulse_returns_detrended_pressure() {
    let n = 96;
    let n_lag = 12;
    let signal = zero_trend_signal(n);
    let pressure = hourly::<MetersOfWater>(&with_drift(&signal, 10.3, -0.002));
    let tide = hourly::<NanometersPerSecondSquared>(&vec![0.0; n]);
    let water_levels = hourly::<Masl>(&vec![25.0; n]);

    let mut a = vec![0.0; n_lag + 1];
    a[0] = 1.0;
    let brf = BarometricResponse::new(a, vec![0.0; n_lag + 1]).unwrap();

    let result = config().correct(&water_levels, &pressure, &tide, &brf).unwrap();
    let baro = result.baro_component.values();
    assert_eq!(baro.len(), n - n_lag);
    for (j, got) in baro.iter().enumerate() {
        let exp = signal[j + n_lag];
        assert!((got - exp).abs() < 1e-9, "index {j}: got {got}, expected {exp}");
    }
}

// ---------------------------------------------------------------------------
// c) tide_divisor_cancels_coefficient
// ---------------------------------------------------------------------------

#[test]
fn tide_divisor_cancels_coefficient() {
    let v = -3.5;
    let mut b = vec![0.0; 7];
    b[0] = TIDE_UNIT_DIVISOR;
    let y = tide_component(&[v; 20], &b, TIDE_UNIT_DIVISOR).unwrap();
    assert_eq!(y.len(), 14);
    for got in y {
        assert!((got - v).abs() < 1e-12, "got {got}");
    }
}

#[test]
fn tide_component_through_pipeline_is_unit_converted() {
    let n = 80;
    let n_lag = 4;
    let signal: Vec<f64> = zero_trend_signal(n).iter().map(|v| v * 1000.0).collect();
    let tide = hourly::<NanometersPerSecondSquared>(&with_drift(&signal, 250.0, 0.5));
    let pressure = hourly::<MetersOfWater>(&vec![10.0; n]);
    let water_levels = hourly::<Masl>(&vec![25.0; n]);

    let mut b = vec![0.0; n_lag + 1];
    b[0] = TIDE_UNIT_DIVISOR;
    let brf = BarometricResponse::new(vec![0.0; n_lag + 1], b).unwrap();

    let result = config().correct(&water_levels, &pressure, &tide, &brf).unwrap();
    for (j, got) in result.tide_component.values().iter().enumerate() {
        let exp = signal[j + n_lag];
        assert!((got - exp).abs() < 1e-7, "index {j}: got {got}, expected {exp}");
    }
}

// ---------------------------------------------------------------------------
// d) zero_coefficients_give_zero_component
// ---------------------------------------------------------------------------

#[test]
fn zero_coefficients_give_zero_component() {
    let n = 60;
    let pressure = hourly::<MetersOfWater>(&with_drift(&zero_trend_signal(n), 9.8, 0.01));
    let tide = hourly::<NanometersPerSecondSquared>(&with_drift(&zero_trend_signal(n), 0.0, 3.0));
    let water_levels = hourly::<Masl>(&vec![25.0; n]);
    let brf = BarometricResponse::new(vec![0.0; 8], vec![0.4, 0.2, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0])
        .unwrap();

    let result = config().correct(&water_levels, &pressure, &tide, &brf).unwrap();
    assert!(result.baro_component.values().iter().all(|&v| v == 0.0));
    assert!(result.tide_component.values().iter().any(|&v| v != 0.0));
}

// ---------------------------------------------------------------------------
// e) length_invariant
// ---------------------------------------------------------------------------

#[test]
fn length_invariant_holds_for_all_lags() {
    let x = zero_trend_signal(50);
    for n_lag in 0..50 {
        let y = baro_component(&x, &vec![0.01; n_lag + 1]).unwrap();
        assert_eq!(y.len(), x.len() - n_lag, "n_lag = {n_lag}");
    }
}

// ---------------------------------------------------------------------------
// f) detrend_is_idempotent
// ---------------------------------------------------------------------------

#[test]
fn detrend_is_idempotent() {
    let raw = with_drift(&zero_trend_signal(500), 102.7, -0.0031);
    let once = detrend(&raw);
    let twice = detrend(&once);
    let fit = linear_fit(&once);
    assert!(fit.slope.abs() < 1e-12 && fit.intercept.abs() < 1e-10);
    for (a, b) in once.iter().zip(&twice) {
        assert!((a - b).abs() < 1e-10, "{a} vs {b}");
    }
}

// ---------------------------------------------------------------------------
// g) inner_join_drops_undefined_correction
// ---------------------------------------------------------------------------

/// Raw `[(t0, 10.0), (t1, 10.5), (t2, 11.0)]`, correction `[(t1, 0.2), (t2, -0.1)]`:
/// `t0` has no correction (lag warm-up) and is dropped.
#[test]
fn inner_join_drops_undefined_correction() {
    let water_levels = hourly::<Masl>(&[10.0, 10.5, 11.0]);
    let correction =
        RegularTimeSeries::<Meters>::new(hour(1), TimeDelta::hours(1), vec![0.2, -0.1]).unwrap();

    let out = apply(&water_levels, &correction, Polarity::Add);
    let rows = out.samples();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].timestamp, hour(1));
    assert_eq!(rows[1].timestamp, hour(2));
    assert!((rows[0].corrected - 10.7).abs() < 1e-12);
    assert!((rows[1].corrected - 10.9).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// h) polarity
// ---------------------------------------------------------------------------

/// The correction is added to the raw level, following the processing scripts
/// of the monitoring network. This sign has not been checked against an
/// independent calibration well; if that check disagrees, this is the test
/// to flip together with the `Polarity` default.
#[test]
fn default_polarity_adds_correction_unverified_against_calibration() {
    assert_eq!(config().polarity(), Polarity::Add);

    let n = 30;
    let pressure = hourly::<MetersOfWater>(&with_drift(&zero_trend_signal(n), 10.0, 0.0));
    let tide = hourly::<NanometersPerSecondSquared>(&vec![0.0; n]);
    let water_levels = hourly::<Masl>(&vec![40.0; n]);
    let brf = BarometricResponse::new(vec![-0.6, -0.2], vec![0.0, 0.0]).unwrap();

    let result = config().correct(&water_levels, &pressure, &tide, &brf).unwrap();
    for row in result.corrected.iter() {
        assert_eq!(row.corrected, row.raw + row.correction);
    }
}

// ---------------------------------------------------------------------------
// i) determinism
// ---------------------------------------------------------------------------

#[test]
fn repeated_runs_are_bit_identical() {
    let n = 200;
    let pressure = hourly::<MetersOfWater>(&with_drift(&zero_trend_signal(n), 10.1, 0.0004));
    let tide = hourly::<NanometersPerSecondSquared>(
        &zero_trend_signal(n).iter().map(|v| v * 900.0).collect::<Vec<_>>(),
    );
    let water_levels = hourly::<Masl>(&with_drift(&zero_trend_signal(n), 55.0, -0.001));
    let a: Vec<f64> = (0..24).map(|k| 0.5 * (-(k as f64) / 6.0).exp()).collect();
    let b: Vec<f64> = (0..24).map(|k| 0.001 * (k as f64 * 0.5).cos()).collect();
    let brf = BarometricResponse::new(a, b).unwrap();

    let first = config().correct(&water_levels, &pressure, &tide, &brf).unwrap();
    let second = config().correct(&water_levels, &pressure, &tide, &brf).unwrap();

    let bits = |r: &brfcorr_core::CorrectionResult| -> Vec<u64> {
        r.corrected.iter().map(|s| s.corrected.to_bits()).collect()
    };
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(first.corrected.len(), n - 23);
}
