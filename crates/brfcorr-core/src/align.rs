//! Alignment of irregular series onto a common regular grid.
//!
//! Pressure and Earth-tide sources are resampled independently and then
//! inner-joined. Every grid puts its slots on whole multiples of the step
//! counted from the Unix epoch, so two sources resampled with the same step
//! always share slots wherever their spans overlap.

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, instrument};

use crate::error::{CorrectionError, SeriesError};
use crate::series::{RegularTimeSeries, TimeSeries};
use crate::unit::{Masl, Unit};

/// Resample a series onto a regular grid spaced by `step`.
///
/// Missing readings (NaN) are discarded first. Slots sit on whole multiples
/// of `step` (00:00, 01:00, ... for an hourly step); the grid runs from the
/// first slot at or after the first remaining reading to the last slot at or
/// before the last one. Slots that coincide with a reading copy it, the
/// others are linearly interpolated in time between the bracketing readings.
/// When no slot falls inside the span of the readings the grid is empty.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`SeriesError::NonPositiveStep`] | `step` is shorter than one millisecond |
/// | [`SeriesError::TooFewSamples`] | Fewer than 2 readings remain after dropping NaN |
#[instrument(skip(series), fields(quantity = U::QUANTITY, n = series.len()))]
pub fn resample<U: Unit>(
    series: &TimeSeries<U>,
    step: TimeDelta,
) -> Result<RegularTimeSeries<U>, SeriesError> {
    let step_ms = step.num_milliseconds();
    if step_ms <= 0 {
        return Err(SeriesError::NonPositiveStep { step });
    }

    let known: Vec<(NaiveDateTime, f64)> = series.iter().filter(|(_, v)| !v.is_nan()).collect();
    if known.len() < 2 {
        return Err(SeriesError::TooFewSamples { n: known.len() });
    }

    let first = known[0].0;
    let last = known[known.len() - 1].0;
    let lead_ms = (step_ms - first.and_utc().timestamp_millis().rem_euclid(step_ms)) % step_ms;
    let start = first + TimeDelta::milliseconds(lead_ms);
    let n_slots = if start > last {
        0
    } else {
        ((last - start).num_milliseconds() / step_ms) as usize + 1
    };

    let mut values = Vec::with_capacity(n_slots);
    let mut cursor = 0;
    for i in 0..n_slots {
        let t = start + TimeDelta::milliseconds(step_ms * i as i64);
        while cursor + 1 < known.len() && known[cursor + 1].0 <= t {
            cursor += 1;
        }
        let (t0, v0) = known[cursor];
        if t0 == t {
            values.push(v0);
            continue;
        }
        let value = match known.get(cursor + 1) {
            Some(&(t1, v1)) => {
                let frac = (t - t0).num_milliseconds() as f64 / (t1 - t0).num_milliseconds() as f64;
                v0 + frac * (v1 - v0)
            }
            None => f64::NAN,
        };
        values.push(value);
    }

    debug!(n_readings = known.len(), n_slots, %start, "resampled onto regular grid");
    RegularTimeSeries::new(start, step, values)
}

/// Inner-join two regular series on their grid timestamps.
///
/// Both outputs start at the first shared slot and have the same length.
/// When the grids do not share any slot (disjoint spans, or grids built
/// outside [`resample`] with a different phase) the outputs are empty.
///
/// # Errors
///
/// Returns [`CorrectionError::StepMismatch`] if the grids have different steps.
pub fn inner_join<A: Unit, B: Unit>(
    a: &RegularTimeSeries<A>,
    b: &RegularTimeSeries<B>,
) -> Result<(RegularTimeSeries<A>, RegularTimeSeries<B>), CorrectionError> {
    if a.step() != b.step() {
        return Err(CorrectionError::StepMismatch {
            left: a.step(),
            right: b.step(),
        });
    }

    let start = a.start().max(b.start());
    let (ia, ib) = match (a.index_of(start), b.index_of(start)) {
        (Some(ia), Some(ib)) => (ia, ib),
        _ => return Ok((a.slice(a.len()..a.len()), b.slice(b.len()..b.len()))),
    };
    let n = (a.len() - ia).min(b.len() - ib);

    debug!(n_shared = n, "joined regular grids");
    Ok((a.slice(ia..ia + n), b.slice(ib..ib + n)))
}

/// Count the grid slots that can feed a correction of `water_levels`.
///
/// A slot counts when it lies in `[first − max_lag·step, last]` of the water
/// level record: either it lands on a water-level reading or it is one of the
/// lags feeding such a reading.
#[must_use]
pub fn lagged_coverage<U: Unit>(
    grid: &RegularTimeSeries<U>,
    water_levels: &TimeSeries<Masl>,
    max_lag: usize,
) -> usize {
    let lead = TimeDelta::milliseconds(grid.step().num_milliseconds() * max_lag as i64);
    let lo = water_levels.first_timestamp() - lead;
    let hi = water_levels.last_timestamp();
    grid.timestamps().filter(|t| *t >= lo && *t <= hi).count()
}
