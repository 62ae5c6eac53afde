//! Time series types with validation guarantees.

use std::marker::PhantomData;
use std::ops::Range;

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::SeriesError;
use crate::unit::Unit;

/// Owned series of `(timestamp, value)` samples tagged with a physical unit.
///
/// Guaranteed non-empty with strictly increasing timestamps. Values may be
/// NaN, which marks a missing reading.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<U: Unit> {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
    unit: PhantomData<U>,
}

impl<U: Unit> TimeSeries<U> {
    /// Create a new series from parallel timestamp and value vectors.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SeriesError::EmptySeries`] | `timestamps` is empty |
    /// | [`SeriesError::LengthMismatch`] | Vectors differ in length |
    /// | [`SeriesError::NotIncreasing`] | A timestamp is not after its predecessor |
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if timestamps.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                n_timestamps: timestamps.len(),
                n_values: values.len(),
            });
        }
        if timestamps.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        if let Some(index) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SeriesError::NotIncreasing {
                index: index + 1,
                timestamp: timestamps[index + 1],
            });
        }
        Ok(Self {
            timestamps,
            values,
            unit: PhantomData,
        })
    }

    /// Create a series from unordered samples.
    ///
    /// Samples are sorted by timestamp with a stable sort; when a timestamp
    /// repeats, the sample seen first is kept and the others are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::EmptySeries`] if `samples` is empty.
    pub fn from_samples(mut samples: Vec<(NaiveDateTime, f64)>) -> Result<Self, SeriesError> {
        if samples.is_empty() {
            return Err(SeriesError::EmptySeries);
        }
        samples.sort_by_key(|&(t, _)| t);
        samples.dedup_by_key(|&mut (t, _)| t);
        let (timestamps, values) = samples.into_iter().unzip();
        Ok(Self {
            timestamps,
            values,
            unit: PhantomData,
        })
    }

    /// Return a copy with every timestamp moved by `offset`.
    ///
    /// Used to bring a source referenced to another time epoch (e.g. UTC)
    /// onto the local time of the station data.
    #[must_use = "returns a new shifted series; the original is unchanged"]
    pub fn shift(&self, offset: TimeDelta) -> Self {
        Self {
            timestamps: self.timestamps.iter().map(|&t| t + offset).collect(),
            values: self.values.clone(),
            unit: PhantomData,
        }
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Return true if the series has no samples.
    ///
    /// Always `false` for a series built through the validating constructors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Return the timestamps.
    #[must_use]
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    /// Return the values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate over `(timestamp, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }

    /// Return the earliest timestamp.
    #[must_use]
    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.timestamps[0]
    }

    /// Return the latest timestamp.
    #[must_use]
    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.timestamps[self.timestamps.len() - 1]
    }

    /// Return the unit label of this series.
    #[must_use]
    pub fn unit_label(&self) -> &'static str {
        U::LABEL
    }
}

/// A series on a regular grid: `timestamp(i) = start + i * step`.
///
/// The grid has no gaps in time. Values may still be NaN where the
/// underlying quantity is undefined (extrapolation, lag warm-up).
#[derive(Debug, Clone, PartialEq)]
pub struct RegularTimeSeries<U: Unit> {
    start: NaiveDateTime,
    step: TimeDelta,
    values: Vec<f64>,
    unit: PhantomData<U>,
}

impl<U: Unit> RegularTimeSeries<U> {
    /// Create a regular series starting at `start` with spacing `step`.
    ///
    /// An empty `values` vector is allowed and denotes an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::NonPositiveStep`] if `step` is shorter than one millisecond.
    pub fn new(
        start: NaiveDateTime,
        step: TimeDelta,
        values: Vec<f64>,
    ) -> Result<Self, SeriesError> {
        if step.num_milliseconds() <= 0 {
            return Err(SeriesError::NonPositiveStep { step });
        }
        Ok(Self {
            start,
            step,
            values,
            unit: PhantomData,
        })
    }

    /// Return the timestamp of the first grid slot.
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Return the grid spacing.
    #[must_use]
    pub fn step(&self) -> TimeDelta {
        self.step
    }

    /// Return the timestamp of grid slot `index`.
    ///
    /// Defined for any index, including slots past the end of the grid.
    #[must_use]
    pub fn timestamp(&self, index: usize) -> NaiveDateTime {
        self.start + grid_offset(self.step, index)
    }

    /// Return the timestamp of the last slot, or `None` for an empty grid.
    #[must_use]
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.values.len().checked_sub(1).map(|i| self.timestamp(i))
    }

    /// Return the grid index of `t` if it falls exactly on a slot of this grid.
    #[must_use]
    pub fn index_of(&self, t: NaiveDateTime) -> Option<usize> {
        let elapsed = (t - self.start).num_milliseconds();
        let step = self.step.num_milliseconds();
        if elapsed < 0 || elapsed % step != 0 {
            return None;
        }
        let index = usize::try_from(elapsed / step).ok()?;
        (index < self.values.len() && self.timestamp(index) == t).then_some(index)
    }

    /// Return the values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the number of grid slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if the grid has no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the grid timestamps.
    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        (0..self.values.len()).map(|i| self.timestamp(i))
    }

    /// Iterate over `(timestamp, value)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| (self.timestamp(i), v))
    }

    /// Return the index of the first NaN value, if any.
    #[must_use]
    pub fn nan_position(&self) -> Option<usize> {
        self.values.iter().position(|v| v.is_nan())
    }

    /// Return the sub-grid covering `range`, re-anchored at its first slot.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            start: self.timestamp(range.start),
            step: self.step,
            values: self.values[range].to_vec(),
            unit: PhantomData,
        }
    }
}

/// Offset of grid slot `index` from the grid start.
///
/// Computed in milliseconds so that very long grids do not overflow the
/// `i32` multiplier accepted by `TimeDelta`.
fn grid_offset(step: TimeDelta, index: usize) -> TimeDelta {
    TimeDelta::milliseconds(step.num_milliseconds().saturating_mul(index as i64))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::unit::{Masl, MetersOfWater};

    fn hour(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 3, 1)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn rejects_empty() {
        let result = TimeSeries::<Masl>::new(vec![], vec![]);
        assert!(matches!(result, Err(SeriesError::EmptySeries)));
    }

    #[test]
    fn rejects_length_mismatch() {
        let result = TimeSeries::<Masl>::new(vec![hour(0), hour(1)], vec![1.0]);
        assert!(matches!(
            result,
            Err(SeriesError::LengthMismatch { n_timestamps: 2, n_values: 1 })
        ));
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let result = TimeSeries::<Masl>::new(vec![hour(0), hour(1), hour(1)], vec![1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(SeriesError::NotIncreasing { index: 2, .. })));
    }

    #[test]
    fn rejects_decreasing_timestamp() {
        let result = TimeSeries::<Masl>::new(vec![hour(3), hour(1)], vec![1.0, 2.0]);
        assert!(matches!(result, Err(SeriesError::NotIncreasing { index: 1, .. })));
    }

    #[test]
    fn accepts_nan_readings() {
        let ts = TimeSeries::<Masl>::new(vec![hour(0), hour(1)], vec![f64::NAN, 2.0]).unwrap();
        assert_eq!(ts.len(), 2);
        assert!(ts.values()[0].is_nan());
    }

    #[test]
    fn from_samples_sorts_and_keeps_first_duplicate() {
        let ts = TimeSeries::<MetersOfWater>::from_samples(vec![
            (hour(2), 20.0),
            (hour(0), 0.0),
            (hour(2), 99.0),
            (hour(1), 10.0),
            (hour(0), -1.0),
        ])
        .unwrap();
        assert_eq!(ts.timestamps(), &[hour(0), hour(1), hour(2)]);
        assert_eq!(ts.values(), &[0.0, 10.0, 20.0]);
    }

    #[test]
    fn from_samples_rejects_empty() {
        let result = TimeSeries::<Masl>::from_samples(vec![]);
        assert!(matches!(result, Err(SeriesError::EmptySeries)));
    }

    #[test]
    fn shift_moves_every_timestamp() {
        let ts = TimeSeries::<Masl>::new(vec![hour(5), hour(6)], vec![1.0, 2.0]).unwrap();
        let shifted = ts.shift(TimeDelta::hours(-5));
        assert_eq!(shifted.timestamps(), &[hour(0), hour(1)]);
        assert_eq!(shifted.values(), ts.values());
    }

    #[test]
    fn first_and_last_timestamp() {
        let ts = TimeSeries::<Masl>::new(vec![hour(1), hour(4), hour(9)], vec![0.0; 3]).unwrap();
        assert_eq!(ts.first_timestamp(), hour(1));
        assert_eq!(ts.last_timestamp(), hour(9));
        assert_eq!(ts.unit_label(), "masl");
    }

    #[test]
    fn regular_rejects_zero_step() {
        let result = RegularTimeSeries::<Masl>::new(hour(0), TimeDelta::zero(), vec![1.0]);
        assert!(matches!(result, Err(SeriesError::NonPositiveStep { .. })));
    }

    #[test]
    fn regular_timestamps_follow_grid() {
        let grid =
            RegularTimeSeries::<Masl>::new(hour(0), TimeDelta::hours(2), vec![1.0, 2.0, 3.0])
                .unwrap();
        let ts: Vec<_> = grid.timestamps().collect();
        assert_eq!(ts, vec![hour(0), hour(2), hour(4)]);
        assert_eq!(grid.end(), Some(hour(4)));
    }

    #[test]
    fn index_of_only_matches_grid_slots() {
        let grid =
            RegularTimeSeries::<Masl>::new(hour(0), TimeDelta::hours(2), vec![1.0, 2.0, 3.0])
                .unwrap();
        assert_eq!(grid.index_of(hour(0)), Some(0));
        assert_eq!(grid.index_of(hour(4)), Some(2));
        assert_eq!(grid.index_of(hour(3)), None);
        assert_eq!(grid.index_of(hour(6)), None);
        assert_eq!(grid.index_of(hour(0) - TimeDelta::hours(2)), None);
    }

    #[test]
    fn slice_reanchors_start() {
        let grid =
            RegularTimeSeries::<Masl>::new(hour(0), TimeDelta::hours(1), vec![1.0, 2.0, 3.0, 4.0])
                .unwrap();
        let sub = grid.slice(1..3);
        assert_eq!(sub.start(), hour(1));
        assert_eq!(sub.values(), &[2.0, 3.0]);
    }

    #[test]
    fn empty_grid_has_no_end() {
        let grid = RegularTimeSeries::<Masl>::new(hour(0), TimeDelta::hours(1), vec![]).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.end(), None);
    }

    #[test]
    fn nan_position_finds_first_gap() {
        let grid = RegularTimeSeries::<Masl>::new(
            hour(0),
            TimeDelta::hours(1),
            vec![1.0, f64::NAN, 3.0, f64::NAN],
        )
        .unwrap();
        assert_eq!(grid.nan_position(), Some(1));
    }
}
