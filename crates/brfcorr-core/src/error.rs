//! Error types for series construction and the correction pipeline.

use chrono::{NaiveDateTime, TimeDelta};

/// Errors from time series construction and resampling.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// Returned when a series is built from zero samples.
    #[error("time series must be non-empty")]
    EmptySeries,

    /// Returned when the timestamp and value vectors differ in length.
    #[error("{n_timestamps} timestamps but {n_values} values")]
    LengthMismatch {
        /// Number of timestamps supplied.
        n_timestamps: usize,
        /// Number of values supplied.
        n_values: usize,
    },

    /// Returned when a timestamp is not strictly greater than its predecessor.
    #[error("timestamp {timestamp} at index {index} is not strictly increasing")]
    NotIncreasing {
        /// Position of the offending timestamp.
        index: usize,
        /// The offending timestamp.
        timestamp: NaiveDateTime,
    },

    /// Returned when resampling a series with fewer than two usable samples.
    #[error("need at least 2 distinct timestamps with a reading, got {n}")]
    TooFewSamples {
        /// Number of usable samples found.
        n: usize,
    },

    /// Returned when a regular grid is given a zero or negative step.
    #[error("grid step must be positive, got {step}")]
    NonPositiveStep {
        /// The rejected step.
        step: TimeDelta,
    },
}

/// Errors from the alignment, convolution and assembly stages.
///
/// Every variant is raised at the point of detection. None of them is
/// retryable: the pipeline is deterministic over its inputs.
#[derive(Debug, thiserror::Error)]
pub enum CorrectionError {
    /// Returned when fewer aligned samples exist than the BRF needs.
    #[error("insufficient data: need at least {required} aligned samples, got {available}")]
    InsufficientData {
        /// Samples required (`max_lag + 1`).
        required: usize,
        /// Samples available after intersecting all inputs.
        available: usize,
    },

    /// Returned when a regular series still holds a NaN going into the convolution.
    #[error("data gap: {label} series is undefined at grid index {index}")]
    DataGap {
        /// Which forcing series contained the gap.
        label: &'static str,
        /// Grid index of the first undefined sample.
        index: usize,
    },

    /// Returned when the barometric and tidal components differ in length.
    ///
    /// Indicates an upstream alignment bug rather than bad input data.
    #[error("component length mismatch: barometric {baro}, tidal {tide}")]
    ShapeMismatch {
        /// Length of the barometric component.
        baro: usize,
        /// Length of the tidal component.
        tide: usize,
    },

    /// Returned when the `A` and `B` coefficient vectors differ in length or are empty.
    #[error("malformed BRF coefficients: A has {a_len} entries, B has {b_len}")]
    MalformedCoefficients {
        /// Number of barometric coefficients.
        a_len: usize,
        /// Number of Earth-tide coefficients.
        b_len: usize,
    },

    /// Returned when two regular grids with different steps are joined.
    #[error("cannot join grids with steps {left} and {right}")]
    StepMismatch {
        /// Step of the left grid.
        left: TimeDelta,
        /// Step of the right grid.
        right: TimeDelta,
    },

    /// Returned when the configured sampling interval is zero or negative.
    #[error("sampling interval must be positive, got {interval}")]
    InvalidSamplingInterval {
        /// The rejected interval.
        interval: TimeDelta,
    },

    /// Returned when the tide unit divisor is zero or not finite.
    #[error("tide unit divisor must be finite and non-zero, got {divisor}")]
    InvalidDivisor {
        /// The rejected divisor.
        divisor: f64,
    },

    /// Wraps a series error raised while aligning the inputs.
    #[error("series error during alignment: {0}")]
    Series(#[from] SeriesError),
}
