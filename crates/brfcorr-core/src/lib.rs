//! Barometric and Earth-tide correction of groundwater levels.
//!
//! Pure math library, zero I/O. Aligns barometric pressure and Earth-tide
//! series onto a regular grid, convolves the detrended signals with a fitted
//! barometric response function (BRF), and applies the predicted displacement
//! to the raw water levels. A rayon batch driver corrects independent
//! stations in parallel.

mod align;
mod assemble;
mod batch;
mod brf;
mod config;
mod convolve;
mod detrend;
mod error;
mod pipeline;
mod result;
mod series;
mod station;
mod unit;

pub use align::{inner_join, lagged_coverage, resample};
pub use assemble::{CorrectedSample, CorrectedSeries, Polarity, apply, combine};
pub use batch::{BatchConfig, BatchReport, SkipReason, StationInputs, StationOutcome, StationReport};
pub use brf::{BarometricResponse, TIDE_UNIT_DIVISOR};
pub use config::{CorrectionConfig, LOCAL_TIME_OFFSET_HOURS};
pub use convolve::{baro_component, checked_detrend, convolve, tide_component};
pub use detrend::{LinearFit, detrend, linear_fit};
pub use error::{CorrectionError, SeriesError};
pub use result::CorrectionResult;
pub use series::{RegularTimeSeries, TimeSeries};
pub use station::{StationId, StationRecord};
pub use unit::{Masl, Meters, MetersOfWater, NanometersPerSecondSquared, Unit};
