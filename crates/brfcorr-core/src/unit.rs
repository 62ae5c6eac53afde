//! Physical unit tags carried by the series types.
//!
//! Each quantity entering or leaving the pipeline gets its own zero-sized
//! marker, so a tide signal cannot be handed to a function expecting
//! barometric pressure and a correction in meters cannot be mistaken for an
//! absolute elevation.

use std::fmt::Debug;

/// A physical unit attached to a series at the type level.
pub trait Unit: Debug + Clone + Copy + PartialEq + Send + Sync + 'static {
    /// Short label used in column headers.
    const LABEL: &'static str;

    /// Name of the measured quantity, used in errors and log output.
    const QUANTITY: &'static str;
}

/// Water-level elevation in meters above sea level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Masl;

impl Unit for Masl {
    const LABEL: &'static str = "masl";
    const QUANTITY: &'static str = "water level";
}

/// Barometric pressure expressed as meters of water.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetersOfWater;

impl Unit for MetersOfWater {
    const LABEL: &'static str = "m";
    const QUANTITY: &'static str = "barometric pressure";
}

/// Earth-tide gravity signal in nanometers per second squared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NanometersPerSecondSquared;

impl Unit for NanometersPerSecondSquared {
    const LABEL: &'static str = "nm/s**2";
    const QUANTITY: &'static str = "earth tide";
}

/// Signed water-level displacement in meters (the correction `dWL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meters;

impl Unit for Meters {
    const LABEL: &'static str = "m";
    const QUANTITY: &'static str = "displacement";
}
