//! Batch correction across independent monitoring stations.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{info, instrument, warn};

use crate::brf::BarometricResponse;
use crate::config::CorrectionConfig;
use crate::error::CorrectionError;
use crate::result::CorrectionResult;
use crate::series::TimeSeries;
use crate::station::{StationId, StationRecord};
use crate::unit::{Masl, MetersOfWater, NanometersPerSecondSquared};

/// Everything needed to correct one station.
#[derive(Debug, Clone)]
pub struct StationInputs {
    /// Station metadata.
    pub record: StationRecord,
    /// Raw water levels (masl).
    pub water_levels: TimeSeries<Masl>,
    /// Barometric pressure at the station (m of water).
    pub pressure: TimeSeries<MetersOfWater>,
    /// Synthetic Earth-tide signal at the station (nm/s**2).
    pub tide: TimeSeries<NanometersPerSecondSquared>,
    /// Fitted response function, `None` when no fit exists for this well.
    pub brf: Option<BarometricResponse>,
}

/// Why a station was not corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The station is on the exclusion list (e.g. pumping-influenced well).
    Excluded,
    /// No response function has been fitted for the station.
    NoResponseFunction,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excluded => f.write_str("excluded"),
            Self::NoResponseFunction => f.write_str("no response function"),
        }
    }
}

/// Outcome of one station in a batch.
#[derive(Debug)]
pub enum StationOutcome {
    /// The station was corrected.
    Corrected(CorrectionResult),
    /// The station was not attempted.
    Skipped(SkipReason),
    /// The correction was attempted and failed.
    Failed(CorrectionError),
}

/// A station paired with its outcome.
#[derive(Debug)]
pub struct StationReport {
    /// Station metadata, copied from the inputs.
    pub record: StationRecord,
    /// What happened to this station.
    pub outcome: StationOutcome,
}

/// Per-station outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One report per input station.
    pub stations: Vec<StationReport>,
}

impl BatchReport {
    /// Return the number of corrected stations.
    #[must_use]
    pub fn n_corrected(&self) -> usize {
        self.count(|o| matches!(o, StationOutcome::Corrected(_)))
    }

    /// Return the number of skipped stations.
    #[must_use]
    pub fn n_skipped(&self) -> usize {
        self.count(|o| matches!(o, StationOutcome::Skipped(_)))
    }

    /// Return the number of failed stations.
    #[must_use]
    pub fn n_failed(&self) -> usize {
        self.count(|o| matches!(o, StationOutcome::Failed(_)))
    }

    /// Iterate over the corrected stations and their results.
    pub fn corrected(&self) -> impl Iterator<Item = (&StationRecord, &CorrectionResult)> {
        self.stations.iter().filter_map(|s| match &s.outcome {
            StationOutcome::Corrected(result) => Some((&s.record, result)),
            _ => None,
        })
    }

    fn count(&self, pred: impl Fn(&StationOutcome) -> bool) -> usize {
        self.stations.iter().filter(|s| pred(&s.outcome)).count()
    }
}

/// Configuration for correcting many stations.
///
/// Construct via [`BatchConfig::new`], then chain `with_*` methods to override defaults.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    correction: CorrectionConfig,
    excluded: BTreeSet<StationId>,
}

impl BatchConfig {
    /// Create a batch configuration applying `correction` to every station.
    #[must_use]
    pub fn new(correction: CorrectionConfig) -> Self {
        Self {
            correction,
            excluded: BTreeSet::new(),
        }
    }

    /// Exclude stations from correction, e.g. wells influenced by pumping.
    #[must_use]
    pub fn with_excluded(mut self, ids: impl IntoIterator<Item = StationId>) -> Self {
        self.excluded.extend(ids);
        self
    }

    /// Return the per-station correction configuration.
    #[must_use]
    pub fn correction(&self) -> &CorrectionConfig {
        &self.correction
    }

    /// Return true if `id` is on the exclusion list.
    #[must_use]
    pub fn is_excluded(&self, id: &StationId) -> bool {
        self.excluded.contains(id)
    }

    /// Correct every station in parallel.
    ///
    /// Stations share nothing, so each one runs as an independent rayon task.
    /// A failing station is recorded in the report and never aborts the others.
    #[instrument(skip_all, fields(n_stations = inputs.len(), n_excluded = self.excluded.len()))]
    pub fn run(&self, inputs: &[StationInputs]) -> BatchReport {
        let stations: Vec<StationReport> = inputs
            .par_iter()
            .map(|station| StationReport {
                record: station.record.clone(),
                outcome: self.run_one(station),
            })
            .collect();

        let report = BatchReport { stations };
        info!(
            n_corrected = report.n_corrected(),
            n_skipped = report.n_skipped(),
            n_failed = report.n_failed(),
            "batch complete"
        );
        report
    }

    fn run_one(&self, station: &StationInputs) -> StationOutcome {
        let id = &station.record.id;
        if self.is_excluded(id) {
            return StationOutcome::Skipped(SkipReason::Excluded);
        }
        let Some(brf) = &station.brf else {
            return StationOutcome::Skipped(SkipReason::NoResponseFunction);
        };
        match self
            .correction
            .correct(&station.water_levels, &station.pressure, &station.tide, brf)
        {
            Ok(result) => StationOutcome::Corrected(result),
            Err(e) => {
                warn!(station = %id, error = %e, "station correction failed");
                StationOutcome::Failed(e)
            }
        }
    }
}
