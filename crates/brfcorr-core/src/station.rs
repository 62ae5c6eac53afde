//! Monitoring station identity and metadata.

use serde::Serialize;

/// A monitoring-well identifier, e.g. `03040018`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parse an identifier, trimming surrounding whitespace.
    ///
    /// Returns `None` if nothing remains after trimming.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let id = raw.trim();
        (!id.is_empty()).then(|| Self(id.to_string()))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable station metadata supplied by the caller.
///
/// Carried alongside the station's data so outputs can be labelled; the
/// correction itself never reads or modifies it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    /// Station identifier.
    pub id: StationId,
    /// Human-readable well name.
    pub name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Ground elevation in meters above sea level, when surveyed.
    pub elevation: Option<f64>,
}
