//! Single value/status/time records.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Opaque quality code attached to every observation.
///
/// Codes are passed through from the historian verbatim; the helpers only
/// provide the conventional spellings used by the bundled mock historian.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(String);

impl Status {
    /// Wrap an arbitrary status code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Conventional "good" status.
    #[must_use]
    pub fn good() -> Self {
        Self("OK".to_string())
    }

    /// Conventional "bad value" status.
    #[must_use]
    pub fn bad() -> Self {
        Self("BAD".to_string())
    }

    /// Conventional "stale" status.
    #[must_use]
    pub fn stale() -> Self {
        Self("STALE".to_string())
    }

    /// Status of a grid point that received no observation.
    #[must_use]
    pub fn missing() -> Self {
        Self("NO DATA".to_string())
    }

    /// Raw status code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A record as delivered by a historian binding: epoch seconds, value, status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// Seconds since the Unix epoch.
    pub ts: i64,
    /// Measured value, or `None` for an outage marker.
    pub value: Option<f64>,
    /// Quality code.
    pub status: Status,
}

impl RawObservation {
    /// Convenience constructor for a valued record.
    pub fn new(ts: i64, value: f64, status: impl Into<Status>) -> Self {
        Self {
            ts,
            value: Some(value),
            status: status.into(),
        }
    }

    /// Convenience constructor for an outage marker.
    pub fn outage(ts: i64, status: impl Into<Status>) -> Self {
        Self {
            ts,
            value: None,
            status: status.into(),
        }
    }
}

/// An immutable observation on a series' time axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Instant of the observation.
    pub ts: Timestamp,
    /// Measured value, or `None` for an outage marker.
    pub value: Option<f64>,
    /// Quality code passed through from the historian.
    pub status: Status,
}
