//! Directory and real-time records exposed by historian services.

use serde::{Deserialize, Serialize};

use crate::observation::Status;
use crate::tag::TagId;

/// A historian service visible to the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// `Site.Service` name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Service type label (e.g. "HISTORY", "CALC").
    pub kind: String,
}

/// A point registered on a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointInfo {
    /// Full point identifier.
    pub tag: TagId,
    /// Point description.
    pub description: Option<String>,
    /// Engineering units.
    pub units: Option<String>,
}

/// The most recent value held by the historian for a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Point identifier.
    pub tag: TagId,
    /// Epoch seconds of the value.
    pub ts: i64,
    /// Current value.
    pub value: Option<f64>,
    /// Quality code.
    pub status: Status,
    /// Engineering units, when reported alongside the value.
    pub units: Option<String>,
}
