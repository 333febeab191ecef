use core::fmt;
use serde::{Deserialize, Serialize};

/// High-level capability labels for routing, errors, and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Capability {
    /// Historical retrieval for a single tag.
    History,
    /// Point existence and metadata lookups.
    Points,
    /// Service and point enumeration.
    Directory,
    /// Current value of a point.
    Snapshot,
    /// Multi-tag retrieval and alignment.
    Merge,
}

impl Capability {
    /// Stable string label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Points => "points",
            Self::Directory => "directory",
            Self::Snapshot => "snapshot",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Capability> for &'static str {
    fn from(c: Capability) -> Self {
        c.as_str()
    }
}
