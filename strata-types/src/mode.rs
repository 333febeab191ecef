use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StrataError;

/// Retrieval semantics for a historical pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullMode {
    /// Time-weighted average over each period.
    Average,
    /// Linear interpolation at each period boundary.
    Interpolate,
    /// Minimum over each period.
    Minimum,
    /// Maximum over each period.
    Maximum,
    /// Exactly the stored records.
    Raw,
    /// Last known value at each period boundary.
    Snap,
}

impl PullMode {
    /// Every mode, in a stable order.
    pub const ALL: &'static [Self] = &[
        Self::Average,
        Self::Interpolate,
        Self::Minimum,
        Self::Maximum,
        Self::Raw,
        Self::Snap,
    ];

    /// Whether a sampling period must accompany this mode.
    #[must_use]
    pub const fn requires_period(self) -> bool {
        !matches!(self, Self::Raw)
    }

    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Average => "avg",
            Self::Interpolate => "interp",
            Self::Minimum => "min",
            Self::Maximum => "max",
            Self::Raw => "raw",
            Self::Snap => "snap",
        }
    }
}

impl fmt::Display for PullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullMode {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "avg" | "average" => Ok(Self::Average),
            "interp" | "interpolate" => Ok(Self::Interpolate),
            "min" | "minimum" => Ok(Self::Minimum),
            "max" | "maximum" => Ok(Self::Maximum),
            "raw" => Ok(Self::Raw),
            "snap" => Ok(Self::Snap),
            other => Err(StrataError::InvalidArg(format!("unknown pull mode '{other}'"))),
        }
    }
}
