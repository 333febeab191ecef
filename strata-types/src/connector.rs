//! Connector metadata types usable across crates.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Typed key for identifying connectors in routing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectorKey(pub &'static str);

impl ConnectorKey {
    /// Construct a new typed connector key from a static name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the inner static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl From<ConnectorKey> for &'static str {
    fn from(k: ConnectorKey) -> Self {
        k.0
    }
}

impl fmt::Display for ConnectorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// How many calls a historian binding tolerates at once.
///
/// Native historian libraries are frequently not safe for concurrent use;
/// such bindings declare `Exclusive` and the orchestrator then drives them
/// with a single in-flight call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessMode {
    /// One call at a time.
    Exclusive,
    /// Up to `max` calls at once.
    Concurrent {
        /// Maximum simultaneous calls (values below 1 are treated as 1).
        max: usize,
    },
}

impl AccessMode {
    /// Maximum simultaneous calls permitted.
    #[must_use]
    pub const fn max_in_flight(self) -> usize {
        match self {
            Self::Exclusive => 1,
            Self::Concurrent { max } => {
                if max == 0 {
                    1
                } else {
                    max
                }
            }
        }
    }
}
