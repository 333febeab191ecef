use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the strata workspace.
///
/// Covers identifier and window validation, historian connection failures,
/// capability mismatches, timeouts, and an aggregate for multi-connector
/// attempts. A failed retrieval is always reported through one of these
/// variants and never as an empty result.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StrataError {
    /// The tag identifier is malformed or does not resolve on the historian.
    #[error("invalid tag: {tag}")]
    InvalidTag {
        /// The identifier as supplied by the caller.
        tag: String,
    },

    /// The requested window or period is unusable (`end <= start`, missing period, ...).
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The historian could not be reached or the connection dropped mid-call.
    #[error("connection to {connector} failed: {msg}")]
    Connection {
        /// Connector name that lost its connection.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An individual connector returned an error that is not connection related.
    #[error("{connector} failed: {msg}")]
    Connector {
        /// Connector name that failed.
        connector: String,
        /// Human-readable error message.
        msg: String,
    },

    /// An internal ordering or uniqueness invariant was violated while aligning series.
    #[error("alignment inconsistency: {0}")]
    AlignmentInconsistency(String),

    /// The requested capability is not implemented by any eligible connector.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// A capability string describing what was requested (e.g. "history/snap").
        capability: String,
    },

    /// Issues with returned data (non-finite values, malformed records, ...).
    #[error("data issue: {0}")]
    Data(String),

    /// A directory resource could not be found (e.g. an unknown service).
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource.
        what: String,
    },

    /// All selected connectors failed; contains the individual failures.
    #[error("all connectors failed: {0:?}")]
    AllConnectorsFailed(Vec<StrataError>),

    /// An individual connector call exceeded the configured timeout.
    #[error("connector timed out: {capability} via {connector}")]
    ProviderTimeout {
        /// Connector name that timed out.
        connector: String,
        /// Capability label (e.g. "history", "points").
        capability: String,
    },

    /// The overall request exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Capability label for which the request timed out.
        capability: String,
    },

    /// All attempted connectors timed out for the requested capability.
    #[error("all connectors timed out: {capability}")]
    AllConnectorsTimedOut {
        /// Capability label that timed out across all connectors.
        capability: String,
    },

    /// The operation was cancelled by the caller before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl StrataError {
    /// Helper: build an `InvalidTag` error from the offending identifier.
    pub fn invalid_tag(tag: impl Into<String>) -> Self {
        Self::InvalidTag { tag: tag.into() }
    }

    /// Helper: build a `Connection` error with the connector name and message.
    pub fn connection(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connection {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(cap: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: cap.into(),
        }
    }

    /// Helper: build a `Connector` error with the connector name and message.
    pub fn connector(connector: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `ProviderTimeout` error.
    pub fn provider_timeout(connector: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::ProviderTimeout {
            connector: connector.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Returns true if this error means the historian itself was unavailable.
    ///
    /// Timeouts count as connection failures. Aggregates qualify only when every
    /// contained error does.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection { .. }
            | Self::ProviderTimeout { .. }
            | Self::AllConnectorsTimedOut { .. } => true,
            Self::AllConnectorsFailed(inner) => {
                !inner.is_empty() && inner.iter().all(Self::is_connection)
            }
            _ => false,
        }
    }

    /// Returns true if this error should be surfaced to users as actionable.
    ///
    /// Non-actionable errors are those indicating capability absence or a benign
    /// not-found condition. Aggregates are classified based on their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::Unsupported { .. } | Self::NotFound { .. } => false,
            Self::AllConnectorsFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllConnectorsFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllConnectorsFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}

impl From<chrono::ParseError> for StrataError {
    fn from(e: chrono::ParseError) -> Self {
        Self::InvalidWindow(e.to_string())
    }
}
