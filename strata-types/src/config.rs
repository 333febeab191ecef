//! Configuration shared by the orchestrator and its routers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing_policy::RoutingPolicy;

/// Global configuration for the `Strata` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Connector ordering rules per `Site.Service`.
    pub routing_policy: RoutingPolicy,
    /// Timeout for each individual connector call.
    pub provider_timeout: Duration,
    /// Optional deadline for fan-out operations such as multi-tag merges.
    pub request_timeout: Option<Duration>,
    /// Upper bound on concurrent per-tag fetches during a merge.
    ///
    /// The effective bound is further limited by each connector's
    /// declared access mode.
    pub fetch_concurrency: usize,
    /// Confirm each tag resolves before retrieving history.
    pub validate_points: bool,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            routing_policy: RoutingPolicy::default(),
            provider_timeout: Duration::from_secs(5),
            request_timeout: None,
            fetch_concurrency: 4,
            validate_points: true,
        }
    }
}
