use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use strata_core::connector::{
    DirectoryProvider, HistorianConnector, HistoryProvider, PointProvider, SnapshotProvider,
};
use strata_core::{
    AccessMode, Middleware, PointInfo, PullMode, RawObservation, RetrievalQuery, ServiceInfo,
    Snapshot, StrataError, TagId,
};

#[derive(Debug, Default)]
struct HealthState {
    consecutive_failures: u32,
    last_error: Option<StrataError>,
    last_success: Option<Instant>,
    tripped_until: Option<Instant>,
}

/// Shared view of a connection's recent health.
///
/// Cloning yields another handle to the same state, so callers can keep one
/// handle while a [`HealthTrackingConnector`] records into another. Only
/// connection-classified errors count as failures; a tag that is not found is
/// a healthy answer.
#[derive(Debug, Clone, Default)]
pub struct ConnectionHealth {
    state: Arc<Mutex<HealthState>>,
}

impl ConnectionHealth {
    /// Fresh handle with no recorded history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HealthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` unless the most recent call failed with a connection error or
    /// the breaker is currently open.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        let g = self.lock();
        g.consecutive_failures == 0 && g.tripped_until.is_none_or(|t| Instant::now() >= t)
    }

    /// Connection failures since the last success.
    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Most recent connection error, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<StrataError> {
        self.lock().last_error.clone()
    }

    /// Instant of the most recent successful call.
    #[must_use]
    pub fn last_success(&self) -> Option<Instant> {
        self.lock().last_success
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut g = self.lock();
        g.consecutive_failures = 0;
        g.last_error = None;
        g.last_success = Some(Instant::now());
        g.tripped_until = None;
    }

    /// Record a failed call; non-connection errors are ignored.
    ///
    /// Returns `true` when this failure opened the breaker.
    pub fn record_failure(&self, err: &StrataError, trip_after: u32, cooldown: Duration) -> bool {
        if !err.is_connection() {
            return false;
        }
        let mut g = self.lock();
        g.consecutive_failures = g.consecutive_failures.saturating_add(1);
        g.last_error = Some(err.clone());
        if trip_after > 0 && g.consecutive_failures >= trip_after && g.tripped_until.is_none() {
            g.tripped_until = Some(Instant::now() + cooldown);
            return true;
        }
        false
    }

    /// Whether calls should be short-circuited right now.
    ///
    /// An expired breaker is half-opened: the next call goes through and its
    /// outcome decides whether the breaker re-trips.
    fn is_tripped(&self) -> bool {
        let mut g = self.lock();
        match g.tripped_until {
            Some(until) if Instant::now() < until => true,
            Some(_) => {
                g.tripped_until = None;
                g.consecutive_failures = 0;
                false
            }
            None => false,
        }
    }
}

/// Connector wrapper that records every call's outcome into a [`ConnectionHealth`].
///
/// After `trip_after` consecutive connection failures the wrapper stops
/// calling the inner connector for `cooldown` and answers with a connection
/// error instead. `trip_after == 0` records without ever tripping.
pub struct HealthTrackingConnector {
    inner: Arc<dyn HistorianConnector>,
    health: ConnectionHealth,
    trip_after: u32,
    cooldown: Duration,
}

impl HealthTrackingConnector {
    /// Wrap `inner`, recording into `health`.
    pub fn new(
        inner: Arc<dyn HistorianConnector>,
        health: ConnectionHealth,
        trip_after: u32,
        cooldown: Duration,
    ) -> Self {
        Self {
            inner,
            health,
            trip_after,
            cooldown,
        }
    }

    /// The health handle this wrapper records into.
    #[must_use]
    pub fn health(&self) -> &ConnectionHealth {
        &self.health
    }

    fn guard(&self) -> Result<(), StrataError> {
        if self.health.is_tripped() {
            return Err(StrataError::connection(
                self.inner.name(),
                "connection marked unhealthy; waiting for cooldown",
            ));
        }
        Ok(())
    }

    fn observe<T>(&self, res: Result<T, StrataError>) -> Result<T, StrataError> {
        match &res {
            Ok(_) => self.health.record_success(),
            Err(e) => {
                let tripped = self.health.record_failure(e, self.trip_after, self.cooldown);
                #[cfg(feature = "tracing")]
                if tripped {
                    tracing::warn!(
                        connector = self.inner.name(),
                        cooldown_ms = self.cooldown.as_millis() as u64,
                        "connection breaker opened"
                    );
                }
                #[cfg(not(feature = "tracing"))]
                let _ = tripped;
            }
        }
        res
    }
}

impl HistorianConnector for HealthTrackingConnector {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn vendor(&self) -> &'static str {
        self.inner.vendor()
    }

    fn serves(&self, tag: &TagId) -> bool {
        self.inner.serves(tag)
    }

    fn access_mode(&self) -> AccessMode {
        self.inner.access_mode()
    }

    strata_core::strata_connector_accessors!(inner);
}

#[async_trait]
impl HistoryProvider for HealthTrackingConnector {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RawObservation>, StrataError> {
        self.guard()?;
        let inner = self
            .inner
            .as_history_provider()
            .ok_or_else(|| StrataError::unsupported("history"))?;
        self.observe(inner.retrieve(query).await)
    }

    fn supported_modes(&self) -> &'static [PullMode] {
        self.inner
            .as_history_provider()
            .map_or(&[], |p| p.supported_modes())
    }
}

#[async_trait]
impl PointProvider for HealthTrackingConnector {
    async fn point_exists(&self, tag: &TagId) -> Result<bool, StrataError> {
        self.guard()?;
        let inner = self
            .inner
            .as_point_provider()
            .ok_or_else(|| StrataError::unsupported("points"))?;
        self.observe(inner.point_exists(tag).await)
    }

    async fn point_info(&self, tag: &TagId) -> Result<PointInfo, StrataError> {
        self.guard()?;
        let inner = self
            .inner
            .as_point_provider()
            .ok_or_else(|| StrataError::unsupported("points"))?;
        self.observe(inner.point_info(tag).await)
    }
}

#[async_trait]
impl DirectoryProvider for HealthTrackingConnector {
    async fn list_services(&self) -> Result<Vec<ServiceInfo>, StrataError> {
        self.guard()?;
        let inner = self
            .inner
            .as_directory_provider()
            .ok_or_else(|| StrataError::unsupported("directory"))?;
        self.observe(inner.list_services().await)
    }

    async fn list_points(&self, site_service: &str) -> Result<Vec<PointInfo>, StrataError> {
        self.guard()?;
        let inner = self
            .inner
            .as_directory_provider()
            .ok_or_else(|| StrataError::unsupported("directory"))?;
        self.observe(inner.list_points(site_service).await)
    }
}

#[async_trait]
impl SnapshotProvider for HealthTrackingConnector {
    async fn snapshot(&self, tag: &TagId) -> Result<Snapshot, StrataError> {
        self.guard()?;
        let inner = self
            .inner
            .as_snapshot_provider()
            .ok_or_else(|| StrataError::unsupported("snapshot"))?;
        self.observe(inner.snapshot(tag).await)
    }
}

/// Middleware descriptor that installs a [`HealthTrackingConnector`].
pub struct HealthMiddleware {
    health: ConnectionHealth,
    trip_after: u32,
    cooldown: Duration,
}

impl HealthMiddleware {
    /// Track into `health`, tripping after `trip_after` failures for `cooldown`.
    #[must_use]
    pub const fn new(health: ConnectionHealth, trip_after: u32, cooldown: Duration) -> Self {
        Self {
            health,
            trip_after,
            cooldown,
        }
    }
}

impl Middleware for HealthMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn HistorianConnector>) -> Arc<dyn HistorianConnector> {
        Arc::new(HealthTrackingConnector::new(
            inner,
            self.health,
            self.trip_after,
            self.cooldown,
        ))
    }

    fn name(&self) -> &'static str {
        "HealthTrackingConnector"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({
            "trip_after": self.trip_after,
            "cooldown_ms": u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
