use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use strata_core::connector::{
    DirectoryProvider, HistorianConnector, HistoryProvider, PointProvider, SnapshotProvider,
};
use strata_core::{
    AccessMode, Middleware, PointInfo, PullMode, RawObservation, RetrievalQuery, ServiceInfo,
    Snapshot, StrataError, TagId,
};

/// Lock that grants exclusive use of one historian binding.
///
/// Wrappers created from the same gate never call their inner connectors at
/// the same time, which lets several `Strata` instances share a binding that
/// is not safe for concurrent use.
pub type BindingGate = Arc<Mutex<()>>;

/// Connector wrapper that runs every call while holding a [`BindingGate`].
pub struct SerializedConnector {
    inner: Arc<dyn HistorianConnector>,
    gate: BindingGate,
}

impl SerializedConnector {
    /// Wrap `inner` behind its own gate.
    pub fn new(inner: Arc<dyn HistorianConnector>) -> Self {
        Self::with_gate(inner, Arc::new(Mutex::new(())))
    }

    /// Wrap `inner` behind an existing gate.
    pub fn with_gate(inner: Arc<dyn HistorianConnector>, gate: BindingGate) -> Self {
        Self { inner, gate }
    }

    /// Handle to the gate, for wrapping further connectors that share the binding.
    #[must_use]
    pub fn gate(&self) -> BindingGate {
        Arc::clone(&self.gate)
    }
}

impl HistorianConnector for SerializedConnector {
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
        AccessMode::Exclusive
    }

    strata_core::strata_connector_accessors!(inner);
}

#[async_trait]
impl HistoryProvider for SerializedConnector {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RawObservation>, StrataError> {
        let inner = self
            .inner
            .as_history_provider()
            .ok_or_else(|| StrataError::unsupported("history"))?;
        let _held = self.gate.lock().await;
        inner.retrieve(query).await
    }

    fn supported_modes(&self) -> &'static [PullMode] {
        self.inner
            .as_history_provider()
            .map_or(&[], |p| p.supported_modes())
    }
}

#[async_trait]
impl PointProvider for SerializedConnector {
    async fn point_exists(&self, tag: &TagId) -> Result<bool, StrataError> {
        let inner = self
            .inner
            .as_point_provider()
            .ok_or_else(|| StrataError::unsupported("points"))?;
        let _held = self.gate.lock().await;
        inner.point_exists(tag).await
    }

    async fn point_info(&self, tag: &TagId) -> Result<PointInfo, StrataError> {
        let inner = self
            .inner
            .as_point_provider()
            .ok_or_else(|| StrataError::unsupported("points"))?;
        let _held = self.gate.lock().await;
        inner.point_info(tag).await
    }
}

#[async_trait]
impl DirectoryProvider for SerializedConnector {
    async fn list_services(&self) -> Result<Vec<ServiceInfo>, StrataError> {
        let inner = self
            .inner
            .as_directory_provider()
            .ok_or_else(|| StrataError::unsupported("directory"))?;
        let _held = self.gate.lock().await;
        inner.list_services().await
    }

    async fn list_points(&self, site_service: &str) -> Result<Vec<PointInfo>, StrataError> {
        let inner = self
            .inner
            .as_directory_provider()
            .ok_or_else(|| StrataError::unsupported("directory"))?;
        let _held = self.gate.lock().await;
        inner.list_points(site_service).await
    }
}

#[async_trait]
impl SnapshotProvider for SerializedConnector {
    async fn snapshot(&self, tag: &TagId) -> Result<Snapshot, StrataError> {
        let inner = self
            .inner
            .as_snapshot_provider()
            .ok_or_else(|| StrataError::unsupported("snapshot"))?;
        let _held = self.gate.lock().await;
        inner.snapshot(tag).await
    }
}

/// Middleware descriptor that installs a [`SerializedConnector`].
pub struct SerializeMiddleware {
    gate: Option<BindingGate>,
}

impl SerializeMiddleware {
    /// Serialize behind a fresh gate.
    #[must_use]
    pub const fn new() -> Self {
        Self { gate: None }
    }

    /// Serialize behind a gate shared with other wrappers of the same binding.
    #[must_use]
    pub const fn sharing(gate: BindingGate) -> Self {
        Self { gate: Some(gate) }
    }
}

impl Default for SerializeMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for SerializeMiddleware {
    fn apply(self: Box<Self>, inner: Arc<dyn HistorianConnector>) -> Arc<dyn HistorianConnector> {
        match self.gate {
            Some(gate) => Arc::new(SerializedConnector::with_gate(inner, gate)),
            None => Arc::new(SerializedConnector::new(inner)),
        }
    }

    fn name(&self) -> &'static str {
        "SerializedConnector"
    }

    fn config_json(&self) -> serde_json::Value {
        serde_json::json!({ "shared_gate": self.gate.is_some() })
    }
}
