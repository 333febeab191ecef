use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use strata_core::connector::{
    DirectoryProvider, HistorianConnector, HistoryProvider, PointProvider,
};
use strata_core::{
    AccessMode, PointInfo, RawObservation, RetrievalQuery, ServiceInfo, StrataError, TagId,
};

/// Instruction for how a method should behave for a given input.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Sleep for the given duration, then return the value.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(StrataError),
    /// Hang indefinitely (simulate a stalled link).
    Hang,
}

#[derive(Default)]
struct InternalState {
    history_rules: HashMap<TagId, MockBehavior<Vec<RawObservation>>>,
    point_rules: HashMap<TagId, MockBehavior<PointInfo>>,
    services: Option<MockBehavior<Vec<ServiceInfo>>>,
    retrievals: Vec<RetrievalQuery>,
}

#[derive(Default)]
struct Concurrency {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Concurrency {
    fn enter(self: &Arc<Self>) -> InFlight {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlight(Arc::clone(self))
    }
}

/// Decrements the in-flight counter when a retrieval finishes or is dropped.
struct InFlight(Arc<Concurrency>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
    concurrency: Arc<Concurrency>,
}

impl DynamicMockController {
    /// Set the behavior for `retrieve` calls for a specific tag.
    pub async fn set_history_behavior(
        &self,
        tag: TagId,
        behavior: MockBehavior<Vec<RawObservation>>,
    ) {
        let mut guard = self.state.lock().await;
        guard.history_rules.insert(tag, behavior);
    }

    /// Set the behavior for `point_exists` / `point_info` calls for a tag.
    ///
    /// Without a point rule, a tag exists exactly when it has a history rule.
    pub async fn set_point_behavior(&self, tag: TagId, behavior: MockBehavior<PointInfo>) {
        let mut guard = self.state.lock().await;
        guard.point_rules.insert(tag, behavior);
    }

    /// Set the behavior for `list_services`.
    pub async fn set_services_behavior(&self, behavior: MockBehavior<Vec<ServiceInfo>>) {
        let mut guard = self.state.lock().await;
        guard.services = Some(behavior);
    }

    /// Return a copy of every retrieval query received so far, in arrival order.
    pub async fn retrievals(&self) -> Vec<RetrievalQuery> {
        let guard = self.state.lock().await;
        guard.retrievals.clone()
    }

    /// Highest number of `retrieve` calls observed running at once.
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.concurrency.peak.load(Ordering::SeqCst)
    }

    /// Clear all configured behaviors and logs.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        *guard = InternalState::default();
        self.concurrency.peak.store(0, Ordering::SeqCst);
    }
}

/// A connector that defers all behavior to an external controller.
pub struct DynamicMockConnector {
    name: &'static str,
    access: AccessMode,
    state: Arc<Mutex<InternalState>>,
    concurrency: Arc<Concurrency>,
}

impl DynamicMockConnector {
    /// Create a new dynamic mock connector and its controller.
    ///
    /// The connector declares `Concurrent { max: 64 }`.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn HistorianConnector>, DynamicMockController) {
        Self::with_access(name, AccessMode::Concurrent { max: 64 })
    }

    /// Create a connector declaring the given access mode, and its controller.
    #[must_use]
    pub fn with_access(
        name: &'static str,
        access: AccessMode,
    ) -> (Arc<dyn HistorianConnector>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let concurrency = Arc::new(Concurrency::default());
        let controller = DynamicMockController {
            state: Arc::clone(&state),
            concurrency: Arc::clone(&concurrency),
        };
        let me = Arc::new(Self {
            name,
            access,
            state,
            concurrency,
        });
        (me as Arc<dyn HistorianConnector>, controller)
    }

    async fn resolve<T>(behavior: Option<MockBehavior<T>>, missing: StrataError) -> Result<T, StrataError> {
        match behavior {
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Delay(d, v)) => {
                tokio::time::sleep(d).await;
                Ok(v)
            }
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(missing),
        }
    }
}

impl HistorianConnector for DynamicMockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn access_mode(&self) -> AccessMode {
        self.access
    }

    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        Some(self as &dyn HistoryProvider)
    }

    fn as_point_provider(&self) -> Option<&dyn PointProvider> {
        Some(self as &dyn PointProvider)
    }

    fn as_directory_provider(&self) -> Option<&dyn DirectoryProvider> {
        Some(self as &dyn DirectoryProvider)
    }
}

#[async_trait]
impl HistoryProvider for DynamicMockConnector {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RawObservation>, StrataError> {
        // Log and snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.retrievals.push(query.clone());
            guard.history_rules.get(&query.tag).cloned()
        };
        let _in_flight = self.concurrency.enter();
        Self::resolve(behavior, StrataError::invalid_tag(query.tag.as_str())).await
    }
}

#[async_trait]
impl PointProvider for DynamicMockConnector {
    async fn point_exists(&self, tag: &TagId) -> Result<bool, StrataError> {
        let (rule, has_history) = {
            let guard = self.state.lock().await;
            (
                guard.point_rules.get(tag).cloned(),
                guard.history_rules.contains_key(tag),
            )
        };
        match rule {
            None => Ok(has_history),
            Some(behavior) => Self::resolve(Some(behavior), StrataError::invalid_tag(tag.as_str()))
                .await
                .map(|_| true),
        }
    }

    async fn point_info(&self, tag: &TagId) -> Result<PointInfo, StrataError> {
        let rule = {
            let guard = self.state.lock().await;
            guard.point_rules.get(tag).cloned()
        };
        Self::resolve(rule, StrataError::invalid_tag(tag.as_str())).await
    }
}

#[async_trait]
impl DirectoryProvider for DynamicMockConnector {
    async fn list_services(&self) -> Result<Vec<ServiceInfo>, StrataError> {
        let rule = {
            let guard = self.state.lock().await;
            guard.services.clone()
        };
        Self::resolve(rule, StrataError::unsupported("directory")).await
    }

    async fn list_points(&self, site_service: &str) -> Result<Vec<PointInfo>, StrataError> {
        let guard = self.state.lock().await;
        let mut tags: Vec<&TagId> = guard
            .history_rules
            .keys()
            .chain(guard.point_rules.keys())
            .filter(|t| t.site_service() == site_service)
            .collect();
        tags.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        tags.dedup();
        Ok(tags
            .into_iter()
            .map(|tag| PointInfo {
                tag: tag.clone(),
                description: None,
                units: None,
            })
            .collect())
    }
}
