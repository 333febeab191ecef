//! Mock historian connectors for CI-safe tests and examples.
use std::time::Duration;

use async_trait::async_trait;
use strata_core::connector::{
    DirectoryProvider, HistorianConnector, HistoryProvider, PointProvider, SnapshotProvider,
};
use strata_core::{
    AccessMode, PointInfo, RawObservation, RetrievalQuery, ServiceInfo, Snapshot, StrataError,
    TagId, sample,
};

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockConnector, DynamicMockController, MockBehavior};
pub use fixtures::{DAY_END, DAY_START};

const NAME: &str = "strata-mock";

/// Mock historian serving deterministic data from static fixtures.
///
/// All pull modes are computed in memory from the stored records. Point
/// `MDSSCSC1.SCADA.FAIL` reports a dropped connection and
/// `MDSSCSC1.SCADA.TIMEOUT` stalls for 200 ms before answering.
pub struct MockHistorian {
    access: AccessMode,
}

impl Default for MockHistorian {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHistorian {
    /// A historian that tolerates up to eight concurrent calls.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            access: AccessMode::Concurrent { max: 8 },
        }
    }

    /// A historian that declares a single-owner binding.
    #[must_use]
    pub const fn exclusive() -> Self {
        Self {
            access: AccessMode::Exclusive,
        }
    }

    async fn maybe_fail_or_stall(tag: &TagId, capability: &'static str) -> Result<(), StrataError> {
        match tag.point() {
            "FAIL" => Err(StrataError::connection(
                NAME,
                format!("link dropped during {capability}"),
            )),
            "TIMEOUT" => {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn unknown(tag: &TagId) -> StrataError {
        StrataError::invalid_tag(tag.as_str())
    }
}

impl HistorianConnector for MockHistorian {
    fn name(&self) -> &'static str {
        NAME
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }

    fn serves(&self, tag: &TagId) -> bool {
        fixtures::directory::has_service(tag.site_service())
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
    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        Some(self as &dyn SnapshotProvider)
    }
}

#[async_trait]
impl HistoryProvider for MockHistorian {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RawObservation>, StrataError> {
        Self::maybe_fail_or_stall(&query.tag, "retrieve").await?;
        if fixtures::directory::point(&query.tag).is_none() {
            return Err(Self::unknown(&query.tag));
        }
        let stored = fixtures::history::records(&query.tag).unwrap_or_default();
        Ok(sample(&stored, query))
    }
}

#[async_trait]
impl PointProvider for MockHistorian {
    async fn point_exists(&self, tag: &TagId) -> Result<bool, StrataError> {
        Ok(fixtures::directory::point(tag).is_some())
    }

    async fn point_info(&self, tag: &TagId) -> Result<PointInfo, StrataError> {
        fixtures::directory::point(tag).ok_or_else(|| Self::unknown(tag))
    }
}

#[async_trait]
impl DirectoryProvider for MockHistorian {
    async fn list_services(&self) -> Result<Vec<ServiceInfo>, StrataError> {
        Ok(fixtures::directory::services())
    }

    async fn list_points(&self, site_service: &str) -> Result<Vec<PointInfo>, StrataError> {
        if !fixtures::directory::has_service(site_service) {
            return Err(StrataError::not_found(format!("service {site_service}")));
        }
        Ok(fixtures::directory::points_on(site_service))
    }
}

#[async_trait]
impl SnapshotProvider for MockHistorian {
    async fn snapshot(&self, tag: &TagId) -> Result<Snapshot, StrataError> {
        Self::maybe_fail_or_stall(tag, "snapshot").await?;
        let info = fixtures::directory::point(tag).ok_or_else(|| Self::unknown(tag))?;
        let last = fixtures::history::records(tag)
            .and_then(|mut r| {
                r.sort_by_key(|o| o.ts);
                r.pop()
            })
            .ok_or_else(|| StrataError::not_found(format!("snapshot for {tag}")))?;
        Ok(Snapshot {
            tag: tag.clone(),
            ts: last.ts,
            value: last.value,
            status: last.status,
            units: info.units,
        })
    }
}
