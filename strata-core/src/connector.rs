use async_trait::async_trait;

use crate::StrataError;
pub use strata_types::{AccessMode, ConnectorKey};
use strata_types::{
    PointInfo, PullMode, RawObservation, RetrievalQuery, ServiceInfo, Snapshot, TagId,
};

/// Focused role trait for connectors that retrieve historical records.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Retrieve records for `query.tag` over `[query.start, query.end]`.
    ///
    /// Implementations return records in retrieval order; duplicates and
    /// out-of-window records are tolerated and cleaned up by the caller.
    /// An empty vector means "no data in window". An unknown tag must be
    /// reported as `InvalidTag` and an unreachable historian as `Connection`,
    /// never as an empty result.
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RawObservation>, StrataError>;

    /// Modes this connector can serve. Defaults to every mode.
    fn supported_modes(&self) -> &'static [PullMode] {
        PullMode::ALL
    }
}

/// Focused role trait for connectors that can resolve individual points.
#[async_trait]
pub trait PointProvider: Send + Sync {
    /// Whether `tag` is registered, by exact identifier match.
    async fn point_exists(&self, tag: &TagId) -> Result<bool, StrataError>;

    /// Description and units for `tag`.
    async fn point_info(&self, tag: &TagId) -> Result<PointInfo, StrataError>;
}

/// Focused role trait for connectors that enumerate services and points.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Services visible to this connection.
    async fn list_services(&self) -> Result<Vec<ServiceInfo>, StrataError>;

    /// Points registered on `site_service` (`Site.Service`).
    async fn list_points(&self, site_service: &str) -> Result<Vec<PointInfo>, StrataError>;
}

/// Focused role trait for connectors that expose the current value of a point.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// Most recent value of `tag`.
    async fn snapshot(&self, tag: &TagId) -> Result<Snapshot, StrataError>;
}

/// Main connector trait implemented by historian bindings. Exposes capability discovery.
pub trait HistorianConnector: Send + Sync {
    /// A stable identifier used in routing policies.
    fn name(&self) -> &'static str;

    /// Canonical connector key constructed from the static name.
    fn key(&self) -> ConnectorKey {
        ConnectorKey::new(self.name())
    }

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this connector can reach the service hosting `tag`.
    ///
    /// Default: `true`. Connectors bound to specific services override this.
    fn serves(&self, tag: &TagId) -> bool {
        let _ = tag;
        true
    }

    /// Concurrency contract of the underlying binding.
    ///
    /// Default: `Exclusive`, the safe assumption for native libraries.
    fn access_mode(&self) -> AccessMode {
        AccessMode::Exclusive
    }

    /// Advertise history capability.
    fn as_history_provider(&self) -> Option<&dyn HistoryProvider> {
        None
    }

    /// Advertise point lookup capability.
    fn as_point_provider(&self) -> Option<&dyn PointProvider> {
        None
    }

    /// Advertise directory enumeration capability.
    fn as_directory_provider(&self) -> Option<&dyn DirectoryProvider> {
        None
    }

    /// Advertise snapshot capability.
    fn as_snapshot_provider(&self) -> Option<&dyn SnapshotProvider> {
        None
    }
}

/// Generate `as_*_provider` accessors for a wrapper that implements
/// `HistorianConnector` by delegating to an inner field.
///
/// The wrapper must implement every capability trait itself; an accessor
/// returns the wrapper only when the inner connector advertises the capability.
#[macro_export]
macro_rules! strata_connector_accessors {
    ($inner:ident) => {
        fn as_history_provider(&self) -> Option<&dyn $crate::connector::HistoryProvider> {
            self.$inner
                .as_history_provider()
                .map(|_| self as &dyn $crate::connector::HistoryProvider)
        }
        fn as_point_provider(&self) -> Option<&dyn $crate::connector::PointProvider> {
            self.$inner
                .as_point_provider()
                .map(|_| self as &dyn $crate::connector::PointProvider)
        }
        fn as_directory_provider(&self) -> Option<&dyn $crate::connector::DirectoryProvider> {
            self.$inner
                .as_directory_provider()
                .map(|_| self as &dyn $crate::connector::DirectoryProvider)
        }
        fn as_snapshot_provider(&self) -> Option<&dyn $crate::connector::SnapshotProvider> {
            self.$inner
                .as_snapshot_provider()
                .map(|_| self as &dyn $crate::connector::SnapshotProvider)
        }
    };
}
