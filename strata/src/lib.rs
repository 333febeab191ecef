//! Strata queries process historians and aligns many tags into one table.
//!
//! Overview
//! - Routes requests to connectors that implement the `strata_core` contracts.
//! - Orders connectors per `Site.Service` through a routing policy and falls
//!   back to the next connector when one does not know a tag or fails.
//! - Validates points before retrieval so an unknown tag is an error, never an
//!   empty series.
//! - Merges independently retrieved series onto one ascending index with a
//!   bounded forward fill and optional shared-grid resampling.
//!
//! Key behaviors and trade-offs
//! - Pull modes: `raw` returns stored records as-is; `average`, `interpolate`,
//!   `minimum`, `maximum` and `snap` return one value per period. `snap` holds
//!   the last stored value, so a compressed point looks like a flat line.
//! - Fill horizon: `fill_limit` bounds how far a value is carried into a gap.
//!   A large limit hides outages, a small one leaves holes between slow tags.
//! - Concurrency: per-tag fetches run concurrently up to `fetch_concurrency`,
//!   lowered to one for connectors whose binding is `Exclusive`.
//! - A merge is all-or-nothing: one failed tag fails the whole table.
//!
//! Examples
//! Building an orchestrator with a routing policy:
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata::{RoutingPolicyBuilder, Strata};
//! use strata_mock::MockHistorian;
//!
//! let primary = Arc::new(MockHistorian::new());
//! let routing = RoutingPolicyBuilder::new()
//!     .providers_for_service("MDSSCSC1.ANVCALC", &[primary.key()])
//!     .build();
//!
//! let strata = Strata::builder()
//!     .with_connector(primary.clone())
//!     .routing_policy(routing)
//!     .provider_timeout(std::time::Duration::from_secs(2))
//!     .build()?;
//! ```
//!
//! Fetching one tag in snap mode:
//! ```rust,ignore
//! use strata::{PullMode, PullRequest, TagId};
//!
//! let tag = TagId::parse("MDSSCSC1.ANVCALC.ADE1SP01")?;
//! let req = PullRequest::builder(tag)
//!     .window_str("12/01/16 00:00", "12/01/16 00:10", chrono_tz::UTC)?
//!     .mode(PullMode::Snap)
//!     .period_str("00:01:00")?
//!     .build()?;
//! let series = strata.fetch(&req).await?;
//! ```
//!
//! Merging several tags:
//! ```rust,ignore
//! let (table, report) = strata
//!     .merge()
//!     .tags(&[load, flow])?
//!     .window(start, end)
//!     .fill_limit(5)
//!     .run_with_report()
//!     .await?;
//! println!("{} rows, {} cells filled", report.rows, report.cells_filled());
//! ```
//!
//! See `strata/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use crate::core::{Strata, StrataBuilder, tag_err};
pub use router::merge::{DEFAULT_FILL_LIMIT, MergeBuilder};
pub use router::util::{collapse_errors, join_with_deadline};

pub use strata_middleware::{
    BindingGate, ConnectionHealth, ConnectorBuilder, HealthMiddleware, SerializeMiddleware,
};

// Re-export core types for convenience
pub use strata_core::{
    // Connector contracts
    AccessMode,
    // Reports
    AlignmentReport,
    // Foundational types
    Capability,
    Cell,
    Column,
    ConnectorKey,
    HistorianConnector,
    LabelPolicy,
    MergedTable,
    Observation,
    PointInfo,
    PullMode,
    // Request types
    PullRequest,
    PullRequestBuilder,
    RawObservation,
    RetrievalQuery,
    RoutingPolicy,
    RoutingPolicyBuilder,
    SeriesMeta,
    ServiceInfo,
    Snapshot,
    Status,
    StrataConfig,
    StrataError,
    TagId,
    TagSeries,
    TagStats,
    TimeAxis,
    Timestamp,
    parse_historian_time,
    parse_period,
};

#[cfg(feature = "dataframe")]
pub use strata_core::ToDataFrame;
