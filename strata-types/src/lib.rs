//! Strata data model, configuration primitives and the unified error type.
#![warn(missing_docs)]

mod capability;
mod config;
mod connector;
mod directory;
/// Unified error type.
pub mod error;
mod middleware;
mod mode;
mod observation;
mod reports;
mod request;
/// Connector ordering rules.
pub mod routing_policy;
mod series;
mod table;
mod tag;
/// Time axis primitives and historian time-string helpers.
pub mod time;

pub use capability::Capability;
pub use config::StrataConfig;
pub use connector::{AccessMode, ConnectorKey};
pub use directory::{PointInfo, ServiceInfo, Snapshot};
pub use error::StrataError;
pub use middleware::{MiddlewareLayer, MiddlewareStack};
pub use mode::PullMode;
pub use observation::{Observation, RawObservation, Status};
pub use reports::{AlignmentReport, TagStats};
pub use request::{LabelPolicy, PullRequest, PullRequestBuilder, RetrievalQuery};
pub use routing_policy::{ProviderRule, RoutingPolicy, RoutingPolicyBuilder};
pub use series::{SeriesMeta, TagSeries};
pub use table::{Cell, Column, MergedTable};
pub use tag::TagId;
pub use time::{TimeAxis, Timestamp};
