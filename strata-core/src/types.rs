//! Re-export of the data model from `strata-types`.
// Downstream crates (connectors, middleware, the orchestrator) depend on
// `strata-core` alone for both traits and types.

pub use strata_types::{
    AccessMode, Capability, ConnectorKey, MiddlewareLayer, MiddlewareStack, StrataConfig,
    StrataError,
};
pub use strata_types::{AlignmentReport, TagStats};
pub use strata_types::{Cell, Column, MergedTable};
pub use strata_types::{LabelPolicy, PullMode, PullRequest, PullRequestBuilder, RetrievalQuery};
pub use strata_types::{Observation, RawObservation, SeriesMeta, Status, TagSeries};
pub use strata_types::{PointInfo, ServiceInfo, Snapshot, TagId};
pub use strata_types::{ProviderRule, RoutingPolicy, RoutingPolicyBuilder};
pub use strata_types::{TimeAxis, Timestamp};

pub use strata_types::time::{
    HISTORIAN_TIME_FORMATS, format_historian_time, format_period, parse_historian_time,
    parse_period,
};

#[cfg(feature = "dataframe")]
pub use crate::dataframe::ToDataFrame;
