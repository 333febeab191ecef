use crate::strata_router_method;
use crate::Strata;
use strata_core::{Capability, PointInfo, Snapshot};

impl Strata {
    strata_router_method! {
        /// Fetch the most recent value the historian holds for `tag`.
        method: snapshot(tag) -> Snapshot,
        accessor: as_snapshot_provider,
        capability: Capability::Snapshot,
        call: snapshot
    }

    strata_router_method! {
        /// Fetch the description and engineering units registered for `tag`.
        method: point_info(tag) -> PointInfo,
        accessor: as_point_provider,
        capability: Capability::Points,
        call: point_info
    }
}
