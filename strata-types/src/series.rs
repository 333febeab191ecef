//! Single-tag series produced by the query executor.

use serde::{Deserialize, Serialize};

use crate::mode::PullMode;
use crate::observation::Observation;
use crate::tag::TagId;
use crate::time::{TimeAxis, Timestamp};

/// Descriptive metadata attached to a [`TagSeries`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMeta {
    /// Tag the series was pulled for.
    pub tag: TagId,
    /// Point description, when the directory knows one.
    pub description: Option<String>,
    /// Engineering units, when the directory knows them.
    pub units: Option<String>,
    /// Retrieval mode used.
    pub mode: PullMode,
    /// Resolved display label.
    pub label: String,
    /// Timestamp representation.
    pub axis: TimeAxis,
}

/// Ordered observations for one tag over one window.
///
/// Timestamps are strictly increasing. Construction enforces this: records
/// are stably ordered by time and, where several share a timestamp, the one
/// retrieved last is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSeries {
    meta: SeriesMeta,
    observations: Vec<Observation>,
    duplicates_collapsed: usize,
}

impl TagSeries {
    /// Build a series from observations in retrieval order.
    #[must_use]
    pub fn new(meta: SeriesMeta, mut observations: Vec<Observation>) -> Self {
        // stable: equal timestamps keep retrieval order, so the last one is the newest
        observations.sort_by(|a, b| a.ts.cmp(&b.ts));
        let before = observations.len();
        let mut out: Vec<Observation> = Vec::with_capacity(before);
        for obs in observations {
            match out.last_mut() {
                Some(last) if last.ts == obs.ts => *last = obs,
                _ => out.push(obs),
            }
        }
        let duplicates_collapsed = before - out.len();
        Self {
            meta,
            observations: out,
            duplicates_collapsed,
        }
    }

    /// Series metadata.
    #[must_use]
    pub const fn meta(&self) -> &SeriesMeta {
        &self.meta
    }

    /// Tag the series was pulled for.
    #[must_use]
    pub const fn tag(&self) -> &TagId {
        &self.meta.tag
    }

    /// Resolved display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.meta.label
    }

    /// Point description, if known.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    /// Engineering units, if known.
    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.meta.units.as_deref()
    }

    /// Retrieval mode used.
    #[must_use]
    pub const fn mode(&self) -> PullMode {
        self.meta.mode
    }

    /// Timestamp representation.
    #[must_use]
    pub const fn axis(&self) -> TimeAxis {
        self.meta.axis
    }

    /// Observations in strictly increasing time order.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Consume the series, returning metadata and observations.
    #[must_use]
    pub fn into_parts(self) -> (SeriesMeta, Vec<Observation>) {
        (self.meta, self.observations)
    }

    /// Iterate timestamps in order.
    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.observations.iter().map(|o| o.ts)
    }

    /// Number of records that were dropped because a later record shared their timestamp.
    #[must_use]
    pub const fn duplicates_collapsed(&self) -> usize {
        self.duplicates_collapsed
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// True when the window held no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
