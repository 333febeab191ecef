use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use futures::future::{self, BoxFuture};
use futures::{StreamExt, stream};

use crate::Strata;
use crate::core::with_request_deadline;
use strata_core::{
    AlignmentReport, Column, MergedTable, Observation, PullMode, PullRequest, StrataError,
    TagId, TagSeries, TagStats, TimeAxis, Timestamp, collapse_duplicate_rows,
    estimate_step_seconds, forward_fill, grid, outer_join, parse_historian_time,
    resample_to_grid,
};

/// Default number of consecutive missing cells forward fill may cover.
pub const DEFAULT_FILL_LIMIT: usize = 600;

/// Builder to retrieve several tags over one window and align them into a single table.
pub struct MergeBuilder<'a> {
    pub(crate) strata: &'a Strata,
    pub(crate) tags: Vec<TagId>,
    pub(crate) window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub(crate) sampling_rate: Option<TimeDelta>,
    pub(crate) fill_limit: usize,
    pub(crate) verify_time: bool,
    pub(crate) desc_as_label: bool,
    pub(crate) utc: bool,
    pub(crate) cancel: Option<BoxFuture<'a, ()>>,
}

impl<'a> MergeBuilder<'a> {
    /// Create a new builder bound to a `Strata` instance.
    ///
    /// Defaults: no tags, no window, native timestamps (no resampling), a fill
    /// limit of 600 cells, duplicate verification on, tag-name labels and a
    /// calendar time axis.
    #[must_use]
    pub const fn new(strata: &'a Strata) -> Self {
        Self {
            strata,
            tags: Vec::new(),
            window: None,
            sampling_rate: None,
            fill_limit: DEFAULT_FILL_LIMIT,
            verify_time: true,
            desc_as_label: false,
            utc: false,
            cancel: None,
        }
    }

    /// Replace the tag list. Columns follow this order.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the same tag appears twice.
    pub fn tags(mut self, tags: &[TagId]) -> Result<Self, StrataError> {
        let mut seen = HashSet::new();
        for tag in tags {
            if !seen.insert(tag) {
                return Err(StrataError::InvalidArg(format!(
                    "duplicate tag '{tag}' in tag list"
                )));
            }
        }
        self.tags = tags.to_vec();
        Ok(self)
    }

    /// Append one tag.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the tag is already in the list.
    pub fn add_tag(mut self, tag: TagId) -> Result<Self, StrataError> {
        if self.tags.contains(&tag) {
            return Err(StrataError::InvalidArg(format!(
                "duplicate tag '{tag}' already exists in tag list"
            )));
        }
        self.tags.push(tag);
        Ok(self)
    }

    /// Set the inclusive window `[start, end]`. Checked in `run()`.
    #[must_use]
    pub const fn window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.window = Some((start, end));
        self
    }

    /// Set the window from historian local-time strings (`mm/dd/yy hh:mm[:ss]`).
    ///
    /// # Errors
    /// Returns `InvalidWindow` if either string does not parse or names a
    /// local time that does not exist in `tz`.
    pub fn window_str(self, start: &str, end: &str, tz: Tz) -> Result<Self, StrataError> {
        let start = parse_historian_time(start, tz)?;
        let end = parse_historian_time(end, tz)?;
        Ok(self.window(start, end))
    }

    /// Resample every series onto the shared grid `start + k * rate` before aligning.
    ///
    /// The rate must be a positive whole number of seconds; `run()` rejects
    /// anything else with `InvalidWindow`.
    #[must_use]
    pub const fn sampling_rate(mut self, rate: TimeDelta) -> Self {
        self.sampling_rate = Some(rate);
        self
    }

    /// Maximum run of missing cells forward fill may cover after an observation.
    ///
    /// `0` disables filling. Large limits can carry a stale value across a
    /// real outage.
    #[must_use]
    pub const fn fill_limit(mut self, limit: usize) -> Self {
        self.fill_limit = limit;
        self
    }

    /// Re-scan the aligned index and collapse duplicate timestamps.
    #[must_use]
    pub const fn verify_time(mut self, yes: bool) -> Self {
        self.verify_time = yes;
        self
    }

    /// Label columns with point descriptions instead of tag names.
    #[must_use]
    pub const fn desc_as_label(mut self, yes: bool) -> Self {
        self.desc_as_label = yes;
        self
    }

    /// Index the table by epoch seconds rather than calendar instants.
    #[must_use]
    pub const fn utc(mut self, yes: bool) -> Self {
        self.utc = yes;
        self
    }

    /// Abort the merge with `Cancelled` once `signal` completes.
    ///
    /// Tags not yet fetched are skipped. Fetches already running finish on
    /// their own (or hit the provider timeout) before `run()` returns, and no
    /// partial table is produced. The request deadline still applies to the
    /// drain.
    #[must_use]
    pub fn cancel_on<F>(mut self, signal: F) -> Self
    where
        F: core::future::Future<Output = ()> + Send + 'a,
    {
        self.cancel = Some(Box::pin(signal));
        self
    }

    /// Execute the merge and return the aligned table.
    ///
    /// # Errors
    /// See [`run_with_report`](Self::run_with_report).
    pub async fn run(self) -> Result<MergedTable, StrataError> {
        self.run_with_report().await.map(|(table, _)| table)
    }

    /// Execute the merge and return the table together with an [`AlignmentReport`].
    ///
    /// Behavior:
    /// - Every tag is fetched in raw mode over the window, concurrently up to
    ///   the configured fetch concurrency and each connector's access mode.
    ///   After the first failure no new fetch starts; running ones finish.
    /// - With a sampling rate, each series is resampled onto the shared grid.
    /// - Series are outer-joined on the union of their timestamps, forward
    ///   filled up to the fill limit, and optionally verified for duplicate
    ///   index entries.
    /// - Columns follow the caller's tag order regardless of completion order.
    ///
    /// # Errors
    /// Returns `InvalidArg` for an empty tag list, `InvalidWindow` for a
    /// missing or empty window or a sampling rate that is not a positive
    /// whole number of seconds, the first fetch failure (the merge is
    /// all-or-nothing), `RequestTimeout` when the
    /// request deadline elapses, `Cancelled` when the cancel signal fires, and
    /// `AlignmentInconsistency` if verification finds a decreasing index.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "strata::router",
            skip(self),
            fields(
                tags = self.tags.len(),
                fill_limit = self.fill_limit,
                verify_time = self.verify_time,
                utc = self.utc,
            ),
        )
    )]
    pub async fn run_with_report(self) -> Result<(MergedTable, AlignmentReport), StrataError> {
        if self.tags.is_empty() {
            return Err(StrataError::InvalidArg("no tags specified for merge".into()));
        }
        let (start, end) = self
            .window
            .ok_or_else(|| StrataError::InvalidWindow("merge window not set".into()))?;
        if end <= start {
            return Err(StrataError::InvalidWindow(format!(
                "end {end} is not after start {start}"
            )));
        }
        if let Some(rate) = self.sampling_rate
            && (rate <= TimeDelta::zero() || rate.subsec_nanos() != 0)
        {
            return Err(StrataError::InvalidWindow(format!(
                "sampling rate must be a positive whole number of seconds, got {}ms",
                rate.num_milliseconds()
            )));
        }

        let requests = self
            .tags
            .iter()
            .map(|tag| {
                PullRequest::builder(tag.clone())
                    .window(start, end)
                    .mode(PullMode::Raw)
                    .utc(self.utc)
                    .desc_as_label(self.desc_as_label)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let strata = self.strata;
        let limit = strata.merge_concurrency(&self.tags);
        #[cfg(feature = "tracing")]
        tracing::debug!(limit, "fetching tags");

        // set on cancel or on the first failure; fetches not yet started are skipped
        let stop = AtomicBool::new(false);
        let cancelled = AtomicBool::new(false);
        let stop_ref = &stop;

        let fetches = stream::iter(requests.into_iter().enumerate())
            .map(|(i, req)| async move {
                if stop_ref.load(Ordering::SeqCst) {
                    return None;
                }
                let res = strata
                    .fetch_with_warnings(&req)
                    .await
                    .map(|(series, warnings)| (i, series, warnings));
                if res.is_err() {
                    stop_ref.store(true, Ordering::SeqCst);
                }
                Some(res)
            })
            .buffer_unordered(limit)
            .collect::<Vec<_>>();
        let cancel = self.cancel;
        let watch = async {
            if let Some(signal) = cancel {
                signal.await;
                #[cfg(feature = "tracing")]
                tracing::debug!("merge cancelled; draining in-flight fetches");
                cancelled.store(true, Ordering::SeqCst);
                stop.store(true, Ordering::SeqCst);
            }
            future::pending::<()>().await;
        };
        let drained = async {
            tokio::select! {
                res = fetches => res,
                () = watch => Vec::new(),
            }
        };

        let outcomes = with_request_deadline(strata.cfg.request_timeout, drained)
            .await
            .map_err(|_| StrataError::request_timeout("merge"))?;
        if cancelled.load(Ordering::SeqCst) {
            return Err(StrataError::Cancelled);
        }
        let mut fetched = outcomes
            .into_iter()
            .flatten()
            .collect::<Result<Vec<_>, _>>()?;
        fetched.sort_by_key(|(i, _, _)| *i);

        let mut series: Vec<TagSeries> = Vec::with_capacity(fetched.len());
        let mut warnings: Vec<StrataError> = Vec::new();
        for (_, s, w) in fetched {
            series.push(s);
            warnings.extend(w);
        }

        let axis = TimeAxis::from_utc_flag(self.utc);
        let (table, duplicate_rows_collapsed) = align_series(
            &series,
            axis,
            self.sampling_rate.map(|rate| grid(start, end, rate, axis)),
            self.fill_limit,
            self.verify_time,
        )?;

        let tags = series
            .iter()
            .zip(table.columns())
            .map(|(s, col)| {
                let stamps: Vec<Timestamp> = s.timestamps().collect();
                TagStats {
                    tag: s.tag().clone(),
                    label: col.label.clone(),
                    observations: s.len(),
                    duplicates_collapsed: s.duplicates_collapsed(),
                    estimated_step_seconds: estimate_step_seconds(&stamps),
                    cells_filled: col.filled_count(),
                    cells_missing: col.missing_count(),
                }
            })
            .collect();
        let report = AlignmentReport {
            rows: table.len(),
            tags,
            duplicate_rows_collapsed,
            warnings,
        };
        Ok((table, report))
    }
}

/// Resample (optional), outer-join, fill and verify (optional) fetched series.
///
/// Returns the table and the number of index rows collapsed by verification.
fn align_series(
    series: &[TagSeries],
    axis: TimeAxis,
    grid: Option<Vec<Timestamp>>,
    fill_limit: usize,
    verify_time: bool,
) -> Result<(MergedTable, usize), StrataError> {
    let inputs: Vec<Cow<'_, [Observation]>> = series
        .iter()
        .map(|s| match &grid {
            Some(g) => Cow::Owned(resample_to_grid(s.observations(), g)),
            None => Cow::Borrowed(s.observations()),
        })
        .collect();
    let slices: Vec<&[Observation]> = inputs.iter().map(|c| &**c).collect();
    let aligned = outer_join(&slices)?;

    let columns = series
        .iter()
        .zip(aligned.columns)
        .map(|(s, mut cells)| {
            forward_fill(&mut cells, fill_limit);
            Column {
                tag: s.tag().clone(),
                label: s.label().to_string(),
                cells,
            }
        })
        .collect();
    let table = MergedTable::from_parts(axis, aligned.index, columns)?;

    if verify_time {
        collapse_duplicate_rows(table)
    } else {
        Ok((table, 0))
    }
}

impl Strata {
    /// Start building a multi-tag merge.
    ///
    /// ```rust,ignore
    /// let table = strata
    ///     .merge()
    ///     .tags(&[flow, load])?
    ///     .window(start, end)
    ///     .fill_limit(10)
    ///     .run()
    ///     .await?;
    /// ```
    #[must_use]
    pub const fn merge(&self) -> MergeBuilder<'_> {
        MergeBuilder::new(self)
    }

    /// Concurrent fetches allowed for a merge over `tags`.
    ///
    /// The configured fetch concurrency, lowered to the tightest access mode
    /// among connectors that could serve any of the tags; never below one.
    pub(crate) fn merge_concurrency(&self, tags: &[TagId]) -> usize {
        self.connectors
            .iter()
            .filter(|c| c.as_history_provider().is_some())
            .filter(|c| tags.iter().any(|t| c.serves(t)))
            .map(|c| c.access_mode().max_in_flight())
            .fold(self.cfg.fetch_concurrency, usize::min)
            .max(1)
    }
}
