//! Validated single-tag pull requests.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::StrataError;
use crate::mode::PullMode;
use crate::tag::TagId;
use crate::time::{TimeAxis, parse_historian_time, parse_period};

/// How the resulting series is labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LabelPolicy {
    /// Use the tag identifier.
    TagName,
    /// Use the point description, falling back to the tag identifier.
    Description,
    /// Use a caller-supplied label.
    Override(String),
}

/// A validated request for one tag over one window.
///
/// Built through [`PullRequest::builder`]; every constructed value satisfies
/// `end > start`, and carries a positive period whenever its mode needs one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    tag: TagId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mode: PullMode,
    period_seconds: Option<i64>,
    high_speed: bool,
    utc: bool,
    label: LabelPolicy,
}

impl PullRequest {
    /// Start building a request for `tag`. Defaults to raw mode.
    #[must_use]
    pub fn builder(tag: TagId) -> PullRequestBuilder {
        PullRequestBuilder::new(tag)
    }

    /// Tag being queried.
    #[must_use]
    pub const fn tag(&self) -> &TagId {
        &self.tag
    }

    /// Inclusive window start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Inclusive window end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Retrieval mode.
    #[must_use]
    pub const fn mode(&self) -> PullMode {
        self.mode
    }

    /// Sampling period; always `None` for raw pulls.
    #[must_use]
    pub fn period(&self) -> Option<TimeDelta> {
        self.period_seconds.and_then(TimeDelta::try_seconds)
    }

    /// Whether the binding should use its high-speed archive.
    #[must_use]
    pub const fn high_speed(&self) -> bool {
        self.high_speed
    }

    /// Whether timestamps are returned as epoch integers.
    #[must_use]
    pub const fn utc(&self) -> bool {
        self.utc
    }

    /// Axis implied by the `utc` flag.
    #[must_use]
    pub const fn axis(&self) -> TimeAxis {
        TimeAxis::from_utc_flag(self.utc)
    }

    /// Labeling policy for the resulting series.
    #[must_use]
    pub const fn label_policy(&self) -> &LabelPolicy {
        &self.label
    }

    /// The subset of this request a historian binding needs.
    #[must_use]
    pub fn retrieval(&self) -> RetrievalQuery {
        RetrievalQuery {
            tag: self.tag.clone(),
            start: self.start,
            end: self.end,
            mode: self.mode,
            period: self.period(),
            high_speed: self.high_speed,
        }
    }
}

/// What a historian binding is asked to retrieve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    /// Tag being queried.
    pub tag: TagId,
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Inclusive window end.
    pub end: DateTime<Utc>,
    /// Retrieval mode.
    pub mode: PullMode,
    /// Sampling period for aggregated and snapshot modes.
    pub period: Option<TimeDelta>,
    /// High-speed archive flag.
    pub high_speed: bool,
}

/// Builder for [`PullRequest`]. Validation is deferred to [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct PullRequestBuilder {
    tag: TagId,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    mode: PullMode,
    period: Option<TimeDelta>,
    high_speed: bool,
    utc: bool,
    desc_as_label: bool,
    label: Option<String>,
}

impl PullRequestBuilder {
    /// New builder for `tag` in raw mode with no window.
    #[must_use]
    pub const fn new(tag: TagId) -> Self {
        Self {
            tag,
            start: None,
            end: None,
            mode: PullMode::Raw,
            period: None,
            high_speed: false,
            utc: false,
            desc_as_label: false,
            label: None,
        }
    }

    /// Set both window bounds.
    #[must_use]
    pub const fn window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Set both window bounds from historian time strings in `tz`.
    ///
    /// # Errors
    /// Returns `InvalidWindow` if either string fails to parse.
    pub fn window_str(self, start: &str, end: &str, tz: Tz) -> Result<Self, StrataError> {
        let s = parse_historian_time(start, tz)?;
        let e = parse_historian_time(end, tz)?;
        Ok(self.window(s, e))
    }

    /// Select the retrieval mode.
    #[must_use]
    pub const fn mode(mut self, mode: PullMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the sampling period.
    #[must_use]
    pub const fn period(mut self, period: TimeDelta) -> Self {
        self.period = Some(period);
        self
    }

    /// Set the sampling period from an `hh:mm:ss` string.
    ///
    /// # Errors
    /// Returns `InvalidWindow` if the string fails to parse.
    pub fn period_str(self, period: &str) -> Result<Self, StrataError> {
        Ok(self.period(parse_period(period)?))
    }

    /// Request the binding's high-speed archive.
    #[must_use]
    pub const fn high_speed(mut self, yes: bool) -> Self {
        self.high_speed = yes;
        self
    }

    /// Return epoch-integer timestamps instead of calendar instants.
    #[must_use]
    pub const fn utc(mut self, yes: bool) -> Self {
        self.utc = yes;
        self
    }

    /// Label the series with the point description.
    #[must_use]
    pub const fn desc_as_label(mut self, yes: bool) -> Self {
        self.desc_as_label = yes;
        self
    }

    /// Label the series with an explicit string. Takes precedence over
    /// [`desc_as_label`](Self::desc_as_label).
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validate and produce the request.
    ///
    /// # Errors
    /// Returns `InvalidWindow` when a bound is missing, `end <= start`, or the
    /// mode needs a period and none (or a non-positive one) was given.
    pub fn build(self) -> Result<PullRequest, StrataError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(StrataError::InvalidWindow(
                "both start and end must be set".into(),
            ));
        };
        if end <= start {
            return Err(StrataError::InvalidWindow(format!(
                "end ({end}) must be after start ({start})"
            )));
        }
        let period_seconds = if self.mode.requires_period() {
            let Some(p) = self.period else {
                return Err(StrataError::InvalidWindow(format!(
                    "mode '{}' requires a period",
                    self.mode
                )));
            };
            if p <= TimeDelta::zero() || p.subsec_nanos() != 0 {
                return Err(StrataError::InvalidWindow(format!(
                    "period must be a positive whole number of seconds, got {}s",
                    p.num_seconds()
                )));
            }
            Some(p.num_seconds())
        } else {
            None
        };
        let label = match (self.label, self.desc_as_label) {
            (Some(l), _) => LabelPolicy::Override(l),
            (None, true) => LabelPolicy::Description,
            (None, false) => LabelPolicy::TagName,
        };
        Ok(PullRequest {
            tag: self.tag,
            start,
            end,
            mode: self.mode,
            period_seconds,
            high_speed: self.high_speed,
            utc: self.utc,
            label,
        })
    }
}
