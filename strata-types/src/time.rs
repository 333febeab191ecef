//! Time axis primitives and historian time-string helpers.
//!
//! Historians address instants in two interchangeable ways: as integer epoch
//! seconds (the native "UTC" form) or as calendar instants. [`Timestamp`]
//! carries either form and orders them on one axis, so series pulled with
//! different flags still compare and merge correctly.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::StrataError;

/// Which representation a series or table uses for its timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeAxis {
    /// Integer seconds since the Unix epoch.
    Epoch,
    /// Calendar instants in UTC.
    #[default]
    Calendar,
}

impl TimeAxis {
    /// Axis selected by a request's `utc` flag.
    #[must_use]
    pub const fn from_utc_flag(utc: bool) -> Self {
        if utc { Self::Epoch } else { Self::Calendar }
    }
}

/// A discrete instant on the historian time axis.
///
/// Equality, ordering and hashing all use the underlying instant, so
/// `Epoch(60)` and the calendar instant one minute after the epoch are equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Integer seconds since the Unix epoch.
    Epoch(i64),
    /// Calendar instant in UTC.
    Calendar(DateTime<Utc>),
}

impl Timestamp {
    /// Build a timestamp on `axis` from epoch seconds.
    ///
    /// Returns `None` when the seconds fall outside the calendar range.
    #[must_use]
    pub fn from_epoch_on(axis: TimeAxis, secs: i64) -> Option<Self> {
        match axis {
            TimeAxis::Epoch => Some(Self::Epoch(secs)),
            TimeAxis::Calendar => DateTime::from_timestamp(secs, 0).map(Self::Calendar),
        }
    }

    fn key(&self) -> (i64, u32) {
        match self {
            Self::Epoch(s) => (*s, 0),
            Self::Calendar(dt) => (dt.timestamp(), dt.timestamp_subsec_nanos()),
        }
    }

    /// Whole seconds since the Unix epoch (sub-second parts are truncated).
    #[must_use]
    pub fn epoch_seconds(&self) -> i64 {
        self.key().0
    }

    /// Representation currently carried by this value.
    #[must_use]
    pub const fn axis(&self) -> TimeAxis {
        match self {
            Self::Epoch(_) => TimeAxis::Epoch,
            Self::Calendar(_) => TimeAxis::Calendar,
        }
    }

    /// The instant as a UTC calendar value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(s) => DateTime::from_timestamp(*s, 0),
            Self::Calendar(dt) => Some(*dt),
        }
    }

    /// Convert to the epoch-integer representation.
    #[must_use]
    pub fn to_epoch(&self) -> Self {
        Self::Epoch(self.epoch_seconds())
    }

    /// Convert to the calendar representation.
    #[must_use]
    pub fn to_calendar(&self) -> Option<Self> {
        self.as_datetime().map(Self::Calendar)
    }

    /// Convert to the representation used by `axis`.
    #[must_use]
    pub fn to_axis(&self, axis: TimeAxis) -> Option<Self> {
        match axis {
            TimeAxis::Epoch => Some(self.to_epoch()),
            TimeAxis::Calendar => self.to_calendar(),
        }
    }

    /// The instant rendered in a local time zone.
    #[must_use]
    pub fn in_timezone(&self, tz: Tz) -> Option<DateTime<Tz>> {
        self.as_datetime().map(|dt| dt.with_timezone(&tz))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Calendar(dt)
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Self::Epoch(secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epoch(s) => write!(f, "{s}"),
            Self::Calendar(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Accepted layouts for historian window bounds, most specific first.
pub const HISTORIAN_TIME_FORMATS: [&str; 2] = ["%m/%d/%y %H:%M:%S", "%m/%d/%y %H:%M"];

/// Parse a historian time string (`mm/dd/yy hh:mm:ss` or `mm/dd/yy hh:mm`)
/// interpreted as wall-clock time in `tz`.
///
/// Ambiguous wall-clock times (the repeated hour when clocks fall back) resolve
/// to the earlier instant; times inside a spring-forward gap are rejected.
///
/// # Errors
/// Returns `InvalidWindow` if the string matches neither layout or names a
/// wall-clock time that does not exist in `tz`.
pub fn parse_historian_time(s: &str, tz: Tz) -> Result<DateTime<Utc>, StrataError> {
    let s = s.trim();
    let naive = HISTORIAN_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| {
            StrataError::InvalidWindow(format!(
                "unrecognized time '{s}'; expected mm/dd/yy hh:mm:ss or mm/dd/yy hh:mm"
            ))
        })?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => Err(StrataError::InvalidWindow(format!(
            "'{s}' does not exist in {tz}"
        ))),
    }
}

/// Render an instant in the historian's `mm/dd/yy hh:mm:ss` layout for `tz`.
#[must_use]
pub fn format_historian_time(dt: DateTime<Utc>, tz: Tz) -> String {
    dt.with_timezone(&tz)
        .format(HISTORIAN_TIME_FORMATS[0])
        .to_string()
}

/// Parse an `hh:mm:ss` sampling period.
///
/// Hours may exceed 23; minutes and seconds must be below 60.
///
/// # Errors
/// Returns `InvalidWindow` for any other layout.
pub fn parse_period(s: &str) -> Result<TimeDelta, StrataError> {
    let bad = || StrataError::InvalidWindow(format!("unrecognized period '{s}'; expected hh:mm:ss"));
    let mut parts = s.trim().split(':');
    let (Some(h), Some(m), Some(sec), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(bad());
    };
    let h: i64 = h.parse().map_err(|_| bad())?;
    let m: i64 = m.parse().map_err(|_| bad())?;
    let sec: i64 = sec.parse().map_err(|_| bad())?;
    if h < 0 || !(0..60).contains(&m) || !(0..60).contains(&sec) {
        return Err(bad());
    }
    h.checked_mul(3600)
        .and_then(|hs| hs.checked_add(m * 60 + sec))
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(bad)
}

/// Render a period in the historian's `hh:mm:ss` layout.
#[must_use]
pub fn format_period(period: TimeDelta) -> String {
    let total = period.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
