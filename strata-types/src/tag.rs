//! Point identifiers of the form `Site.Service.Tag`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StrataError;

/// A validated historian point identifier.
///
/// The identifier has exactly three dot-separated components: the site, the
/// service, and the point name. The point name is everything after the second
/// dot and may itself contain dots. No normalization is applied: case and
/// whitespace are preserved verbatim, so two identifiers are equal only when
/// their text is byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagId {
    raw: String,
    site_end: usize,
    service_end: usize,
}

impl TagId {
    /// Parse and validate an identifier.
    ///
    /// # Errors
    /// Returns `InvalidTag` when the identifier does not split into three
    /// non-empty components.
    pub fn parse(raw: impl Into<String>) -> Result<Self, StrataError> {
        let raw = raw.into();
        let Some(site_end) = raw.find('.') else {
            return Err(StrataError::invalid_tag(raw));
        };
        let Some(rel) = raw[site_end + 1..].find('.') else {
            return Err(StrataError::invalid_tag(raw));
        };
        let service_end = site_end + 1 + rel;
        if site_end == 0 || service_end == site_end + 1 || service_end + 1 == raw.len() {
            return Err(StrataError::invalid_tag(raw));
        }
        Ok(Self {
            raw,
            site_end,
            service_end,
        })
    }

    /// Full identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Site component (before the first dot).
    #[must_use]
    pub fn site(&self) -> &str {
        &self.raw[..self.site_end]
    }

    /// Service component (between the first and second dot).
    #[must_use]
    pub fn service(&self) -> &str {
        &self.raw[self.site_end + 1..self.service_end]
    }

    /// Point name (everything after the second dot).
    #[must_use]
    pub fn point(&self) -> &str {
        &self.raw[self.service_end + 1..]
    }

    /// `Site.Service` prefix used to address a historian service directory.
    #[must_use]
    pub fn site_service(&self) -> &str {
        &self.raw[..self.service_end]
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for TagId {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TagId {
    type Error = StrataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for TagId {
    type Error = StrataError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TagId> for String {
    fn from(t: TagId) -> Self {
        t.raw
    }
}

impl AsRef<str> for TagId {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
