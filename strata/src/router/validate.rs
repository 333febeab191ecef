use crate::Strata;
use crate::core::tag_err;
use crate::router::util::{collapse_errors, is_not_found};
use strata_core::{Capability, StrataError, TagId};

impl Strata {
    /// Check whether `tag` is registered on its historian service.
    ///
    /// Matching is exact: no whitespace trimming and no case folding, so a
    /// differently-cased identifier is not found. An unreachable directory
    /// reports `false` rather than an error; callers that need to tell
    /// "absent" from "unavailable" should consult connection health.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "strata::router", skip(self), fields(tag = %tag))
    )]
    pub async fn exists(&self, tag: &TagId) -> bool {
        match self.lookup_point(tag).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(tag = %tag, "no connector can resolve points; treating as not found");
                false
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(tag = %tag, error = %_e, "point lookup failed; treating as not found");
                false
            }
        }
    }

    /// Like [`exists`](Self::exists) for an unparsed identifier.
    ///
    /// A string that is not a well-formed `Site.Service.Tag` is not found.
    pub async fn exists_str(&self, raw: &str) -> bool {
        match TagId::parse(raw) {
            Ok(tag) => self.exists(&tag).await,
            Err(_) => false,
        }
    }

    /// Resolve `tag` against every connector serving it.
    ///
    /// A connector answers through its `PointProvider`, or failing that by
    /// scanning `DirectoryProvider::list_points` for the tag's service.
    /// Returns `Some(true)` on the first positive answer, `Some(false)` when
    /// every serving connector answered no, and `None` when at least one
    /// serving connector cannot answer (or none serves the tag).
    ///
    /// # Errors
    /// Returns the collapsed connector errors when no connector found the tag
    /// and at least one failed for a reason other than not-found.
    pub(crate) async fn lookup_point(&self, tag: &TagId) -> Result<Option<bool>, StrataError> {
        let mut answered = false;
        let mut undecided = false;
        let mut errors: Vec<StrataError> = Vec::new();

        for c in self.ordered(tag) {
            let outcome = if let Some(p) = c.as_point_provider() {
                Self::provider_call_with_timeout(
                    c.name(),
                    Capability::Points,
                    self.cfg.provider_timeout,
                    p.point_exists(tag),
                )
                .await
            } else if let Some(d) = c.as_directory_provider() {
                Self::provider_call_with_timeout(
                    c.name(),
                    Capability::Directory,
                    self.cfg.provider_timeout,
                    d.list_points(tag.site_service()),
                )
                .await
                .map(|points| points.iter().any(|p| &p.tag == tag))
            } else {
                undecided = true;
                continue;
            };

            match outcome {
                Ok(true) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(connector = c.name(), tag = %tag, "point resolved");
                    return Ok(Some(true));
                }
                Ok(false) => answered = true,
                Err(e) if is_not_found(&e) => answered = true,
                Err(e) => errors.push(tag_err(c.name(), e)),
            }
        }

        if !errors.is_empty() {
            return Err(collapse_errors(Capability::Points, true, errors, None));
        }
        if undecided {
            return Ok(None);
        }
        Ok(answered.then_some(false))
    }

    /// Gate a history retrieval on point validation when it is enabled.
    pub(crate) async fn ensure_point(&self, tag: &TagId) -> Result<(), StrataError> {
        if !self.cfg.validate_points {
            return Ok(());
        }
        match self.lookup_point(tag).await? {
            Some(false) => Err(StrataError::invalid_tag(tag.as_str())),
            Some(true) | None => Ok(()),
        }
    }
}
