use std::sync::Arc;

use chrono::DateTime;

use crate::Strata;
use crate::router::util::is_not_found;
use strata_core::{
    Capability, HistorianConnector, LabelPolicy, Observation, PointInfo, PullRequest,
    RawObservation, SeriesMeta, StrataError, TagSeries, Timestamp,
};

impl Strata {
    /// Retrieve one tag over one window as a validated series.
    ///
    /// Behavior:
    /// - When point validation is enabled the tag is resolved first; an
    ///   unknown tag fails with `InvalidTag` before any retrieval. A tag whose
    ///   `Site.Service` no connector serves is unknown as well.
    /// - Connectors are tried in routing order. Eligible connectors advertise
    ///   history, serve the tag's service, and support the requested mode.
    /// - Records outside `[start, end]` are discarded, and records sharing a
    ///   timestamp collapse to the one retrieved last.
    /// - Description and units come from the point directory when available;
    ///   a failed lookup never fails the fetch.
    ///
    /// An empty series means the historian holds no data in the window.
    ///
    /// # Errors
    /// Returns `InvalidTag` when the tag is unknown, `Unsupported` when no
    /// connector can serve the mode, timeout errors, or an aggregate of the
    /// individual connector failures. Connection loss is never reported as an
    /// empty series.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "strata::router",
            skip(self, req),
            fields(tag = %req.tag(), mode = %req.mode(), utc = req.utc()),
        )
    )]
    pub async fn fetch(&self, req: &PullRequest) -> Result<TagSeries, StrataError> {
        self.fetch_with_warnings(req).await.map(|(series, _)| series)
    }

    /// [`fetch`](Self::fetch), also returning the non-fatal issues met on the way.
    pub(crate) async fn fetch_with_warnings(
        &self,
        req: &PullRequest,
    ) -> Result<(TagSeries, Vec<StrataError>), StrataError> {
        let tag = req.tag();
        self.ensure_point(tag).await?;

        let candidates = self.ordered(tag);
        if candidates.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(site_service = tag.site_service(), "no connector serves this service");
            return Err(StrataError::invalid_tag(tag.as_str()));
        }

        let query = req.retrieval();
        let mode = query.mode;
        let (records, _used) = self
            .fetch_single(
                candidates,
                Capability::History,
                StrataError::invalid_tag(tag.as_str()),
                |c: Arc<dyn HistorianConnector>| {
                    let p = c.as_history_provider()?;
                    if !p.supported_modes().contains(&mode) {
                        return None;
                    }
                    let q = query.clone();
                    Some(async move {
                        match c.as_history_provider() {
                            Some(p) => p.retrieve(&q).await,
                            None => Err(StrataError::connector(
                                c.name(),
                                "missing history capability during call",
                            )),
                        }
                    })
                },
            )
            .await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(connector = _used.name(), records = records.len(), "history retrieved");

        let mut warnings = Vec::new();
        let info = match self.point_info(tag).await {
            Ok(info) => Some(info),
            Err(e) if is_not_found(&e) || !e.is_actionable() => {
                #[cfg(feature = "tracing")]
                tracing::debug!(tag = %tag, "no point metadata registered");
                None
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(tag = %tag, error = %e, "point metadata lookup failed");
                warnings.push(e);
                None
            }
        };

        let observations = to_observations(req, records)?;
        let meta = series_meta(req, info);
        let series = TagSeries::new(meta, observations);

        #[cfg(feature = "tracing")]
        {
            if series.duplicates_collapsed() > 0 {
                tracing::debug!(
                    tag = %tag,
                    collapsed = series.duplicates_collapsed(),
                    "duplicate timestamps collapsed"
                );
            }
        }

        Ok((series, warnings))
    }
}

fn to_observations(
    req: &PullRequest,
    records: Vec<RawObservation>,
) -> Result<Vec<Observation>, StrataError> {
    let window = req.start()..=req.end();
    let axis = req.axis();
    let mut out = Vec::with_capacity(records.len());
    for r in records {
        // compare whole instants so a fractional window bound is honored;
        // a timestamp beyond the calendar range is outside any window
        match DateTime::from_timestamp(r.ts, 0) {
            Some(at) if window.contains(&at) => {}
            _ => continue,
        }
        let ts = Timestamp::from_epoch_on(axis, r.ts).ok_or_else(|| {
            StrataError::Data(format!("timestamp {} out of calendar range", r.ts))
        })?;
        out.push(Observation {
            ts,
            value: r.value,
            status: r.status,
        });
    }
    Ok(out)
}

fn series_meta(req: &PullRequest, info: Option<PointInfo>) -> SeriesMeta {
    let (description, units) = info.map_or((None, None), |i| (i.description, i.units));
    let label = match req.label_policy() {
        LabelPolicy::Override(label) => label.clone(),
        LabelPolicy::Description => description
            .clone()
            .unwrap_or_else(|| req.tag().to_string()),
        LabelPolicy::TagName => req.tag().to_string(),
    };
    SeriesMeta {
        tag: req.tag().clone(),
        description,
        units,
        mode: req.mode(),
        label,
        axis: req.axis(),
    }
}
