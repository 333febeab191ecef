use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use strata_core::{Capability, HistorianConnector, RoutingPolicy, StrataConfig, StrataError, TagId};

/// Orchestrator that routes historian queries across registered connectors.
pub struct Strata {
    pub(crate) connectors: Vec<Arc<dyn HistorianConnector>>,
    pub(crate) cfg: StrataConfig,
}

/// Builder for constructing a `Strata` orchestrator with custom configuration.
pub struct StrataBuilder {
    connectors: Vec<Arc<dyn HistorianConnector>>,
    cfg: StrataConfig,
}

impl Default for StrataBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StrataBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Starts with no connectors; register at least one via
    /// [`with_connector`](Self::with_connector). Defaults: 5 s per connector
    /// call, no overall deadline, four concurrent fetches during a merge, and
    /// point validation before every fetch.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connectors: vec![],
            cfg: StrataConfig::default(),
        }
    }

    /// Register a historian connector.
    ///
    /// Registration order is the routing order unless a routing policy says
    /// otherwise. Connector names must be unique.
    #[must_use]
    pub fn with_connector(mut self, c: Arc<dyn HistorianConnector>) -> Self {
        self.connectors.push(c);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: StrataConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the connector ordering rules.
    ///
    /// Rules are keyed by `Site.Service`; a strict rule excludes connectors it
    /// does not list for that service.
    #[must_use]
    pub fn routing_policy(mut self, policy: RoutingPolicy) -> Self {
        self.cfg.routing_policy = policy;
        self
    }

    /// Set the timeout applied to every individual connector call.
    #[must_use]
    pub const fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.provider_timeout = timeout;
        self
    }

    /// Set an overall deadline for fan-out operations (multi-tag merges).
    ///
    /// When exceeded, the operation fails with `RequestTimeout`.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Upper bound on concurrent per-tag fetches during a merge.
    ///
    /// The effective bound is the minimum of this value and every eligible
    /// connector's declared access mode.
    #[must_use]
    pub const fn fetch_concurrency(mut self, n: usize) -> Self {
        self.cfg.fetch_concurrency = n;
        self
    }

    /// Toggle point validation before history retrieval.
    #[must_use]
    pub const fn validate_points(mut self, yes: bool) -> Self {
        self.cfg.validate_points = yes;
        self
    }

    /// Build the `Strata` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no connectors are registered, two connectors
    /// share a name, `fetch_concurrency` is zero, or the routing policy names
    /// a connector that was never registered.
    pub fn build(self) -> Result<Strata, StrataError> {
        if self.connectors.is_empty() {
            return Err(StrataError::InvalidArg(
                "no connectors registered; add at least one via with_connector(...)".to_string(),
            ));
        }

        let mut known: HashSet<&str> = HashSet::new();
        for c in &self.connectors {
            if !known.insert(c.name()) {
                return Err(StrataError::InvalidArg(format!(
                    "connector '{}' registered more than once",
                    c.name()
                )));
            }
        }

        if let Some(unknown) = self
            .cfg
            .routing_policy
            .referenced_connectors()
            .find(|n| !known.contains(*n))
        {
            return Err(StrataError::InvalidArg(format!(
                "routing policy references unknown connector '{unknown}'"
            )));
        }

        if self.cfg.fetch_concurrency == 0 {
            return Err(StrataError::InvalidArg(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(Strata {
            connectors: self.connectors,
            cfg: self.cfg,
        })
    }
}

/// Attribute a connector error to `connector` unless it already carries a
/// classification the router relies on.
pub fn tag_err(connector: &str, e: StrataError) -> StrataError {
    match e {
        e @ (StrataError::InvalidTag { .. }
        | StrataError::NotFound { .. }
        | StrataError::Connection { .. }
        | StrataError::ProviderTimeout { .. }
        | StrataError::Connector { .. }
        | StrataError::Unsupported { .. }
        | StrataError::RequestTimeout { .. }
        | StrataError::AllConnectorsTimedOut { .. }
        | StrataError::AllConnectorsFailed(_)
        | StrataError::Cancelled) => e,
        other => StrataError::Connector {
            connector: connector.to_string(),
            msg: other.to_string(),
        },
    }
}

/// Run `fut` under an optional overall deadline.
///
/// # Errors
/// Returns `RequestTimeout("request")` when the deadline elapses; call sites
/// remap the label to their capability.
pub(crate) async fn with_request_deadline<T, Fut>(
    deadline: Option<Duration>,
    fut: Fut,
) -> Result<T, StrataError>
where
    Fut: core::future::Future<Output = T>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| StrataError::request_timeout("request")),
        None => Ok(fut.await),
    }
}

impl Strata {
    /// Start building a new `Strata` instance.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use strata::Strata;
    /// use strata_mock::MockHistorian;
    ///
    /// let strata = Strata::builder()
    ///     .with_connector(Arc::new(MockHistorian::new()))
    ///     .provider_timeout(std::time::Duration::from_secs(2))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> StrataBuilder {
        StrataBuilder::new()
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &StrataConfig {
        &self.cfg
    }

    /// Wrap a connector future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "strata::core::provider_call_with_timeout",
            skip(fut),
            fields(
                connector = connector_name,
                capability = %capability,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn provider_call_with_timeout<T, Fut>(
        connector_name: &'static str,
        capability: Capability,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, StrataError>
    where
        Fut: core::future::Future<Output = Result<T, StrataError>>,
    {
        (tokio::time::timeout(timeout, fut).await).unwrap_or_else(|_| {
            Err(StrataError::provider_timeout(
                connector_name,
                capability.as_str(),
            ))
        })
    }

    /// Connectors in routing order for a `Site.Service`.
    ///
    /// Registration order, stably re-ranked by the routing policy; connectors
    /// excluded by a strict rule are dropped.
    pub(crate) fn ordered_for_service(&self, site_service: &str) -> Vec<Arc<dyn HistorianConnector>> {
        let mut out: Vec<(usize, usize, Arc<dyn HistorianConnector>)> = self
            .connectors
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                self.cfg
                    .routing_policy
                    .sort_key(site_service, c.name())
                    .map(|rank| (rank, i, Arc::clone(c)))
            })
            .collect();
        out.sort_by_key(|(rank, i, _)| (*rank, *i));
        out.into_iter().map(|(_, _, c)| c).collect()
    }

    /// Connectors in routing order that can reach the service hosting `tag`.
    pub(crate) fn ordered(&self, tag: &TagId) -> Vec<Arc<dyn HistorianConnector>> {
        self.ordered_for_service(tag.site_service())
            .into_iter()
            .filter(|c| c.serves(tag))
            .collect()
    }

    /// Try `connectors` in order until one succeeds.
    ///
    /// - `call` returns `None` for connectors lacking the capability; those are skipped.
    /// - Every call is bounded by the provider timeout.
    /// - A not-found answer falls through to the next connector; so does any
    ///   other failure, which is recorded.
    /// - If every attempt answered not-found, `not_found` is returned; other
    ///   outcomes are collapsed by [`collapse_errors`](crate::collapse_errors).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "strata::core::fetch_single",
            skip(self, connectors, not_found, call),
            fields(capability = %capability, candidates = connectors.len()),
        )
    )]
    pub(crate) async fn fetch_single<T, F, Fut>(
        &self,
        connectors: Vec<Arc<dyn HistorianConnector>>,
        capability: Capability,
        not_found: StrataError,
        call: F,
    ) -> Result<(T, Arc<dyn HistorianConnector>), StrataError>
    where
        T: Send,
        F: Fn(Arc<dyn HistorianConnector>) -> Option<Fut> + Send,
        Fut: core::future::Future<Output = Result<T, StrataError>> + Send,
    {
        let mut attempted_any = false;
        let mut errors: Vec<StrataError> = Vec::new();

        for c in connectors {
            let Some(fut) = call(Arc::clone(&c)) else {
                continue;
            };
            attempted_any = true;
            match Self::provider_call_with_timeout(c.name(), capability, self.cfg.provider_timeout, fut)
                .await
            {
                Ok(v) => return Ok((v, c)),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(connector = c.name(), error = %e, "connector attempt failed");
                    errors.push(tag_err(c.name(), e));
                }
            }
        }

        Err(crate::router::util::collapse_errors(
            capability,
            attempted_any,
            errors,
            Some(not_found),
        ))
    }
}
