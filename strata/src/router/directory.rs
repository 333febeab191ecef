use std::collections::HashSet;

use crate::Strata;
use crate::core::tag_err;
use crate::router::util::{collapse_errors, join_with_deadline};
use strata_core::{Capability, PointInfo, ServiceInfo, StrataError};

impl Strata {
    /// List the historian services visible through every directory-capable connector.
    ///
    /// All connectors are queried concurrently; services are de-duplicated by
    /// name, keeping the first occurrence in registration order. Connectors that
    /// fail are ignored as long as at least one answers.
    ///
    /// # Errors
    /// Returns `Unsupported` if no connector enumerates services, the collapsed
    /// failures if every attempt failed, or `RequestTimeout` if the request
    /// deadline elapses.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "strata::router", skip(self))
    )]
    pub async fn services(&self) -> Result<Vec<ServiceInfo>, StrataError> {
        let call_timeout = self.cfg.provider_timeout;
        let tasks = self.connectors.iter().map(|c| async move {
            let name = c.name();
            match c.as_directory_provider() {
                Some(d) => {
                    let res = Self::provider_call_with_timeout(
                        name,
                        Capability::Directory,
                        call_timeout,
                        d.list_services(),
                    )
                    .await;
                    (name, true, res)
                }
                None => (name, false, Ok(vec![])),
            }
        });

        let joined = join_with_deadline(tasks, self.cfg.request_timeout)
            .await
            .map_err(|_| StrataError::request_timeout(Capability::Directory.as_str()))?;

        let mut merged: Vec<ServiceInfo> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut errors: Vec<StrataError> = Vec::new();
        let mut attempted_any = false;
        let mut succeeded_any = false;
        for (name, attempted, res) in joined {
            if !attempted {
                continue;
            }
            attempted_any = true;
            match res {
                Ok(list) => {
                    succeeded_any = true;
                    for svc in list {
                        if seen.insert(svc.name.clone()) {
                            merged.push(svc);
                        }
                    }
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(connector = name, error = %e, "service listing failed");
                    errors.push(tag_err(name, e));
                }
            }
        }

        if succeeded_any {
            return Ok(merged);
        }
        Err(collapse_errors(
            Capability::Directory,
            attempted_any,
            errors,
            None,
        ))
    }

    /// List the points registered on `site_service` (`Site.Service`).
    ///
    /// The first connector in routing order that knows the service answers.
    ///
    /// # Errors
    /// Returns `NotFound` if no connector knows the service, `Unsupported` if
    /// none enumerates points, or the collapsed connector failures.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(target = "strata::router", skip(self))
    )]
    pub async fn points(&self, site_service: &str) -> Result<Vec<PointInfo>, StrataError> {
        let svc = site_service.to_string();
        self.fetch_single(
            self.ordered_for_service(site_service),
            Capability::Directory,
            StrataError::not_found(format!("service {site_service}")),
            |c| {
                c.as_directory_provider()?;
                let svc = svc.clone();
                Some(async move {
                    match c.as_directory_provider() {
                        Some(d) => d.list_points(&svc).await,
                        None => Err(StrataError::connector(
                            c.name(),
                            "missing directory capability during call",
                        )),
                    }
                })
            },
        )
        .await
        .map(|(points, _)| points)
    }
}
