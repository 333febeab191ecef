use strata_core::{Capability, StrataError};

/// Join a collection of tasks and apply an optional request-level deadline.
///
/// This wraps `futures::future::join_all(tasks)` with `crate::core::with_request_deadline`.
/// On timeout, the inner helper returns `StrataError::RequestTimeout("request")` which
/// call sites can remap to a more specific capability label as needed.
pub async fn join_with_deadline<I, F, T>(
    tasks: I,
    deadline: Option<std::time::Duration>,
) -> Result<Vec<T>, StrataError>
where
    I: IntoIterator<Item = F>,
    F: core::future::Future<Output = T>,
{
    crate::core::with_request_deadline(deadline, futures::future::join_all(tasks)).await
}

/// Whether `e` means "this connector does not know the resource".
#[must_use]
pub const fn is_not_found(e: &StrataError) -> bool {
    matches!(
        e,
        StrataError::InvalidTag { .. } | StrataError::NotFound { .. }
    )
}

/// Collapse a set of connector errors into a uniform `StrataError` outcome.
///
/// Rules:
/// - If `attempted_any` is false → `Unsupported(capability)`.
/// - If all errors are `ProviderTimeout` → `AllConnectorsTimedOut(capability)`.
/// - If `not_found` is `Some` and all errors are `InvalidTag` or `NotFound` → `not_found`.
/// - Else → `AllConnectorsFailed(errors)`.
pub fn collapse_errors(
    capability: Capability,
    attempted_any: bool,
    errors: Vec<StrataError>,
    not_found: Option<StrataError>,
) -> StrataError {
    if !attempted_any {
        return StrataError::unsupported(capability.to_string());
    }
    if !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, StrataError::ProviderTimeout { .. }))
    {
        return StrataError::AllConnectorsTimedOut {
            capability: capability.to_string(),
        };
    }
    if let Some(nf) = not_found
        && !errors.is_empty()
        && errors.iter().all(is_not_found)
    {
        return nf;
    }
    StrataError::AllConnectorsFailed(errors)
}
