//! Middleware trait for wrapping `HistorianConnector` implementations.

use std::sync::Arc;

use crate::connector::HistorianConnector;

/// Trait implemented by connector middleware layers.
///
/// A middleware consumes an inner connector and returns a wrapped connector
/// that augments or restricts behavior (health tracking, serialized access).
pub trait Middleware: Send + Sync {
    /// Wrap `inner` and return the wrapped connector.
    fn apply(self: Box<Self>, inner: Arc<dyn HistorianConnector>) -> Arc<dyn HistorianConnector>;

    /// Middleware name for introspection and logging.
    fn name(&self) -> &'static str;

    /// Opaque configuration snapshot for serialization/inspection.
    fn config_json(&self) -> serde_json::Value;
}
