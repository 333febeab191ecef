//! Builder for composing connectors with middleware layers.
//!
//! # Middleware Ordering Convention
//!
//! Middleware layers form an "onion" around the raw connector:
//!
//! ```text
//! Caller
//!     ↓
//! Outermost Middleware (e.g., HealthTracking - short-circuits when the link is down)
//!     ↓
//! Inner Middleware (e.g., Serialized - one call at a time on the binding)
//!     ↓
//! Raw Connector (the historian binding)
//! ```
//!
//! The `layers` vector stores middleware in **outermost-first** order and is
//! applied in reverse during `build()`. Health tracking is always inserted
//! outermost so it sees gate waits as part of the call; serialization is
//! always inserted innermost so the gate covers only the binding itself.
//!
//! ```text
//! builder.serialized().with_health(..)
//!
//! Storage: [HealthTracking, Serialized]
//! Result:  HealthTracking(Serialized(Raw))
//! ```
//!
//! This convention matches [`MiddlewareStack`](strata_types::MiddlewareStack)
//! where `layers[0]` is the outermost layer.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use strata_core::Middleware;
use strata_core::connector::HistorianConnector;
use strata_types::{MiddlewareLayer, MiddlewareStack};

use crate::health::{ConnectionHealth, HealthMiddleware};
use crate::serialize::{BindingGate, SerializeMiddleware};

const HEALTH: &str = "HealthTrackingConnector";
const SERIALIZED: &str = "SerializedConnector";

/// Generic middleware builder for composing a connector with layered wrappers.
///
/// See [module-level documentation](self) for details on middleware ordering.
pub struct ConnectorBuilder {
    raw: Arc<dyn HistorianConnector>,
    /// Middleware layers in outermost-first order.
    layers: Vec<Box<dyn Middleware>>,
}

impl ConnectorBuilder {
    /// Create a new builder from a raw, unwrapped connector.
    #[must_use]
    pub fn new(raw: Arc<dyn HistorianConnector>) -> Self {
        Self {
            raw,
            layers: Vec::new(),
        }
    }

    /// Add or replace connection-health tracking at the outermost position.
    ///
    /// `trip_after` consecutive connection failures open the breaker for
    /// `cooldown`; `0` disables tripping.
    #[must_use]
    pub fn with_health(mut self, health: ConnectionHealth, trip_after: u32, cooldown: Duration) -> Self {
        self.layers.retain(|m| m.name() != HEALTH);
        self.layers
            .insert(0, Box::new(HealthMiddleware::new(health, trip_after, cooldown)));
        self
    }

    /// Remove health tracking if present.
    #[must_use]
    pub fn without_health(mut self) -> Self {
        self.layers.retain(|m| m.name() != HEALTH);
        self
    }

    /// Add or replace serialized access (fresh gate) at the innermost position.
    #[must_use]
    pub fn serialized(mut self) -> Self {
        self.layers.retain(|m| m.name() != SERIALIZED);
        self.layers.push(Box::new(SerializeMiddleware::new()));
        self
    }

    /// Add or replace serialized access behind a shared gate at the innermost position.
    #[must_use]
    pub fn serialized_with(mut self, gate: BindingGate) -> Self {
        self.layers.retain(|m| m.name() != SERIALIZED);
        self.layers.push(Box::new(SerializeMiddleware::sharing(gate)));
        self
    }

    /// Remove serialized access if present.
    #[must_use]
    pub fn without_serialization(mut self) -> Self {
        self.layers.retain(|m| m.name() != SERIALIZED);
        self
    }

    /// Add an arbitrary middleware layer at the outermost position.
    #[must_use]
    pub fn layer(mut self, layer: Box<dyn Middleware>) -> Self {
        self.layers.insert(0, layer);
        self
    }

    /// Export the current middleware stack configuration for inspection.
    ///
    /// The raw connector is appended as the innermost "layer" for observability.
    #[must_use]
    pub fn to_stack(&self) -> MiddlewareStack {
        let mut stack = MiddlewareStack::new();
        for layer in &self.layers {
            stack.push_inner(MiddlewareLayer::new(layer.name(), layer.config_json()));
        }
        stack.push_inner(MiddlewareLayer::new(
            "RawConnector",
            json!({ "name": self.raw.name() }),
        ));
        stack
    }

    /// Construct a builder from a raw connector and an explicit stack.
    ///
    /// Health layers get a fresh [`ConnectionHealth`] and serialized layers a
    /// fresh gate, since neither handle survives serialization. Unknown layer
    /// names are ignored.
    #[must_use]
    pub fn from_stack(raw: Arc<dyn HistorianConnector>, stack: &MiddlewareStack) -> Self {
        let mut layers: Vec<Box<dyn Middleware>> = Vec::new();
        for l in &stack.layers {
            match l.name.as_str() {
                HEALTH => {
                    let trip_after = l
                        .config
                        .get("trip_after")
                        .and_then(serde_json::Value::as_u64)
                        .and_then(|v| u32::try_from(v).ok())
                        .unwrap_or(3);
                    let cooldown_ms = l
                        .config
                        .get("cooldown_ms")
                        .and_then(serde_json::Value::as_u64)
                        .unwrap_or(30_000);
                    layers.push(Box::new(HealthMiddleware::new(
                        ConnectionHealth::new(),
                        trip_after,
                        Duration::from_millis(cooldown_ms),
                    )));
                }
                SERIALIZED => layers.push(Box::new(SerializeMiddleware::new())),
                _ => {}
            }
        }
        Self { raw, layers }
    }

    /// Build the wrapped connector, applying layers innermost first.
    #[must_use]
    pub fn build(self) -> Arc<dyn HistorianConnector> {
        let mut acc: Arc<dyn HistorianConnector> = Arc::clone(&self.raw);
        for m in self.layers.into_iter().rev() {
            acc = m.apply(acc);
        }
        acc
    }
}
