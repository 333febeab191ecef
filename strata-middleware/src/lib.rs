#![doc = include_str!("../README.md")]
//! strata-middleware
//!
//! Re-exports for middleware wrappers.

mod builder;
mod health;
mod serialize;

pub use crate::builder::ConnectorBuilder;
pub use crate::health::{ConnectionHealth, HealthMiddleware, HealthTrackingConnector};
pub use crate::serialize::{BindingGate, SerializeMiddleware, SerializedConnector};
