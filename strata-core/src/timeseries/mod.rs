//! Time-series utilities shared by connectors and the orchestrator.
//!
//! The merge pipeline runs `resample` (optional), `align`, `fill`, then
//! `verify` (optional). `sample` holds the reference semantics for the six
//! pull modes and `infer` estimates cadence for reporting.
/// K-way outer-join alignment.
pub mod align;
/// Bounded forward fill.
pub mod fill;
/// Cadence inference.
pub mod infer;
/// Shared-grid resampling.
pub mod resample;
/// Reference pull-mode semantics.
pub mod sample;
/// Duplicate-index verification.
pub mod verify;
