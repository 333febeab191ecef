//! strata-core
//!
//! Connector traits and time-series primitives shared across the strata
//! historian query engine.
//!
//! - `types`: the data model re-exported from `strata-types` (tags, pull
//!   modes, requests, series, merged tables, errors).
//! - `connector`: the `HistorianConnector` trait and capability provider traits.
//! - `timeseries`: sampling, resampling, outer-join alignment, bounded forward
//!   fill and duplicate verification used by the merge pipeline.
//!
//! Async runtime
//! -------------
//! Provider traits are `async_trait` based and runtime-agnostic; the
//! orchestrator in the `strata` crate drives them under Tokio.
//!
#![warn(missing_docs)]

/// Connector capability traits and the primary `HistorianConnector` interface.
pub mod connector;
/// Polars conversions for series and merged tables.
#[cfg(feature = "dataframe")]
pub mod dataframe;
/// Middleware trait implemented by connector wrappers.
pub mod middleware;
/// Time-series utilities for sampling, aligning and filling historian data.
pub mod timeseries;
pub mod types;

pub use connector::HistorianConnector;
pub use middleware::Middleware;
pub use timeseries::align::{Aligned, outer_join};
pub use timeseries::fill::forward_fill;
pub use timeseries::infer::estimate_step_seconds;
pub use timeseries::resample::{grid, resample_to_grid};
pub use timeseries::sample::sample;
pub use timeseries::verify::collapse_duplicate_rows;
pub use types::*;
