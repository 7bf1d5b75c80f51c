//! Fleet query orchestration.
//!
//! This module answers the rider-facing question: "which vehicles run
//! a route that serves both of these stops, and where are they?". It
//! composes the document store, the stop registry, the matcher and the
//! live hub into one query path.

mod config;
mod orchestrator;

pub use config::SearchConfig;
pub use orchestrator::{FleetSearch, PositionFix, PositionSource, SearchError, SearchResult};
