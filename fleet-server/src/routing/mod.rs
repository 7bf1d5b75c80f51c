//! External routing provider integration.
//!
//! Wraps an OpenRouteService-style HTTP API behind the
//! [`RoutingProvider`] trait, and builds the two consumers on top:
//! [`EtaEstimator`] (directions with a deterministic local fallback)
//! and [`RouteOptimizer`] (waypoint reordering with graceful
//! degradation). Provider failures never escape this module.

mod client;
mod error;
mod eta;
mod optimize;

pub use client::{RoutingClient, RoutingConfig};
pub use error::RoutingError;
pub use eta::{EtaConfig, EtaEstimate, EtaEstimator, EtaSource};
pub use optimize::{RouteOptimizer, Waypoint};

use crate::domain::Coordinate;

/// Summary of a routed leg between two coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// One interior waypoint submitted to the optimization endpoint.
///
/// Job ids are assigned by the caller and echoed back by the provider
/// in visiting order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Job {
    pub id: u32,
    pub location: Coordinate,
}

/// A third-party routing service.
pub trait RoutingProvider: Send + Sync {
    /// Road distance and travel time between two coordinates.
    fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<RouteSummary, RoutingError>> + Send;

    /// Visiting order for `jobs` on a trip from `start` to `end`,
    /// as a sequence of job ids.
    fn optimize(
        &self,
        start: Coordinate,
        jobs: &[Job],
        end: Coordinate,
    ) -> impl Future<Output = Result<Vec<u32>, RoutingError>> + Send;
}
