//! Document store access.
//!
//! The admin backend owns all vehicle, route and stop documents; this
//! module is the read-side boundary. The [`DocumentStore`] trait lets
//! the orchestrator run against the HTTP client, the cached wrapper or
//! an in-memory mock interchangeably.

mod client;
mod error;
mod mock;
mod types;

pub use client::{StoreClient, StoreConfig};
pub use error::StoreError;
pub use mock::MockStoreClient;
pub use types::{RouteStopsDoc, StopDoc, VehicleDoc};

use crate::domain::{Route, RouteVariant, Stop, Vehicle, VehicleId};

/// Read access to externally-owned fleet documents.
///
/// Every method may fail when the store is unreachable; callers decide
/// whether that fails a whole query (batch fetches) or just skips one
/// vehicle (per-vehicle fetches).
pub trait DocumentStore: Send + Sync {
    /// All vehicle documents.
    fn get_vehicles(&self) -> impl Future<Output = Result<Vec<Vehicle>, StoreError>> + Send;

    /// One vehicle document by id.
    fn get_vehicle(
        &self,
        id: &VehicleId,
    ) -> impl Future<Output = Result<Vehicle, StoreError>> + Send;

    /// A route's stop sequence from the given variant store.
    fn get_route(
        &self,
        id: &str,
        variant: RouteVariant,
    ) -> impl Future<Output = Result<Route, StoreError>> + Send;

    /// One stop by name (case-insensitive on the store side).
    fn get_stop(&self, name: &str) -> impl Future<Output = Result<Stop, StoreError>> + Send;

    /// All stop documents.
    fn get_all_stops(&self) -> impl Future<Output = Result<Vec<Stop>, StoreError>> + Send;
}
