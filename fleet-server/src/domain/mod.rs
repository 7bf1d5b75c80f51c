//! Core domain types for the fleet tracker.
//!
//! These types are shared between the store layer, the live-location
//! hub and the search orchestrator. They carry no I/O.

mod coordinate;
mod route;
mod stop;
mod vehicle;

pub use coordinate::{Coordinate, InvalidCoordinate, Position};
pub use route::{Route, RouteVariant};
pub use stop::Stop;
pub use vehicle::{Vehicle, VehicleId, VehicleNumber, VehicleStatus};
