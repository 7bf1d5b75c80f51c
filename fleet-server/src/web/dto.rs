//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coordinate, RouteVariant, Vehicle, VehicleStatus};
use crate::routing::{EtaEstimate, EtaSource, Waypoint};
use crate::search::{PositionFix, PositionSource, SearchResult};

/// Query for a fleet search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Boarding stop name
    pub source: String,

    /// Alighting stop name
    pub dest: String,
}

/// A latitude/longitude pair.
#[derive(Debug, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinate> for LatLng {
    fn from(coord: Coordinate) -> Self {
        Self {
            lat: coord.lat,
            lng: coord.lng,
        }
    }
}

/// A vehicle position with provenance.
#[derive(Debug, Serialize)]
pub struct PositionResult {
    pub lat: f64,
    pub lng: f64,

    /// When the position was recorded, if known
    pub recorded_at: Option<DateTime<Utc>>,

    /// "live" (feed sample) or "static" (vehicle document)
    pub source: &'static str,
}

impl From<PositionFix> for PositionResult {
    fn from(fix: PositionFix) -> Self {
        Self {
            lat: fix.position.coord.lat,
            lng: fix.position.coord.lng,
            recorded_at: fix.position.recorded_at,
            source: match fix.source {
                PositionSource::Live => "live",
                PositionSource::Static => "static",
            },
        }
    }
}

/// One vehicle in search results.
#[derive(Debug, Serialize)]
pub struct VehicleMatch {
    pub vehicle_id: String,
    pub vehicle_number: String,

    /// Stop names in route order
    pub route_stops: Vec<String>,

    /// Registered coordinates of the queried stops (absent when the
    /// stop has no map placement)
    pub source_coord: Option<LatLng>,
    pub dest_coord: Option<LatLng>,

    /// Coordinates of every placed stop on the route
    pub route_coords: Vec<LatLng>,

    /// The vehicle's position, if any source has one
    pub position: Option<PositionResult>,
}

impl From<SearchResult> for VehicleMatch {
    fn from(result: SearchResult) -> Self {
        Self {
            vehicle_id: result.vehicle.id.as_str().to_string(),
            vehicle_number: result.vehicle.number.as_str().to_string(),
            route_stops: result.route_stops,
            source_coord: result.source_coord.map(LatLng::from),
            dest_coord: result.dest_coord.map(LatLng::from),
            route_coords: result.route_coords.into_iter().map(LatLng::from).collect(),
            position: result.position.map(PositionResult::from),
        }
    }
}

/// Response for a fleet search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub matches: Vec<VehicleMatch>,
}

/// One vehicle in the fleet listing.
#[derive(Debug, Serialize)]
pub struct VehicleSummary {
    pub id: String,
    pub number: String,
    pub route_id: Option<String>,

    /// "default" or "modified"
    pub route_variant: &'static str,

    /// "active" or "inactive"
    pub status: &'static str,
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id.as_str().to_string(),
            number: vehicle.number.as_str().to_string(),
            route_id: vehicle.route_id.clone(),
            route_variant: match vehicle.variant {
                RouteVariant::Default => "default",
                RouteVariant::Modified => "modified",
            },
            status: match vehicle.status {
                VehicleStatus::Active => "active",
                VehicleStatus::Inactive => "inactive",
            },
        }
    }
}

/// Response for the fleet listing.
#[derive(Debug, Serialize)]
pub struct VehiclesResponse {
    pub vehicles: Vec<VehicleSummary>,
}

/// Response for an arrival estimate.
#[derive(Debug, Serialize)]
pub struct EtaResponse {
    pub vehicle_id: String,
    pub distance_km: f64,

    /// Travel time rounded to whole minutes for display
    pub duration_mins: i64,

    pub arrival_time: DateTime<Utc>,
    pub delayed: bool,

    /// "provider" (road routing) or "fallback" (straight line)
    pub source: &'static str,
}

impl EtaResponse {
    pub fn from_estimate(vehicle_id: &str, estimate: EtaEstimate) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            distance_km: estimate.distance_km,
            duration_mins: estimate.duration_min.round() as i64,
            arrival_time: estimate.arrival_time,
            delayed: estimate.delayed,
            source: match estimate.source {
                EtaSource::Provider => "provider",
                EtaSource::Fallback => "fallback",
            },
        }
    }
}

/// One waypoint of a travel plan.
#[derive(Debug, Serialize)]
pub struct RouteWaypoint {
    /// Stop name, or "vehicle"/"terminal" for the fixed endpoints
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<Waypoint> for RouteWaypoint {
    fn from(waypoint: Waypoint) -> Self {
        Self {
            name: waypoint.id,
            lat: waypoint.coord.lat,
            lng: waypoint.coord.lng,
        }
    }
}

/// Response for a vehicle's travel plan.
#[derive(Debug, Serialize)]
pub struct TravelPlanResponse {
    pub vehicle_id: String,

    /// Waypoints in visiting order, vehicle position first and the
    /// terminal last
    pub waypoints: Vec<RouteWaypoint>,
}

/// A position report from a vehicle's tracking device.
///
/// Coordinates are optional on purpose: devices send whatever they
/// have, and validation happens downstream in the hub.
#[derive(Debug, Deserialize)]
pub struct LocationReport {
    pub vehicle_number: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
