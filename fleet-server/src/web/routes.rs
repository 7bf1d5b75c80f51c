//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::warn;

use crate::domain::{Coordinate, VehicleId, VehicleNumber};
use crate::hub::{RawSample, channel_for};
use crate::routing::Waypoint;
use crate::search::{FleetSearch, PositionFix, PositionSource, SearchError};
use crate::stops::StopIndex;
use crate::store::{DocumentStore, StoreError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search", get(search))
        .route("/api/vehicles", get(list_vehicles))
        .route("/api/vehicles/:id/position", get(vehicle_position))
        .route("/api/vehicles/:id/eta", get(vehicle_eta))
        .route("/api/vehicles/:id/route", get(vehicle_route))
        .route("/api/locations", post(report_location))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search for vehicles serving a trip between two stops.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let search = FleetSearch::new(state.store.as_ref(), &state.hub, &state.search);
    let mut results = search.search(&query.source, &query.dest).await?;
    results.sort_by(|a, b| a.vehicle.number.cmp(&b.vehicle.number));

    Ok(Json(SearchResponse {
        matches: results.into_iter().map(VehicleMatch::from).collect(),
    }))
}

/// List the fleet, sorted by vehicle number.
async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<VehiclesResponse>, AppError> {
    let mut vehicles = state.store.get_vehicles().await?;
    vehicles.sort_by(|a, b| a.number.cmp(&b.number));

    Ok(Json(VehiclesResponse {
        vehicles: vehicles.iter().map(VehicleSummary::from).collect(),
    }))
}

/// The freshest position for one vehicle.
async fn vehicle_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PositionResult>, AppError> {
    let id = VehicleId::new(id);
    let fix = position_fix(&state, &id).await?;
    Ok(Json(PositionResult::from(fix)))
}

/// Estimated arrival at the terminal for one vehicle.
async fn vehicle_eta(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EtaResponse>, AppError> {
    let id = VehicleId::new(id);
    let fix = position_fix(&state, &id).await?;

    let estimate = state
        .estimator
        .estimate(fix.position.coord, state.terminal)
        .await;
    Ok(Json(EtaResponse::from_estimate(id.as_str(), estimate)))
}

/// A vehicle's travel plan: its current position, the route's placed
/// stops in optimized visiting order, then the terminal. The optimizer
/// degrades to the route's own stop order on any provider trouble, so
/// this never fails once the route is resolved.
async fn vehicle_route(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TravelPlanResponse>, AppError> {
    let id = VehicleId::new(id);
    let vehicle = state.store.get_vehicle(&id).await?;
    let Some(route_id) = vehicle.route_id.as_deref() else {
        return Err(AppError::NotFound {
            message: format!("vehicle {} has no route assigned", id.as_str()),
        });
    };

    let route = state.store.get_route(route_id, vehicle.variant).await?;
    let index = StopIndex::from_stops(state.store.get_all_stops().await?);
    let fix = position_fix(&state, &id).await?;

    let waypoints = travel_waypoints(fix.position.coord, &route.stops, &index, state.terminal);
    let ordered = state.optimizer.optimize(waypoints).await;

    Ok(Json(TravelPlanResponse {
        vehicle_id: id.as_str().to_string(),
        waypoints: ordered.into_iter().map(RouteWaypoint::from).collect(),
    }))
}

/// Ingest a position report by publishing it to the vehicle's feed
/// channel. Malformed coordinates are accepted here and rejected by
/// the hub's validation, the same as any other feed sample.
async fn report_location(
    State(state): State<AppState>,
    Json(report): Json<LocationReport>,
) -> Result<StatusCode, AppError> {
    let number = report.vehicle_number.trim();
    if number.is_empty() {
        return Err(AppError::BadRequest {
            message: "vehicle_number is required".to_string(),
        });
    }

    let channel = channel_for(&VehicleNumber::new(number));
    state.feed.publish(
        &channel,
        RawSample {
            lat: report.latitude,
            lng: report.longitude,
            recorded_at: report.timestamp,
        },
    );

    Ok(StatusCode::ACCEPTED)
}

/// Waypoints for a travel plan: the vehicle's position, each placed
/// stop of the route in route order, the terminal. Unresolved stops
/// are dropped, as in search geometry.
fn travel_waypoints(
    start: Coordinate,
    route_stops: &[String],
    index: &StopIndex,
    terminal: Coordinate,
) -> Vec<Waypoint> {
    let mut waypoints = Vec::with_capacity(route_stops.len() + 2);
    waypoints.push(Waypoint {
        id: "vehicle".to_string(),
        coord: start,
    });
    for name in route_stops {
        if let Some(coord) = index.coordinate(name) {
            waypoints.push(Waypoint {
                id: name.clone(),
                coord,
            });
        }
    }
    waypoints.push(Waypoint {
        id: "terminal".to_string(),
        coord: terminal,
    });
    waypoints
}

/// Resolve a vehicle's position: live hub cache first, then the static
/// fix on the vehicle document.
async fn position_fix(state: &AppState, id: &VehicleId) -> Result<PositionFix, AppError> {
    if let Some(position) = state.hub.current_position(id).await {
        return Ok(PositionFix {
            position,
            source: PositionSource::Live,
        });
    }

    let vehicle = state.store.get_vehicle(id).await?;
    vehicle
        .last_known_location
        .map(|position| PositionFix {
            position,
            source: PositionSource::Static,
        })
        .ok_or_else(|| AppError::NotFound {
            message: format!("no position recorded for vehicle {}", id.as_str()),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::VehicleNotFound(_)
            | StoreError::RouteNotFound(_)
            | StoreError::StopNotFound(_) => AppError::NotFound {
                message: e.to_string(),
            },
            e if e.is_unavailable() => AppError::Unavailable {
                message: e.to_string(),
            },
            e => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::InvalidQuery(message) => AppError::BadRequest { message },
            SearchError::Store(e) => AppError::from(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!("request failed with {status}: {message}");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
