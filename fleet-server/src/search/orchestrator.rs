//! Fleet search orchestration.
//!
//! Answers "which vehicles serve a trip from A to B, and where are
//! they right now?". Fetches the fleet and stop registry, fans out one
//! route lookup per vehicle, filters by stop matching and attaches the
//! freshest position available for each match.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::domain::{Coordinate, Position, Vehicle};
use crate::hub::LiveLocationHub;
use crate::matcher;
use crate::stops::{StopIndex, normalize};
use crate::store::{DocumentStore, StoreError};

use super::config::SearchConfig;

/// Error from a fleet search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query itself is unusable.
    #[error("invalid search query: {0}")]
    InvalidQuery(String),

    /// A fleet-wide store fetch failed.
    #[error("document store error: {0}")]
    Store(#[from] StoreError),
}

/// Where a match's position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    /// The live hub's cached feed sample.
    Live,
    /// The static fix recorded on the vehicle document.
    Static,
}

/// A position together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub position: Position,
    pub source: PositionSource,
}

/// One vehicle that serves the queried trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub vehicle: Vehicle,

    /// The route's stop names in sequence.
    pub route_stops: Vec<String>,

    /// Registered coordinates of the queried stops, when placed.
    pub source_coord: Option<Coordinate>,
    pub dest_coord: Option<Coordinate>,

    /// Coordinates of every placed stop on the route, in route order.
    pub route_coords: Vec<Coordinate>,

    /// The vehicle's position, or `None` when neither the hub nor the
    /// vehicle document has one.
    pub position: Option<PositionFix>,
}

/// Fleet search orchestrator.
///
/// Borrows its collaborators so one store, hub and config can serve
/// every request.
pub struct FleetSearch<'a, S: DocumentStore> {
    store: &'a S,
    hub: &'a LiveLocationHub,
    config: &'a SearchConfig,
}

impl<'a, S: DocumentStore> FleetSearch<'a, S> {
    pub fn new(store: &'a S, hub: &'a LiveLocationHub, config: &'a SearchConfig) -> Self {
        Self { store, hub, config }
    }

    /// Search for vehicles serving a trip from `source` to `dest`.
    ///
    /// Results follow the fleet roster order; callers that need a
    /// particular ordering sort the returned vector. An empty result
    /// is a successful answer (no vehicle serves that trip); store
    /// outages surface as [`SearchError::Store`] instead.
    pub async fn search(&self, source: &str, dest: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.search_at(source, dest, Utc::now()).await
    }

    /// Search with an explicit "now", used for position staleness.
    pub async fn search_at(
        &self,
        source: &str,
        dest: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        // Query validation happens before any store traffic.
        let source_key = normalize(source);
        let dest_key = normalize(dest);
        if source_key.is_empty() || dest_key.is_empty() {
            return Err(SearchError::InvalidQuery(
                "source and destination stops are required".to_string(),
            ));
        }
        if source_key == dest_key {
            return Err(SearchError::InvalidQuery(
                "source and destination are the same stop".to_string(),
            ));
        }

        let (vehicles, stops) =
            futures::future::try_join(self.store.get_vehicles(), self.store.get_all_stops())
                .await?;
        let index = StopIndex::from_stops(stops);
        let source_coord = index.coordinate(source);
        let dest_coord = index.coordinate(dest);

        // One route lookup per assigned vehicle, bounded individually;
        // a slow or missing route drops that vehicle, not the query.
        let timeout = std::time::Duration::from_secs(self.config.vehicle_timeout_secs);
        let candidates: Vec<(Vehicle, String)> = vehicles
            .into_iter()
            .filter_map(|v| {
                let route_id = v.route_id.clone()?;
                Some((v, route_id))
            })
            .collect();

        let lookups = candidates.into_iter().map(|(vehicle, route_id)| async move {
            match tokio::time::timeout(timeout, self.store.get_route(&route_id, vehicle.variant))
                .await
            {
                Ok(Ok(route)) => Some((vehicle, route)),
                Ok(Err(e)) => {
                    warn!(
                        vehicle = %vehicle.number,
                        route = %route_id,
                        "route lookup failed, skipping vehicle: {e}"
                    );
                    None
                }
                Err(_) => {
                    warn!(
                        vehicle = %vehicle.number,
                        route = %route_id,
                        "route lookup timed out, skipping vehicle"
                    );
                    None
                }
            }
        });
        let routed = futures::future::join_all(lookups).await;

        let mut results = Vec::new();
        for (vehicle, route) in routed.into_iter().flatten() {
            if !matcher::matches(&route.stops, source, dest, self.config.strict_order) {
                continue;
            }

            let route_coords = matcher::coordinates_for(&route.stops, &index);
            let position = self.position_for(&vehicle, now).await;
            results.push(SearchResult {
                route_stops: route.stops,
                source_coord,
                dest_coord,
                route_coords,
                position,
                vehicle,
            });
        }

        Ok(results)
    }

    /// The freshest acceptable position for a vehicle: the hub's live
    /// cache first, then the document's static fix.
    async fn position_for(&self, vehicle: &Vehicle, now: DateTime<Utc>) -> Option<PositionFix> {
        let live = match self.config.max_position_age_secs {
            Some(secs) => {
                self.hub
                    .position_no_older_than(&vehicle.id, Duration::seconds(secs as i64), now)
                    .await
            }
            None => self.hub.current_position(&vehicle.id).await,
        };

        if let Some(position) = live {
            return Some(PositionFix {
                position,
                source: PositionSource::Live,
            });
        }

        vehicle.last_known_location.map(|position| PositionFix {
            position,
            source: PositionSource::Static,
        })
    }
}
