//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::CachedStoreClient;
use crate::domain::Coordinate;
use crate::hub::{BroadcastFeed, LiveLocationHub};
use crate::routing::{EtaEstimator, RouteOptimizer, RoutingClient};
use crate::search::SearchConfig;
use crate::store::StoreClient;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached document store client
    pub store: Arc<CachedStoreClient<StoreClient>>,

    /// Live location hub
    pub hub: Arc<LiveLocationHub>,

    /// Feed the ingest endpoint publishes into
    pub feed: Arc<BroadcastFeed>,

    /// Arrival estimator against the routing provider
    pub estimator: Arc<EtaEstimator<RoutingClient>>,

    /// Stop-order optimizer for travel plans
    pub optimizer: Arc<RouteOptimizer<RoutingClient>>,

    /// The common destination every arrival estimate targets
    pub terminal: Coordinate,

    /// Fleet search configuration
    pub search: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        store: CachedStoreClient<StoreClient>,
        hub: Arc<LiveLocationHub>,
        feed: Arc<BroadcastFeed>,
        estimator: EtaEstimator<RoutingClient>,
        optimizer: RouteOptimizer<RoutingClient>,
        terminal: Coordinate,
        search: SearchConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            hub,
            feed,
            estimator: Arc::new(estimator),
            optimizer: Arc::new(optimizer),
            terminal,
            search: Arc::new(search),
        }
    }
}
