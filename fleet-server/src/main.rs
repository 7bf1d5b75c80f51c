use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fleet_server::cache::{CacheConfig, CachedStoreClient};
use fleet_server::domain::{Coordinate, VehicleStatus};
use fleet_server::hub::{BroadcastFeed, LiveLocationHub};
use fleet_server::routing::{EtaConfig, EtaEstimator, RouteOptimizer, RoutingClient, RoutingConfig};
use fleet_server::search::SearchConfig;
use fleet_server::store::{DocumentStore, StoreClient, StoreConfig};
use fleet_server::web::{AppState, create_router};

/// How often to reconcile hub subscriptions with the fleet roster.
const FLEET_SYNC_INTERVAL: Duration = Duration::from_secs(60);

/// Default terminal coordinate used when none is configured.
const DEFAULT_TERMINAL: (f64, f64) = (12.7516, 80.1932);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Get configuration from environment
    let store_url = std::env::var("STORE_BASE_URL").unwrap_or_else(|_| {
        eprintln!("Warning: STORE_BASE_URL not set, using http://127.0.0.1:8000");
        "http://127.0.0.1:8000".to_string()
    });
    let routing_key = std::env::var("ROUTING_API_KEY").unwrap_or_else(|_| {
        eprintln!("Warning: ROUTING_API_KEY not set. Arrival estimates will use the fallback.");
        String::new()
    });
    let terminal = terminal_from_env();

    // Create the cached document store client
    let store_client =
        StoreClient::new(StoreConfig::new(&store_url)).expect("Failed to create store client");
    let store = CachedStoreClient::new(store_client, &CacheConfig::default());

    // Create the live location hub over an in-process feed
    let feed = Arc::new(BroadcastFeed::new());
    let hub = Arc::new(LiveLocationHub::new(feed.clone()));

    // Subscribe the active fleet up front, then keep reconciling in the
    // background as vehicles are added, retired or reassigned.
    match store.get_vehicles().await {
        Ok(vehicles) => {
            let active: Vec<_> = vehicles
                .into_iter()
                .filter(|v| v.status == VehicleStatus::Active)
                .collect();
            hub.sync(&active).await;
            println!("Tracking {} active vehicles", active.len());
        }
        Err(e) => eprintln!("Warning: initial fleet fetch failed: {e}"),
    }

    let sync_store = store.clone();
    let sync_hub = hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(FLEET_SYNC_INTERVAL);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match sync_store.get_vehicles().await {
                Ok(vehicles) => {
                    let active: Vec<_> = vehicles
                        .into_iter()
                        .filter(|v| v.status == VehicleStatus::Active)
                        .collect();
                    sync_hub.sync(&active).await;
                }
                Err(e) => eprintln!("Failed to refresh fleet roster: {e}"),
            }
        }
    });

    // Create the arrival estimator and the travel-plan optimizer over
    // one shared routing client
    let routing_client =
        RoutingClient::new(RoutingConfig::new(routing_key)).expect("Failed to create routing client");
    let estimator = EtaEstimator::new(routing_client.clone(), EtaConfig::default());
    let optimizer = RouteOptimizer::new(routing_client);

    // Build app state
    let state = AppState::new(
        store,
        hub,
        feed,
        estimator,
        optimizer,
        terminal,
        SearchConfig::default(),
    );

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Fleet server listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  GET  /health                    - Health check");
    println!("  GET  /api/search                - Search vehicles by stop pair");
    println!("  GET  /api/vehicles              - List the fleet");
    println!("  GET  /api/vehicles/:id/position - Current vehicle position");
    println!("  GET  /api/vehicles/:id/eta      - Estimated arrival at the terminal");
    println!("  GET  /api/vehicles/:id/route    - Travel plan in optimized stop order");
    println!("  POST /api/locations             - Ingest a position report");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Terminal coordinate from `TERMINAL_LAT`/`TERMINAL_LNG`, or the
/// built-in default when unset or unparseable.
fn terminal_from_env() -> Coordinate {
    let parsed = std::env::var("TERMINAL_LAT")
        .ok()
        .zip(std::env::var("TERMINAL_LNG").ok())
        .and_then(|(lat, lng)| {
            let lat: f64 = lat.parse().ok()?;
            let lng: f64 = lng.parse().ok()?;
            Coordinate::new(lat, lng).ok()
        });

    match parsed {
        Some(coord) => coord,
        None => {
            eprintln!(
                "Warning: TERMINAL_LAT/TERMINAL_LNG not set or invalid, using default terminal"
            );
            Coordinate::new(DEFAULT_TERMINAL.0, DEFAULT_TERMINAL.1)
                .expect("default terminal coordinate is valid")
        }
    }
}
