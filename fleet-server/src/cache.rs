//! Caching layer for document store reads.
//!
//! Store documents only need to be consistent for the duration of one
//! request window, so a short TTL cache in front of the store absorbs
//! the per-vehicle route fetches a search fans out, without holding
//! stale admin edits for long.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Route, RouteVariant, Stop, Vehicle, VehicleId};
use crate::store::{DocumentStore, StoreError};

/// Cache key for a route: (route id, variant store).
type RouteKey = (String, RouteVariant);

/// Configuration for the store cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached route entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 1000,
        }
    }
}

/// Document store wrapper with read-through caching.
///
/// The batch fetches (`get_vehicles`, `get_all_stops`) and per-route
/// fetches are cached; single vehicle and stop lookups pass through,
/// since nothing in the core calls them in a loop. Errors are never
/// cached.
///
/// Clones share the same cache entries.
#[derive(Clone)]
pub struct CachedStoreClient<S> {
    store: S,
    vehicles: MokaCache<(), Arc<Vec<Vehicle>>>,
    stops: MokaCache<(), Arc<Vec<Stop>>>,
    routes: MokaCache<RouteKey, Arc<Route>>,
}

impl<S: DocumentStore> CachedStoreClient<S> {
    /// Wrap a store with the given cache configuration.
    pub fn new(store: S, config: &CacheConfig) -> Self {
        let vehicles = MokaCache::builder().time_to_live(config.ttl).build();
        let stops = MokaCache::builder().time_to_live(config.ttl).build();
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            store,
            vehicles,
            stops,
            routes,
        }
    }

    /// Access the underlying store for operations that bypass cache.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of cached route entries (for monitoring).
    pub fn route_entry_count(&self) -> u64 {
        self.routes.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.vehicles.invalidate_all();
        self.stops.invalidate_all();
        self.routes.invalidate_all();
    }
}

impl<S: DocumentStore> DocumentStore for CachedStoreClient<S> {
    async fn get_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        if let Some(cached) = self.vehicles.get(&()).await {
            return Ok((*cached).clone());
        }

        let fetched = Arc::new(self.store.get_vehicles().await?);
        self.vehicles.insert((), fetched.clone()).await;
        Ok((*fetched).clone())
    }

    async fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, StoreError> {
        self.store.get_vehicle(id).await
    }

    async fn get_route(&self, id: &str, variant: RouteVariant) -> Result<Route, StoreError> {
        let key = (id.to_string(), variant);

        if let Some(cached) = self.routes.get(&key).await {
            return Ok((*cached).clone());
        }

        let fetched = Arc::new(self.store.get_route(id, variant).await?);
        self.routes.insert(key, fetched.clone()).await;
        Ok((*fetched).clone())
    }

    async fn get_stop(&self, name: &str) -> Result<Stop, StoreError> {
        self.store.get_stop(name).await
    }

    async fn get_all_stops(&self) -> Result<Vec<Stop>, StoreError> {
        if let Some(cached) = self.stops.get(&()).await {
            return Ok((*cached).clone());
        }

        let fetched = Arc::new(self.store.get_all_stops().await?);
        self.stops.insert((), fetched.clone()).await;
        Ok((*fetched).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockStoreClient;
    use std::collections::HashMap;

    fn mock_store() -> MockStoreClient {
        let mut default_routes = HashMap::new();
        default_routes.insert("route_1".to_string(), vec!["A".to_string(), "B".to_string()]);
        MockStoreClient::from_parts(Vec::new(), Vec::new(), default_routes, HashMap::new())
    }

    #[tokio::test]
    async fn route_reads_are_cached() {
        let cached = CachedStoreClient::new(mock_store(), &CacheConfig::default());

        assert_eq!(cached.route_entry_count(), 0);
        let first = cached
            .get_route("route_1", RouteVariant::Default)
            .await
            .unwrap();
        let second = cached
            .get_route("route_1", RouteVariant::Default)
            .await
            .unwrap();
        assert_eq!(first, second);

        // moka maintains counts asynchronously; force a sync pass.
        cached.routes.run_pending_tasks().await;
        assert_eq!(cached.route_entry_count(), 1);
    }

    #[tokio::test]
    async fn variants_cached_separately() {
        let mut default_routes = HashMap::new();
        default_routes.insert("r".to_string(), vec!["A".to_string(), "B".to_string()]);
        let mut modified_routes = HashMap::new();
        modified_routes.insert(
            "r".to_string(),
            vec!["A".to_string(), "X".to_string(), "B".to_string()],
        );
        let store =
            MockStoreClient::from_parts(Vec::new(), Vec::new(), default_routes, modified_routes);
        let cached = CachedStoreClient::new(store, &CacheConfig::default());

        let default = cached.get_route("r", RouteVariant::Default).await.unwrap();
        let modified = cached.get_route("r", RouteVariant::Modified).await.unwrap();
        assert_eq!(default.stops.len(), 2);
        assert_eq!(modified.stops.len(), 3);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cached = CachedStoreClient::new(mock_store(), &CacheConfig::default());

        let missing = cached.get_route("route_99", RouteVariant::Default).await;
        assert!(missing.is_err());

        cached.routes.run_pending_tasks().await;
        assert_eq!(cached.route_entry_count(), 0);
    }

    #[tokio::test]
    async fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.max_capacity, 1000);
    }
}
