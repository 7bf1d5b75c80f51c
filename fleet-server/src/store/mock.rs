//! Mock document store for testing without a backend.
//!
//! Loads fleet fixtures from JSON files and serves them as if they
//! were live store responses.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::{Route, RouteVariant, Stop, Vehicle, VehicleId};
use crate::stops::normalize;

use super::DocumentStore;
use super::error::StoreError;
use super::types::{StopDoc, VehicleDoc};

/// Mock store client backed by in-memory documents.
///
/// Useful for development and tests without backend access. Build one
/// either from a fixture directory containing `vehicles.json`,
/// `stops.json`, `default_routes.json` and `modified_routes.json`
/// (route files map route id to a stop-name array), or directly from
/// parts.
#[derive(Debug, Clone, Default)]
pub struct MockStoreClient {
    vehicles: Vec<Vehicle>,
    stops: Vec<Stop>,
    default_routes: HashMap<String, Vec<String>>,
    modified_routes: HashMap<String, Vec<String>>,
}

impl MockStoreClient {
    /// Load fixtures from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();

        let vehicle_docs: Vec<VehicleDoc> = read_json(&data_dir.join("vehicles.json"))?;
        let stop_docs: Vec<StopDoc> = read_json(&data_dir.join("stops.json"))?;
        let default_routes: HashMap<String, Vec<String>> =
            read_json(&data_dir.join("default_routes.json"))?;
        let modified_routes: HashMap<String, Vec<String>> =
            read_json(&data_dir.join("modified_routes.json"))?;

        Ok(Self {
            vehicles: vehicle_docs
                .into_iter()
                .map(VehicleDoc::into_vehicle)
                .collect(),
            stops: stop_docs.into_iter().map(StopDoc::into_stop).collect(),
            default_routes,
            modified_routes,
        })
    }

    /// Build a mock store directly from domain values.
    pub fn from_parts(
        vehicles: Vec<Vehicle>,
        stops: Vec<Stop>,
        default_routes: HashMap<String, Vec<String>>,
        modified_routes: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            vehicles,
            stops,
            default_routes,
            modified_routes,
        }
    }

    fn routes_for(&self, variant: RouteVariant) -> &HashMap<String, Vec<String>> {
        match variant {
            RouteVariant::Default => &self.default_routes,
            RouteVariant::Modified => &self.modified_routes,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let json = std::fs::read_to_string(path).map_err(|e| StoreError::Api {
        status: 0,
        message: format!("Failed to read {:?}: {}", path, e),
    })?;

    serde_json::from_str(&json).map_err(|e| StoreError::Json {
        message: format!("Failed to parse {:?}: {}", path, e),
        body: None,
    })
}

impl DocumentStore for MockStoreClient {
    async fn get_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        Ok(self.vehicles.clone())
    }

    async fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, StoreError> {
        self.vehicles
            .iter()
            .find(|v| &v.id == id)
            .cloned()
            .ok_or_else(|| StoreError::VehicleNotFound(id.to_string()))
    }

    async fn get_route(&self, id: &str, variant: RouteVariant) -> Result<Route, StoreError> {
        self.routes_for(variant)
            .get(id)
            .map(|stops| Route::new(id, stops.clone(), variant))
            .ok_or_else(|| StoreError::RouteNotFound(id.to_string()))
    }

    async fn get_stop(&self, name: &str) -> Result<Stop, StoreError> {
        let key = normalize(name);
        self.stops
            .iter()
            .find(|s| normalize(&s.name) == key)
            .cloned()
            .ok_or_else(|| StoreError::StopNotFound(name.to_string()))
    }

    async fn get_all_stops(&self) -> Result<Vec<Stop>, StoreError> {
        Ok(self.stops.clone())
    }
}
