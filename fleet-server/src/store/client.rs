//! Document store HTTP client.
//!
//! Talks to the admin backend's REST surface, converts loose document
//! JSON into domain types, and bounds concurrent requests.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::domain::{Route, RouteVariant, Stop, Vehicle, VehicleId};

use super::DocumentStore;
use super::error::StoreError;
use super::types::{RouteStopsDoc, StopDoc, VehicleDoc};

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the store client.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the admin backend (e.g. `http://localhost:5000`)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl StoreConfig {
    /// Create a new config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP client for the fleet document store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl StoreClient {
    /// Create a new store client with the given configuration.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, StoreError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| StoreError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl DocumentStore for StoreClient {
    async fn get_vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        let url = format!("{}/api/buses", self.base_url);
        let docs: Vec<VehicleDoc> = self.get_json(url).await?;
        Ok(docs.into_iter().map(VehicleDoc::into_vehicle).collect())
    }

    async fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, StoreError> {
        let url = format!("{}/api/buses/{}", self.base_url, id);
        let doc: VehicleDoc = match self.get_json(url).await {
            Err(StoreError::Api { status: 404, .. }) => {
                return Err(StoreError::VehicleNotFound(id.to_string()));
            }
            other => other?,
        };
        Ok(doc.into_vehicle())
    }

    async fn get_route(&self, id: &str, variant: RouteVariant) -> Result<Route, StoreError> {
        let url = format!(
            "{}/api/routes/{}/stops?source={}",
            self.base_url,
            id,
            variant.as_source_param()
        );
        let doc: RouteStopsDoc = match self.get_json(url).await {
            Err(StoreError::Api { status: 404, .. }) => {
                return Err(StoreError::RouteNotFound(id.to_string()));
            }
            other => other?,
        };
        // The store answers a missing variant document with an empty
        // stop list rather than a 404; surface that as not-found.
        if doc.stops.is_empty() {
            return Err(StoreError::RouteNotFound(id.to_string()));
        }
        Ok(doc.into_route(id, variant))
    }

    async fn get_stop(&self, name: &str) -> Result<Stop, StoreError> {
        let url = format!("{}/api/stops/{}", self.base_url, name.trim().to_lowercase());
        let doc: StopDoc = match self.get_json(url).await {
            Err(StoreError::Api { status: 404, .. }) => {
                return Err(StoreError::StopNotFound(name.to_string()));
            }
            other => other?,
        };
        Ok(doc.into_stop())
    }

    async fn get_all_stops(&self) -> Result<Vec<Stop>, StoreError> {
        let url = format!("{}/api/stops", self.base_url);
        let docs: Vec<StopDoc> = self.get_json(url).await?;
        Ok(docs.into_iter().map(StopDoc::into_stop).collect())
    }
}
