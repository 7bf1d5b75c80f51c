//! Routing provider HTTP client.
//!
//! Talks to an OpenRouteService-compatible API: the driving-car
//! directions endpoint for distance/duration and the optimization
//! endpoint for waypoint ordering. The provider expects coordinate
//! pairs in lng,lat order; all conversion from the internal lat,lng
//! convention happens here.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::domain::Coordinate;

use super::error::RoutingError;
use super::{Job, RouteSummary, RoutingProvider};

/// Default base URL for the routing provider.
const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL for the API (defaults to the hosted provider)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RoutingConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Routing provider API client.
#[derive(Debug, Clone)]
pub struct RoutingClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    summary: Summary,
}

#[derive(Debug, Deserialize)]
struct Summary {
    distance: f64,
    duration: f64,
}

#[derive(Debug, Serialize)]
struct OptimizationRequest {
    jobs: Vec<JobPayload>,
    vehicles: Vec<VehiclePayload>,
}

#[derive(Debug, Serialize)]
struct JobPayload {
    id: u32,
    location: [f64; 2],
}

#[derive(Debug, Serialize)]
struct VehiclePayload {
    id: u32,
    profile: &'static str,
    start: [f64; 2],
    end: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct OptimizationResponse {
    routes: Vec<OptimizedRoute>,
}

#[derive(Debug, Deserialize)]
struct OptimizedRoute {
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
struct Step {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: Option<u32>,
}

impl RoutingClient {
    /// Create a new routing client with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let mut headers = HeaderMap::new();
        let api_key = HeaderValue::from_str(&config.api_key).map_err(|_| RoutingError::Api {
            status: 0,
            message: "Invalid API key format".to_string(),
        })?;
        headers.insert("Authorization", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    async fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        body: &B,
    ) -> Result<T, RoutingError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RoutingError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RoutingError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RoutingError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RoutingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RoutingError::Json {
            message: e.to_string(),
        })
    }
}

impl RoutingProvider for RoutingClient {
    async fn directions(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteSummary, RoutingError> {
        let url = format!("{}/v2/directions/driving-car/geojson", self.base_url);
        let request = DirectionsRequest {
            coordinates: vec![origin.as_lng_lat(), destination.as_lng_lat()],
        };

        let response: DirectionsResponse = self.post_json(url, &request).await?;
        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or(RoutingError::EmptyResponse)?;

        Ok(RouteSummary {
            distance_meters: feature.properties.summary.distance,
            duration_seconds: feature.properties.summary.duration,
        })
    }

    async fn optimize(
        &self,
        start: Coordinate,
        jobs: &[Job],
        end: Coordinate,
    ) -> Result<Vec<u32>, RoutingError> {
        let url = format!("{}/optimization", self.base_url);
        let request = OptimizationRequest {
            jobs: jobs
                .iter()
                .map(|j| JobPayload {
                    id: j.id,
                    location: j.location.as_lng_lat(),
                })
                .collect(),
            vehicles: vec![VehiclePayload {
                id: 1,
                profile: "driving-car",
                start: start.as_lng_lat(),
                end: end.as_lng_lat(),
            }],
        };

        let response: OptimizationResponse = self.post_json(url, &request).await?;
        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(RoutingError::EmptyResponse)?;

        Ok(route
            .steps
            .into_iter()
            .filter(|s| s.kind == "job")
            .filter_map(|s| s.id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = RoutingConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_timeout(5);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn config_defaults() {
        let config = RoutingConfig::new("test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn client_creation() {
        assert!(RoutingClient::new(RoutingConfig::new("test-key")).is_ok());
    }

    #[test]
    fn directions_payload_uses_lng_lat_order() {
        let origin = Coordinate::new(12.8, 80.1).unwrap();
        let destination = Coordinate::new(12.75, 80.2).unwrap();
        let request = DirectionsRequest {
            coordinates: vec![origin.as_lng_lat(), destination.as_lng_lat()],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["coordinates"][0][0], 80.1);
        assert_eq!(json["coordinates"][0][1], 12.8);
    }

    #[test]
    fn parses_directions_response() {
        let body = r#"{
            "features": [
                { "properties": { "summary": { "distance": 12500.0, "duration": 1500.0 } },
                  "geometry": { "type": "LineString", "coordinates": [] } }
            ]
        }"#;

        let response: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.features[0].properties.summary.distance, 12500.0);
        assert_eq!(response.features[0].properties.summary.duration, 1500.0);
    }

    #[test]
    fn parses_optimization_steps() {
        let body = r#"{
            "routes": [
                { "steps": [
                    { "type": "start" },
                    { "type": "job", "id": 2 },
                    { "type": "job", "id": 1 },
                    { "type": "end" }
                ] }
            ]
        }"#;

        let response: OptimizationResponse = serde_json::from_str(body).unwrap();
        let ids: Vec<u32> = response.routes[0]
            .steps
            .iter()
            .filter(|s| s.kind == "job")
            .filter_map(|s| s.id)
            .collect();
        assert_eq!(ids, [2, 1]);
    }
}
