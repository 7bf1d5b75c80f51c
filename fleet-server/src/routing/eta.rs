//! Arrival estimation with provider fallback.
//!
//! Asks the routing provider for road distance and travel time, and
//! falls back to a straight-line approximation when the provider is
//! slow, unreachable or returns garbage. Estimation itself is
//! infallible; only the quality of the answer varies.

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use tracing::warn;

use crate::domain::Coordinate;

use super::RoutingProvider;

/// Minutes of travel per straight-line kilometre used by the fallback.
const FALLBACK_MINS_PER_KM: f64 = 2.0;

/// Configuration for the arrival estimator.
#[derive(Debug, Clone, Copy)]
pub struct EtaConfig {
    /// Scheduled arrival deadline, in the service day's local clock.
    pub target_arrival: NaiveTime,
    /// How long to wait for the provider before falling back.
    pub provider_timeout_secs: u64,
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            // 07:50 is always a valid clock time.
            target_arrival: NaiveTime::from_hms_opt(7, 50, 0).unwrap(),
            provider_timeout_secs: 10,
        }
    }
}

impl EtaConfig {
    pub fn with_target_arrival(mut self, target: NaiveTime) -> Self {
        self.target_arrival = target;
        self
    }

    pub fn with_provider_timeout(mut self, secs: u64) -> Self {
        self.provider_timeout_secs = secs;
        self
    }
}

/// Where an estimate's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtaSource {
    /// Road distance and duration from the routing provider.
    Provider,
    /// Straight-line approximation computed locally.
    Fallback,
}

/// An arrival estimate for one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtaEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
    pub arrival_time: DateTime<Utc>,
    /// Whether the projected arrival misses the deadline.
    pub delayed: bool,
    pub source: EtaSource,
}

/// Estimates arrival times against a fixed deadline.
#[derive(Debug, Clone)]
pub struct EtaEstimator<P> {
    provider: P,
    config: EtaConfig,
}

impl<P: RoutingProvider> EtaEstimator<P> {
    pub fn new(provider: P, config: EtaConfig) -> Self {
        Self { provider, config }
    }

    /// Estimate travel from `origin` to `destination` starting now.
    pub async fn estimate(&self, origin: Coordinate, destination: Coordinate) -> EtaEstimate {
        self.estimate_at(origin, destination, Utc::now()).await
    }

    /// Estimate with an explicit departure instant. The deadline is the
    /// configured arrival time on the departure day.
    pub async fn estimate_at(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        now: DateTime<Utc>,
    ) -> EtaEstimate {
        let timeout = std::time::Duration::from_secs(self.config.provider_timeout_secs);
        let (distance_km, duration_min, source) =
            match tokio::time::timeout(timeout, self.provider.directions(origin, destination))
                .await
            {
                Ok(Ok(summary)) => (
                    summary.distance_meters / 1000.0,
                    summary.duration_seconds / 60.0,
                    EtaSource::Provider,
                ),
                Ok(Err(e)) => {
                    warn!("routing provider failed, using straight-line fallback: {e}");
                    let (d, m) = fallback_estimate(origin, destination);
                    (d, m, EtaSource::Fallback)
                }
                Err(_) => {
                    warn!("routing provider timed out, using straight-line fallback");
                    let (d, m) = fallback_estimate(origin, destination);
                    (d, m, EtaSource::Fallback)
                }
            };

        let arrival_time = now + ChronoDuration::seconds((duration_min * 60.0) as i64);
        let deadline = now.date_naive().and_time(self.config.target_arrival).and_utc();

        EtaEstimate {
            distance_km,
            duration_min,
            arrival_time,
            delayed: arrival_time > deadline,
            source,
        }
    }
}

/// Straight-line distance and a rough duration at a fixed pace.
/// Full precision; display rounding is the caller's concern.
fn fallback_estimate(origin: Coordinate, destination: Coordinate) -> (f64, f64) {
    let distance_km = origin.approx_distance_km(&destination);
    (distance_km, distance_km * FALLBACK_MINS_PER_KM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Job, RouteSummary, RoutingError};
    use chrono::TimeZone;

    struct StubProvider {
        summary: RouteSummary,
    }

    impl RoutingProvider for StubProvider {
        async fn directions(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<RouteSummary, RoutingError> {
            Ok(self.summary)
        }

        async fn optimize(
            &self,
            _start: Coordinate,
            _jobs: &[Job],
            _end: Coordinate,
        ) -> Result<Vec<u32>, RoutingError> {
            Ok(Vec::new())
        }
    }

    struct FailingProvider;

    impl RoutingProvider for FailingProvider {
        async fn directions(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<RouteSummary, RoutingError> {
            Err(RoutingError::EmptyResponse)
        }

        async fn optimize(
            &self,
            _start: Coordinate,
            _jobs: &[Job],
            _end: Coordinate,
        ) -> Result<Vec<u32>, RoutingError> {
            Err(RoutingError::EmptyResponse)
        }
    }

    struct HangingProvider;

    impl RoutingProvider for HangingProvider {
        async fn directions(
            &self,
            _origin: Coordinate,
            _destination: Coordinate,
        ) -> Result<RouteSummary, RoutingError> {
            futures::future::pending().await
        }

        async fn optimize(
            &self,
            _start: Coordinate,
            _jobs: &[Job],
            _end: Coordinate,
        ) -> Result<Vec<u32>, RoutingError> {
            futures::future::pending().await
        }
    }

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 7, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn provider_summary_drives_estimate() {
        let provider = StubProvider {
            summary: RouteSummary {
                distance_meters: 12_000.0,
                duration_seconds: 1800.0,
            },
        };
        let estimator = EtaEstimator::new(provider, EtaConfig::default());

        let estimate = estimator
            .estimate_at(coord(12.8, 80.0), coord(12.9, 80.1), departure())
            .await;

        assert_eq!(estimate.source, EtaSource::Provider);
        assert_eq!(estimate.distance_km, 12.0);
        assert_eq!(estimate.duration_min, 30.0);
        assert_eq!(
            estimate.arrival_time,
            Utc.with_ymd_and_hms(2024, 3, 11, 7, 30, 0).unwrap()
        );
        assert!(!estimate.delayed);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_straight_line() {
        let estimator = EtaEstimator::new(FailingProvider, EtaConfig::default());

        let origin = coord(12.8, 80.0);
        let destination = coord(12.9, 80.1);
        let estimate = estimator.estimate_at(origin, destination, departure()).await;

        assert_eq!(estimate.source, EtaSource::Fallback);
        let expected_km = origin.approx_distance_km(&destination);
        assert_eq!(estimate.distance_km, expected_km);
        assert_eq!(estimate.duration_min, expected_km * 2.0);
    }

    #[tokio::test]
    async fn slow_provider_falls_back() {
        let config = EtaConfig::default().with_provider_timeout(0);
        let estimator = EtaEstimator::new(HangingProvider, config);

        let estimate = estimator
            .estimate_at(coord(12.8, 80.0), coord(12.9, 80.1), departure())
            .await;
        assert_eq!(estimate.source, EtaSource::Fallback);
    }

    #[tokio::test]
    async fn arrival_past_deadline_is_delayed() {
        // Deadline is 07:50; a 60 minute trip departing 07:00 arrives 08:00.
        let provider = StubProvider {
            summary: RouteSummary {
                distance_meters: 30_000.0,
                duration_seconds: 3600.0,
            },
        };
        let estimator = EtaEstimator::new(provider, EtaConfig::default());

        let estimate = estimator
            .estimate_at(coord(12.8, 80.0), coord(12.9, 80.1), departure())
            .await;
        assert!(estimate.delayed);
    }

    #[tokio::test]
    async fn arrival_exactly_on_deadline_is_not_delayed() {
        // 50 minutes departing 07:00 lands exactly on 07:50.
        let provider = StubProvider {
            summary: RouteSummary {
                distance_meters: 25_000.0,
                duration_seconds: 3000.0,
            },
        };
        let estimator = EtaEstimator::new(provider, EtaConfig::default());

        let estimate = estimator
            .estimate_at(coord(12.8, 80.0), coord(12.9, 80.1), departure())
            .await;
        assert!(!estimate.delayed);
    }

    #[tokio::test]
    async fn zero_distance_estimate() {
        let estimator = EtaEstimator::new(FailingProvider, EtaConfig::default());

        let origin = coord(12.8, 80.0);
        let estimate = estimator.estimate_at(origin, origin, departure()).await;
        assert_eq!(estimate.distance_km, 0.0);
        assert_eq!(estimate.duration_min, 0.0);
        assert_eq!(estimate.arrival_time, departure());
    }
}
