//! Stop-order optimization with graceful degradation.
//!
//! Sends the interior stops of a route to the provider's optimization
//! endpoint and reorders them by the returned visiting order. The first
//! and last waypoints are terminals and never move. Any provider
//! failure, timeout or implausible answer leaves the original order
//! untouched.

use tracing::warn;

use crate::domain::Coordinate;

use super::{Job, RoutingProvider};

/// A named, placed stop submitted for reordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub id: String,
    pub coord: Coordinate,
}

/// Reorders route stops via the routing provider.
#[derive(Debug, Clone)]
pub struct RouteOptimizer<P> {
    provider: P,
    timeout_secs: u64,
}

impl<P: RoutingProvider> RouteOptimizer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout_secs: 10,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Reorder the interior of `waypoints` for travel time. Fewer than
    /// three waypoints have no interior and come back unchanged.
    pub async fn optimize(&self, waypoints: Vec<Waypoint>) -> Vec<Waypoint> {
        if waypoints.len() < 3 {
            return waypoints;
        }

        let start = waypoints[0].coord;
        let end = waypoints[waypoints.len() - 1].coord;
        let interior = &waypoints[1..waypoints.len() - 1];

        // Job ids are 1-based positions within the interior slice.
        let jobs: Vec<Job> = interior
            .iter()
            .enumerate()
            .map(|(idx, w)| Job {
                id: idx as u32 + 1,
                location: w.coord,
            })
            .collect();

        let timeout = std::time::Duration::from_secs(self.timeout_secs);
        let order = match tokio::time::timeout(timeout, self.provider.optimize(start, &jobs, end))
            .await
        {
            Ok(Ok(order)) => order,
            Ok(Err(e)) => {
                warn!("optimization failed, keeping original stop order: {e}");
                return waypoints;
            }
            Err(_) => {
                warn!("optimization timed out, keeping original stop order");
                return waypoints;
            }
        };

        match reorder(&waypoints, &order) {
            Some(reordered) => reordered,
            None => {
                warn!("optimization returned an implausible visiting order, keeping original");
                waypoints
            }
        }
    }
}

/// Apply a provider visiting order to the interior waypoints.
///
/// Returns `None` when the order is not a permutation of the submitted
/// job ids: wrong length, an unknown id, or a repeated id.
fn reorder(waypoints: &[Waypoint], order: &[u32]) -> Option<Vec<Waypoint>> {
    let interior = &waypoints[1..waypoints.len() - 1];
    if order.len() != interior.len() {
        return None;
    }

    let mut seen = vec![false; interior.len()];
    let mut result = Vec::with_capacity(waypoints.len());
    result.push(waypoints[0].clone());

    for &id in order {
        let idx = (id as usize).checked_sub(1)?;
        if idx >= interior.len() || seen[idx] {
            return None;
        }
        seen[idx] = true;
        result.push(interior[idx].clone());
    }

    result.push(waypoints[waypoints.len() - 1].clone());
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteSummary, RoutingError};

    struct OrderProvider {
        order: Vec<u32>,
    }

    impl RoutingProvider for OrderProvider {
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
            Ok(self.order.clone())
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
            Err(RoutingError::Timeout)
        }
    }

    fn waypoint(id: &str, lat: f64, lng: f64) -> Waypoint {
        Waypoint {
            id: id.to_string(),
            coord: Coordinate::new(lat, lng).unwrap(),
        }
    }

    fn names(waypoints: &[Waypoint]) -> Vec<&str> {
        waypoints.iter().map(|w| w.id.as_str()).collect()
    }

    #[tokio::test]
    async fn fewer_than_three_waypoints_unchanged() {
        let optimizer = RouteOptimizer::new(FailingProvider);

        let empty = optimizer.optimize(Vec::new()).await;
        assert!(empty.is_empty());

        let one = vec![waypoint("a", 1.0, 1.0)];
        assert_eq!(names(&optimizer.optimize(one).await), ["a"]);

        let two = vec![waypoint("a", 1.0, 1.0), waypoint("b", 2.0, 2.0)];
        assert_eq!(names(&optimizer.optimize(two).await), ["a", "b"]);
    }

    #[tokio::test]
    async fn interior_reordered_terminals_fixed() {
        let optimizer = RouteOptimizer::new(OrderProvider { order: vec![3, 1, 2] });

        let route = vec![
            waypoint("depot", 0.0, 0.0),
            waypoint("p", 1.0, 1.0),
            waypoint("q", 2.0, 2.0),
            waypoint("r", 3.0, 3.0),
            waypoint("school", 4.0, 4.0),
        ];

        let optimized = optimizer.optimize(route).await;
        assert_eq!(names(&optimized), ["depot", "r", "p", "q", "school"]);
    }

    #[tokio::test]
    async fn provider_failure_keeps_original_order() {
        let optimizer = RouteOptimizer::new(FailingProvider);

        let route = vec![
            waypoint("a", 0.0, 0.0),
            waypoint("b", 1.0, 1.0),
            waypoint("c", 2.0, 2.0),
        ];
        assert_eq!(names(&optimizer.optimize(route).await), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unknown_job_id_keeps_original_order() {
        let optimizer = RouteOptimizer::new(OrderProvider { order: vec![1, 7] });

        let route = vec![
            waypoint("a", 0.0, 0.0),
            waypoint("b", 1.0, 1.0),
            waypoint("c", 2.0, 2.0),
            waypoint("d", 3.0, 3.0),
        ];
        assert_eq!(names(&optimizer.optimize(route).await), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn duplicate_job_id_keeps_original_order() {
        let optimizer = RouteOptimizer::new(OrderProvider { order: vec![1, 1] });

        let route = vec![
            waypoint("a", 0.0, 0.0),
            waypoint("b", 1.0, 1.0),
            waypoint("c", 2.0, 2.0),
            waypoint("d", 3.0, 3.0),
        ];
        assert_eq!(names(&optimizer.optimize(route).await), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn short_order_keeps_original_order() {
        let optimizer = RouteOptimizer::new(OrderProvider { order: vec![1] });

        let route = vec![
            waypoint("a", 0.0, 0.0),
            waypoint("b", 1.0, 1.0),
            waypoint("c", 2.0, 2.0),
            waypoint("d", 3.0, 3.0),
        ];
        assert_eq!(names(&optimizer.optimize(route).await), ["a", "b", "c", "d"]);
    }

    #[test]
    fn reorder_identity() {
        let route = vec![
            waypoint("a", 0.0, 0.0),
            waypoint("b", 1.0, 1.0),
            waypoint("c", 2.0, 2.0),
            waypoint("d", 3.0, 3.0),
        ];
        let reordered = reorder(&route, &[1, 2]).unwrap();
        assert_eq!(names(&reordered), ["a", "b", "c", "d"]);
    }

    #[test]
    fn reorder_rejects_zero_id() {
        let route = vec![
            waypoint("a", 0.0, 0.0),
            waypoint("b", 1.0, 1.0),
            waypoint("c", 2.0, 2.0),
            waypoint("d", 3.0, 3.0),
        ];
        assert!(reorder(&route, &[0, 1]).is_none());
    }
}
