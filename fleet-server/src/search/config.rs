//! Search configuration for the fleet query orchestrator.

/// Configuration parameters for a fleet search.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Require the source stop to precede the destination in the route
    /// sequence. Off by default; riders routinely query against the
    /// return leg of a route that lists stops in one direction only.
    pub strict_order: bool,

    /// Per-vehicle route lookup deadline (seconds). A vehicle whose
    /// lookup exceeds this is skipped, not the whole query.
    pub vehicle_timeout_secs: u64,

    /// Reject live positions older than this (seconds). `None` serves
    /// whatever the hub last cached regardless of age.
    pub max_position_age_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            strict_order: false,
            vehicle_timeout_secs: 10,
            max_position_age_secs: None,
        }
    }
}

impl SearchConfig {
    pub fn with_strict_order(mut self, strict: bool) -> Self {
        self.strict_order = strict;
        self
    }

    pub fn with_vehicle_timeout(mut self, secs: u64) -> Self {
        self.vehicle_timeout_secs = secs;
        self
    }

    pub fn with_max_position_age(mut self, secs: u64) -> Self {
        self.max_position_age_secs = Some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SearchConfig::default();
        assert!(!config.strict_order);
        assert_eq!(config.vehicle_timeout_secs, 10);
        assert_eq!(config.max_position_age_secs, None);
    }

    #[test]
    fn builder() {
        let config = SearchConfig::default()
            .with_strict_order(true)
            .with_vehicle_timeout(3)
            .with_max_position_age(120);
        assert!(config.strict_order);
        assert_eq!(config.vehicle_timeout_secs, 3);
        assert_eq!(config.max_position_age_secs, Some(120));
    }
}
