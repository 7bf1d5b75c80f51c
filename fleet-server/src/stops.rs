//! Stop name lookup.
//!
//! A read-only index over the stop documents fetched for one request
//! window. Lookups are case-insensitive and whitespace-trimmed.

use std::collections::HashMap;

use crate::domain::{Coordinate, Stop};

/// Normalized lookup key for a stop name.
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive stop name index.
///
/// Insertion order is preserved for [`StopIndex::all`]. When two
/// registered names collide after normalization (e.g. "Tambaram " and
/// "tambaram"), the first registration wins; later ones are ignored
/// rather than overwriting in arbitrary order.
#[derive(Debug, Clone, Default)]
pub struct StopIndex {
    stops: Vec<Stop>,
    by_key: HashMap<String, usize>,
}

impl StopIndex {
    /// Build an index from stop documents, in the order given.
    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        let mut index = Self::default();
        for stop in stops {
            index.insert(stop);
        }
        index
    }

    fn insert(&mut self, stop: Stop) {
        let key = normalize(&stop.name);
        if key.is_empty() || self.by_key.contains_key(&key) {
            return;
        }
        self.by_key.insert(key, self.stops.len());
        self.stops.push(stop);
    }

    /// Look up a stop by name, ignoring case and surrounding whitespace.
    pub fn lookup(&self, name: &str) -> Option<&Stop> {
        self.by_key.get(&normalize(name)).map(|&i| &self.stops[i])
    }

    /// The registered coordinate for a stop name.
    ///
    /// `None` both when the name is unknown and when the stop exists
    /// without a coordinate; callers treat either as "no geometry".
    pub fn coordinate(&self, name: &str) -> Option<Coordinate> {
        self.lookup(name).and_then(|s| s.coord)
    }

    /// All stops in insertion order. Restartable.
    pub fn all(&self) -> impl Iterator<Item = &Stop> {
        self.stops.iter()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}
