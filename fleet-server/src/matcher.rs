//! Route matching.
//!
//! Decides whether a route's stop sequence serves a source/destination
//! pair, and resolves the sequence to coordinates.

use crate::domain::Coordinate;
use crate::stops::{StopIndex, normalize};

/// Does `route_stops` serve the `source` → `dest` pair?
///
/// Both names must be present in the sequence (case-insensitive,
/// trimmed). With `strict_order = false` (the default behavior)
/// presence alone is enough; a route is matched even when the
/// destination physically precedes the source. `strict_order = true`
/// additionally requires the first occurrence of `source` to come
/// before the first occurrence of `dest`.
pub fn matches(route_stops: &[String], source: &str, dest: &str, strict_order: bool) -> bool {
    let source = normalize(source);
    let dest = normalize(dest);

    let source_idx = route_stops.iter().position(|s| normalize(s) == source);
    let dest_idx = route_stops.iter().position(|s| normalize(s) == dest);

    match (source_idx, dest_idx) {
        (Some(s), Some(d)) => !strict_order || s < d,
        _ => false,
    }
}

/// Resolve a stop sequence to coordinates, in route order.
///
/// Stops that are unknown to the index, or known but unplaced, are
/// dropped; the output may be shorter than the input and callers must
/// not assume index alignment with the name sequence.
pub fn coordinates_for(route_stops: &[String], index: &StopIndex) -> Vec<Coordinate> {
    route_stops
        .iter()
        .filter_map(|name| index.coordinate(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Stop;

    fn route(stops: &[&str]) -> Vec<String> {
        stops.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matches_when_both_present() {
        let r = route(&["Tambaram", "Guindy", "College"]);
        assert!(matches(&r, "Tambaram", "College", false));
        assert!(matches(&r, "Guindy", "College", false));
    }

    #[test]
    fn no_match_when_either_missing() {
        let r = route(&["Tambaram", "Guindy"]);
        assert!(!matches(&r, "Tambaram", "College", false));
        assert!(!matches(&r, "College", "Guindy", false));
        assert!(!matches(&r, "A", "B", false));
    }

    #[test]
    fn permissive_mode_ignores_direction() {
        // Destination before source still matches by default.
        let r = route(&["Tambaram", "Guindy", "College"]);
        assert!(matches(&r, "College", "Tambaram", false));
    }

    #[test]
    fn strict_mode_requires_source_first() {
        let r = route(&["Tambaram", "Guindy", "College"]);
        assert!(matches(&r, "Tambaram", "College", true));
        assert!(!matches(&r, "College", "Tambaram", true));
    }

    #[test]
    fn matching_is_case_and_whitespace_insensitive() {
        let r = route(&["Tambaram", "Guindy"]);
        assert!(matches(&r, " TAMBARAM ", "guindy", false));
    }

    #[test]
    fn duplicate_stops_use_first_occurrence_in_strict_mode() {
        let r = route(&["A", "B", "A", "C"]);
        assert!(matches(&r, "A", "B", true));
        // First "B" (index 1) is after first "A" (index 0), so the
        // reverse pair fails strictly.
        assert!(!matches(&r, "B", "A", true));
    }

    #[test]
    fn coordinates_skip_unresolved_stops() {
        let idx = StopIndex::from_stops([
            Stop::new("X", Some(Coordinate::new(0.0, 0.0).unwrap())),
            Stop::new("Y", None),
            Stop::new("Z", Some(Coordinate::new(0.0, 2.0).unwrap())),
        ]);
        let r = route(&["X", "Y", "Z", "Unknown"]);
        let coords = coordinates_for(&r, &idx);
        assert_eq!(coords.len(), 2);
        assert_eq!(coords[0], Coordinate::new(0.0, 0.0).unwrap());
        assert_eq!(coords[1], Coordinate::new(0.0, 2.0).unwrap());
    }

    #[test]
    fn coordinates_preserve_route_order() {
        let idx = StopIndex::from_stops([
            Stop::new("A", Some(Coordinate::new(0.0, 0.0).unwrap())),
            Stop::new("B", Some(Coordinate::new(0.0, 1.0).unwrap())),
        ]);
        let coords = coordinates_for(&route(&["B", "A"]), &idx);
        assert_eq!(coords[0], Coordinate::new(0.0, 1.0).unwrap());
        assert_eq!(coords[1], Coordinate::new(0.0, 0.0).unwrap());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// For any pair both present in a route, the permissive matcher
        /// matches regardless of relative position.
        #[test]
        fn permissive_ignores_positions(
            stops in proptest::collection::vec("[a-z]{1,8}", 2..8),
            i in 0usize..8,
            j in 0usize..8,
        ) {
            let i = i % stops.len();
            let j = j % stops.len();
            prop_assume!(i != j);
            prop_assert!(matches(&stops, &stops[i], &stops[j], false));
        }
    }
}
