//! Geographic coordinate types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kilometers per degree of latitude (and of longitude near the
/// equator), used by the equirectangular distance approximation.
const KM_PER_DEGREE: f64 = 111.0;

/// Error returned when constructing an invalid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair.
///
/// Valid by construction: both components are finite, latitude is in
/// [-90, 90] and longitude in [-180, 180]. Internal convention is
/// lat,lng; use [`Coordinate::as_lng_lat`] when building routing
/// provider payloads, which expect the reverse order.
///
/// # Examples
///
/// ```
/// use fleet_server::domain::Coordinate;
///
/// let c = Coordinate::new(12.83714, 80.05204).unwrap();
/// assert_eq!(c.as_lng_lat(), [80.05204, 12.83714]);
///
/// assert!(Coordinate::new(f64::NAN, 0.0).is_err());
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Construct a coordinate, rejecting non-finite or out-of-range
    /// components.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidCoordinate {
                reason: "components must be finite numbers",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate {
                reason: "latitude must be in [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidCoordinate {
                reason: "longitude must be in [-180, 180]",
            });
        }
        Ok(Self { lat, lng })
    }

    /// Straight-line distance in kilometers using the equirectangular
    /// approximation: degree deltas scaled by 111 km/degree, combined
    /// Euclidean. Good enough for the short distances a fleet covers;
    /// this is also the routing fallback's distance model.
    pub fn approx_distance_km(&self, other: &Coordinate) -> f64 {
        let dlat = (self.lat - other.lat) * KM_PER_DEGREE;
        let dlng = (self.lng - other.lng) * KM_PER_DEGREE;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    /// Coordinate pair in lng,lat order for routing provider payloads.
    pub fn as_lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

/// A position fix for a vehicle: where it was, and (when known) when.
///
/// Produced both by the live feed (timestamped samples) and by the
/// admin-recorded static location on the vehicle document, which may
/// predate timestamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coord: Coordinate,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl Position {
    /// A position with a known timestamp.
    pub fn at(coord: Coordinate, recorded_at: DateTime<Utc>) -> Self {
        Self {
            coord,
            recorded_at: Some(recorded_at),
        }
    }

    /// A position with no timestamp (admin-recorded fix).
    pub fn untimed(coord: Coordinate) -> Self {
        Self {
            coord,
            recorded_at: None,
        }
    }
}
