//! Document store wire types and their conversion to domain types.
//!
//! The admin backend stores documents loosely: `bus_no` may be a
//! number or a string, `isDefault` has been a bool, an object with a
//! `value` field, and absent at different points in the data's life,
//! and coordinates are sometimes stringly typed. All of that is
//! normalized here so the rest of the crate sees clean domain types.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    Coordinate, Position, Route, RouteVariant, Stop, Vehicle, VehicleId, VehicleNumber,
    VehicleStatus,
};

/// A vehicle document as returned by `/api/buses`.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleDoc {
    pub id: String,

    #[serde(default)]
    pub bus_no: Option<Value>,

    #[serde(default)]
    pub current_route_no: Option<String>,

    #[serde(default, rename = "isDefault")]
    pub is_default: Option<Value>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub current_location: Option<LocationDoc>,
}

/// The admin-recorded static location on a vehicle document.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationDoc {
    #[serde(default)]
    pub latitude: Option<Value>,

    #[serde(default)]
    pub longitude: Option<Value>,
}

/// A stop entry as returned by `/api/stops`.
#[derive(Debug, Clone, Deserialize)]
pub struct StopDoc {
    pub name: String,

    #[serde(default)]
    pub lat: Option<Value>,

    #[serde(default)]
    pub lng: Option<Value>,
}

/// A route's stop list as returned by `/api/routes/{id}/stops`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteStopsDoc {
    #[serde(default)]
    pub stops: Vec<String>,
}

/// Accept a JSON number or a numeric string.
fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accept a JSON string or render a number as its label.
fn as_label(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce the store's historically inconsistent `isDefault` field.
///
/// Missing means Default; a bool is taken as-is; an object with a
/// `value` field uses that field's truthiness; anything else non-null
/// is truthy.
fn variant_from_is_default(v: Option<&Value>) -> RouteVariant {
    let truthy = match v {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(Value::Object(map)) => map
            .get("value")
            .map(|inner| !matches!(inner, Value::Bool(false) | Value::Null))
            .unwrap_or(true),
        Some(_) => true,
    };
    if truthy {
        RouteVariant::Default
    } else {
        RouteVariant::Modified
    }
}

impl LocationDoc {
    fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.latitude.as_ref().and_then(as_f64)?;
        let lng = self.longitude.as_ref().and_then(as_f64)?;
        Coordinate::new(lat, lng).ok()
    }
}

impl VehicleDoc {
    /// Convert to the domain type, normalizing loose fields.
    pub fn into_vehicle(self) -> Vehicle {
        let number = self
            .bus_no
            .as_ref()
            .and_then(as_label)
            // Document ids follow the `bus_no_{N}` convention; fall
            // back to the suffix when the field is missing.
            .or_else(|| self.id.rsplit('_').next().map(str::to_string))
            .unwrap_or_else(|| self.id.clone());

        let status = match self.status.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("inactive") => VehicleStatus::Inactive,
            _ => VehicleStatus::Active,
        };

        let last_known_location = self
            .current_location
            .as_ref()
            .and_then(LocationDoc::coordinate)
            .map(Position::untimed);

        Vehicle {
            variant: variant_from_is_default(self.is_default.as_ref()),
            id: VehicleId::new(self.id),
            number: VehicleNumber::new(number),
            route_id: self.current_route_no.filter(|r| !r.trim().is_empty()),
            status,
            last_known_location,
        }
    }
}

impl StopDoc {
    /// Convert to the domain type; a stop with missing or unparsable
    /// coordinates is kept, just without geometry.
    pub fn into_stop(self) -> Stop {
        let coord = match (self.lat.as_ref(), self.lng.as_ref()) {
            (Some(lat), Some(lng)) => match (as_f64(lat), as_f64(lng)) {
                (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
                _ => None,
            },
            _ => None,
        };
        Stop::new(self.name, coord)
    }
}

impl RouteStopsDoc {
    pub fn into_route(self, id: &str, variant: RouteVariant) -> Route {
        Route::new(id, self.stops, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vehicle_from(value: Value) -> Vehicle {
        serde_json::from_value::<VehicleDoc>(value)
            .unwrap()
            .into_vehicle()
    }

    #[test]
    fn full_vehicle_doc() {
        let v = vehicle_from(json!({
            "id": "bus_no_7",
            "bus_no": "7",
            "current_route_no": "route_7",
            "isDefault": false,
            "status": "Active",
            "current_location": { "latitude": 12.8, "longitude": 80.1 }
        }));

        assert_eq!(v.id.as_str(), "bus_no_7");
        assert_eq!(v.number.as_str(), "7");
        assert_eq!(v.route_id.as_deref(), Some("route_7"));
        assert_eq!(v.variant, RouteVariant::Modified);
        assert_eq!(v.status, VehicleStatus::Active);
        let pos = v.last_known_location.unwrap();
        assert_eq!(pos.coord, Coordinate::new(12.8, 80.1).unwrap());
        assert!(pos.recorded_at.is_none());
    }

    #[test]
    fn numeric_bus_no_becomes_label() {
        let v = vehicle_from(json!({ "id": "bus_no_14", "bus_no": 14 }));
        assert_eq!(v.number.as_str(), "14");
    }

    #[test]
    fn missing_bus_no_derived_from_id() {
        let v = vehicle_from(json!({ "id": "bus_no_3" }));
        assert_eq!(v.number.as_str(), "3");
    }

    #[test]
    fn is_default_coercions() {
        assert_eq!(
            vehicle_from(json!({ "id": "b" })).variant,
            RouteVariant::Default
        );
        assert_eq!(
            vehicle_from(json!({ "id": "b", "isDefault": true })).variant,
            RouteVariant::Default
        );
        assert_eq!(
            vehicle_from(json!({ "id": "b", "isDefault": false })).variant,
            RouteVariant::Modified
        );
        assert_eq!(
            vehicle_from(json!({ "id": "b", "isDefault": { "value": false } })).variant,
            RouteVariant::Modified
        );
        assert_eq!(
            vehicle_from(json!({ "id": "b", "isDefault": { "value": true } })).variant,
            RouteVariant::Default
        );
        assert_eq!(
            vehicle_from(json!({ "id": "b", "isDefault": "yes" })).variant,
            RouteVariant::Default
        );
    }

    #[test]
    fn inactive_status() {
        let v = vehicle_from(json!({ "id": "b", "status": "inactive" }));
        assert_eq!(v.status, VehicleStatus::Inactive);
    }

    #[test]
    fn stringly_typed_location_parses() {
        let v = vehicle_from(json!({
            "id": "b",
            "current_location": { "latitude": "12.5", "longitude": "80.0" }
        }));
        assert_eq!(
            v.last_known_location.unwrap().coord,
            Coordinate::new(12.5, 80.0).unwrap()
        );
    }

    #[test]
    fn garbage_location_dropped() {
        let v = vehicle_from(json!({
            "id": "b",
            "current_location": { "latitude": "north", "longitude": 80.0 }
        }));
        assert!(v.last_known_location.is_none());
    }

    #[test]
    fn empty_route_id_treated_as_unassigned() {
        let v = vehicle_from(json!({ "id": "b", "current_route_no": " " }));
        assert!(v.route_id.is_none());
    }

    #[test]
    fn stop_doc_without_coords() {
        let stop: StopDoc = serde_json::from_value(json!({ "name": "Potheri" })).unwrap();
        let stop = stop.into_stop();
        assert_eq!(stop.name, "Potheri");
        assert!(stop.coord.is_none());
    }

    #[test]
    fn stop_doc_with_null_lat() {
        let stop: StopDoc =
            serde_json::from_value(json!({ "name": "Potheri", "lat": null, "lng": 80.0 }))
                .unwrap();
        assert!(stop.into_stop().coord.is_none());
    }

    #[test]
    fn route_stops_doc_defaults_to_empty() {
        let doc: RouteStopsDoc = serde_json::from_value(json!({})).unwrap();
        let route = doc.into_route("route_9", RouteVariant::Default);
        assert_eq!(route.id, "route_9");
        assert!(route.stops.is_empty());
    }
}
