//! Stop type.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A named stop along a route.
///
/// A stop may exist without a registered coordinate (the admin created
/// the name but never placed it on the map). Such stops are valid for
/// matching by name but are excluded from any geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Display name; also the (case-insensitive) lookup key.
    pub name: String,

    /// Map position, if one has been registered.
    pub coord: Option<Coordinate>,
}

impl Stop {
    pub fn new(name: impl Into<String>, coord: Option<Coordinate>) -> Self {
        Self {
            name: name.into(),
            coord,
        }
    }
}
