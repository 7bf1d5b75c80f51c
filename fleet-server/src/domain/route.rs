//! Route types.

use serde::{Deserialize, Serialize};

/// Which variant store a route's stop sequence is read from.
///
/// Every route exists in the canonical `Default` store; an admin may
/// save a locally edited copy, which lives in the `Modified` store
/// under the same route id. A vehicle's `isDefault` flag selects which
/// one its reads resolve against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteVariant {
    Default,
    Modified,
}

impl RouteVariant {
    /// The query-string value the document store uses for this variant.
    pub fn as_source_param(&self) -> &'static str {
        match self {
            RouteVariant::Default => "default",
            RouteVariant::Modified => "copy",
        }
    }
}

/// A route: an ordered sequence of stop names.
///
/// Order is significant; it encodes the physical visiting order.
/// Duplicate stop names are not expected but are not rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub stops: Vec<String>,
    pub variant: RouteVariant,
}

impl Route {
    pub fn new(id: impl Into<String>, stops: Vec<String>, variant: RouteVariant) -> Self {
        Self {
            id: id.into(),
            stops,
            variant,
        }
    }
}
