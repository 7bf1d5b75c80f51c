//! Document store error types.

use std::fmt;

/// Errors from the document store client.
#[derive(Debug)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Store returned an error status code
    Api { status: u16, message: String },

    /// Route id not present in the requested variant store
    RouteNotFound(String),

    /// Vehicle document not found
    VehicleNotFound(String),

    /// Stop name not registered
    StopNotFound(String),
}

impl StoreError {
    /// True when the failure means the store itself was unreachable,
    /// as opposed to a particular document being absent.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Http(_) | StoreError::Api { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(e) => write!(f, "store unreachable: {e}"),
            StoreError::Json { message, body } => {
                write!(f, "store JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            StoreError::Api { status, message } => {
                write!(f, "store error {status}: {message}")
            }
            StoreError::RouteNotFound(id) => write!(f, "route not found: {id}"),
            StoreError::VehicleNotFound(id) => write!(f, "vehicle not found: {id}"),
            StoreError::StopNotFound(name) => write!(f, "stop not found: {name}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::RouteNotFound("route_12".into());
        assert_eq!(err.to_string(), "route not found: route_12");

        let err = StoreError::Api {
            status: 500,
            message: "Failed to fetch buses".into(),
        };
        assert_eq!(err.to_string(), "store error 500: Failed to fetch buses");

        let err = StoreError::Json {
            message: "expected array".into(),
            body: Some("{}".into()),
        };
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn unavailable_classification() {
        assert!(
            StoreError::Api {
                status: 503,
                message: String::new()
            }
            .is_unavailable()
        );
        assert!(!StoreError::RouteNotFound("r".into()).is_unavailable());
        assert!(
            !StoreError::Json {
                message: String::new(),
                body: None
            }
            .is_unavailable()
        );
    }
}
