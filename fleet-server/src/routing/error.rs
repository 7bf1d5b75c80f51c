//! Routing provider error types.

/// Errors from the routing provider client.
///
/// These never propagate past the estimator/optimizer boundary; they
/// exist so fallback decisions and logs can tell failure modes apart.
#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    /// HTTP request failed (network error, connect timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider did not answer within the configured deadline
    #[error("routing provider timed out")]
    Timeout,

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Provider returned an error status code
    #[error("provider error {status}: {message}")]
    Api { status: u16, message: String },

    /// Invalid API key
    #[error("unauthorized (invalid routing API key)")]
    Unauthorized,

    /// Rate limited by the provider
    #[error("rate limited by routing provider")]
    RateLimited,

    /// Response was well-formed but contained no route
    #[error("provider response contained no route")]
    EmptyResponse,
}
