//! Fetch error types.

use thiserror::Error;

/// Errors from outbound HTTP requests and response decoding.
///
/// [`Network`](FetchError::Network) is the transport failure scripts see
/// when a request cannot complete; [`Decode`](FetchError::Decode) is only
/// produced by the JSON accessors on an already-received response.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FetchError {
    /// DNS, connect, TLS, timeout or I/O failure.
    #[error("fetch failed for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The method is not a valid HTTP token.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// A request header name or value is not valid HTTP.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The response body does not have the requested shape.
    #[error("response is not valid JSON: {reason}")]
    Decode { reason: String },

    /// The background task running the request failed or was cancelled.
    #[error("fetch task failed: {0}")]
    TaskFailed(String),

    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl FetchError {
    /// Whether this is a transport-level failure.
    pub fn is_network(&self) -> bool {
        matches!(self, FetchError::Network { .. })
    }

    /// Whether the transport failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Network { source, .. } if source.is_timeout())
    }
}

impl From<FetchError> for scriptnet_types::ScriptnetError {
    fn from(err: FetchError) -> Self {
        scriptnet_types::ScriptnetError::Fetch(err.to_string())
    }
}
