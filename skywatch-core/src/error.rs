use reqwest::StatusCode;
use thiserror::Error;

/// Failure classes for a single weather or icon lookup.
///
/// Every variant is terminal for the operation that produced it; the core
/// never retries on its own.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured endpoint could not be turned into a valid request URL.
    #[error("cannot build a request URL from `{0}`")]
    MalformedRequest(String),

    /// Transport-level failure: connect, DNS, TLS, or body transfer.
    #[error("network failure talking to the weather service")]
    Network(#[source] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("weather service responded with HTTP {0}")]
    Http(StatusCode),

    /// The response body did not match the expected shape.
    #[error("could not decode response body: {0}")]
    Decode(String),
}

impl Error {
    /// Status code for `Http` failures, `None` otherwise.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Http(status) => Some(*status),
            _ => None,
        }
    }
}
