use reqwest::StatusCode;
use thiserror::Error;

/// Failure modes of the device HTTP API.
#[derive(Debug, Error)]
pub enum DeviceApiError {
    /// The request never completed cleanly: connection failure, or an error
    /// status on the stats endpoint.
    #[error("device request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The stats endpoint answered, but the body was not a well-formed state
    /// payload.
    #[error("malformed stats payload: {0}")]
    Malformed(#[source] reqwest::Error),
    /// A command endpoint answered with a non-success status. The reply text
    /// is the device's own explanation.
    #[error("device rejected {endpoint} ({status}): {reply}")]
    Rejected {
        endpoint: &'static str,
        status: StatusCode,
        reply: String,
    },
}
