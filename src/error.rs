//! Error taxonomy for the polling engine.

use thiserror::Error;

/// Failure while talking to a remote endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The wiki has no base URL configured but the call requires one.
    #[error("wiki base url is required for this call")]
    MissingBaseUrl,
    /// Network or decoding failure from the HTTP layer.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The remote answered with a non-success status.
    #[error("{endpoint} returned status {status}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },
}

/// Typed failure reason returned to callers of the poll cycle.
///
/// Any of these means the checkpoint was not advanced and the next cycle
/// re-covers the same window.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("fetch stage failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("normalize stage failed: {0}")]
    Normalize(String),
}
