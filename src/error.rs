use thiserror::Error;

/// Failures surfaced by the fetch path. Storage problems never reach this
/// enum; the preference store logs and degrades instead of propagating.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be sent or the response body not received.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with `success: false`.
    #[error("server error: {0}")]
    Server(String),
    /// The envelope was missing fields or had the wrong shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}
