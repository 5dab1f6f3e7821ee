use thiserror::Error;

/// Failures from a request to the knowledge service. Callers only ever surface
/// these as display text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The service could not be reached, the request threw, or the response
    /// could not be read.
    #[error("{0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("{0}")]
    Application(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> ApiError {
        return ApiError::Transport(err.to_string());
    }
}
