//! Errors from external recognition collaborators.

use std::time::Duration;

use thiserror::Error;

/// Errors from the cloud recognition services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{service} is not configured: set GOOGLE_API_KEY or GOOGLE_ACCESS_TOKEN")]
    NotConfigured { service: &'static str },

    /// Transport failure. The request URL is stripped before wrapping.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("{service} API error: {message}")]
    Api {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("{service} returned an unexpected response: {detail}")]
    InvalidResponse {
        service: &'static str,
        detail: String,
    },

    #[error("{service} did not finish within {waited:?}")]
    Timeout {
        service: &'static str,
        waited: Duration,
    },
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Http(err.without_url())
    }
}

/// Errors from the audio transcoder.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("{0}")]
    BinaryNotFound(String),

    #[error("transcoding failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
