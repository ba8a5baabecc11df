/*!
 * Error types for the newscast application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The call did not complete within its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered successfully but with nothing usable
    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Map an HTTP status and body onto the matching error variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::ConnectionError(format!("request timed out: {}", error))
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while producing a podcast episode.
///
/// `ScriptUnavailable` is recovered inside script acquisition by substituting the
/// fallback transcript; every other variant aborts the podcast step only.
#[derive(Error, Debug)]
pub enum PodcastError {
    /// The script author failed or timed out
    #[error("Script author unavailable: {0}")]
    ScriptUnavailable(#[source] ProviderError),

    /// The transcript contained no recognised dialogue lines
    #[error("Script produced no dialogue segments")]
    EmptyScript,

    /// A single utterance could not be synthesised
    #[error("Speech synthesis failed for segment {order}: {reason}")]
    SynthesisFailure {
        /// Order index of the failing segment
        order: usize,
        /// Human readable cause
        reason: String,
    },

    /// Clips could not be combined into an episode file
    #[error("Audio assembly failed: {0}")]
    Assembly(String),

    /// The episode could not be written to its final locations
    #[error("Publishing failed: {0}")]
    Publish(String),

    /// Temporary or output file handling failed
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from podcast production
    #[error("Podcast error: {0}")]
    Podcast(#[from] PodcastError),

    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
