/*!
 * Tests for error types and conversions
 */

use std::time::Duration;
use newscast::errors::{AppError, PodcastError, ProviderError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection reset".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection reset"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "Internal error".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("500"));
    assert!(display.contains("Internal error"));
}

#[test]
fn test_providerError_timeout_shouldBeRetryable() {
    let error = ProviderError::Timeout(Duration::from_secs(30));
    assert!(error.to_string().contains("timed out"));
    assert!(error.is_retryable());
    assert!(!ProviderError::EmptyResponse.is_retryable());
}

#[test]
fn test_podcastError_synthesisFailure_shouldNameSegment() {
    let error = PodcastError::SynthesisFailure {
        order: 3,
        reason: "voice not found".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("segment 3"));
    assert!(display.contains("voice not found"));
}

#[test]
fn test_podcastError_scriptUnavailable_shouldKeepSource() {
    let error = PodcastError::ScriptUnavailable(ProviderError::EmptyResponse);
    let source = std::error::Error::source(&error).map(|s| s.to_string());
    assert_eq!(source.as_deref(), Some("Provider returned an empty response"));
}

#[test]
fn test_appError_fromPodcastError_shouldWrap() {
    let error: AppError = PodcastError::EmptyScript.into();
    assert!(matches!(error, AppError::Podcast(PodcastError::EmptyScript)));
    assert!(error.to_string().contains("no dialogue segments"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "news.json missing");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
}
