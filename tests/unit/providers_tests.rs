/*!
 * Tests for the provider clients against a local HTTP stub
 */

use std::time::Duration;

use newscast::app_config::{Config, ProviderConfig, ScriptConfig, ScriptProvider, VoiceConfig};
use newscast::errors::ProviderError;
use newscast::podcast::{AudioFormat, LlmScriptAuthor, PodcastPipeline, VoiceProfile};
use newscast::providers::speech::OpenAISpeech;
use newscast::providers::{ScriptAuthor, SpeechBackend};
use crate::common::{self, http_stub};

fn voice_config(endpoint: &str) -> VoiceConfig {
    VoiceConfig {
        endpoint: endpoint.to_string(),
        api_key: "voice-key".to_string(),
        ..VoiceConfig::default()
    }
}

fn script_config(provider: ScriptProvider, endpoint: &str, retries: u32) -> ScriptConfig {
    let mut provider_config = ProviderConfig::new(provider.clone());
    provider_config.endpoint = endpoint.to_string();
    provider_config.timeout_secs = 5;

    let mut config = ScriptConfig::default();
    config.provider = provider;
    config.available_providers = vec![provider_config];
    config.common.retry_count = retries;
    config.common.retry_backoff_ms = 1;
    config
}

fn chat_completion(content: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
    })).unwrap()
}

/// Test that the speech client posts the expected request and returns the audio
#[tokio::test]
async fn test_openaiSpeech_synthesize_shouldPostRequestAndReturnAudio() {
    let (url, server) = http_stub::serve(vec![(200, "audio/wav", b"RIFF-audio".to_vec())]).await;
    let backend = OpenAISpeech::from_config(&voice_config(&url));

    let audio = backend.synthesize("Hello there", "onyx").await.unwrap();
    assert_eq!(&audio[..], b"RIFF-audio");
    assert_eq!(backend.format(), AudioFormat::Wav);

    let requests = server.await.unwrap();
    assert!(requests[0].head.starts_with("POST /audio/speech"));
    assert_eq!(requests[0].header("authorization").as_deref(), Some("Bearer voice-key"));
    let body = requests[0].body_json();
    assert_eq!(body["model"], "tts-1");
    assert_eq!(body["input"], "Hello there");
    assert_eq!(body["voice"], "onyx");
    assert_eq!(body["response_format"], "wav");
}

/// Test that a rejected key maps to an authentication error
#[tokio::test]
async fn test_openaiSpeech_withUnauthorized_shouldReturnAuthenticationError() {
    let (url, _server) = http_stub::serve(vec![(401, "application/json", b"{\"error\":\"bad key\"}".to_vec())]).await;
    let backend = OpenAISpeech::from_config(&voice_config(&url));

    let result = backend.synthesize("Hello", "nova").await;
    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));
}

/// Test that an empty body is reported as an empty response
#[tokio::test]
async fn test_openaiSpeech_withEmptyBody_shouldReturnEmptyResponse() {
    let (url, _server) = http_stub::serve(vec![(200, "audio/wav", Vec::new())]).await;
    let backend = OpenAISpeech::from_config(&voice_config(&url));

    let result = backend.synthesize("Hello", "nova").await;
    assert!(matches!(result, Err(ProviderError::EmptyResponse)));
}

/// Test the OpenAI-compatible script author end to end
#[tokio::test]
async fn test_llmScriptAuthor_withLmStudio_shouldSendPromptAndReturnScript() {
    let (url, server) = http_stub::serve(vec![
        (200, "application/json", chat_completion("ALEX: Hi\nJORDAN: Hello")),
    ]).await;
    let author = LlmScriptAuthor::from_config(
        &script_config(ScriptProvider::LMStudio, &url, 0),
        &VoiceProfile::default(),
    );

    let script = author.generate_script("- Big news (Source: Wire)").await.unwrap();
    assert_eq!(script, "ALEX: Hi\nJORDAN: Hello");

    let requests = server.await.unwrap();
    assert!(requests[0].head.starts_with("POST /chat/completions"));
    assert_eq!(requests[0].header("authorization").as_deref(), Some("Bearer lm-studio"));
    let body = requests[0].body_json();
    assert_eq!(body["model"], "local-model");
    assert_eq!(body["max_tokens"], 800);
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][1]["content"].as_str().unwrap().contains("- Big news (Source: Wire)"));
}

/// Test that a transient server error is retried
#[tokio::test]
async fn test_llmScriptAuthor_withTransientError_shouldRetry() {
    let (url, server) = http_stub::serve(vec![
        (503, "application/json", b"{\"error\":\"busy\"}".to_vec()),
        (200, "application/json", chat_completion("ALEX: Back online")),
    ]).await;
    let author = LlmScriptAuthor::from_config(
        &script_config(ScriptProvider::LMStudio, &url, 1),
        &VoiceProfile::default(),
    );

    let script = author.generate_script("- item").await.unwrap();
    assert_eq!(script, "ALEX: Back online");
    assert_eq!(server.await.unwrap().len(), 2);
}

/// Test the Ollama chat path
#[tokio::test]
async fn test_llmScriptAuthor_withOllama_shouldUseChatEndpoint() {
    let body = serde_json::to_vec(&serde_json::json!({
        "model": "llama3.2",
        "message": {"role": "assistant", "content": "JORDAN: Local model here"},
        "done": true
    })).unwrap();
    let (url, server) = http_stub::serve(vec![(200, "application/json", body)]).await;
    let author = LlmScriptAuthor::from_config(
        &script_config(ScriptProvider::Ollama, &url, 0),
        &VoiceProfile::default(),
    );

    let script = author.generate_script("- item").await.unwrap();
    assert_eq!(script, "JORDAN: Local model here");

    let requests = server.await.unwrap();
    assert!(requests[0].head.starts_with("POST /api/chat"));
    assert_eq!(requests[0].body_json()["options"]["temperature"].as_f64().map(|t| (t * 10.0).round()), Some(8.0));
}

/// Test that a blank completion is an empty response
#[tokio::test]
async fn test_llmScriptAuthor_withBlankCompletion_shouldReturnEmptyResponse() {
    let (url, _server) = http_stub::serve(vec![(200, "application/json", chat_completion("  \n"))]).await;
    let author = LlmScriptAuthor::from_config(
        &script_config(ScriptProvider::LMStudio, &url, 0),
        &VoiceProfile::default(),
    );

    let result = author.generate_script("- item").await;
    assert!(matches!(result, Err(ProviderError::EmptyResponse)));
}

/// Test that a stalled attempt is retried within the pipeline's script deadline
#[tokio::test]
async fn test_pipeline_acquireScript_withStalledFirstAttempt_shouldUseRetriedScript() {
    let (url, server) = http_stub::serve_after_stall(1, vec![
        (200, "application/json", chat_completion("ALEX: Sorry for the wait\nJORDAN: Worth it")),
    ]).await;

    let mut config = Config::default();
    config.script = script_config(ScriptProvider::LMStudio, &url, 3);
    config.script.available_providers[0].timeout_secs = 1;
    config.script.common.retry_backoff_ms = 10;
    let pipeline = PodcastPipeline::from_config(&config);
    assert!(pipeline.settings().script_timeout > Duration::from_secs(1));

    let outcome = pipeline.acquire_script(&common::sample_items()).await;
    assert!(!outcome.is_fallback());
    assert_eq!(outcome.script(), "ALEX: Sorry for the wait\nJORDAN: Worth it");
    assert_eq!(server.await.unwrap().len(), 2);
}
