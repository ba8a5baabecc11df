/*!
 * Provider implementations for the external services used by the podcast pipeline.
 *
 * Script authoring goes through chat LLM clients:
 * - OpenAI-compatible: Groq, OpenAI and LM Studio
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 *
 * Speech goes through an OpenAI-compatible `/audio/speech` client.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::warn;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::podcast::clip::AudioFormat;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all chat client implementations follow,
/// allowing them to be used interchangeably by the script author.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Something that can write a two-host conversation about a news digest
#[async_trait]
pub trait ScriptAuthor: Send + Sync + Debug {
    /// Return the raw transcript for `digest`
    async fn generate_script(&self, digest: &str) -> Result<String, ProviderError>;
}

/// A per-utterance text-to-speech service
#[async_trait]
pub trait SpeechBackend: Send + Sync + Debug {
    /// Render `text` with `voice_id` and return the encoded audio
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError>;

    /// Container format of the returned audio
    fn format(&self) -> AudioFormat;
}

/// Run `operation` until it succeeds, fails permanently or runs out of retries.
///
/// The delay doubles after each failed attempt starting at `backoff_base_ms`.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    label: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                let delay = backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
                warn!("{} request failed (attempt {}/{}): {}. Retrying in {}ms",
                      label, attempt + 1, max_retries + 1, e, delay);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod speech;
