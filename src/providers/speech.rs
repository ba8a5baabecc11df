/*!
 * Client for OpenAI-compatible text-to-speech endpoints.
 *
 * One request renders one utterance: `POST {endpoint}/audio/speech` with the
 * model, the text, the voice and the desired container format.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::app_config::VoiceConfig;
use crate::errors::ProviderError;
use crate::podcast::clip::AudioFormat;
use crate::providers::SpeechBackend;

/// Speech request body
#[derive(Debug, Serialize)]
pub struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

/// HTTP speech backend
#[derive(Debug)]
pub struct OpenAISpeech {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    format: AudioFormat,
}

impl OpenAISpeech {
    /// Create a client from the voice section of the configuration
    pub fn from_config(config: &VoiceConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs.max(1)))
                .build()
                .unwrap_or_default(),
            api_key: config.get_api_key(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            format: config.response_format,
        }
    }
}

#[async_trait]
impl SpeechBackend for OpenAISpeech {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError> {
        let url = format!("{}/audio/speech", self.endpoint);
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: voice_id,
            response_format: self.format.extension(),
        };

        let mut request = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Speech API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        debug!("Received {} bytes of {} audio for voice {}", audio.len(), self.format, voice_id);
        Ok(audio)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}
