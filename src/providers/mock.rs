/*!
 * Mock collaborators for testing.
 *
 * - `MockScriptAuthor`: returns a canned transcript, fails, stalls or answers empty
 * - `MockSpeechBackend`: returns small WAV clips (or opaque bytes), fails, stalls
 *   or fails at a given call
 *
 * Both record what they were asked so tests can check call order.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::podcast::assembler::encode_wav;
use crate::podcast::clip::AudioFormat;
use crate::providers::{ScriptAuthor, SpeechBackend};

/// Sample rate of mock WAV clips
pub const MOCK_SAMPLE_RATE: u32 = 16000;

/// Behavior mode for the mock collaborators
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with an error
    Failing,
    /// Fails on the call with this zero-based index, succeeds otherwise
    FailAt { index: usize },
    /// Returns an empty response
    Empty,
    /// Simulates a slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock script author returning a fixed transcript
#[derive(Debug, Clone)]
pub struct MockScriptAuthor {
    behavior: MockBehavior,
    script: String,
    digests: Arc<Mutex<Vec<String>>>,
}

impl MockScriptAuthor {
    pub fn new(behavior: MockBehavior, script: impl Into<String>) -> Self {
        Self {
            behavior,
            script: script.into(),
            digests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Author that always returns `script`
    pub fn working(script: impl Into<String>) -> Self {
        Self::new(MockBehavior::Working, script)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, "")
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty, "")
    }

    pub fn slow(delay_ms: u64, script: impl Into<String>) -> Self {
        Self::new(MockBehavior::Slow { delay_ms }, script)
    }

    /// Digests received so far
    pub fn digests(&self) -> Vec<String> {
        self.digests.lock().clone()
    }
}

#[async_trait]
impl ScriptAuthor for MockScriptAuthor {
    async fn generate_script(&self, digest: &str) -> Result<String, ProviderError> {
        let call = {
            let mut digests = self.digests.lock();
            digests.push(digest.to_string());
            digests.len() - 1
        };

        match self.behavior {
            MockBehavior::Working => Ok(self.script.clone()),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated script author failure".to_string(),
            }),
            MockBehavior::FailAt { index } if index == call => Err(ProviderError::ApiError {
                status_code: 500,
                message: format!("Simulated failure on call #{}", call),
            }),
            MockBehavior::FailAt { .. } => Ok(self.script.clone()),
            MockBehavior::Empty => Ok(String::new()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.script.clone())
            }
        }
    }
}

/// One recorded synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCall {
    pub text: String,
    pub voice: String,
}

/// Mock speech backend.
///
/// In WAV mode call `n` returns a constant-amplitude clip whose sample value is
/// `mock_amplitude(n)` and whose length grows with the text, so a mixed episode
/// can be split back into its clips. In MP3 mode it returns opaque bytes no
/// decoder accepts.
#[derive(Debug, Clone)]
pub struct MockSpeechBackend {
    behavior: MockBehavior,
    format: AudioFormat,
    calls: Arc<Mutex<Vec<SpeechCall>>>,
}

impl MockSpeechBackend {
    pub fn new(behavior: MockBehavior, format: AudioFormat) -> Self {
        Self {
            behavior,
            format,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working, AudioFormat::Wav)
    }

    /// Backend producing bytes the mixer cannot decode
    pub fn opaque() -> Self {
        Self::new(MockBehavior::Working, AudioFormat::Mp3)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, AudioFormat::Wav)
    }

    pub fn fail_at(index: usize) -> Self {
        Self::new(MockBehavior::FailAt { index }, AudioFormat::Wav)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms }, AudioFormat::Wav)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty, AudioFormat::Wav)
    }

    /// Requests received so far, in call order
    pub fn calls(&self) -> Vec<SpeechCall> {
        self.calls.lock().clone()
    }

    /// Encoded audio the backend returns for call `call` with `text`
    pub fn audio_for(&self, call: usize, text: &str) -> Result<Bytes, ProviderError> {
        match self.format {
            AudioFormat::Wav => {
                let samples = vec![mock_amplitude(call); mock_clip_len(text)];
                encode_wav(&samples, MOCK_SAMPLE_RATE)
                    .map(Bytes::from)
                    .map_err(|e| ProviderError::ParseError(e.to_string()))
            }
            AudioFormat::Mp3 => Ok(Bytes::from(format!("MOCK-AUDIO-{}:{}", call, text))),
        }
    }
}

/// Sample value of mock clip `call`; small enough to survive a float round trip exactly
pub fn mock_amplitude(call: usize) -> i16 {
    1000 + (call % 15) as i16 * 1000
}

/// Sample count of a mock clip for `text`
pub fn mock_clip_len(text: &str) -> usize {
    800 + 40 * text.chars().count()
}

#[async_trait]
impl SpeechBackend for MockSpeechBackend {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Bytes, ProviderError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(SpeechCall {
                text: text.to_string(),
                voice: voice_id.to_string(),
            });
            calls.len() - 1
        };

        match self.behavior {
            MockBehavior::Working => self.audio_for(call, text),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated speech failure".to_string(),
            }),
            MockBehavior::FailAt { index } if index == call => Err(ProviderError::ApiError {
                status_code: 503,
                message: format!("Simulated speech failure on call #{}", call),
            }),
            MockBehavior::FailAt { .. } => self.audio_for(call, text),
            MockBehavior::Empty => Ok(Bytes::new()),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                self.audio_for(call, text)
            }
        }
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}
