use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::podcast::clip::AudioFormat;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Script author config
    #[serde(default)]
    pub script: ScriptConfig,

    /// Speech synthesis config
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Episode production settings
    #[serde(default)]
    pub podcast: PodcastConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Script author provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptProvider {
    // @provider: Groq (OpenAI-compatible)
    #[default]
    Groq,
    // @provider: OpenAI
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama
    Ollama,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl ScriptProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Groq => "Groq",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Groq => "groq".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Environment variable consulted when no key is configured
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama | Self::LMStudio => None,
        }
    }

    // @returns: Whether a hosted API key is mandatory
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

impl std::fmt::Display for ScriptProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ScriptProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_script_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: ScriptProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            timeout_secs: default_script_timeout_secs(),
        }
    }
}

/// Script author configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Provider used to author the dialogue
    #[serde(default)]
    pub provider: ScriptProvider,

    /// Available script providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Prompt and request settings shared by all providers
    #[serde(default)]
    pub common: ScriptCommonConfig,
}

/// Common script settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptCommonConfig {
    /// System prompt given to the script author
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of tokens in the generated script
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Number of top news items included in the digest
    #[serde(default = "default_top_items")]
    pub top_items: usize,
}

impl Default for ScriptCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            top_items: default_top_items(),
        }
    }
}

/// One of the two podcast hosts
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeakerConfig {
    /// Label used in the transcript, e.g. "ALEX"
    pub label: String,
    /// Display name used in episode metadata
    pub name: String,
    /// Voice identifier understood by the speech backend
    pub voice: String,
}

/// Speech synthesis backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VoiceConfig {
    /// OpenAI-compatible base URL, `/audio/speech` is appended
    #[serde(default = "default_voice_endpoint")]
    pub endpoint: String,

    /// API key for the service (falls back to OPENAI_API_KEY)
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Speech model name
    #[serde(default = "default_voice_model")]
    pub model: String,

    /// Audio container requested from the backend
    #[serde(default)]
    pub response_format: AudioFormat,

    /// Per-utterance timeout in seconds
    #[serde(default = "default_voice_timeout_secs")]
    pub timeout_secs: u64,

    /// The two hosts and their voices
    #[serde(default = "default_speakers")]
    pub speakers: Vec<SpeakerConfig>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_voice_endpoint(),
            api_key: String::new(),
            model: default_voice_model(),
            response_format: AudioFormat::default(),
            timeout_secs: default_voice_timeout_secs(),
            speakers: default_speakers(),
        }
    }
}

impl VoiceConfig {
    /// Get the API key, consulting OPENAI_API_KEY when none is configured
    pub fn get_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        std::env::var("OPENAI_API_KEY").unwrap_or_default()
    }
}

/// Episode production settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PodcastConfig {
    /// Root data directory; episodes land in `<data_dir>/podcast`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Silence inserted between consecutive utterances
    #[serde(default = "default_gap_ms")]
    pub gap_ms: u64,

    /// Speaking rate used for the duration estimate
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: usize,

    /// Whether clips are mixed into one file or the first clip stands in
    #[serde(default = "default_true")]
    pub mixing: bool,

    /// Web path recorded as the episode `file`, independent of `data_dir`
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for PodcastConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            gap_ms: default_gap_ms(),
            chars_per_second: default_chars_per_second(),
            mixing: true,
            public_dir: default_public_dir(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_script_timeout_secs() -> u64 {
    60
}

fn default_voice_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.8
}

fn default_max_tokens() -> u32 {
    800
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_top_items() -> usize {
    5
}

fn default_gap_ms() -> u64 {
    300
}

fn default_chars_per_second() -> usize {
    15
}

fn default_true() -> bool {
    true
}

fn default_public_dir() -> String {
    "data/podcast".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_voice_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_voice_model() -> String {
    "tts-1".to_string()
}

fn default_speakers() -> Vec<SpeakerConfig> {
    vec![
        SpeakerConfig {
            label: "ALEX".to_string(),
            name: "Alex".to_string(),
            voice: "onyx".to_string(),
        },
        SpeakerConfig {
            label: "JORDAN".to_string(),
            name: "Jordan".to_string(),
            voice: "nova".to_string(),
        },
    ]
}

fn default_endpoint(provider: &ScriptProvider) -> String {
    match provider {
        ScriptProvider::Groq => "https://api.groq.com/openai/v1".to_string(),
        ScriptProvider::OpenAI => "https://api.openai.com/v1".to_string(),
        ScriptProvider::Anthropic => "https://api.anthropic.com".to_string(),
        ScriptProvider::Ollama => "http://localhost:11434".to_string(),
        // LM Studio default server (OpenAI compatible) runs on port 1234 under /v1
        ScriptProvider::LMStudio => "http://localhost:1234/v1".to_string(),
    }
}

fn default_model(provider: &ScriptProvider) -> String {
    match provider {
        ScriptProvider::Groq => "llama-3.3-70b-versatile".to_string(),
        ScriptProvider::OpenAI => "gpt-4o-mini".to_string(),
        ScriptProvider::Anthropic => "claude-3-haiku-20240307".to_string(),
        ScriptProvider::Ollama => "llama3.2".to_string(),
        ScriptProvider::LMStudio => "local-model".to_string(),
    }
}

fn default_system_prompt() -> String {
    "You are a professional podcast script writer specializing in tech news.".to_string()
}

impl Config {
    /// Load a configuration file, writing the defaults first when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            return serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path));
        }

        log::warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Speakers
        let speakers = &self.voice.speakers;
        if speakers.len() != 2 {
            return Err(anyhow!("Exactly two speakers are required, found {}", speakers.len()));
        }
        let mut labels = HashSet::new();
        for speaker in speakers {
            let label = speaker.label.trim().to_uppercase();
            if label.is_empty() || label.contains(':') {
                return Err(anyhow!("Invalid speaker label: {:?}", speaker.label));
            }
            if speaker.voice.trim().is_empty() {
                return Err(anyhow!("Speaker {} has no voice configured", speaker.label));
            }
            if !labels.insert(label) {
                return Err(anyhow!("Duplicate speaker label: {}", speaker.label));
            }
        }

        // Endpoints
        Url::parse(&self.script.get_endpoint())
            .with_context(|| format!("Invalid script endpoint: {}", self.script.get_endpoint()))?;
        Url::parse(&self.voice.endpoint)
            .with_context(|| format!("Invalid voice endpoint: {}", self.voice.endpoint))?;

        // API key for hosted providers
        if self.script.provider.requires_api_key() && self.script.get_api_key().is_empty() {
            return Err(anyhow!(
                "Script API key is required for {} provider",
                self.script.provider.display_name()
            ));
        }

        if self.voice.timeout_secs == 0 {
            return Err(anyhow!("voice timeout_secs must be greater than zero"));
        }

        if self.podcast.chars_per_second == 0 {
            return Err(anyhow!("chars_per_second must be greater than zero"));
        }

        Ok(())
    }
}

impl ScriptConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }
        default_model(&self.provider)
    }

    /// Get the API key for the active provider, then its environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider.api_key_env()
            .and_then(|name| std::env::var(name).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }
        default_endpoint(&self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_script_timeout_secs)
    }

    /// Deadline for a whole script request: every attempt plus the backoff between them
    pub fn get_script_deadline(&self) -> Duration {
        let attempts = u64::from(self.common.retry_count) + 1;
        let backoff_ms: u64 = (0..self.common.retry_count)
            .map(|attempt| self.common.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16)))
            .fold(0u64, u64::saturating_add);
        Duration::from_secs(self.get_timeout_secs().saturating_mul(attempts))
            + Duration::from_millis(backoff_ms)
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            provider: ScriptProvider::default(),
            available_providers: vec![
                ProviderConfig::new(ScriptProvider::Groq),
                ProviderConfig::new(ScriptProvider::OpenAI),
                ProviderConfig::new(ScriptProvider::Anthropic),
                ProviderConfig::new(ScriptProvider::Ollama),
                ProviderConfig::new(ScriptProvider::LMStudio),
            ],
            common: ScriptCommonConfig::default(),
        }
    }
}
