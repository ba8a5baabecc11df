/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use newscast::app_config::{Config, LogLevel, ProviderConfig, ScriptProvider};
use newscast::podcast::AudioFormat;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.script.provider, ScriptProvider::Groq);
    assert_eq!(config.script.get_model(), "llama-3.3-70b-versatile");
    assert_eq!(config.script.common.temperature, 0.8);
    assert_eq!(config.script.common.max_tokens, 800);
    assert_eq!(config.script.common.top_items, 5);

    assert_eq!(config.voice.speakers.len(), 2);
    assert_eq!(config.voice.speakers[0].label, "ALEX");
    assert_eq!(config.voice.speakers[1].label, "JORDAN");
    assert_eq!(config.voice.response_format, AudioFormat::Wav);

    assert_eq!(config.podcast.data_dir, PathBuf::from("data"));
    assert_eq!(config.podcast.gap_ms, 300);
    assert_eq!(config.podcast.chars_per_second, 15);
    assert!(config.podcast.mixing);
    assert_eq!(config.podcast.public_dir, "data/podcast");

    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test that a missing file is created with the defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.podcast.gap_ms, 300);

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.script.provider, config.script.provider);
    Ok(())
}

/// Test that partial files are completed with defaults
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", r#"{
        "script": {"provider": "ollama", "available_providers": [{"type": "ollama", "model": "qwen2.5"}]},
        "voice": {"response_format": "mp3"},
        "podcast": {"gap_ms": 500},
        "log_level": "debug"
    }"#)?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.script.provider, ScriptProvider::Ollama);
    assert_eq!(config.script.get_model(), "qwen2.5");
    assert_eq!(config.script.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.voice.response_format, AudioFormat::Mp3);
    assert_eq!(config.voice.speakers.len(), 2);
    assert_eq!(config.podcast.gap_ms, 500);
    assert_eq!(config.podcast.chars_per_second, 15);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    config.script.provider = ScriptProvider::LMStudio;
    assert!(config.validate().is_ok());

    // Hosted provider with an explicit key
    config.script.provider = ScriptProvider::Anthropic;
    let mut anthropic = ProviderConfig::new(ScriptProvider::Anthropic);
    anthropic.api_key = "test-key".to_string();
    config.script.available_providers = vec![anthropic];
    assert!(config.validate().is_ok());

    // Label containing the separator
    let mut broken = config.clone();
    broken.voice.speakers[0].label = "HOST:1".to_string();
    assert!(broken.validate().is_err());

    // Missing voice
    let mut broken = config.clone();
    broken.voice.speakers[1].voice = " ".to_string();
    assert!(broken.validate().is_err());

    // Unparsable endpoint
    let mut broken = config.clone();
    broken.voice.endpoint = "not a url".to_string();
    assert!(broken.validate().is_err());

    // Zero speaking rate
    let mut broken = config.clone();
    broken.podcast.chars_per_second = 0;
    assert!(broken.validate().is_err());
}

/// Test that a zero voice timeout is rejected instead of failing every utterance
#[test]
fn test_config_validation_withZeroVoiceTimeout_shouldFail() {
    let mut config = Config::default();
    config.script.provider = ScriptProvider::LMStudio;
    config.voice.timeout_secs = 0;

    let error = config.validate().unwrap_err();
    assert!(error.to_string().contains("timeout_secs"));

    config.voice.timeout_secs = 1;
    assert!(config.validate().is_ok());
}

/// Test that the script deadline covers every attempt and the backoff between them
#[test]
fn test_script_deadline_shouldCoverRetryBudget() {
    let mut config = Config::default();
    assert_eq!(config.script.get_script_deadline(), Duration::from_secs(183));

    let mut provider_config = ProviderConfig::new(ScriptProvider::Groq);
    provider_config.timeout_secs = 1;
    config.script.available_providers = vec![provider_config];
    config.script.common.retry_count = 3;
    config.script.common.retry_backoff_ms = 10;
    assert_eq!(config.script.get_script_deadline(), Duration::from_millis(4070));

    config.script.common.retry_count = 0;
    assert_eq!(config.script.get_script_deadline(), Duration::from_secs(1));
}

/// Test log level mapping
#[test]
fn test_log_level_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
