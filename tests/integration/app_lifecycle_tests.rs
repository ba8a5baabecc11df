/*!
 * Integration tests for application lifecycle
 */

use anyhow::Result;
use std::sync::Arc;

use newscast::app_config::Config;
use newscast::app_controller::Controller;
use newscast::news_store::NewsDocument;
use newscast::podcast::{PodcastPipeline, VoiceProfile};
use newscast::providers::mock::{MockScriptAuthor, MockSpeechBackend};
use crate::common;

fn controller(data_dir: &std::path::Path) -> Result<Controller> {
    let mut config = Config::default();
    config.podcast.data_dir = data_dir.to_path_buf();
    Ok(Controller::with_config(config)?.with_progress(false))
}

fn mock_pipeline(author: MockScriptAuthor, speech: MockSpeechBackend, data_dir: &std::path::Path) -> PodcastPipeline {
    PodcastPipeline::new(
        Arc::new(author),
        Arc::new(speech),
        VoiceProfile::default(),
        common::test_settings(data_dir),
    )
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().podcast.gap_ms, 300);
    Ok(())
}

/// Test that a produced episode is merged into the news document
#[tokio::test]
async fn test_run_withWorkingPipeline_shouldMergePodcastMetadata() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let news_path = common::create_news_document(temp_dir.path())?;
    let controller = controller(temp_dir.path())?;
    let pipeline = mock_pipeline(
        MockScriptAuthor::working(common::SAMPLE_SCRIPT),
        MockSpeechBackend::working(),
        temp_dir.path(),
    );

    let metadata = controller.run_with_pipeline(&news_path, &pipeline).await?
        .expect("episode metadata");

    let document = NewsDocument::load(&news_path)?;
    assert_eq!(document.podcast.as_ref(), Some(&metadata));
    assert_eq!(metadata.segments, common::SAMPLE_SEGMENTS);
    assert_eq!(metadata.speakers, vec!["Alex", "Jordan"]);
    assert_eq!(document.articles.len(), 3);

    // Fields this crate does not know about survive the rewrite
    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&news_path)?)?;
    assert_eq!(raw["papers"][0]["title"], "Attention again");
    assert_eq!(raw["updated"], "2026-10-17T06:00:00");
    Ok(())
}

/// Test that a failed run removes a stale podcast section but keeps the articles
#[tokio::test]
async fn test_run_withFailedPodcast_shouldRemovePodcastField() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let news_path = common::create_news_document(temp_dir.path())?;
    let controller = controller(temp_dir.path())?;

    let working = mock_pipeline(
        MockScriptAuthor::working(common::SAMPLE_SCRIPT),
        MockSpeechBackend::working(),
        temp_dir.path(),
    );
    assert!(controller.run_with_pipeline(&news_path, &working).await?.is_some());

    let failing = mock_pipeline(
        MockScriptAuthor::working(common::SAMPLE_SCRIPT),
        MockSpeechBackend::failing(),
        temp_dir.path(),
    );
    let metadata = controller.run_with_pipeline(&news_path, &failing).await?;

    assert!(metadata.is_none());
    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&news_path)?)?;
    assert!(raw.get("podcast").is_none());
    assert_eq!(raw["articles"].as_array().map(Vec::len), Some(3));
    Ok(())
}

/// Test that a document without articles skips podcast production
#[tokio::test]
async fn test_run_withoutArticles_shouldSkipPodcast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let news_path = common::create_test_file(temp_dir.path(), "news.json", r#"{"articles": []}"#)?;
    let controller = controller(temp_dir.path())?;
    let author = MockScriptAuthor::working(common::SAMPLE_SCRIPT);
    let pipeline = mock_pipeline(author.clone(), MockSpeechBackend::working(), temp_dir.path());

    assert!(controller.run_with_pipeline(&news_path, &pipeline).await?.is_none());
    assert!(author.digests().is_empty());
    Ok(())
}

/// Test that a missing news document is an error
#[tokio::test]
async fn test_run_withMissingDocument_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller(temp_dir.path())?;
    let pipeline = mock_pipeline(
        MockScriptAuthor::working(common::SAMPLE_SCRIPT),
        MockSpeechBackend::working(),
        temp_dir.path(),
    );

    let result = controller.run_with_pipeline(&temp_dir.path().join("missing.json"), &pipeline).await;
    assert!(result.is_err());
    Ok(())
}

/// Test that the controller can be driven from synchronous code
#[test]
fn test_run_withBlockingRuntime_shouldProduceEpisode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let news_path = common::create_news_document(temp_dir.path())?;
    let controller = controller(temp_dir.path())?;
    let pipeline = mock_pipeline(
        MockScriptAuthor::working(common::SAMPLE_SCRIPT),
        MockSpeechBackend::working(),
        temp_dir.path(),
    );

    let metadata = tokio_test::block_on(async {
        controller.run_with_pipeline(&news_path, &pipeline).await
    })?;

    assert!(metadata.is_some());
    assert!(temp_dir.path().join("podcast").join("latest.wav").exists());
    Ok(())
}
