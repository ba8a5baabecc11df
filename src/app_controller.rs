use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::news_store::NewsDocument;
use crate::podcast::{EpisodeMetadata, PodcastPipeline, ScriptOutcome};

// @module: Application controller for podcast production

/// Main application controller: loads the news document, runs the podcast
/// pipeline and persists the result
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Show a synthesis progress bar
    show_progress: bool,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Ok(Self::with_config(Config::default())?.with_progress(false))
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pipeline wired to the configured providers
    pub fn pipeline(&self) -> PodcastPipeline {
        PodcastPipeline::from_config(&self.config).with_progress(self.show_progress)
    }

    /// Produce today's episode for the news document at `news_path`
    pub async fn run(&self, news_path: &Path) -> Result<Option<EpisodeMetadata>> {
        self.run_with_pipeline(news_path, &self.pipeline()).await
    }

    /// Produce an episode with `pipeline` and merge its metadata into the document.
    ///
    /// The document is always written back; the `podcast` field is removed when no
    /// episode was produced.
    pub async fn run_with_pipeline(
        &self,
        news_path: &Path,
        pipeline: &PodcastPipeline,
    ) -> Result<Option<EpisodeMetadata>> {
        let start_time = Instant::now();

        let mut document = NewsDocument::load(news_path)
            .with_context(|| format!("Failed to load news document {:?}", news_path))?;
        info!("Loaded {} articles from {:?}", document.articles.len(), news_path);

        let metadata = if document.articles.is_empty() {
            warn!("No articles available, skipping podcast generation");
            None
        } else {
            pipeline.create_podcast(&document.articles).await
        };

        document.set_podcast(metadata.clone());
        document.save(news_path)
            .with_context(|| format!("Failed to save news document {:?}", news_path))?;

        match &metadata {
            Some(episode) => info!(
                "Podcast ready: {} ({} segments, ~{}s). Completed in {}",
                episode.file, episode.segments, episode.duration, Self::format_duration(start_time.elapsed())
            ),
            None => warn!(
                "No podcast produced. News document saved in {}",
                Self::format_duration(start_time.elapsed())
            ),
        }

        Ok(metadata)
    }

    /// Acquire and parse a script without synthesising it
    pub async fn dry_run_script(&self, news_path: &Path) -> Result<(ScriptOutcome, usize)> {
        let document = NewsDocument::load(news_path)
            .with_context(|| format!("Failed to load news document {:?}", news_path))?;
        let pipeline = self.pipeline();
        let outcome = pipeline.acquire_script(&document.articles).await;
        let segments = pipeline.parse(outcome.script()).len();
        Ok((outcome, segments))
    }

    /// Format a duration in a human-readable form
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
