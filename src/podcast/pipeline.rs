/*!
 * End-to-end podcast production for one run.
 *
 * script acquisition -> parsing -> sequential synthesis -> assembly -> publishing
 *
 * Failures are contained here: `create_podcast` logs the cause and returns `None`
 * so the surrounding news run always completes.
 */

use chrono::{Local, NaiveDate};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::PodcastError;
use crate::news_store::NewsItem;
use crate::podcast::assembler::{discard_partial, AudioAssembler, ClipMixer, PcmMixer};
use crate::podcast::clip::ClipWorkspace;
use crate::podcast::parser::{DialogueSegment, ScriptParser};
use crate::podcast::publisher::{Episode, EpisodeMetadata, EpisodePaths, Publisher};
use crate::podcast::script::{acquire_script, build_digest, LlmScriptAuthor, ScriptOutcome};
use crate::podcast::speakers::VoiceProfile;
use crate::podcast::synthesizer::SegmentSynthesizer;
use crate::providers::speech::OpenAISpeech;
use crate::providers::{ScriptAuthor, SpeechBackend};

/// Tunables of a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Deadline for the whole script request, retries included
    pub script_timeout: Duration,
    /// Deadline for each utterance
    pub voice_timeout: Duration,
    /// Number of news items in the digest
    pub top_items: usize,
    pub gap: Duration,
    pub chars_per_second: usize,
    pub data_dir: PathBuf,
    pub mixing: bool,
    /// Web path recorded in the episode metadata
    pub public_dir: String,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            script_timeout: config.script.get_script_deadline(),
            voice_timeout: Duration::from_secs(config.voice.timeout_secs),
            top_items: config.script.common.top_items,
            gap: Duration::from_millis(config.podcast.gap_ms),
            chars_per_second: config.podcast.chars_per_second,
            data_dir: config.podcast.data_dir.clone(),
            mixing: config.podcast.mixing,
            public_dir: config.podcast.public_dir.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Produces podcast episodes from news items
#[derive(Debug)]
pub struct PodcastPipeline {
    author: Arc<dyn ScriptAuthor>,
    speech: Arc<dyn SpeechBackend>,
    profile: VoiceProfile,
    settings: PipelineSettings,
    assembler: Arc<AudioAssembler>,
    show_progress: bool,
}

impl PodcastPipeline {
    pub fn new(
        author: Arc<dyn ScriptAuthor>,
        speech: Arc<dyn SpeechBackend>,
        profile: VoiceProfile,
        settings: PipelineSettings,
    ) -> Self {
        let mixer: Option<Box<dyn ClipMixer>> = if settings.mixing {
            Some(Box::new(PcmMixer::new()))
        } else {
            None
        };
        let assembler = AudioAssembler::new(mixer, settings.gap);

        Self {
            author,
            speech,
            profile,
            settings,
            assembler: Arc::new(assembler),
            show_progress: false,
        }
    }

    /// Pipeline talking to the configured script provider and speech service
    pub fn from_config(config: &Config) -> Self {
        let profile = VoiceProfile::from_config(&config.voice);
        let author = LlmScriptAuthor::from_config(&config.script, &profile);
        let speech = OpenAISpeech::from_config(&config.voice);
        Self::new(Arc::new(author), Arc::new(speech), profile, PipelineSettings::from_config(config))
    }

    /// Replace the mixer; `None` forces the first-clip fallback
    pub fn with_mixer(mut self, mixer: Option<Box<dyn ClipMixer>>) -> Self {
        self.assembler = Arc::new(AudioAssembler::new(mixer, self.settings.gap));
        self
    }

    /// Show a progress bar while synthesising
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn profile(&self) -> &VoiceProfile {
        &self.profile
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn paths(&self) -> EpisodePaths {
        EpisodePaths::new(&self.settings.data_dir)
    }

    /// Digest `items` and obtain a transcript, falling back when the author fails
    pub async fn acquire_script(&self, items: &[NewsItem]) -> ScriptOutcome {
        let digest = build_digest(items, self.settings.top_items);
        info!("Generating podcast script from {} news items...", items.len().min(self.settings.top_items));
        acquire_script(self.author.as_ref(), &digest, self.settings.script_timeout, &self.profile).await
    }

    pub fn parse(&self, script: &str) -> Vec<DialogueSegment> {
        ScriptParser::new(&self.profile).parse(script)
    }

    /// Produce and publish the episode for today
    pub async fn produce(&self, items: &[NewsItem]) -> Result<Episode, PodcastError> {
        self.produce_on(items, Local::now().date_naive()).await
    }

    /// Produce and publish the episode for `date`
    pub async fn produce_on(&self, items: &[NewsItem], date: NaiveDate) -> Result<Episode, PodcastError> {
        let outcome = self.acquire_script(items).await;
        let segments = self.parse(outcome.script());
        if segments.is_empty() {
            return Err(PodcastError::EmptyScript);
        }
        info!("Parsed {} dialogue segments", segments.len());

        let paths = self.paths();
        let workspace = ClipWorkspace::create_in(paths.temp_dir())
            .map_err(|e| PodcastError::Io(std::io::Error::other(format!("{:#}", e))))?;
        let run_name = workspace.path()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "run".to_string());
        let staging = paths.temp_dir().join(format!("{}-episode", run_name));

        let mut synthesizer = SegmentSynthesizer::new(
            self.speech.as_ref(),
            &self.profile,
            self.settings.voice_timeout,
        );
        if self.show_progress {
            synthesizer = synthesizer
                .with_progress(SegmentSynthesizer::styled_progress_bar(segments.len() as u64));
        }
        let clip_set = synthesizer.synthesize_all(&segments, workspace).await?;

        // Decoding and encoding are CPU bound; keep them off the async workers
        let assembler = Arc::clone(&self.assembler);
        let assembly = tokio::task::spawn_blocking(move || assembler.assemble(clip_set, &staging))
            .await
            .map_err(|e| PodcastError::Assembly(format!("assembly task failed: {}", e)))??;
        if assembly.degraded {
            warn!("Episode is degraded: {}",
                  assembly.degradation_reason.as_deref().unwrap_or("unknown reason"));
        }

        let publisher = Publisher::new(
            paths,
            self.settings.chars_per_second,
            self.profile.speakers().cloned().collect(),
        )
        .with_public_dir(self.settings.public_dir.clone());
        let published = publisher.publish(&assembly, &segments, date);
        if published.is_err() {
            discard_partial(&assembly.output);
        }
        published
    }

    /// Produce today's episode, containing every failure.
    ///
    /// Returns the metadata to merge into the news document, or `None` when no
    /// episode could be produced.
    pub async fn create_podcast(&self, items: &[NewsItem]) -> Option<EpisodeMetadata> {
        match self.produce(items).await {
            Ok(episode) => Some(episode.metadata()),
            Err(e) => {
                error!("Podcast generation failed: {}", e);
                None
            }
        }
    }
}
