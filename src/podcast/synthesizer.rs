/*!
 * Renders dialogue segments into per-segment audio clips.
 *
 * Segments are synthesised strictly one after another: the request for clip N is
 * only issued once clip N-1 is on disk. A single failure aborts the episode.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::time::Duration;

use crate::errors::{PodcastError, ProviderError};
use crate::podcast::clip::{AudioClip, ClipSet, ClipWorkspace};
use crate::podcast::parser::DialogueSegment;
use crate::podcast::speakers::VoiceProfile;
use crate::providers::SpeechBackend;

/// Sequential segment-to-clip renderer
pub struct SegmentSynthesizer<'a> {
    backend: &'a dyn SpeechBackend,
    profile: &'a VoiceProfile,
    timeout: Duration,
    progress: ProgressBar,
}

impl<'a> SegmentSynthesizer<'a> {
    pub fn new(backend: &'a dyn SpeechBackend, profile: &'a VoiceProfile, timeout: Duration) -> Self {
        Self {
            backend,
            profile,
            timeout,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` instead of the hidden default bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Progress bar styled the way the CLI shows synthesis
    pub fn styled_progress_bar(len: u64) -> ProgressBar {
        let progress = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        progress
    }

    /// Synthesise every segment into `workspace`, in order.
    ///
    /// On error the workspace is dropped, which removes any clips already written.
    pub async fn synthesize_all(
        &self,
        segments: &[DialogueSegment],
        workspace: ClipWorkspace,
    ) -> Result<ClipSet, PodcastError> {
        let format = self.backend.format();
        let mut clips = Vec::with_capacity(segments.len());

        self.progress.set_length(segments.len() as u64);
        self.progress.set_position(0);

        for segment in segments {
            self.progress.set_message(segment.speaker.name().to_string());

            let voice = self.profile.voice_for(&segment.speaker).ok_or_else(|| {
                PodcastError::SynthesisFailure {
                    order: segment.order,
                    reason: format!("no voice configured for speaker {}", segment.speaker),
                }
            })?;

            let preview: String = segment.text.chars().take(50).collect();
            debug!("Generating audio for {}: {}...", segment.speaker, preview);

            let audio = match tokio::time::timeout(self.timeout, self.backend.synthesize(&segment.text, voice)).await {
                Ok(Ok(audio)) if audio.is_empty() => Err(ProviderError::EmptyResponse),
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            }
            .map_err(|e| PodcastError::SynthesisFailure {
                order: segment.order,
                reason: e.to_string(),
            })?;

            let path = workspace.clip_path(segment.order, format);
            tokio::fs::write(&path, &audio).await?;

            clips.push(AudioClip {
                order: segment.order,
                speaker: segment.speaker.clone(),
                path,
                size_bytes: audio.len(),
            });
            self.progress.inc(1);
        }

        self.progress.finish_and_clear();
        info!("Synthesised {} clips", clips.len());
        Ok(ClipSet::new(workspace, clips, format))
    }
}
