/*!
 * Publishing: move the assembled episode onto its canonical location, keep a dated
 * archive copy and describe the result.
 */

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::PodcastError;
use crate::file_utils::FileManager;
use crate::podcast::assembler::AssemblyResult;
use crate::podcast::clip::AudioFormat;
use crate::podcast::parser::DialogueSegment;
use crate::podcast::speakers::SpeakerId;

/// Date format used for archive names and metadata
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Web path the news site serves episodes from
pub const DEFAULT_PUBLIC_DIR: &str = "data/podcast";

/// Fixed locations under `<data_dir>/podcast`
#[derive(Debug, Clone)]
pub struct EpisodePaths {
    root: PathBuf,
}

impl EpisodePaths {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self { root: data_dir.as_ref().join("podcast") }
    }

    pub fn podcast_dir(&self) -> &Path {
        &self.root
    }

    /// Canonical episode, overwritten by every run
    pub fn latest(&self, format: AudioFormat) -> PathBuf {
        self.root.join(format!("latest.{}", format.extension()))
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.root.join("archive")
    }

    /// Archive copy for `date`; reruns on the same day overwrite it
    pub fn archive(&self, date: NaiveDate, format: AudioFormat) -> PathBuf {
        self.archive_dir()
            .join(format!("{}.{}", date.format(DATE_FORMAT), format.extension()))
    }

    /// Parent of the per-run clip workspaces
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }
}

/// Estimated playback length: total characters over speaking rate, rounded down
pub fn estimate_duration(segments: &[DialogueSegment], chars_per_second: usize) -> u64 {
    if chars_per_second == 0 {
        return 0;
    }
    let total_chars: usize = segments.iter().map(DialogueSegment::char_count).sum();
    (total_chars / chars_per_second) as u64
}

/// A published episode
#[derive(Debug, Clone)]
pub struct Episode {
    pub audio_path: PathBuf,
    pub archive_path: PathBuf,
    /// Location of the latest episode as the web player requests it
    pub public_file: String,
    pub date: NaiveDate,
    pub duration_estimate_seconds: u64,
    pub speakers: Vec<SpeakerId>,
    /// Parsed segment count, not the number of clips that were mixed
    pub segment_count: usize,
    /// The episode holds only the first clip
    pub degraded: bool,
}

impl Episode {
    /// The JSON view merged into the news document
    pub fn metadata(&self) -> EpisodeMetadata {
        EpisodeMetadata {
            file: self.public_file.clone(),
            duration: self.duration_estimate_seconds,
            date: self.date.format(DATE_FORMAT).to_string(),
            speakers: self.speakers.iter().map(|s| s.name().to_string()).collect(),
            segments: self.segment_count,
        }
    }
}

/// Episode metadata as persisted under `podcast` in `news.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub file: String,
    pub duration: u64,
    pub date: String,
    pub speakers: Vec<String>,
    pub segments: usize,
}

/// Writes episode artifacts
#[derive(Debug, Clone)]
pub struct Publisher {
    paths: EpisodePaths,
    chars_per_second: usize,
    speakers: Vec<SpeakerId>,
    public_dir: String,
}

impl Publisher {
    pub fn new(paths: EpisodePaths, chars_per_second: usize, speakers: Vec<SpeakerId>) -> Self {
        Self {
            paths,
            chars_per_second,
            speakers,
            public_dir: DEFAULT_PUBLIC_DIR.to_string(),
        }
    }

    /// Web directory recorded in the metadata instead of the local data directory
    pub fn with_public_dir(mut self, public_dir: impl Into<String>) -> Self {
        self.public_dir = public_dir.into();
        self
    }

    /// `data/podcast/latest.wav` style path of the latest episode
    pub fn public_latest(&self, format: AudioFormat) -> String {
        let dir = self.public_dir.replace('\\', "/");
        let dir = dir.trim_end_matches('/');
        if dir.is_empty() {
            format!("latest.{}", format.extension())
        } else {
            format!("{}/latest.{}", dir, format.extension())
        }
    }

    pub fn paths(&self) -> &EpisodePaths {
        &self.paths
    }

    /// Publish `assembly` as the episode for `date`
    pub fn publish(
        &self,
        assembly: &AssemblyResult,
        segments: &[DialogueSegment],
        date: NaiveDate,
    ) -> Result<Episode, PodcastError> {
        let format = assembly.format;
        let audio_path = self.paths.latest(format);
        let archive_path = self.paths.archive(date, format);

        FileManager::replace_file(&assembly.output, &audio_path)
            .map_err(|e| PodcastError::Publish(format!("{:#}", e)))?;

        // A latest file in the other container is stale once the new one is in place
        for other in [AudioFormat::Wav, AudioFormat::Mp3] {
            let stale = self.paths.latest(other);
            if other != format && FileManager::file_exists(&stale) {
                debug!("Removing stale episode {:?}", stale);
                if let Err(e) = std::fs::remove_file(&stale) {
                    warn!("Failed to remove stale episode {:?}: {}", stale, e);
                }
            }
        }

        FileManager::copy_file(&audio_path, &archive_path)
            .map_err(|e| PodcastError::Publish(format!("{:#}", e)))?;

        let episode = Episode {
            audio_path,
            archive_path,
            public_file: self.public_latest(format),
            date,
            duration_estimate_seconds: estimate_duration(segments, self.chars_per_second),
            speakers: self.speakers.clone(),
            segment_count: segments.len(),
            degraded: assembly.degraded,
        };

        info!("Podcast published to {:?} (archive {:?}). Duration: ~{}s",
              episode.audio_path, episode.archive_path, episode.duration_estimate_seconds);
        Ok(episode)
    }
}
