/*!
 * Per-segment audio clips and the run-scoped workspace that owns them.
 *
 * Clips live in a private `run-*` directory created under the podcast temp
 * directory. The workspace is a `TempDir`, so the directory and every clip in it
 * are removed when it is dropped, whichever way a run ends.
 */

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::file_utils::FileManager;
use crate::podcast::speakers::SpeakerId;

/// File name prefix shared by all clips
pub const CLIP_PREFIX: &str = "segment_";

/// Digits in a clip index; sorting names sorts playback order
pub const CLIP_INDEX_WIDTH: usize = 4;

/// Audio container produced by the speech backend or the assembler
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Wav,
    Mp3,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// A synthesised utterance on disk
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Order of the segment this clip renders
    pub order: usize,
    /// Who is speaking
    pub speaker: SpeakerId,
    /// Location inside the run workspace
    pub path: PathBuf,
    /// Encoded size in bytes
    pub size_bytes: usize,
}

/// `segment_0007.wav` style name for a clip
pub fn clip_file_name(order: usize, format: AudioFormat) -> String {
    format!("{}{:0width$}.{}", CLIP_PREFIX, order, format.extension(), width = CLIP_INDEX_WIDTH)
}

/// Private temporary directory for one pipeline run
#[derive(Debug)]
pub struct ClipWorkspace {
    dir: TempDir,
}

impl ClipWorkspace {
    /// Create a fresh `run-*` directory under `parent`
    pub fn create_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let parent = parent.as_ref();
        FileManager::ensure_dir(parent)?;
        let dir = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create clip workspace in {:?}", parent))?;
        debug!("Created clip workspace {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the clip for `order` is written
    pub fn clip_path(&self, order: usize, format: AudioFormat) -> PathBuf {
        self.dir.path().join(clip_file_name(order, format))
    }

    /// Clip files currently in the workspace, sorted by name
    pub fn discover_clips(&self, format: AudioFormat) -> Result<Vec<PathBuf>> {
        let mut clips: Vec<PathBuf> = FileManager::find_files(self.dir.path(), format.extension())?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().starts_with(CLIP_PREFIX))
                    .unwrap_or(false)
            })
            .collect();
        clips.sort();
        Ok(clips)
    }

    /// Delete every clip and then the directory itself
    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        for entry in fs::read_dir(&path).with_context(|| format!("Failed to list {:?}", path))? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())
                    .with_context(|| format!("Failed to delete clip {:?}", entry.path()))?;
            }
        }
        self.dir.close()
            .with_context(|| format!("Failed to remove clip workspace {:?}", path))?;
        debug!("Released clip workspace {:?}", path);
        Ok(())
    }
}

/// Clips of one run together with the workspace that owns them
#[derive(Debug)]
pub struct ClipSet {
    workspace: ClipWorkspace,
    clips: Vec<AudioClip>,
    format: AudioFormat,
}

impl ClipSet {
    pub fn new(workspace: ClipWorkspace, clips: Vec<AudioClip>, format: AudioFormat) -> Self {
        Self { workspace, clips, format }
    }

    pub fn clips(&self) -> &[AudioClip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn workspace(&self) -> &ClipWorkspace {
        &self.workspace
    }

    /// Hand the workspace back for cleanup
    pub fn into_workspace(self) -> ClipWorkspace {
        self.workspace
    }
}
