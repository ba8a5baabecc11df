/*!
 * Speaker identities and the voice each one is rendered with.
 */

use serde::Serialize;
use std::fmt;

use crate::app_config::VoiceConfig;

/// A configured podcast host.
///
/// The label is what the transcript uses (`ALEX`), the name is what listeners see
/// (`Alex`). Two speakers are equal when their labels are.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct SpeakerId {
    label: String,
    name: String,
}

impl SpeakerId {
    /// Create a speaker; the label is normalised to trimmed upper case
    pub fn new(label: impl AsRef<str>, name: impl Into<String>) -> Self {
        Self {
            label: normalize_label(label.as_ref()),
            name: name.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for SpeakerId {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl std::hash::Hash for SpeakerId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Case-insensitive, whitespace-insensitive form of a transcript label
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Fixed mapping from speaker to synthesis voice, in roster order
#[derive(Debug, Clone)]
pub struct VoiceProfile {
    entries: Vec<(SpeakerId, String)>,
}

impl VoiceProfile {
    pub fn new(entries: Vec<(SpeakerId, String)>) -> Self {
        Self { entries }
    }

    /// Build the profile from the voice section of the configuration
    pub fn from_config(config: &VoiceConfig) -> Self {
        Self::new(
            config.speakers.iter()
                .map(|s| (SpeakerId::new(&s.label, s.name.clone()), s.voice.clone()))
                .collect(),
        )
    }

    /// Find the speaker a raw transcript label refers to
    pub fn resolve_label(&self, raw_label: &str) -> Option<&SpeakerId> {
        let label = normalize_label(raw_label);
        self.entries.iter()
            .map(|(speaker, _)| speaker)
            .find(|speaker| speaker.label == label)
    }

    /// Voice identifier for `speaker`
    pub fn voice_for(&self, speaker: &SpeakerId) -> Option<&str> {
        self.entries.iter()
            .find(|(candidate, _)| candidate == speaker)
            .map(|(_, voice)| voice.as_str())
    }

    /// Speakers in roster order
    pub fn speakers(&self) -> impl Iterator<Item = &SpeakerId> {
        self.entries.iter().map(|(speaker, _)| speaker)
    }

    /// Display names in roster order
    pub fn roster(&self) -> Vec<String> {
        self.speakers().map(|s| s.name().to_string()).collect()
    }
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self::from_config(&VoiceConfig::default())
    }
}
