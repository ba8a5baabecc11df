/*!
 * Turns an LLM-authored transcript into ordered dialogue segments.
 *
 * The transcript is untrusted, loosely structured text. Anything that is not a
 * `LABEL: text` line for a configured speaker is skipped; parsing never fails.
 */

use log::debug;
use serde::Serialize;

use crate::podcast::speakers::{SpeakerId, VoiceProfile};

/// One speaker's utterance, in playback order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueSegment {
    /// Zero-based position among the emitted segments
    pub order: usize,
    /// Who speaks
    pub speaker: SpeakerId,
    /// What is said, trimmed and never empty
    pub text: String,
}

impl DialogueSegment {
    /// Number of characters spoken, as used by the duration estimate
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Parser bound to the configured speakers
#[derive(Debug, Clone, Copy)]
pub struct ScriptParser<'a> {
    profile: &'a VoiceProfile,
}

impl<'a> ScriptParser<'a> {
    pub fn new(profile: &'a VoiceProfile) -> Self {
        Self { profile }
    }

    /// Parse `script` into segments.
    ///
    /// The same input always yields the same segments.
    pub fn parse(&self, script: &str) -> Vec<DialogueSegment> {
        let mut segments = Vec::new();

        for (line_number, line) in script.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.parse_line(line) {
                Some((speaker, text)) => segments.push(DialogueSegment {
                    order: segments.len(),
                    speaker: speaker.clone(),
                    text: text.to_string(),
                }),
                None => debug!("Skipping transcript line {}: {:?}", line_number + 1, line),
            }
        }

        segments
    }

    fn parse_line<'l>(&self, line: &'l str) -> Option<(&'a SpeakerId, &'l str)> {
        let (label, remainder) = line.split_once(':')?;
        let speaker = self.profile.resolve_label(label)?;
        let text = remainder.trim();
        if text.is_empty() {
            return None;
        }
        Some((speaker, text))
    }
}
