/*!
 * Podcast production: turn a news digest into a published two-host episode.
 *
 * - `script`: digest, prompt, script acquisition with fallback
 * - `speakers`: speaker identities and their voices
 * - `parser`: transcript to ordered dialogue segments
 * - `clip`: per-segment clips and the run workspace
 * - `synthesizer`: sequential text-to-speech
 * - `assembler`: clips to one episode file
 * - `publisher`: latest/archive files and metadata
 * - `pipeline`: the whole flow, with failure containment
 */

pub mod assembler;
pub mod clip;
pub mod parser;
pub mod pipeline;
pub mod publisher;
pub mod script;
pub mod speakers;
pub mod synthesizer;

pub use assembler::{AssemblyResult, AudioAssembler, ClipMixer, MixError, PcmMixer};
pub use clip::{AudioClip, AudioFormat, ClipSet, ClipWorkspace};
pub use parser::{DialogueSegment, ScriptParser};
pub use pipeline::{PipelineSettings, PodcastPipeline};
pub use publisher::{estimate_duration, Episode, EpisodeMetadata, EpisodePaths, Publisher};
pub use script::{acquire_script, build_digest, fallback_script, LlmScriptAuthor, ScriptOutcome};
pub use speakers::{SpeakerId, VoiceProfile};
pub use synthesizer::SegmentSynthesizer;
