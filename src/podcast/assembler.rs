/*!
 * Audio assembly: combine the clips of one run into a single episode file.
 *
 * The mixer decodes every clip to mono PCM, resamples to the rate of the first
 * clip and writes a 16-bit WAV with a fixed silence gap between utterances. When
 * mixing is disabled or a clip cannot be decoded, the first clip is copied as the
 * episode instead and the result is flagged as degraded.
 *
 * Every path through `AudioAssembler::assemble` releases the clip workspace.
 */

use hound::{SampleFormat, WavSpec, WavWriter};
use log::{debug, info, warn};
use std::fmt::Debug;
use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::errors::PodcastError;
use crate::file_utils::FileManager;
use crate::podcast::clip::{AudioClip, AudioFormat, ClipSet};

/// Why a mix could not be produced
#[derive(Error, Debug)]
pub enum MixError {
    /// A clip is in a container or codec the mixer cannot read
    #[error("Unsupported clip audio: {0}")]
    Unsupported(String),

    #[error("Mixer I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode mixed audio: {0}")]
    Encode(String),
}

impl From<hound::Error> for MixError {
    fn from(error: hound::Error) -> Self {
        match error {
            hound::Error::IoError(e) => Self::Io(e),
            other => Self::Encode(other.to_string()),
        }
    }
}

/// Summary of a successful mix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixReport {
    pub sample_rate: u32,
    pub total_samples: usize,
}

impl MixReport {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.total_samples as f64 / self.sample_rate as f64)
    }
}

/// Concatenates clips with silence between them
pub trait ClipMixer: Send + Sync + Debug {
    /// Container format written by `mix`
    fn output_format(&self) -> AudioFormat;

    /// Write `clips`, in slice order, to `destination` with `gap` of silence between neighbours
    fn mix(&self, clips: &[AudioClip], gap: Duration, destination: &Path) -> Result<MixReport, MixError>;
}

/// Decoded mono clip
#[derive(Debug)]
struct DecodedClip {
    samples: Vec<f32>,
    sample_rate: u32,
}

/// PCM mixer writing 16-bit mono WAV
#[derive(Debug, Default, Clone, Copy)]
pub struct PcmMixer;

impl PcmMixer {
    pub fn new() -> Self {
        Self
    }
}

impl ClipMixer for PcmMixer {
    fn output_format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    fn mix(&self, clips: &[AudioClip], gap: Duration, destination: &Path) -> Result<MixReport, MixError> {
        let decoded = clips.iter()
            .map(|clip| decode_clip(&clip.path))
            .collect::<Result<Vec<_>, _>>()?;

        let sample_rate = decoded.first()
            .map(|clip| clip.sample_rate)
            .ok_or_else(|| MixError::Unsupported("no clips to mix".to_string()))?;
        let gap_samples = (sample_rate as u128 * gap.as_millis() / 1000) as usize;

        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(destination, spec)?;
        let mut total_samples = 0;

        for (index, clip) in decoded.iter().enumerate() {
            if index > 0 {
                for _ in 0..gap_samples {
                    writer.write_sample(0i16)?;
                }
                total_samples += gap_samples;
            }

            let samples = resample(&clip.samples, clip.sample_rate, sample_rate);
            for &sample in &samples {
                writer.write_sample(to_i16(sample))?;
            }
            total_samples += samples.len();
        }
        writer.finalize()?;

        Ok(MixReport { sample_rate, total_samples })
    }
}

/// Decode an audio file to mono f32 samples
fn decode_clip(path: &Path) -> Result<DecodedClip, MixError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| MixError::Unsupported(format!("{:?}: {}", path, e)))?;
    let mut format = probed.format;

    let track = format.tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MixError::Unsupported(format!("{:?}: no audio track", path)))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| MixError::Unsupported(format!("{:?}: {}", path, e)))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(MixError::Unsupported(format!("{:?}: {}", path, e))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                let channels = spec.channels.count().max(1);

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                for frame in buffer.samples().chunks(channels) {
                    samples.push(frame.iter().sum::<f32>() / frame.len() as f32);
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet in {:?}: {}", path, e);
            }
            Err(e) => return Err(MixError::Unsupported(format!("{:?}: {}", path, e))),
        }
    }

    let sample_rate = sample_rate
        .ok_or_else(|| MixError::Unsupported(format!("{:?}: unknown sample rate", path)))?;
    debug!("Decoded {:?}: {} samples at {} Hz", path, samples.len(), sample_rate);
    Ok(DecodedClip { samples, sample_rate })
}

/// Linear resampling
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = ((samples.len() as f64) / ratio).round() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 * ratio;
        let idx = src_pos as usize;
        let frac = (src_pos - idx as f64) as f32;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        } else {
            samples[samples.len() - 1]
        };
        output.push(sample);
    }

    output
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// Encode 16-bit mono PCM as an in-memory WAV file
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// The single episode file produced from a run's clips
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    /// Where the episode was written
    pub output: PathBuf,
    pub format: AudioFormat,
    /// Whether only the first clip stands in for the episode
    pub degraded: bool,
    pub degradation_reason: Option<String>,
    /// Number of clips the run produced
    pub clips_absorbed: usize,
}

/// Turns a `ClipSet` into one episode file
#[derive(Debug)]
pub struct AudioAssembler {
    mixer: Option<Box<dyn ClipMixer>>,
    gap: Duration,
}

impl AudioAssembler {
    /// `mixer` of `None` always takes the degraded first-clip path
    pub fn new(mixer: Option<Box<dyn ClipMixer>>, gap: Duration) -> Self {
        Self { mixer, gap }
    }

    /// Assembler using the built-in PCM mixer
    pub fn with_pcm_mixer(gap: Duration) -> Self {
        Self::new(Some(Box::new(PcmMixer::new())), gap)
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }

    /// Assemble `clip_set` into `destination`, whose extension is replaced by the
    /// format actually written. The clip workspace is released on every path.
    pub fn assemble(&self, clip_set: ClipSet, destination: &Path) -> Result<AssemblyResult, PodcastError> {
        if clip_set.is_empty() {
            release(clip_set);
            return Err(PodcastError::Assembly("no clips to assemble".to_string()));
        }

        if let Some(parent) = destination.parent() {
            if let Err(e) = FileManager::ensure_dir(parent) {
                release(clip_set);
                return Err(PodcastError::Assembly(e.to_string()));
            }
        }

        let clips_absorbed = clip_set.len();
        let degradation_reason = match &self.mixer {
            Some(mixer) => {
                let output = destination.with_extension(mixer.output_format().extension());
                match mixer.mix(clip_set.clips(), self.gap, &output) {
                    Ok(report) => {
                        info!("Mixed {} clips into {:?} ({:.1}s)",
                              clips_absorbed, output, report.duration().as_secs_f64());
                        release(clip_set);
                        return Ok(AssemblyResult {
                            output,
                            format: mixer.output_format(),
                            degraded: false,
                            degradation_reason: None,
                            clips_absorbed,
                        });
                    }
                    Err(MixError::Unsupported(reason)) => {
                        discard_partial(&output);
                        reason
                    }
                    Err(e) => {
                        discard_partial(&output);
                        release(clip_set);
                        return Err(PodcastError::Assembly(e.to_string()));
                    }
                }
            }
            None => "audio mixing disabled".to_string(),
        };

        warn!("Could not mix clips ({}). Using first clip as the episode", degradation_reason);
        let result = Self::copy_first_clip(&clip_set, destination).map(|output| AssemblyResult {
            output,
            format: clip_set.format(),
            degraded: true,
            degradation_reason: Some(degradation_reason),
            clips_absorbed,
        });
        release(clip_set);
        result
    }

    /// Copy the first clip, by name, to `destination` with the clip format's extension
    fn copy_first_clip(clip_set: &ClipSet, destination: &Path) -> Result<PathBuf, PodcastError> {
        let format = clip_set.format();
        let first = clip_set.workspace()
            .discover_clips(format)
            .map_err(|e| PodcastError::Assembly(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| PodcastError::Assembly("no clip files found in workspace".to_string()))?;

        let output = destination.with_extension(format.extension());
        FileManager::copy_file(&first, &output)
            .map_err(|e| PodcastError::Assembly(e.to_string()))?;
        Ok(output)
    }
}

/// Remove a partially written episode file, logging a failed removal
pub(crate) fn discard_partial(path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove partial episode {:?}: {}", path, e);
    }
}

/// Delete the clips of a run; failures are logged, the directory is removed on drop regardless
fn release(clip_set: ClipSet) {
    let workspace = clip_set.into_workspace();
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.release() {
        warn!("Failed to clean up clip workspace {:?}: {:#}", path, e);
    }
}
