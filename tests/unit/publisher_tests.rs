/*!
 * Tests for episode publishing
 */

use anyhow::Result;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

use newscast::errors::PodcastError;
use newscast::podcast::{
    AssemblyResult, AudioFormat, DialogueSegment, EpisodePaths, Publisher, SpeakerId, VoiceProfile,
};
use crate::common;

fn publisher(data_dir: &Path) -> Publisher {
    Publisher::new(
        EpisodePaths::new(data_dir),
        15,
        VoiceProfile::default().speakers().cloned().collect(),
    )
}

fn staged(dir: &Path, content: &[u8], format: AudioFormat, degraded: bool) -> Result<AssemblyResult> {
    let output = dir.join(format!("staged.{}", format.extension()));
    fs::write(&output, content)?;
    Ok(AssemblyResult {
        output,
        format,
        degraded,
        degradation_reason: degraded.then(|| "audio mixing disabled".to_string()),
        clips_absorbed: 1,
    })
}

fn segments(texts: &[&str]) -> Vec<DialogueSegment> {
    texts.iter()
        .enumerate()
        .map(|(order, text)| DialogueSegment {
            order,
            speaker: SpeakerId::new(if order % 2 == 0 { "ALEX" } else { "JORDAN" }, "Host"),
            text: text.to_string(),
        })
        .collect()
}

/// Test that latest and archive are written and described
#[test]
fn test_publish_shouldWriteLatestAndArchive() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let data_dir = temp_dir.path().join("data");
    let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let assembly = staged(temp_dir.path(), b"episode-audio", AudioFormat::Wav, false)?;

    let episode = publisher(&data_dir).publish(&assembly, &segments(&["123456789012345678901234567890"]), date)?;

    assert_eq!(episode.audio_path, data_dir.join("podcast/latest.wav"));
    assert_eq!(episode.archive_path, data_dir.join("podcast/archive/2026-10-17.wav"));
    assert_eq!(fs::read(&episode.audio_path)?, b"episode-audio");
    assert_eq!(fs::read(&episode.archive_path)?, b"episode-audio");
    assert!(!assembly.output.exists());
    assert_eq!(episode.duration_estimate_seconds, 2);
    assert_eq!(episode.segment_count, 1);
    assert!(!episode.degraded);

    let metadata = episode.metadata();
    assert_eq!(metadata.date, "2026-10-17");
    assert_eq!(metadata.speakers, vec!["Alex", "Jordan"]);
    assert_eq!(metadata.duration, 2);
    assert_eq!(metadata.segments, 1);
    Ok(())
}

/// Test that a same-day rerun overwrites both files
#[test]
fn test_publish_twiceOnSameDate_shouldOverwrite() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let data_dir = temp_dir.path().join("data");
    let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let publisher = publisher(&data_dir);

    let first = publisher.publish(
        &staged(temp_dir.path(), b"first", AudioFormat::Wav, false)?,
        &segments(&["a".repeat(45).as_str()]),
        date,
    )?;
    let second = publisher.publish(
        &staged(temp_dir.path(), b"second", AudioFormat::Wav, false)?,
        &segments(&["b".repeat(15).as_str(), "c".repeat(15).as_str()]),
        date,
    )?;

    assert_eq!(first.audio_path, second.audio_path);
    assert_eq!(first.archive_path, second.archive_path);
    assert_eq!(fs::read(&second.audio_path)?, b"second");
    assert_eq!(fs::read(&second.archive_path)?, b"second");
    assert_eq!(first.metadata().date, second.metadata().date);
    assert_eq!((first.duration_estimate_seconds, first.segment_count), (3, 1));
    assert_eq!((second.duration_estimate_seconds, second.segment_count), (2, 2));
    assert_eq!(common::dir_entries(&data_dir.join("podcast/archive")).len(), 1);
    Ok(())
}

/// Test that a format change removes the stale latest file
#[test]
fn test_publish_withFormatChange_shouldRemoveStaleLatest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let data_dir = temp_dir.path().join("data");
    let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let publisher = publisher(&data_dir);

    publisher.publish(&staged(temp_dir.path(), b"mixed", AudioFormat::Wav, false)?, &segments(&["hi"]), date)?;
    let episode = publisher.publish(&staged(temp_dir.path(), b"clip", AudioFormat::Mp3, true)?, &segments(&["hi"]), date)?;

    assert!(episode.degraded);
    assert_eq!(episode.audio_path, data_dir.join("podcast/latest.mp3"));
    assert!(!data_dir.join("podcast/latest.wav").exists());
    Ok(())
}

/// Test that a failed move keeps the previous episode in the other format
#[test]
fn test_publish_withMissingStagedFile_shouldKeepPreviousLatest() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let data_dir = temp_dir.path().join("data");
    let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
    let publisher = publisher(&data_dir);

    publisher.publish(&staged(temp_dir.path(), b"mixed", AudioFormat::Wav, false)?, &segments(&["hi"]), date)?;

    let missing = staged(temp_dir.path(), b"clip", AudioFormat::Mp3, true)?;
    fs::remove_file(&missing.output)?;
    let result = publisher.publish(&missing, &segments(&["hi"]), date);

    assert!(matches!(result, Err(PodcastError::Publish(_))));
    assert_eq!(fs::read(data_dir.join("podcast/latest.wav"))?, b"mixed");
    assert!(!data_dir.join("podcast/latest.mp3").exists());
    Ok(())
}

/// Test that the metadata names the web path rather than the local data directory
#[test]
fn test_publish_withAbsoluteDataDir_shouldRecordPublicPath() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let data_dir = temp_dir.path().join("data");
    let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

    let episode = publisher(&data_dir)
        .publish(&staged(temp_dir.path(), b"audio", AudioFormat::Wav, false)?, &segments(&["hi"]), date)?;
    assert_eq!(episode.metadata().file, "data/podcast/latest.wav");

    let episode = publisher(&data_dir)
        .with_public_dir("media/shows")
        .publish(&staged(temp_dir.path(), b"audio", AudioFormat::Mp3, true)?, &segments(&["hi"]), date)?;
    assert_eq!(episode.metadata().file, "media/shows/latest.mp3");
    Ok(())
}
