/*!
 * Common test utilities for the newscast test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

use newscast::news_store::NewsItem;
use newscast::podcast::PipelineSettings;

/// Transcript with four dialogue lines and some noise
pub const SAMPLE_SCRIPT: &str = "ALEX: Welcome back to AI Daily News!
JORDAN: Great to be here. Big week for open models.
[music fades]
ALEX: Let's start with the new reasoning benchmark.
JORDAN: Thanks for listening, everyone!";

/// Number of dialogue lines in `SAMPLE_SCRIPT`
pub const SAMPLE_SEGMENTS: usize = 4;


/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A few ranked news items
pub fn sample_items() -> Vec<NewsItem> {
    ["Open model tops leaderboard", "Chip export rules updated", "New agent framework released"]
        .iter()
        .enumerate()
        .map(|(i, title)| NewsItem {
            title: title.to_string(),
            source_name: format!("Source {}", i),
            summary: Some(format!("Summary of story {}.", i)),
            ..NewsItem::default()
        })
        .collect()
}

/// Writes a news document with `sample_items` and an unrelated top-level field
pub fn create_news_document(dir: &Path) -> Result<PathBuf> {
    let document = serde_json::json!({
        "updated": "2026-10-17T06:00:00",
        "articles": sample_items(),
        "papers": [{"title": "Attention again"}]
    });
    create_test_file(dir, "news.json", &serde_json::to_string_pretty(&document)?)
}

/// Pipeline settings rooted at `data_dir` with short deadlines
pub fn test_settings(data_dir: &Path) -> PipelineSettings {
    PipelineSettings {
        script_timeout: Duration::from_secs(2),
        voice_timeout: Duration::from_secs(2),
        top_items: 5,
        gap: Duration::from_millis(300),
        chars_per_second: 15,
        data_dir: data_dir.to_path_buf(),
        mixing: true,
        public_dir: "data/podcast".to_string(),
    }
}

/// Read a 16-bit WAV file
pub fn read_wav(path: &Path) -> Result<(hound::WavSpec, Vec<i16>)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader.samples::<i16>().collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((spec, samples))
}

/// Run-length encode samples into `(value, count)` pairs
pub fn sample_runs(samples: &[i16]) -> Vec<(i16, usize)> {
    let mut runs: Vec<(i16, usize)> = Vec::new();
    for &sample in samples {
        match runs.last_mut() {
            Some((value, count)) if *value == sample => *count += 1,
            _ => runs.push((sample, 1)),
        }
    }
    runs
}

/// Entries left in a directory, empty when it does not exist
pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default()
}
