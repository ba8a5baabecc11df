/*!
 * The aggregated news document (`news.json`).
 *
 * Only the fields the podcast pipeline needs are typed; everything else written by
 * the aggregation step is carried through untouched.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::file_utils::FileManager;
use crate::podcast::EpisodeMetadata;

/// A ranked news item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,

    /// Publication the item came from
    #[serde(default)]
    pub source_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Fields this crate does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsItem {
    /// Publication name, falling back to the coarse `source` field
    pub fn source_label(&self) -> &str {
        if !self.source_name.trim().is_empty() {
            return &self.source_name;
        }
        self.extra.get("source")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
    }
}

/// The whole `news.json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(default)]
    pub articles: Vec<NewsItem>,

    /// Metadata of the latest episode, absent when none was produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podcast: Option<EpisodeMetadata>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewsDocument {
    /// Load the document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse news document: {:?}", path))
    }

    /// Write the document back, pretty printed
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize news document")?;
        FileManager::write_to_file(path, &json)
    }

    /// Replace the podcast section; `None` removes it
    pub fn set_podcast(&mut self, metadata: Option<EpisodeMetadata>) {
        self.podcast = metadata;
    }
}
