/*!
 * # Newscast - two-host AI news podcast generator
 *
 * Turns a ranked list of news items into a short two-speaker audio episode plus
 * the metadata describing it.
 *
 * ## Features
 *
 * - Script writing with chat LLM providers:
 *   - Groq, OpenAI and LM Studio (OpenAI-compatible)
 *   - Anthropic API
 *   - Ollama (local LLM)
 * - Built-in fallback script when the provider fails
 * - Defensive transcript parsing into ordered dialogue segments
 * - Sequential per-line speech synthesis with per-speaker voices
 * - Clip mixing with natural pauses, or a flagged first-clip fallback
 * - Canonical latest episode plus a dated archive copy
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `podcast`: The production pipeline:
 *   - `podcast::script`: Digest, prompt and script acquisition
 *   - `podcast::parser`: Transcript parsing
 *   - `podcast::synthesizer`: Sequential speech synthesis
 *   - `podcast::assembler`: Clip mixing and the degraded fallback
 *   - `podcast::publisher`: Episode files and metadata
 *   - `podcast::pipeline`: End-to-end flow with failure containment
 * - `providers`: Client implementations for the external services
 * - `news_store`: The `news.json` document
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod news_store;
pub mod podcast;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use errors::{AppError, PodcastError, ProviderError};
pub use news_store::{NewsDocument, NewsItem};
pub use podcast::{Episode, EpisodeMetadata, PodcastPipeline};
