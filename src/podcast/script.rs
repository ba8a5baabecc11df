/*!
 * Script acquisition: digest the top news items, ask the script author for a
 * conversation, and fall back to a fixed transcript when that fails.
 */

use async_trait::async_trait;
use log::{info, warn};
use std::time::Duration;

use crate::app_config::{ScriptConfig, ScriptProvider};
use crate::errors::{PodcastError, ProviderError};
use crate::news_store::NewsItem;
use crate::podcast::speakers::VoiceProfile;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatMessage, ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::{Provider, ScriptAuthor};

/// Placeholder used when an item carries no summary
const MISSING_SUMMARY: &str = "No summary available";

/// Format the first `top_n` items as the digest handed to the script author
pub fn build_digest(items: &[NewsItem], top_n: usize) -> String {
    items.iter()
        .take(top_n)
        .map(|item| {
            let summary = item.summary.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(MISSING_SUMMARY);
            format!("- {} (Source: {})\n  Summary: {}", item.title, item.source_label(), summary)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the user prompt asking for a conversation between the two hosts
pub fn build_user_prompt(digest: &str, profile: &VoiceProfile) -> String {
    let speakers: Vec<_> = profile.speakers().collect();
    let (first, second) = match speakers.as_slice() {
        [first, second, ..] => (*first, *second),
        _ => return digest.to_string(),
    };

    format!(
"You are writing a script for a 2-minute podcast where two tech journalists, {a_name} and {b_name}, discuss today's AI news in a casual, engaging conversation.

Today's top AI news:
{digest}

Create a natural dialogue between {a_name} and {b_name}. They should:
- Discuss 3-5 of the most interesting stories
- Have a conversational, friendly tone
- Include brief analysis or implications
- Use natural transitions between topics
- Keep it engaging and informative
- Target approximately 300-350 words total

Format the script exactly like this:
{a}: [statement or question]
{b}: [response]
{a}: [follow-up]
...

Start with a brief intro and end with a sign-off. Make it sound natural and engaging!",
        a_name = first.name(),
        b_name = second.name(),
        a = first.label(),
        b = second.label(),
        digest = digest,
    )
}

/// Fixed transcript used whenever the script author cannot deliver
pub fn fallback_script(profile: &VoiceProfile) -> String {
    let labels: Vec<&str> = profile.speakers().map(|s| s.label()).collect();
    let (a, b) = match labels.as_slice() {
        [a, b, ..] => (*a, *b),
        [a] => (*a, *a),
        [] => ("ALEX", "JORDAN"),
    };
    let a_name = profile.speakers().next().map(|s| s.name().to_string()).unwrap_or_default();

    format!(
        "{a}: Hey everyone, welcome to AI Daily News!\n\
         {b}: Hi {a_name}! We've got some exciting AI developments to discuss today.\n\
         {a}: Absolutely. Let's dive into the latest from the AI world.\n\
         {b}: Sounds good! Thanks for tuning in, everyone!"
    )
}

/// Result of script acquisition
#[derive(Debug)]
pub enum ScriptOutcome {
    /// The script author delivered a transcript
    Generated(String),
    /// The built-in transcript was substituted
    Fallback {
        script: String,
        cause: PodcastError,
    },
}

impl ScriptOutcome {
    pub fn script(&self) -> &str {
        match self {
            Self::Generated(script) => script,
            Self::Fallback { script, .. } => script,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Ask `author` for a script within `timeout`, substituting the fallback on any failure
pub async fn acquire_script(
    author: &dyn ScriptAuthor,
    digest: &str,
    timeout: Duration,
    profile: &VoiceProfile,
) -> ScriptOutcome {
    let result = match tokio::time::timeout(timeout, author.generate_script(digest)).await {
        Ok(Ok(script)) if script.trim().is_empty() => Err(ProviderError::EmptyResponse),
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    };

    match result {
        Ok(script) => {
            info!("Script generated ({} characters)", script.chars().count());
            ScriptOutcome::Generated(script)
        }
        Err(e) => {
            let cause = PodcastError::ScriptUnavailable(e);
            warn!("{}. Using fallback script", cause);
            ScriptOutcome::Fallback {
                script: fallback_script(profile),
                cause,
            }
        }
    }
}

/// Chat client behind the script author
#[derive(Debug)]
enum ChatClient {
    /// Groq, OpenAI and LM Studio
    OpenAICompatible(OpenAI),
    Anthropic(Anthropic),
    Ollama(Ollama),
}

/// Script author backed by a chat LLM
#[derive(Debug)]
pub struct LlmScriptAuthor {
    client: ChatClient,
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    profile: VoiceProfile,
}

impl LlmScriptAuthor {
    /// Create the author for the configured provider
    pub fn from_config(config: &ScriptConfig, profile: &VoiceProfile) -> Self {
        let timeout = Duration::from_secs(config.get_timeout_secs());
        let retries = config.common.retry_count;
        let backoff = config.common.retry_backoff_ms;
        let endpoint = config.get_endpoint();

        let client = match config.provider {
            ScriptProvider::Groq | ScriptProvider::OpenAI => ChatClient::OpenAICompatible(
                OpenAI::new_with_config(config.get_api_key(), endpoint, timeout, retries, backoff),
            ),
            ScriptProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                ChatClient::OpenAICompatible(
                    OpenAI::new_with_config(api_key, endpoint, timeout, retries, backoff),
                )
            }
            ScriptProvider::Anthropic => ChatClient::Anthropic(
                Anthropic::new_with_config(config.get_api_key(), endpoint, timeout, retries, backoff),
            ),
            ScriptProvider::Ollama => ChatClient::Ollama(
                Ollama::from_url(endpoint, timeout, retries, backoff),
            ),
        };

        Self {
            client,
            model: config.get_model(),
            system_prompt: config.common.system_prompt.clone(),
            temperature: config.common.temperature,
            max_tokens: config.common.max_tokens,
            profile: profile.clone(),
        }
    }
}

#[async_trait]
impl ScriptAuthor for LlmScriptAuthor {
    async fn generate_script(&self, digest: &str) -> Result<String, ProviderError> {
        let prompt = build_user_prompt(digest, &self.profile);

        let text = match &self.client {
            ChatClient::OpenAICompatible(client) => {
                let request = OpenAIRequest::new(&self.model)
                    .add_message("system", &self.system_prompt)
                    .add_message("user", prompt)
                    .temperature(self.temperature)
                    .max_tokens(self.max_tokens);
                OpenAI::extract_text(&client.complete(request).await?)
            }
            ChatClient::Anthropic(client) => {
                let request = AnthropicRequest::new(&self.model, self.max_tokens)
                    .system(&self.system_prompt)
                    .add_message("user", prompt)
                    .temperature(self.temperature);
                Anthropic::extract_text(&client.complete(request).await?)
            }
            ChatClient::Ollama(client) => {
                let messages = vec![
                    ChatMessage { role: "system".to_string(), content: self.system_prompt.clone() },
                    ChatMessage { role: "user".to_string(), content: prompt },
                ];
                let request = ChatRequest::new(&self.model, messages)
                    .temperature(self.temperature)
                    .num_predict(self.max_tokens);
                Ollama::extract_text(&client.complete(request).await?)
            }
        };

        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }
}
