//! DeepSeek content provider (OpenAI-compatible chat completions)

use crate::parse::parse_post_json;
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::{auth, ChatClient, ContentProvider};
use async_trait::async_trait;
use redpost_core::{GeneratedPost, Result};

pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com/v1";
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Provider backed by DeepSeek's OpenAI-compatible endpoint.
///
/// Requests JSON output mode; the defensive parse still runs because JSON
/// mode occasionally returns fenced or prose-wrapped output anyway.
pub struct DeepSeekProvider {
    client: ChatClient,
}

impl DeepSeekProvider {
    /// Build from `DEEPSEEK_API_KEY`. Missing key is fatal here, before any
    /// browser work starts.
    pub fn from_env() -> Result<Self> {
        let api_key = auth::deepseek_api_key()?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: String) -> Self {
        Self {
            client: ChatClient::new(api_key, DEEPSEEK_API_BASE, DEEPSEEK_MODEL),
        }
    }
}

#[async_trait]
impl ContentProvider for DeepSeekProvider {
    async fn generate(&self, topic: &str) -> GeneratedPost {
        let raw = match self
            .client
            .complete_json(SYSTEM_PROMPT, &user_prompt(topic))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("DeepSeek generation failed: {}", e);
                return GeneratedPost::error_record(topic, &e.to_string());
            }
        };

        parse_post_json(&raw).unwrap_or_else(|| {
            tracing::warn!("Could not parse JSON from DeepSeek response");
            GeneratedPost::error_record(topic, "could not parse JSON from response")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_network_failure_degrades_to_placeholder() {
        // Unroutable endpoint: generation must not raise.
        let provider = DeepSeekProvider {
            client: ChatClient::new("k".to_string(), "http://127.0.0.1:1", DEEPSEEK_MODEL)
                .with_timeout(std::time::Duration::from_millis(500)),
        };
        let post = provider.generate("coffee").await;
        assert!(post.is_error_record());
        assert!(post.title.contains("coffee"));
    }
}
