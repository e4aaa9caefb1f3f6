//! Chat-completion HTTP client
//!
//! One request, one response: system + user message in, a single text
//! completion out. Both content generation and the element resolver speak
//! this contract. The client itself performs no retries — content providers
//! degrade to a placeholder on failure and the resolver's caller falls back
//! to hardcoded selectors, so retrying here would stack policies.

use crate::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
use redpost_core::{RedpostError, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Client for one OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl ChatClient {
    /// Create a client bound to an endpoint and model
    pub fn new(api_key: String, base_url: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request a free-text completion
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.send(system, user, None).await
    }

    /// Request a completion with JSON output mode enabled
    pub async fn complete_json(&self, system: &str, user: &str) -> Result<String> {
        self.send(system, user, Some(ResponseFormat::json_object()))
            .await
    }

    async fn send(
        &self,
        system: &str,
        user: &str,
        response_format: Option<ResponseFormat>,
    ) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            response_format,
        };

        tracing::debug!("Sending chat completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RedpostError::Api(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(RedpostError::Api(format!(
                "Chat API error {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| RedpostError::Api(format!("Failed to parse response: {}", e)))?;

        let content = chat_response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| RedpostError::Api("No content in response".to_string()))?;

        if let Some(usage) = chat_response.usage {
            tracing::debug!(
                "Completion received ({} chars, {} prompt tokens, {} completion tokens)",
                content.len(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ChatClient::new("k".to_string(), "https://api.deepseek.com/v1/", "m");
        assert_eq!(client.base_url, "https://api.deepseek.com/v1");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_api_error() {
        let client = ChatClient::new("k".to_string(), "http://127.0.0.1:1", "m")
            .with_timeout(Duration::from_millis(500));
        let result = client.complete("s", "u").await;
        assert!(matches!(result, Err(RedpostError::Api(_))));
    }
}
