//! Gemini content provider (`generateContent` API)
//!
//! Gemini does not speak the OpenAI chat-completions shape: the system
//! instruction is a separate field and messages are `contents` with `parts`.
//! The provider keeps its own thin request builder instead of reusing
//! [`crate::ChatClient`].

use crate::parse::parse_post_json;
use crate::prompt::{user_prompt, SYSTEM_PROMPT};
use crate::{auth, ContentProvider};
use async_trait::async_trait;
use redpost_core::{GeneratedPost, RedpostError, Result};
use serde::Deserialize;
use std::time::Duration;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-pro";

const REQUEST_TIMEOUT_SECS: u64 = 60;

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    /// Build from `GEMINI_API_KEY`. Missing key is fatal here.
    pub fn from_env() -> Result<Self> {
        let api_key = auth::gemini_api_key()?;
        Ok(Self::new(api_key))
    }

    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_base: GEMINI_API_BASE.to_string(),
            model: GEMINI_MODEL.to_string(),
        }
    }

    async fn request_text(&self, topic: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let body = serde_json::json!({
            "systemInstruction": {
                "parts": [{"text": SYSTEM_PROMPT}]
            },
            "contents": [{
                "role": "user",
                "parts": [{"text": user_prompt(topic)}]
            }]
        });

        tracing::debug!("Sending generateContent request for model {}", self.model);

        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .header("Content-Type", "application/json")
            .json(&body)
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
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RedpostError::Api(format!("Failed to parse response: {}", e)))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RedpostError::Api("No content in response".to_string()))?;

        Ok(text)
    }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    async fn generate(&self, topic: &str) -> GeneratedPost {
        let raw = match self.request_text(topic).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Gemini generation failed: {}", e);
                return GeneratedPost::error_record(topic, &e.to_string());
            }
        };

        parse_post_json(&raw).unwrap_or_else(|| {
            tracing::warn!("Could not parse JSON from Gemini response");
            GeneratedPost::error_record(topic, "could not parse JSON from response")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shape_parses() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"title\":\"t\",\"content\":\"c\",\"image_prompt\":\"i\"}"}]}
            }]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = &parsed.candidates[0].content.parts[0].text;
        assert!(text.contains("image_prompt"));
    }

    #[tokio::test]
    async fn test_network_failure_degrades_to_placeholder() {
        let mut provider = GeminiProvider::new("k".to_string());
        provider.api_base = "http://127.0.0.1:1".to_string();
        let post = provider.generate("tea").await;
        assert!(post.is_error_record());
    }
}
