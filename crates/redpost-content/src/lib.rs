//! # redpost-content
//!
//! Content providers and the chat-completion client for redpost.
//!
//! A [`ContentProvider`] turns a topic string into a [`GeneratedPost`]
//! (title, body, image prompt). Implementations are interchangeable and
//! selected by name at the CLI boundary:
//!
//! - [`MockProvider`] — deterministic, no network; for tests and dry runs
//! - [`DeepSeekProvider`] — OpenAI-compatible chat completions
//! - [`GeminiProvider`] — Google `generateContent`
//!
//! ## Key pattern
//!
//! Generation is **fail-soft** (`DegradeToPlaceholder`): the trait method is
//! infallible and a provider that hits a network or parse error returns a
//! clearly-labeled placeholder record instead of propagating. Missing API
//! keys are the one exception — those fail at construction time, before any
//! workflow starts.
//!
//! The [`ChatClient`] is also used by the browser crate's element resolver;
//! both speak the same system+user-in, one-completion-out contract.

mod auth;
mod client;
mod deepseek;
mod gemini;
mod mock;
pub mod parse;
mod prompt;
mod types;

pub use auth::{deepseek_api_key, gemini_api_key};
pub use client::ChatClient;
pub use deepseek::{DeepSeekProvider, DEEPSEEK_API_BASE, DEEPSEEK_MODEL};
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use types::{ChatMessage, ProviderKind};

use async_trait::async_trait;
use redpost_core::{GeneratedPost, Result};

/// Strategy producing a post from a topic string.
///
/// Infallible on purpose: implementations degrade to
/// [`GeneratedPost::error_record`] rather than raising past this boundary.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn generate(&self, topic: &str) -> GeneratedPost;
}

/// Build the provider selected by name.
///
/// A missing API key for the selected vendor is a startup-time fatal error,
/// not a runtime one.
pub fn provider_for(kind: ProviderKind) -> Result<Box<dyn ContentProvider>> {
    match kind {
        ProviderKind::Mock => Ok(Box::new(MockProvider)),
        ProviderKind::DeepSeek => Ok(Box::new(DeepSeekProvider::from_env()?)),
        ProviderKind::Gemini => Ok(Box::new(GeminiProvider::from_env()?)),
    }
}
