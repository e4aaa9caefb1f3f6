//! AI-assisted element resolution
//!
//! Translates a natural-language description of a UI element into a
//! concrete, clickable element reference. Primary consumers are workflow
//! steps whose hardcoded selectors have drifted out from under them.
//!
//! The resolver performs no retries: a remote failure or an unusable reply
//! is an explicit error so the workflow can fall back to its hardcoded
//! selector list.

use crate::driver::PageDriver;
use crate::error::Result;
use crate::markup::{simplify_markup, truncate_markup, MAX_MARKUP_LEN};
use async_trait::async_trait;
use redpost_content::parse::strip_code_fences;
use redpost_content::ChatClient;
use redpost_core::RedpostError;
use tracing::{debug, info};

const INFERENCE_SYSTEM_PROMPT: &str =
    "You are a helpful QA automation engineer. Return only the CSS selector.";

/// Remote capability that maps a description plus cleaned markup to one
/// CSS selector string. Kept as a trait so the workflow is testable and
/// the inference vendor stays an opaque external concern.
#[async_trait]
pub trait SelectorInference: Send + Sync {
    async fn infer_selector(&self, description: &str, markup: &str) -> Result<String>;
}

/// Production inference over the chat-completion contract
pub struct ChatSelectorInference {
    client: ChatClient,
}

impl ChatSelectorInference {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SelectorInference for ChatSelectorInference {
    async fn infer_selector(&self, description: &str, markup: &str) -> Result<String> {
        let prompt = format!(
            r#"I have an HTML page. I need to find the CSS selector for an element described as: "{description}".

Here is the cleaned HTML of the page:
```html
{markup}
```

Return ONLY the CSS selector. Do not include any explanation or markdown formatting.
If there are multiple matches, choose the most specific and robust one."#
        );

        self.client.complete(INFERENCE_SYSTEM_PROMPT, &prompt).await
    }
}

/// Placeholder inference used when no API key is configured.
///
/// Always fails, so every resolution falls back to the step's hardcoded
/// selectors; publish runs still proceed without a key.
pub struct OfflineInference;

#[async_trait]
impl SelectorInference for OfflineInference {
    async fn infer_selector(&self, description: &str, _markup: &str) -> Result<String> {
        Err(RedpostError::Resolver(format!(
            "selector inference not configured (no API key); cannot resolve '{}'",
            description
        )))
    }
}

/// Reference to a single resolved DOM node, valid for the page's current
/// load generation. Must be re-resolved after any navigation.
#[derive(Debug, Clone)]
pub struct ElementHandle {
    selector: String,
}

impl ElementHandle {
    /// The CSS selector this handle is bound through
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

/// Resolves natural-language element descriptions against the live page
pub struct ElementResolver {
    inference: Box<dyn SelectorInference>,
    max_markup_len: usize,
}

impl ElementResolver {
    pub fn new(inference: Box<dyn SelectorInference>) -> Self {
        Self {
            inference,
            max_markup_len: MAX_MARKUP_LEN,
        }
    }

    /// Override the markup cap (the default matches [`MAX_MARKUP_LEN`])
    pub fn with_max_markup_len(mut self, max_markup_len: usize) -> Self {
        self.max_markup_len = max_markup_len;
        self
    }

    /// Resolve a description to a handle on the current page.
    ///
    /// Captures and simplifies the page markup, asks the inference
    /// capability for a selector, strips any code fences from the reply,
    /// and binds the candidate against the live page. Zero matches or an
    /// unusable reply is an error; the caller decides the fallback.
    pub async fn resolve(
        &self,
        page: &dyn PageDriver,
        description: &str,
    ) -> Result<ElementHandle> {
        let html = page.page_html()?;
        let cleaned = truncate_markup(simplify_markup(&html), self.max_markup_len);
        debug!(
            "Resolving '{}' against {} chars of cleaned markup",
            description,
            cleaned.len()
        );

        let reply = self.inference.infer_selector(description, &cleaned).await?;
        let selector = strip_code_fences(&reply);

        if selector.is_empty() || selector.contains('\n') {
            return Err(RedpostError::Resolver(format!(
                "Unusable selector reply for '{}': {:?}",
                description, reply
            )));
        }

        if !page.exists_css(&selector) {
            return Err(RedpostError::Resolver(format!(
                "Selector '{}' matched no elements for '{}'",
                selector, description
            )));
        }

        info!("Resolved '{}' -> '{}'", description, selector);
        Ok(ElementHandle { selector })
    }
}
