//! Shared data types for redpost

use serde::{Deserialize, Serialize};

/// One generated post: title, body, and a cover-image prompt.
///
/// Produced once per publish attempt and immutable afterward. Every content
/// provider returns this shape, including on failure — see
/// [`GeneratedPost::error_record`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    /// Post title. Intended to stay under ~20 display characters.
    pub title: String,
    /// Free-text body with trailing hashtags.
    pub content: String,
    /// Prompt for an AI image generator to produce the cover image.
    pub image_prompt: String,
}

impl GeneratedPost {
    /// Fail-soft placeholder returned when generation fails.
    ///
    /// Downstream publishing logic never needs a separate "generation
    /// failed" code path: the record is well-formed and clearly labeled.
    pub fn error_record(topic: &str, reason: &str) -> Self {
        Self {
            title: format!("Error generating for {}", topic),
            content: format!("Failed to generate content. Error: {}", reason),
            image_prompt: "Error icon".to_string(),
        }
    }

    /// Whether this record is the fail-soft placeholder.
    pub fn is_error_record(&self) -> bool {
        self.title.starts_with("Error generating for ")
    }
}
