//! Deterministic no-network provider for tests and dry runs

use crate::ContentProvider;
use async_trait::async_trait;
use redpost_core::GeneratedPost;

/// Returns hardcoded data shaped exactly like the networked providers'
/// output. Useful for exercising the publish workflow without API costs.
pub struct MockProvider;

#[async_trait]
impl ContentProvider for MockProvider {
    async fn generate(&self, topic: &str) -> GeneratedPost {
        GeneratedPost {
            title: format!("[Mock] 5 Tips for {}", topic),
            content: format!(
                "This is a mock post about {}.\n\n1. Tip One\n2. Tip Two\n3. Tip Three\n\n#mock #test",
                topic
            ),
            image_prompt: format!("A beautiful illustration of {}, minimal style", topic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_title_contains_topic() {
        let post = MockProvider.generate("coffee").await;
        assert!(post.title.contains("coffee"));
    }

    #[tokio::test]
    async fn test_content_has_hashtags() {
        let post = MockProvider.generate("coffee").await;
        assert!(post.content.contains("#mock"));
        assert!(post.content.contains("#test"));
        assert!(!post.content.is_empty());
    }

    #[tokio::test]
    async fn test_image_prompt_nonempty() {
        let post = MockProvider.generate("tea").await;
        assert!(post.image_prompt.contains("tea"));
    }
}
