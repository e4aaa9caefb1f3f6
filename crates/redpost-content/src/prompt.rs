//! Prompt templates for post generation

/// System prompt shared by the networked providers
pub const SYSTEM_PROMPT: &str = "You are a professional social media content creator \
for Xiaohongshu (Little Red Book). Output strictly in JSON format.";

/// User prompt embedding the topic
pub fn user_prompt(topic: &str) -> String {
    format!(
        r#"Please generate a post about "{topic}".

Requirements:
1. Title: Catchy, includes emojis, under 20 chars.
2. Content: Engaging, uses emojis, split into paragraphs, includes 3-5 hashtags at the end.
3. Image Prompt: A description to generate a cover image for this post using an AI image generator.

Output Format (JSON):
{{
    "title": "...",
    "content": "...",
    "image_prompt": "..."
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_topic() {
        let prompt = user_prompt("coffee");
        assert!(prompt.contains("\"coffee\""));
        assert!(prompt.contains("image_prompt"));
    }
}
