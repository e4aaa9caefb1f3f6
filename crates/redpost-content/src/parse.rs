//! Defensive parsing of model output
//!
//! Models wrap JSON in code fences, prepend prose, or trail explanations.
//! The helpers here recover the useful part without ever panicking:
//! strict parse first, then the first balanced `{...}` block, then a greedy
//! first-`{`-to-last-`}` slice as the final attempt.

use redpost_core::GeneratedPost;
use serde::Deserialize;

/// Remove code-fence wrapping (```json, ```css, bare ```) and trim.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = text.trim();

    if out.starts_with("```") {
        // Drop the opening fence and any language tag on the same line
        out = match out.find('\n') {
            Some(pos) => &out[pos + 1..],
            None => out.trim_start_matches('`'),
        };
    }
    if let Some(stripped) = out.trim_end().strip_suffix("```") {
        out = stripped;
    }

    out.trim().to_string()
}

/// Extract the first balanced `{...}` block from raw text.
///
/// Brace counting is blind to string contents, so a brace inside a JSON
/// string can unbalance it; callers fall back to [`greedy_json_slice`].
pub fn first_balanced_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;

    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Greedy slice from the first `{` to the last `}`.
pub fn greedy_json_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Tolerant deserialization target: missing fields become empty strings so
/// we can reject on content rather than on serde errors.
#[derive(Debug, Deserialize)]
struct RawPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    image_prompt: String,
}

impl RawPost {
    fn into_post(self) -> Option<GeneratedPost> {
        if self.title.is_empty() || self.content.is_empty() {
            return None;
        }
        Some(GeneratedPost {
            title: self.title,
            content: self.content,
            image_prompt: self.image_prompt,
        })
    }
}

/// Parse a generated post out of raw model output.
///
/// Attempts, in order: strict parse of the fence-stripped text, the first
/// balanced `{...}` block, the greedy brace slice. `None` means every
/// attempt failed and the caller should degrade to its placeholder record.
pub fn parse_post_json(raw: &str) -> Option<GeneratedPost> {
    let cleaned = strip_code_fences(raw);

    if let Ok(post) = serde_json::from_str::<RawPost>(&cleaned) {
        if let Some(post) = post.into_post() {
            return Some(post);
        }
    }

    for candidate in [first_balanced_block(&cleaned), greedy_json_slice(&cleaned)]
        .into_iter()
        .flatten()
    {
        if let Ok(post) = serde_json::from_str::<RawPost>(candidate) {
            if let Some(post) = post.into_post() {
                return Some(post);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences_json() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_fences_css() {
        let raw = "```css\nbutton.submit\n```";
        assert_eq!(strip_code_fences(raw), "button.submit");
    }

    #[test]
    fn test_strip_fences_passthrough() {
        assert_eq!(strip_code_fences("  button.submit "), "button.submit");
    }

    #[test]
    fn test_first_balanced_block() {
        let raw = "Sure! Here it is: {\"a\": {\"b\": 2}} and some prose.";
        assert_eq!(first_balanced_block(raw), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_balanced_block_none_without_braces() {
        assert!(first_balanced_block("no json here").is_none());
    }

    #[test]
    fn test_parse_strict() {
        let raw = r#"{"title": "t", "content": "c", "image_prompt": "i"}"#;
        let post = parse_post_json(raw).unwrap();
        assert_eq!(post.title, "t");
        assert_eq!(post.image_prompt, "i");
    }

    #[test]
    fn test_parse_with_prose_and_fences() {
        let raw = "Here is your post:\n```json\n{\"title\": \"t\", \"content\": \"c\", \"image_prompt\": \"i\"}\n```\nEnjoy!";
        let post = parse_post_json(raw).unwrap();
        assert_eq!(post.title, "t");
    }

    #[test]
    fn test_parse_missing_required_fields_fails() {
        let raw = r#"{"title": "t"}"#;
        assert!(parse_post_json(raw).is_none());
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_post_json("I could not produce JSON, sorry.").is_none());
    }

    #[test]
    fn test_parse_missing_image_prompt_is_tolerated() {
        let raw = r#"{"title": "t", "content": "c"}"#;
        let post = parse_post_json(raw).unwrap();
        assert!(post.image_prompt.is_empty());
    }
}
