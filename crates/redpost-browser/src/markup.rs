//! Page-markup simplification for the element resolver
//!
//! Raw page HTML is far too large to send to a selector-inference service.
//! The simplifier walks the parsed DOM, drops non-content nodes, and
//! collapses whitespace; the result is then truncated at a fixed cap.
//! Truncation is lossy and acceptable: the remote lookup is best-effort,
//! not exhaustive.

use scraper::{ElementRef, Html, Selector};

/// Hard cap on cleaned markup sent to the inference service, in characters
pub const MAX_MARKUP_LEN: usize = 20_000;

/// Marker appended when markup is cut at the cap
pub const TRUNCATION_MARKER: &str = "...(truncated)";

/// Tags whose subtrees carry no locatable content
const STRIP_TAGS: &[&str] = &["script", "style", "svg", "path", "meta", "link", "noscript"];

/// Strip non-content nodes and collapse whitespace.
///
/// Keeps element tags and all attributes (ids, classes, placeholders are
/// exactly what selector inference needs); drops scripts, styles, vector
/// graphics, metadata, and comments. Only the `<body>` subtree is kept
/// when one exists.
pub fn simplify_markup(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut out = String::new();
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match body {
        Some(body) => write_element(body, &mut out),
        None => write_element(document.root_element(), &mut out),
    }

    out
}

/// Truncate cleaned markup at `max_len` characters, appending the marker.
///
/// Markup below the limit passes through unmodified.
pub fn truncate_markup(markup: String, max_len: usize) -> String {
    if markup.chars().count() < max_len {
        return markup;
    }

    let cut = markup
        .char_indices()
        .nth(max_len)
        .map(|(idx, _)| idx)
        .unwrap_or(markup.len());
    let mut truncated = markup[..cut].to_string();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

fn write_element(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if STRIP_TAGS.contains(&name) {
        return;
    }

    out.push('<');
    out.push_str(name);
    for (attr, value) in element.value().attrs() {
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
    out.push('>');

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            write_element(child_element, out);
        } else if let Some(text) = child.value().as_text() {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                out.push_str(&collapsed);
            }
        }
        // Comments, doctypes, and processing instructions are dropped
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let html = r#"<html><head><style>.a{color:red}</style></head>
            <body><script>alert(1)</script><button class="submit">发布</button></body></html>"#;
        let cleaned = simplify_markup(html);
        assert!(cleaned.contains(r#"<button class="submit">发布</button>"#));
        assert!(!cleaned.contains("alert"));
        assert!(!cleaned.contains("color:red"));
    }

    #[test]
    fn test_strips_comments() {
        let html = "<html><body><!-- hidden note --><div id=\"x\">ok</div></body></html>";
        let cleaned = simplify_markup(html);
        assert!(!cleaned.contains("hidden note"));
        assert!(cleaned.contains("<div id=\"x\">ok</div>"));
    }

    #[test]
    fn test_strips_svg_subtree() {
        let html = "<html><body><svg><path d=\"M0 0\"/></svg><span>kept</span></body></html>";
        let cleaned = simplify_markup(html);
        assert!(!cleaned.contains("svg"));
        assert!(!cleaned.contains("M0 0"));
        assert!(cleaned.contains("<span>kept</span>"));
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<html><body><p>  hello \n\n   world  </p></body></html>";
        let cleaned = simplify_markup(html);
        assert!(cleaned.contains("<p>hello world</p>"));
    }

    #[test]
    fn test_keeps_attributes() {
        let html = r#"<html><body><input type="file" accept="image/*"></body></html>"#;
        let cleaned = simplify_markup(html);
        assert!(cleaned.contains(r#"type="file""#));
        assert!(cleaned.contains(r#"accept="image/*""#));
    }

    #[test]
    fn test_truncate_below_limit_unmodified() {
        let markup = "a".repeat(100);
        assert_eq!(truncate_markup(markup.clone(), 200), markup);
    }

    #[test]
    fn test_truncate_at_limit_gets_marker() {
        let markup = "a".repeat(200);
        let truncated = truncate_markup(markup, 200);
        assert_eq!(
            truncated.len(),
            200 + TRUNCATION_MARKER.len()
        );
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_above_limit_cut_to_limit() {
        let markup = "a".repeat(500);
        let truncated = truncate_markup(markup, 200);
        assert_eq!(truncated.len(), 200 + TRUNCATION_MARKER.len());
        assert!(truncated.starts_with(&"a".repeat(200)));
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncate_multibyte_safe() {
        let markup = "标".repeat(50);
        let truncated = truncate_markup(markup, 10);
        assert!(truncated.starts_with(&"标".repeat(10)));
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }
}
