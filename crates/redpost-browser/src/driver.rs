//! Page-driver seam between the workflow and the live browser
//!
//! The publish workflow and the element resolver only need a handful of
//! page operations. Putting them behind a trait keeps the state machine
//! testable against a scripted stub; [`crate::session::Session`] is the
//! production implementation over Chrome DevTools Protocol.
//!
//! All waits take an explicit timeout. Implementations fail on timeout
//! rather than blocking indefinitely.

use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Operations the workflow performs against the active page
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the load to settle
    fn navigate(&self, url: &str) -> Result<()>;

    /// Current page URL
    fn current_url(&self) -> Result<String>;

    /// Wait for a CSS selector to match, bounded by `timeout`
    fn wait_for_css(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Wait for visible text to appear, bounded by `timeout`
    fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<()>;

    /// Whether a CSS selector matches right now (no wait)
    fn exists_css(&self, selector: &str) -> bool;

    /// Click the first element matching a CSS selector
    fn click_css(&self, selector: &str) -> Result<()>;

    /// Click the first element containing the given text
    fn click_text(&self, text: &str) -> Result<()>;

    /// Type a value into the first element matching a CSS selector
    fn fill_css(&self, selector: &str, value: &str) -> Result<()>;

    /// Set a local file path on a (possibly hidden) file input
    fn set_file_input(&self, selector: &str, path: &Path) -> Result<()>;

    /// Full HTML of the current document
    fn page_html(&self) -> Result<String>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted stub driver for workflow and resolver tests

    use super::*;
    use crate::error::RedpostError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Stub page with a scripted URL map and fixed element/text presence.
    ///
    /// Every call is recorded so tests can assert on attempt order.
    pub struct StubPage {
        /// URL the page reports after `navigate` (keyed by requested URL
        /// prefix match is overkill here; one landing URL is enough)
        pub landing_url: String,
        /// URL the page moves to when the composer trigger is clicked
        pub composer_url: String,
        url: Mutex<String>,
        css_present: HashSet<String>,
        text_present: HashSet<String>,
        pub calls: Mutex<Vec<String>>,
        pub html: String,
    }

    impl StubPage {
        pub fn new(landing_url: &str) -> Self {
            Self {
                landing_url: landing_url.to_string(),
                composer_url: "https://creator.example.com/publish/publish".to_string(),
                url: Mutex::new("about:blank".to_string()),
                css_present: HashSet::new(),
                text_present: HashSet::new(),
                calls: Mutex::new(Vec::new()),
                html: "<html><body></body></html>".to_string(),
            }
        }

        pub fn with_css(mut self, selectors: &[&str]) -> Self {
            self.css_present = selectors.iter().map(|s| s.to_string()).collect();
            self
        }

        pub fn with_text(mut self, texts: &[&str]) -> Self {
            self.text_present = texts.iter().map(|s| s.to_string()).collect();
            self
        }

        pub fn with_html(mut self, html: &str) -> Self {
            self.html = html.to_string();
            self
        }

        pub fn recorded_calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl PageDriver for StubPage {
        fn navigate(&self, url: &str) -> Result<()> {
            self.record(format!("navigate:{}", url));
            *self.url.lock().unwrap() = self.landing_url.clone();
            Ok(())
        }

        fn current_url(&self) -> Result<String> {
            Ok(self.url.lock().unwrap().clone())
        }

        fn wait_for_css(&self, selector: &str, _timeout: Duration) -> Result<()> {
            self.record(format!("wait_css:{}", selector));
            if self.css_present.contains(selector) {
                Ok(())
            } else {
                Err(RedpostError::Browser(format!(
                    "Element not found: {}",
                    selector
                )))
            }
        }

        fn wait_for_text(&self, text: &str, _timeout: Duration) -> Result<()> {
            self.record(format!("wait_text:{}", text));
            if self.text_present.contains(text) {
                Ok(())
            } else {
                Err(RedpostError::Browser(format!("Text not found: {}", text)))
            }
        }

        fn exists_css(&self, selector: &str) -> bool {
            self.css_present.contains(selector)
        }

        fn click_css(&self, selector: &str) -> Result<()> {
            self.record(format!("click_css:{}", selector));
            if self.css_present.contains(selector) {
                Ok(())
            } else {
                Err(RedpostError::Browser(format!(
                    "Element not found: {}",
                    selector
                )))
            }
        }

        fn click_text(&self, text: &str) -> Result<()> {
            self.record(format!("click_text:{}", text));
            if self.text_present.contains(text) {
                *self.url.lock().unwrap() = self.composer_url.clone();
                Ok(())
            } else {
                Err(RedpostError::Browser(format!("Text not found: {}", text)))
            }
        }

        fn fill_css(&self, selector: &str, value: &str) -> Result<()> {
            self.record(format!("fill:{}={}", selector, value));
            if self.css_present.contains(selector) {
                Ok(())
            } else {
                Err(RedpostError::Browser(format!(
                    "Element not found: {}",
                    selector
                )))
            }
        }

        fn set_file_input(&self, selector: &str, path: &Path) -> Result<()> {
            self.record(format!("set_file:{}:{}", selector, path.display()));
            if self.css_present.contains(selector) {
                Ok(())
            } else {
                Err(RedpostError::Browser(format!(
                    "Element not found: {}",
                    selector
                )))
            }
        }

        fn page_html(&self) -> Result<String> {
            Ok(self.html.clone())
        }
    }
}
