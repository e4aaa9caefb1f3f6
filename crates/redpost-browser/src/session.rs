//! Browser session lifecycle over Chrome DevTools Protocol
//!
//! One session owns one persistent profile directory and one active tab.
//! The profile directory carries cookies and local storage across process
//! restarts; the workflow never clears it.

use crate::driver::PageDriver;
use crate::error::Result;
use headless_chrome::{Browser, LaunchOptions, Tab};
use redpost_core::RedpostError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Launch arguments that make the browser read as a regular profile
const ANTI_AUTOMATION_ARGS: &[&str] = &[
    "--disable-blink-features=AutomationControlled",
    "--no-sandbox",
];

/// Configuration for session launch
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Profile directory holding the persisted login identity
    pub profile_dir: PathBuf,
    /// Run in headless mode. Manual login needs a visible window.
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Default timeout for element waits, seconds
    pub timeout_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from("user_data/browser_profile"),
            headless: false,
            window_width: 1280,
            window_height: 800,
            timeout_seconds: 30,
        }
    }
}

/// Active browser session bound to a persistent profile
pub struct Session {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// The single tab the workflow drives
    tab: Arc<Tab>,
    config: SessionConfig,
}

impl Session {
    /// Launch a browser bound to the configured profile directory.
    ///
    /// Creates the profile directory if absent, applies the
    /// anti-automation launch arguments and the navigator-fingerprint
    /// patch, and reuses a tab the profile restored if one exists.
    ///
    /// Failure here is fatal for the whole operation; there is no retry.
    pub async fn launch(config: SessionConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, profile: {})",
            config.headless,
            config.profile_dir.display()
        );

        std::fs::create_dir_all(&config.profile_dir).map_err(|e| {
            RedpostError::Session(format!(
                "Failed to create profile directory {}: {}",
                config.profile_dir.display(),
                e
            ))
        })?;

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((config.window_width, config.window_height)))
            .user_data_dir(Some(config.profile_dir.clone()))
            .build()
            .map_err(|e| RedpostError::Session(format!("Failed to build launch options: {}", e)))?;

        for arg in ANTI_AUTOMATION_ARGS {
            launch_options.args.push(OsStr::new(arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| RedpostError::Session(format!("Failed to launch browser: {}", e)))?;

        // A persistent profile may restore last session's tab; reuse it
        // so the workflow drives exactly one page.
        let restored = browser
            .get_tabs()
            .lock()
            .ok()
            .and_then(|tabs| tabs.first().cloned());

        let tab = match restored {
            Some(tab) => {
                debug!("Reusing tab restored from profile");
                tab
            }
            None => browser
                .new_tab()
                .map_err(|e| RedpostError::Session(format!("Failed to create tab: {}", e)))?,
        };

        tab.set_default_timeout(Duration::from_secs(config.timeout_seconds));

        // Fingerprint patch: navigator.webdriver and friends read as unset.
        if let Err(e) = tab.enable_stealth_mode() {
            warn!("Could not enable stealth mode: {}", e);
        }

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            tab,
            config,
        })
    }

    /// Session configuration in effect
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Execute JavaScript in the page context
    pub fn evaluate_script(&self, script: &str) -> Result<serde_json::Value> {
        debug!("Evaluating JavaScript: {}", script);

        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| RedpostError::Browser(format!("JavaScript evaluation failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Current page title
    pub fn get_title(&self) -> Result<String> {
        let result = self.evaluate_script("document.title")?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Write the informational session-state backup after a manual login.
    ///
    /// The profile directory remains the real session store; this file
    /// only records that a login happened and which cookies exist (names
    /// and domains, not values).
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let cookies = self
            .tab
            .get_cookies()
            .map_err(|e| RedpostError::Browser(format!("Failed to read cookies: {}", e)))?;

        let exported: Vec<serde_json::Value> = cookies
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name,
                    "domain": c.domain,
                })
            })
            .collect();

        let state = serde_json::json!({
            "saved_at": chrono::Utc::now().to_rfc3339(),
            "url": self.tab.get_url(),
            "cookies": exported,
        });

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&state)?)?;

        info!("Session state exported to {}", path.display());
        Ok(())
    }

    /// Close the browser session.
    ///
    /// Never errors: a half-failed session still releases its browser
    /// process when dropped.
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        // Browser is dropped and cleaned up here
        Ok(())
    }
}

impl PageDriver for Session {
    fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);

        self.tab
            .navigate_to(url)
            .map_err(|e| RedpostError::Browser(format!("Failed to navigate to {}: {}", url, e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| RedpostError::Browser(format!("Navigation timeout for {}: {}", url, e)))?;

        info!("Navigated to {}", url);
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn wait_for_css(&self, selector: &str, timeout: Duration) -> Result<()> {
        debug!("Waiting for element: {} (timeout: {:?})", selector, timeout);

        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|_e| RedpostError::Browser(format!("Element not found: {}", selector)))?;

        debug!("Element found: {}", selector);
        Ok(())
    }

    fn wait_for_text(&self, text: &str, timeout: Duration) -> Result<()> {
        let xpath = text_xpath(text);
        debug!("Waiting for text: {} (timeout: {:?})", text, timeout);

        self.tab
            .wait_for_xpath_with_custom_timeout(&xpath, timeout)
            .map_err(|_e| RedpostError::Browser(format!("Text not found: {}", text)))?;

        debug!("Text found: {}", text);
        Ok(())
    }

    fn exists_css(&self, selector: &str) -> bool {
        self.tab.find_element(selector).is_ok()
    }

    fn click_css(&self, selector: &str) -> Result<()> {
        debug!("Clicking element: {}", selector);

        self.tab
            .find_element(selector)
            .map_err(|e| RedpostError::Browser(format!("Element not found: {}: {}", selector, e)))?
            .click()
            .map_err(|e| RedpostError::Browser(format!("Failed to click {}: {}", selector, e)))?;

        Ok(())
    }

    fn click_text(&self, text: &str) -> Result<()> {
        debug!("Clicking element with text: {}", text);

        self.tab
            .find_element_by_xpath(&text_xpath(text))
            .map_err(|e| RedpostError::Browser(format!("Text not found: {}: {}", text, e)))?
            .click()
            .map_err(|e| RedpostError::Browser(format!("Failed to click '{}': {}", text, e)))?;

        Ok(())
    }

    fn fill_css(&self, selector: &str, value: &str) -> Result<()> {
        debug!("Filling element: {}", selector);

        self.tab
            .find_element(selector)
            .map_err(|e| RedpostError::Browser(format!("Element not found: {}: {}", selector, e)))?
            .type_into(value)
            .map_err(|e| RedpostError::Browser(format!("Failed to fill {}: {}", selector, e)))?;

        Ok(())
    }

    fn set_file_input(&self, selector: &str, path: &Path) -> Result<()> {
        debug!("Setting file input {} to {}", selector, path.display());

        let element = self
            .tab
            .find_element(selector)
            .map_err(|e| RedpostError::Browser(format!("Element not found: {}: {}", selector, e)))?;

        self.tab
            .handle_file_chooser(vec![path.to_string_lossy().into_owned()], element.node_id)
            .map_err(|e| {
                RedpostError::Browser(format!("Failed to set file on {}: {}", selector, e))
            })?;

        Ok(())
    }

    fn page_html(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| RedpostError::Browser(format!("Failed to read page content: {}", e)))
    }
}

/// XPath matching any element whose text contains the given string
fn text_xpath(text: &str) -> String {
    format!("//*[contains(text(), '{}')]", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(!config.headless);
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, 800);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_text_xpath() {
        assert_eq!(
            text_xpath("发布笔记"),
            "//*[contains(text(), '发布笔记')]"
        );
    }
}
