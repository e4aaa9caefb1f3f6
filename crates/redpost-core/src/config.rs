//! Configuration management for redpost
//!
//! Settings are loaded from `redpost.toml` next to the profile directory,
//! falling back to defaults when the file is absent. All timeouts are
//! explicit: every browser or network wait in the workflow is bounded.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{RedpostError, Result};

/// Tool-level redpost configuration
///
/// Loaded from `redpost.toml` in the working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedpostConfig {
    /// Browser profile directory holding cookies and local storage.
    /// Never cleared by the workflow; this is the persisted login identity.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: PathBuf,

    /// Run the browser headless. Login and publish want a visible window.
    #[serde(default)]
    pub headless: bool,

    /// Creator-platform landing URL
    #[serde(default = "default_creator_url")]
    pub creator_url: String,

    /// Workflow wait bounds
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Element resolver settings
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Explicit timeouts for every wait the workflow performs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Interactive manual login (QR scan), seconds
    #[serde(default = "default_login_secs")]
    pub login_secs: u64,

    /// URL-settle wait when checking login state, seconds
    #[serde(default = "default_login_check_secs")]
    pub login_check_secs: u64,

    /// General navigation and element presence waits, seconds
    #[serde(default = "default_navigation_secs")]
    pub navigation_secs: u64,

    /// Wait for the editor to accept an uploaded asset, seconds
    #[serde(default = "default_editor_secs")]
    pub editor_secs: u64,

    /// Wait for the publish-success indicator, seconds
    #[serde(default = "default_confirmation_secs")]
    pub confirmation_secs: u64,

    /// Fixed settle delay after switching composer tabs, milliseconds
    #[serde(default = "default_tab_settle_ms")]
    pub tab_settle_ms: u64,
}

/// Element resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum cleaned-markup length sent to the selector-inference service.
    /// Truncation past this point is lossy and acceptable.
    #[serde(default = "default_max_markup_len")]
    pub max_markup_len: usize,
}

// Default value providers
fn default_profile_dir() -> PathBuf {
    PathBuf::from("user_data/browser_profile")
}

fn default_creator_url() -> String {
    "https://creator.xiaohongshu.com".to_string()
}

fn default_login_secs() -> u64 {
    300
}

fn default_login_check_secs() -> u64 {
    15
}

fn default_navigation_secs() -> u64 {
    30
}

fn default_editor_secs() -> u64 {
    60
}

fn default_confirmation_secs() -> u64 {
    10
}

fn default_tab_settle_ms() -> u64 {
    2000
}

fn default_max_markup_len() -> usize {
    20_000
}

impl RedpostConfig {
    /// Load configuration from `redpost.toml` or use defaults
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join("redpost.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content)
                .map_err(|e| RedpostError::Config(format!("Failed to parse config file: {}", e)))?)
        } else {
            Ok(Self::default())
        }
    }

    /// Write default configuration to `redpost.toml`
    pub fn write_default(dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;

        let config_path = dir.join("redpost.toml");
        let config = Self::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| RedpostError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Path of the informational session-state export written after login
    pub fn state_export_path(&self) -> PathBuf {
        self.profile_dir
            .parent()
            .map(|p| p.join("session_state.json"))
            .unwrap_or_else(|| PathBuf::from("session_state.json"))
    }
}

impl Default for RedpostConfig {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            headless: false,
            creator_url: default_creator_url(),
            timeouts: TimeoutConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_secs: default_login_secs(),
            login_check_secs: default_login_check_secs(),
            navigation_secs: default_navigation_secs(),
            editor_secs: default_editor_secs(),
            confirmation_secs: default_confirmation_secs(),
            tab_settle_ms: default_tab_settle_ms(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_markup_len: default_max_markup_len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedpostConfig::default();
        assert!(!config.headless);
        assert!(config.creator_url.contains("creator"));
        assert_eq!(config.timeouts.login_secs, 300);
        assert_eq!(config.timeouts.login_check_secs, 15);
        assert_eq!(config.timeouts.editor_secs, 60);
        assert_eq!(config.timeouts.confirmation_secs, 10);
        assert_eq!(config.resolver.max_markup_len, 20_000);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RedpostConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.timeouts.navigation_secs, 30);
    }

    #[test]
    fn test_write_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        RedpostConfig::write_default(dir.path()).unwrap();

        let config = RedpostConfig::load_or_default(dir.path()).unwrap();
        assert_eq!(config.resolver.max_markup_len, 20_000);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("redpost.toml"), "headless = true\n").unwrap();

        let config = RedpostConfig::load_or_default(dir.path()).unwrap();
        assert!(config.headless);
        assert_eq!(config.timeouts.login_secs, 300);
    }

    #[test]
    fn test_state_export_path_is_profile_sibling() {
        let config = RedpostConfig::default();
        assert_eq!(
            config.state_export_path(),
            PathBuf::from("user_data/session_state.json")
        );
    }
}
