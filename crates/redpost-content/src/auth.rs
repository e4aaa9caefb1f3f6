//! API-key lookup for content-provider vendors
//!
//! One environment variable per networked vendor. Absence of the key for the
//! selected vendor is a startup-time fatal error, checked at provider
//! construction rather than mid-workflow.

use redpost_core::{RedpostError, Result};
use std::env;

/// API key for the DeepSeek vendor (also used by the element resolver)
pub fn deepseek_api_key() -> Result<String> {
    require_env("DEEPSEEK_API_KEY")
}

/// API key for the Gemini vendor
pub fn gemini_api_key() -> Result<String> {
    require_env("GEMINI_API_KEY")
}

fn require_env(var: &str) -> Result<String> {
    match env::var(var) {
        Ok(value) if !value.is_empty() => {
            tracing::debug!("Using {}", var);
            Ok(value)
        }
        _ => Err(RedpostError::Auth(format!(
            "{} not found in environment.\n\
             Set it before selecting this provider, e.g.:\n\
             - export {}=sk-...",
            var, var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent concurrent env var modifications
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap();

        // Save original values
        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();

        // Set test values
        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let result = f();

        // Restore original values
        for (key, original) in originals {
            match original {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        result
    }

    #[test]
    fn test_key_present() {
        with_env_vars(&[("DEEPSEEK_API_KEY", Some("test-key"))], || {
            let key = deepseek_api_key().unwrap();
            assert_eq!(key, "test-key");
        });
    }

    #[test]
    fn test_key_absent() {
        with_env_vars(&[("GEMINI_API_KEY", None)], || {
            let result = gemini_api_key();
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_empty_key_rejected() {
        with_env_vars(&[("DEEPSEEK_API_KEY", Some(""))], || {
            assert!(deepseek_api_key().is_err());
        });
    }
}
