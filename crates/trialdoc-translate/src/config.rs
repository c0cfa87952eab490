//! Translation configuration
//!
//! Loaded from the `[translation]` table of `trialdoc.toml`:
//!
//! ```toml
//! [translation]
//! max_concurrent = 2
//! max_items_per_batch = 5
//! join_timeout_secs = 600
//!
//! [translation.backend]
//! model = "gpt-5-nano"
//! api_key_env = "OPENAI_API_KEY"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Batching, concurrency and retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Batches in flight at once; 1 serializes all requests
    pub max_concurrent: usize,
    pub max_items_per_batch: usize,
    pub max_chars_per_batch: usize,
    /// Backend calls per batch before falling back to source text
    pub max_attempts: u32,
    /// Wait before every backend call
    pub pre_request_delay_ms: u64,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Deadline for the whole set of batches; unfinished batches pass through
    pub join_timeout_secs: Option<u64>,
    pub backend: BackendConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            max_items_per_batch: 5,
            max_chars_per_batch: 1000,
            max_attempts: 4,
            pre_request_delay_ms: 5000,
            backoff_base_ms: 5000,
            backoff_max_ms: 60_000,
            join_timeout_secs: None,
            backend: BackendConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Parse a bare `[translation]` table
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Settings with no delays, for tests and local backends
    pub fn immediate() -> Self {
        Self {
            pre_request_delay_ms: 0,
            backoff_base_ms: 0,
            backoff_max_ms: 0,
            ..Self::default()
        }
    }

    /// Wait before attempt `attempt` (0-based)
    ///
    /// `pre_request_delay + min(backoff_base * 2^(attempt-1), backoff_max)`,
    /// with no backoff term on the first attempt.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let backoff = if attempt == 0 {
            0
        } else {
            let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
            self.backoff_base_ms
                .saturating_mul(factor)
                .min(self.backoff_max_ms)
        };
        Duration::from_millis(self.pre_request_delay_ms.saturating_add(backoff))
    }

    pub fn join_timeout(&self) -> Option<Duration> {
        self.join_timeout_secs.map(Duration::from_secs)
    }
}

/// Chat-completions endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-5-nano".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 4000,
            temperature: 1.0,
            request_timeout_secs: 120,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranslationConfig::default();
        assert_eq!(config.max_concurrent, 1);
        assert_eq!(config.max_items_per_batch, 5);
        assert_eq!(config.max_chars_per_batch, 1000);
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.join_timeout(), None);
        assert_eq!(config.backend.model, "gpt-5-nano");
        assert_eq!(config.backend.max_tokens, 4000);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = TranslationConfig::from_toml_str(
            r#"
            max_concurrent = 3
            join_timeout_secs = 90

            [backend]
            model = "local-model"
            endpoint = "http://localhost:8080/v1/chat/completions"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.max_items_per_batch, 5);
        assert_eq!(config.join_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.backend.model, "local-model");
        assert_eq!(config.backend.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(TranslationConfig::from_toml_str("max_concurrent = \"many\"").is_err());
    }

    #[test]
    fn test_backoff_schedule() {
        let config = TranslationConfig {
            pre_request_delay_ms: 100,
            backoff_base_ms: 1000,
            backoff_max_ms: 3000,
            ..TranslationConfig::default()
        };
        let delays: Vec<u128> = (0..5).map(|n| config.delay_before(n).as_millis()).collect();
        assert_eq!(delays, vec![100, 1100, 2100, 3100, 3100]);
    }

    #[test]
    fn test_immediate_has_no_delay() {
        let config = TranslationConfig::immediate();
        assert_eq!(config.delay_before(0), Duration::ZERO);
        assert_eq!(config.delay_before(3), Duration::ZERO);
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let config = TranslationConfig::default();
        assert_eq!(config.delay_before(200), Duration::from_millis(65_000));
    }
}
