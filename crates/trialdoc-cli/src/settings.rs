//! `trialdoc.toml` settings
//!
//! ```toml
//! [render]
//! validate = true
//! settle_delay_ms = 50
//!
//! [translation]
//! max_concurrent = 1
//!
//! [translation.backend]
//! model = "gpt-5-nano"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trialdoc_ooxml::RenderOptions;
use trialdoc_translate::TranslationConfig;

/// File name looked up next to the input document
pub const SETTINGS_FILE: &str = "trialdoc.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub render: RenderSettings,
    pub translation: TranslationConfig,
}

/// Render settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Refuse to render trees that fail validation
    pub validate: bool,
    /// Pause between flushing the output and verifying it
    pub settle_delay_ms: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            validate: true,
            settle_delay_ms: 50,
        }
    }
}

impl RenderSettings {
    pub fn to_options(&self) -> RenderOptions {
        RenderOptions {
            validate: self.validate,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Load an explicit config, else `trialdoc.toml` beside `input`, else defaults
    pub fn locate(explicit: Option<&Path>, input: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let beside = sibling_settings(input);
        if beside.exists() {
            tracing::debug!("Loading config: {}", beside.display());
            Self::from_file(&beside)
        } else {
            Ok(Self::default())
        }
    }
}

fn sibling_settings(input: &Path) -> PathBuf {
    input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .join(SETTINGS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.render.validate);
        assert_eq!(settings.translation.max_attempts, 4);
    }

    #[test]
    fn test_sections_parse() {
        let settings = Settings::from_toml_str(
            r#"
[render]
validate = false

[translation]
max_concurrent = 4

[translation.backend]
api_key_env = "AZURE_KEY"
"#,
        )
        .unwrap();
        assert!(!settings.render.validate);
        assert_eq!(settings.render.settle_delay_ms, 50);
        assert_eq!(settings.translation.max_concurrent, 4);
        assert_eq!(settings.translation.backend.api_key_env, "AZURE_KEY");
    }

    #[test]
    fn test_render_options() {
        let options = RenderSettings {
            validate: false,
            settle_delay_ms: 5,
        }
        .to_options();
        assert!(!options.validate);
        assert_eq!(options.settle_delay, Duration::from_millis(5));
    }

    #[test]
    fn test_locate_prefers_sibling_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("consent.json");
        std::fs::write(dir.path().join(SETTINGS_FILE), "[render]\nsettle_delay_ms = 7\n").unwrap();

        let settings = Settings::locate(None, &input).unwrap();
        assert_eq!(settings.render.settle_delay_ms, 7);
    }

    #[test]
    fn test_locate_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("consent.json");
        let err = Settings::locate(Some(&dir.path().join("nope.toml")), &input).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_locate_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::locate(None, &dir.path().join("consent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
