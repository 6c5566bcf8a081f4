//! Configuration for mapscout.
//!
//! Settings come from an optional TOML file (`mapscout.toml` by default)
//! with every field defaulted, so a missing file is a fully working setup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::scrapers::{BrowserEngineConfig, CollectorConfig, PageTiming};

fn default_maps_url() -> String {
    "https://www.google.com/maps".to_string()
}

/// Top-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// URL of the map search UI.
    pub maps_url: String,

    /// Browser launch configuration.
    pub browser: BrowserEngineConfig,

    /// Scroll/convergence loop tuning.
    pub collector: CollectorConfig,

    /// Render pauses and lookup bounds for the live page.
    pub timing: PageTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maps_url: default_maps_url(),
            browser: BrowserEngineConfig::default(),
            collector: CollectorConfig::default(),
            timing: PageTiming::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("mapscout.toml"));

        if !path.exists() {
            let settings = Self::default();
            settings.validate()?;
            return Ok(settings);
        }

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.maps_url)
            .with_context(|| format!("Invalid maps_url: {}", self.maps_url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert!(settings.browser.headless);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            maps_url = "https://maps.example.test"

            [collector]
            max_scroll_iterations = 10
            "#,
        )
        .unwrap();

        assert_eq!(settings.maps_url, "https://maps.example.test");
        assert_eq!(settings.collector.max_scroll_iterations, 10);
        // untouched sections keep their defaults
        assert_eq!(settings.browser.timeout, 30);
        assert_eq!(settings.timing.focus_pause_ms, 3_000);
    }

    #[test]
    fn invalid_maps_url_is_rejected() {
        let settings = Settings {
            maps_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
