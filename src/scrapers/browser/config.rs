//! Browser engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false for debugging the live page.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chrome/Chromium executable; discovered from well-known
    /// paths and `$PATH` when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Navigation timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,
}

fn default_headless() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            chrome_path: None,
            proxy: None,
            timeout: default_timeout(),
            chrome_args: Vec::new(),
        }
    }
}
