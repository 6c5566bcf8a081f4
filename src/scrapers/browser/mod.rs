//! Chromium-backed collection session over CDP.
//!
//! Finds a system Chrome, launches it headless with container-safe
//! arguments, keeps the CDP event handler on a background task, and
//! guarantees the process is torn down when the session closes.

mod config;
mod page;

pub use config::BrowserEngineConfig;
pub use page::{ChromePage, PageTiming};

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::extract::locators;
use super::session::Session;
use super::ScrapeError;

/// User agent presented to the map UI. Headless Chrome advertises itself
/// otherwise, which degrades the served markup.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One browser lifecycle for a single collection request.
pub struct ChromeSession {
    config: BrowserEngineConfig,
    timing: PageTiming,
    maps_url: String,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
}

impl ChromeSession {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a session that will navigate to `maps_url` when opened.
    pub fn new(
        config: BrowserEngineConfig,
        timing: PageTiming,
        maps_url: impl Into<String>,
    ) -> Self {
        Self {
            config,
            timing,
            maps_url: maps_url.into(),
            browser: None,
            handler: None,
        }
    }

    /// Find a Chrome executable.
    fn find_chrome(&self) -> Result<PathBuf, ScrapeError> {
        if let Some(ref path) = self.config.chrome_path {
            return Ok(path.clone());
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        // Check if in PATH via `which`
        for cmd in &[
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
                if output.status.success() {
                    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                    if !path.is_empty() {
                        info!("Found Chrome in PATH: {}", path);
                        return Ok(PathBuf::from(path));
                    }
                }
            }
        }

        Err(ScrapeError::Browser(
            "Chrome/Chromium not found; install it or set browser.chrome_path".to_string(),
        ))
    }

    /// Launch the browser if not already running.
    async fn launch(&mut self) -> Result<(), ScrapeError> {
        if self.browser.is_some() {
            return Ok(());
        }

        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = self.find_chrome()?;
        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless, confusingly
        if !self.config.headless {
            builder = builder.with_head();
        }

        if let Some(ref proxy) = self.config.proxy {
            builder = builder.arg(format!("--proxy-server={}", proxy));
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu") // Recommended for headless
            .arg("--disable-software-rasterizer")
            .arg("--lang=en-US");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg.as_str());
        }

        let config = builder
            .build()
            .map_err(|e| ScrapeError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Failed to launch browser: {}", e)))?;

        // Drain CDP events until the browser goes away
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        self.browser = Some(browser);
        self.handler = Some(handle);

        Ok(())
    }

    fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout)
    }
}

#[async_trait]
impl Session for ChromeSession {
    type Page = ChromePage;

    async fn open(&mut self) -> Result<ChromePage, ScrapeError> {
        self.launch().await?;
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScrapeError::Browser("browser not running after launch".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        // Set the user agent before any navigation
        page.execute(SetUserAgentOverrideParams::new(USER_AGENT.to_string()))
            .await
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        info!(url = %self.maps_url, "navigating to search UI");
        match tokio::time::timeout(self.navigation_timeout(), page.goto(self.maps_url.clone()))
            .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(error)) => {
                return Err(ScrapeError::Navigation {
                    url: self.maps_url.clone(),
                    reason: error.to_string(),
                });
            }
            Err(_) => {
                return Err(ScrapeError::Navigation {
                    url: self.maps_url.clone(),
                    reason: format!("timed out after {}s", self.config.timeout),
                });
            }
        }

        // The page is usable once the search input is interactive
        match tokio::time::timeout(
            self.navigation_timeout(),
            page.find_element(locators::SEARCH_INPUT),
        )
        .await
        {
            Ok(Ok(_)) => debug!("search input ready"),
            Ok(Err(error)) => {
                warn!(%error, "search input not found after navigation");
                return Err(ScrapeError::SearchBoxMissing);
            }
            Err(_) => return Err(ScrapeError::SearchBoxMissing),
        }

        Ok(ChromePage::new(page, self.timing.clone()))
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(error) = browser.close().await {
                warn!(%error, "browser close failed");
            }
            let _ = browser.wait().await;
        }
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }
        debug!("browser session released");
    }
}
