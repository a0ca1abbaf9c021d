//! Browser automation boundary
//!
//! The engine only talks to a browser through these two traits. Any W3C
//! WebDriver client can satisfy them; see [`super::remote`] for the
//! `fantoccini` implementation and [`super::mock`] for the in-memory one.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BrowserKind;
use crate::engine::Locator;
use crate::Result;

/// Capabilities requested when a browser is acquired
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Browser family
    pub kind: BrowserKind,
    /// Headless mode (no GUI)
    pub headless: bool,
    /// Maximize the window after the session starts
    pub maximized: bool,
    /// Implicit wait applied to element lookups
    pub implicit_wait: Duration,
    /// Page load timeout
    pub page_load_timeout: Duration,
    /// Additional arguments passed to the browser binary
    pub args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chrome,
            headless: false,
            maximized: true,
            implicit_wait: Duration::from_millis(500),
            page_load_timeout: Duration::from_secs(30),
            args: Vec::new(),
        }
    }
}

impl BrowserOptions {
    /// Relaxed flags for testing against a local development server
    pub fn local_testing(kind: BrowserKind) -> Self {
        let args = match kind {
            BrowserKind::Chrome => vec![
                "--start-maximized",
                "--disable-web-security",
                "--disable-features=VizDisplayCompositor",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-extensions",
                "--disable-gpu",
                "--remote-allow-origins=*",
            ],
            BrowserKind::Edge => vec![
                "--start-maximized",
                "--disable-web-security",
                "--remote-allow-origins=*",
            ],
            BrowserKind::Firefox => vec!["--start-maximized"],
        };

        Self {
            kind,
            args: args.into_iter().map(String::from).collect(),
            ..Default::default()
        }
    }

    /// Options derived from the suite configuration
    pub fn from_config(config: &crate::Config) -> Self {
        let mut options = Self::local_testing(config.browser);
        options.headless = config.headless;
        options.implicit_wait = config.implicit_wait();
        options.page_load_timeout = config.page_load_timeout();
        options
    }
}

/// A live browser session
#[async_trait]
pub trait WebDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Find the first element matching `locator`; `None` when nothing matches
    async fn find(&self, locator: &Locator) -> Result<Option<Arc<dyn ElementHandle>>>;

    /// Find every element matching `locator`, in document order
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Arc<dyn ElementHandle>>>;

    /// Current page URL
    async fn current_url(&self) -> Result<String>;

    /// Current page title
    async fn title(&self) -> Result<String>;

    /// Evaluate JavaScript in the page
    async fn execute_script(
        &self,
        script: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value>;

    /// Capture a PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the browser session
    async fn quit(&self) -> Result<()>;
}

/// A DOM element resolved by a [`WebDriver`]
#[async_trait]
pub trait ElementHandle: Send + Sync {
    /// Short description for logs and error messages
    fn describe(&self) -> String;

    /// Native click
    async fn click(&self) -> Result<()>;

    /// Clear an input's value
    async fn clear(&self) -> Result<()>;

    /// Type text into the element
    async fn send_keys(&self, text: &str) -> Result<()>;

    /// Rendered text
    async fn text(&self) -> Result<String>;

    /// Whether the element is displayed
    async fn is_displayed(&self) -> Result<bool>;

    /// Whether the element is enabled
    async fn is_enabled(&self) -> Result<bool>;

    /// Click through the page's script engine
    async fn script_click(&self) -> Result<()>;

    /// Assign the value through the page's script engine and fire
    /// `input`/`change`
    async fn script_set_value(&self, value: &str) -> Result<()>;

    /// Scroll element into view
    async fn scroll_into_view(&self) -> Result<()>;
}

/// Acquires browser sessions
#[async_trait]
pub trait DriverFactory: Send + Sync {
    /// Start a new browser with `options`
    async fn connect(&self, options: &BrowserOptions) -> Result<Arc<dyn WebDriver>>;
}
