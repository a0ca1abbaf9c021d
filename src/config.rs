//! Configuration management for the YATRIK suite

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Browser family driven through WebDriver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
    Edge,
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" | "msedge" => Ok(BrowserKind::Edge),
            other => Err(Error::configuration(format!("Unsupported browser: {}", other))),
        }
    }
}

/// Credential override for one role, read from the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleOverride {
    pub email: Option<String>,
    pub password: Option<String>,
    pub expected_fragment: Option<String>,
}

/// Suite configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application origin, e.g. `http://localhost:5173`
    pub base_url: String,

    /// Path of the login page below `base_url`
    pub login_path: String,

    /// WebDriver endpoint (chromedriver, geckodriver, msedgedriver)
    pub webdriver_url: String,

    /// Browser family
    pub browser: BrowserKind,

    /// Run without a visible window
    pub headless: bool,

    /// Implicit wait applied to the driver in milliseconds
    pub implicit_wait_ms: u64,

    /// Explicit wait for redirects and page-level checks in milliseconds
    pub explicit_wait_ms: u64,

    /// Per-locator wait inside a fallback chain in milliseconds
    pub locator_wait_ms: u64,

    /// Poll interval for every wait in milliseconds
    pub poll_interval_ms: u64,

    /// Page load timeout in milliseconds
    pub page_load_timeout_ms: u64,

    /// Directory receiving teardown screenshots
    pub screenshot_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Credential overrides keyed by role name
    pub roles: BTreeMap<String, RoleOverride>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            login_path: "/login".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: false,
            implicit_wait_ms: 500,
            explicit_wait_ms: 15_000,
            locator_wait_ms: 2_000,
            poll_interval_ms: 250,
            page_load_timeout_ms: 30_000,
            screenshot_dir: PathBuf::from("target/screenshots"),
            log_level: "info".to_string(),
            roles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load the config file named by `YATRIK_CONFIG` (if any), then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        let base = match env::var("YATRIK_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Config::default(),
        };
        base.with_env_overrides()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Config::default().with_env_overrides()
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(base_url) = env::var("YATRIK_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(login_path) = env::var("YATRIK_LOGIN_PATH") {
            self.login_path = login_path;
        }

        if let Ok(webdriver_url) = env::var("YATRIK_WEBDRIVER_URL") {
            self.webdriver_url = webdriver_url;
        }

        if let Ok(browser) = env::var("YATRIK_BROWSER") {
            self.browser = browser.parse()?;
        }

        if let Ok(headless) = env::var("YATRIK_HEADLESS") {
            self.headless = headless
                .parse()
                .map_err(|_| Error::configuration("Invalid YATRIK_HEADLESS"))?;
        }

        if let Ok(value) = env::var("YATRIK_IMPLICIT_WAIT_MS") {
            self.implicit_wait_ms = parse_millis("YATRIK_IMPLICIT_WAIT_MS", &value)?;
        }

        if let Ok(value) = env::var("YATRIK_EXPLICIT_WAIT_MS") {
            self.explicit_wait_ms = parse_millis("YATRIK_EXPLICIT_WAIT_MS", &value)?;
        }

        if let Ok(value) = env::var("YATRIK_LOCATOR_WAIT_MS") {
            self.locator_wait_ms = parse_millis("YATRIK_LOCATOR_WAIT_MS", &value)?;
        }

        if let Ok(value) = env::var("YATRIK_POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_millis("YATRIK_POLL_INTERVAL_MS", &value)?;
        }

        if let Ok(value) = env::var("YATRIK_PAGE_LOAD_TIMEOUT_MS") {
            self.page_load_timeout_ms = parse_millis("YATRIK_PAGE_LOAD_TIMEOUT_MS", &value)?;
        }

        if let Ok(dir) = env::var("YATRIK_SCREENSHOT_DIR") {
            self.screenshot_dir = PathBuf::from(dir);
        }

        if let Ok(log_level) = env::var("YATRIK_LOG_LEVEL") {
            self.log_level = log_level;
        }

        self.validate()?;
        Ok(self)
    }

    /// Reject values that would make every wait degenerate
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| Error::configuration(format!("Invalid base_url {}: {}", self.base_url, e)))?;
        url::Url::parse(&self.webdriver_url).map_err(|e| {
            Error::configuration(format!("Invalid webdriver_url {}: {}", self.webdriver_url, e))
        })?;

        if self.poll_interval_ms == 0 {
            return Err(Error::configuration("poll_interval_ms must be greater than zero"));
        }

        if !self.login_path.starts_with('/') {
            return Err(Error::configuration("login_path must start with '/'"));
        }

        Ok(())
    }

    /// Full URL of the login page
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.login_path)
    }

    /// Whether `url` denotes the login page: it contains the login path or is
    /// the bare application origin
    pub fn is_login_url(&self, url: &str) -> bool {
        url.contains(&self.login_path)
            || url.trim_end_matches('/') == self.base_url.trim_end_matches('/')
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    pub fn explicit_wait(&self) -> Duration {
        Duration::from_millis(self.explicit_wait_ms)
    }

    pub fn locator_wait(&self) -> Duration {
        Duration::from_millis(self.locator_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_millis(self.page_load_timeout_ms)
    }
}

fn parse_millis(name: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.login_url(), "http://localhost:5173/login");
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert_eq!(config.explicit_wait(), Duration::from_secs(15));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_login_url() {
        let config = Config::default();
        assert!(config.is_login_url("http://localhost:5173/login"));
        assert!(config.is_login_url("http://localhost:5173/login?next=/admin"));
        assert!(config.is_login_url("http://localhost:5173/"));
        assert!(config.is_login_url("http://localhost:5173"));
        assert!(!config.is_login_url("http://localhost:5173/admin"));
    }

    #[test]
    fn test_from_toml_with_role_override() {
        let config = Config::from_toml(
            r#"
            base_url = "http://erp.test:8080"
            browser = "firefox"
            explicit_wait_ms = 5000

            [roles.depot]
            email = "depot-kch@yatrik.com"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.base_url, "http://erp.test:8080");
        assert_eq!(config.browser, BrowserKind::Firefox);
        assert_eq!(config.explicit_wait_ms, 5000);
        assert_eq!(config.locator_wait_ms, 2_000);
        assert_eq!(
            config.roles["depot"].email.as_deref(),
            Some("depot-kch@yatrik.com")
        );
        assert!(config.roles["depot"].password.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Config::from_toml("base_url = \"not a url\"").is_err());
        assert!(Config::from_toml("poll_interval_ms = 0").is_err());
        assert!(Config::from_toml("login_path = \"login\"").is_err());
        assert!("safari".parse::<BrowserKind>().is_err());
        assert_eq!("MSEdge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
    }
}
