//! W3C WebDriver implementation backed by `fantoccini`

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator as WdLocator};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use webdriver::capabilities::Capabilities;

use super::scripts::{text_contains_xpath, SCRIPT_CLICK, SCRIPT_SET_VALUE, SCROLL_INTO_VIEW};
use super::traits::{BrowserOptions, DriverFactory, ElementHandle, WebDriver};
use crate::config::BrowserKind;
use crate::engine::{Locator, Strategy};
use crate::{Error, Result};

/// Query shape understood by the WebDriver wire protocol
enum Query {
    Css(String),
    Id(String),
    XPath(String),
}

impl Query {
    fn from_locator(locator: &Locator) -> Self {
        let selector = locator.selector();
        match locator.strategy() {
            Strategy::Id => Query::Id(selector.to_string()),
            Strategy::Name => Query::Css(format!("[name=\"{}\"]", selector.replace('"', "\\\""))),
            Strategy::Css => Query::Css(selector.to_string()),
            Strategy::XPath => Query::XPath(selector.to_string()),
            Strategy::Text => Query::XPath(text_contains_xpath(selector)),
        }
    }

    fn as_wd(&self) -> WdLocator<'_> {
        match self {
            Query::Css(s) => WdLocator::Css(s),
            Query::Id(s) => WdLocator::Id(s),
            Query::XPath(s) => WdLocator::XPath(s),
        }
    }
}

/// Classify a WebDriver command error
pub(crate) fn map_cmd_error(err: CmdError, target: &str) -> Error {
    if let CmdError::Standard(wd) = &err {
        match wd.error {
            ErrorStatus::ElementNotInteractable
            | ErrorStatus::ElementClickIntercepted
            | ErrorStatus::InvalidElementState => {
                return Error::not_interactable(format!("{}: {}", target, wd.message));
            }
            ErrorStatus::StaleElementReference => return Error::stale_element(target.to_string()),
            ErrorStatus::NoSuchElement => return Error::element_not_found(target.to_string()),
            ErrorStatus::JavascriptError => {
                return Error::script(format!("{}: {}", target, wd.message));
            }
            _ => {}
        }
    }
    Error::driver(format!("{}: {}", target, err))
}

/// A live browser session driven over WebDriver
#[derive(Clone)]
pub struct FantocciniDriver {
    client: Client,
}

impl FantocciniDriver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn wrap(&self, element: Element, locator: &Locator) -> Arc<dyn ElementHandle> {
        Arc::new(FantocciniElement {
            client: self.client.clone(),
            element,
            description: locator.to_string(),
        })
    }
}

#[async_trait]
impl WebDriver for FantocciniDriver {
    #[instrument(skip(self))]
    async fn navigate(&self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| map_cmd_error(e, url))
    }

    async fn find(&self, locator: &Locator) -> Result<Option<Arc<dyn ElementHandle>>> {
        let query = Query::from_locator(locator);
        match self.client.find(query.as_wd()).await {
            Ok(element) => Ok(Some(self.wrap(element, locator))),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(map_cmd_error(e, &locator.to_string())),
        }
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Arc<dyn ElementHandle>>> {
        let query = Query::from_locator(locator);
        let elements = self
            .client
            .find_all(query.as_wd())
            .await
            .map_err(|e| map_cmd_error(e, &locator.to_string()))?;

        Ok(elements
            .into_iter()
            .map(|element| self.wrap(element, locator))
            .collect())
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .client
            .current_url()
            .await
            .map_err(|e| map_cmd_error(e, "current url"))?;
        Ok(url.to_string())
    }

    async fn title(&self) -> Result<String> {
        self.client
            .title()
            .await
            .map_err(|e| map_cmd_error(e, "title"))
    }

    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.client
            .execute(script, args)
            .await
            .map_err(|e| map_cmd_error(e, "script"))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client
            .screenshot()
            .await
            .map_err(|e| map_cmd_error(e, "screenshot"))
    }

    async fn quit(&self) -> Result<()> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| map_cmd_error(e, "quit"))
    }
}

/// Element handle backed by a WebDriver element reference
pub struct FantocciniElement {
    client: Client,
    element: Element,
    description: String,
}

impl FantocciniElement {
    async fn run_script(&self, script: &str, extra: Vec<Value>) -> Result<Value> {
        let mut args = vec![serde_json::to_value(&self.element)?];
        args.extend(extra);
        self.client
            .execute(script, args)
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }
}

#[async_trait]
impl ElementHandle for FantocciniElement {
    fn describe(&self) -> String {
        self.description.clone()
    }

    async fn click(&self) -> Result<()> {
        self.element
            .click()
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }

    async fn clear(&self) -> Result<()> {
        self.element
            .clear()
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.element
            .send_keys(text)
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }

    async fn text(&self) -> Result<String> {
        self.element
            .text()
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }

    async fn is_displayed(&self) -> Result<bool> {
        self.element
            .is_displayed()
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }

    async fn is_enabled(&self) -> Result<bool> {
        self.element
            .is_enabled()
            .await
            .map_err(|e| map_cmd_error(e, &self.description))
    }

    async fn script_click(&self) -> Result<()> {
        self.run_script(SCRIPT_CLICK, Vec::new()).await.map(|_| ())
    }

    async fn script_set_value(&self, value: &str) -> Result<()> {
        self.run_script(SCRIPT_SET_VALUE, vec![json!(value)])
            .await
            .map(|_| ())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        self.run_script(SCROLL_INTO_VIEW, Vec::new()).await.map(|_| ())
    }
}

/// Browser capabilities for `options`
pub fn build_capabilities(options: &BrowserOptions) -> Capabilities {
    let mut args = options.args.clone();
    let mut caps = Capabilities::new();

    let (browser_name, options_key) = match options.kind {
        BrowserKind::Chrome => ("chrome", "goog:chromeOptions"),
        BrowserKind::Edge => ("MicrosoftEdge", "ms:edgeOptions"),
        BrowserKind::Firefox => ("firefox", "moz:firefoxOptions"),
    };

    if options.headless {
        match options.kind {
            BrowserKind::Firefox => args.push("-headless".to_string()),
            BrowserKind::Chrome | BrowserKind::Edge => {
                args.push("--headless=new".to_string());
                args.push("--window-size=1920,1080".to_string());
            }
        }
    }

    caps.insert("browserName".to_string(), json!(browser_name));
    caps.insert(options_key.to_string(), json!({ "args": args }));
    caps
}

/// Acquires sessions from a running WebDriver server
#[derive(Debug, Clone)]
pub struct RemoteDriverFactory {
    endpoint: String,
    http: reqwest::Client,
}

impl RemoteDriverFactory {
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query `/status` so a missing driver fails fast with a clear message
    async fn check_ready(&self) -> Result<()> {
        let url = format!("{}/status", self.endpoint);
        let response = self.http.get(&url).send().await.map_err(|e| {
            Error::session_acquisition(format!(
                "No WebDriver server reachable at {} ({}). Start chromedriver, geckodriver or msedgedriver first.",
                self.endpoint, e
            ))
        })?;

        let status: Value = response
            .json()
            .await
            .map_err(|e| Error::session_acquisition(format!("Invalid status response: {}", e)))?;

        let ready = status
            .pointer("/value/ready")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if !ready {
            let message = status
                .pointer("/value/message")
                .and_then(Value::as_str)
                .unwrap_or("not ready");
            return Err(Error::session_acquisition(format!(
                "WebDriver at {} is not ready: {}",
                self.endpoint, message
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl DriverFactory for RemoteDriverFactory {
    #[instrument(skip(self, options), fields(endpoint = %self.endpoint, browser = ?options.kind))]
    async fn connect(&self, options: &BrowserOptions) -> Result<Arc<dyn WebDriver>> {
        self.check_ready().await?;

        let client = ClientBuilder::native()
            .capabilities(build_capabilities(options))
            .connect(&self.endpoint)
            .await
            .map_err(|e| {
                Error::session_acquisition(format!(
                    "Failed to start {:?} session at {}: {}",
                    options.kind, self.endpoint, e
                ))
            })?;

        client
            .update_timeouts(TimeoutConfiguration::new(
                None,
                Some(options.page_load_timeout),
                Some(options.implicit_wait),
            ))
            .await
            .map_err(|e| map_cmd_error(e, "timeouts"))?;

        if options.maximized && !options.headless {
            if let Err(e) = client.maximize_window().await {
                warn!("Could not maximize window: {}", e);
            }
        }

        info!("Browser session started");
        debug!("Implicit wait {:?}", options.implicit_wait);
        Ok(Arc::new(FantocciniDriver::new(client)))
    }
}
