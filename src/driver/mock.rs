//! In-memory browser for testing
//!
//! [`MockDriver`] keeps a tiny document model: a URL, a title and a flat list
//! of [`MockNode`]s. Nodes react to clicks through closures, so a test can
//! script a whole application (see [`crate::simulated`]) without a browser.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::scripts::{DOCUMENT_READY, HAS_INVALID_FIELD};
use super::traits::{BrowserOptions, DriverFactory, ElementHandle, WebDriver};
use crate::engine::{Locator, Strategy};
use crate::{Error, Result};

/// Callback run when a node is clicked
pub type ClickReaction = Arc<dyn Fn(&mut MockDom) + Send + Sync>;

/// One element of the mock document
#[derive(Clone)]
pub struct MockNode {
    key: String,
    tag: String,
    id: Option<String>,
    name: Option<String>,
    text: String,
    value: String,
    aliases: Vec<Locator>,
    displayed: bool,
    enabled: bool,
    interactable: bool,
    required: bool,
    reveal_after: u32,
    on_click: Option<ClickReaction>,
}

impl MockNode {
    /// `key` identifies the node in the journal and in [`MockDom`] lookups
    pub fn new<K: Into<String>, T: Into<String>>(key: K, tag: T) -> Self {
        Self {
            key: key.into(),
            tag: tag.into(),
            id: None,
            name: None,
            text: String::new(),
            value: String::new(),
            aliases: Vec::new(),
            displayed: true,
            enabled: true,
            interactable: true,
            required: false,
            reveal_after: 0,
            on_click: None,
        }
    }

    pub fn id<S: Into<String>>(mut self, id: S) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    pub fn value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = value.into();
        self
    }

    /// CSS or XPath locator this node answers to
    pub fn matches(mut self, locator: Locator) -> Self {
        self.aliases.push(locator);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Native clicks and typing fail with "not interactable"
    pub fn rejecting_native(mut self) -> Self {
        self.interactable = false;
        self
    }

    /// Counts as `:invalid` while its value is empty
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Stay absent for the first `lookups` lookups that match it
    pub fn revealed_after(mut self, lookups: u32) -> Self {
        self.reveal_after = lookups;
        self
    }

    pub fn on_click<F>(mut self, reaction: F) -> Self
    where
        F: Fn(&mut MockDom) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(reaction));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn answers_to(&self, locator: &Locator) -> bool {
        let selector = locator.selector();
        match locator.strategy() {
            Strategy::Id => self.id.as_deref() == Some(selector),
            Strategy::Name => self.name.as_deref() == Some(selector),
            Strategy::Css => {
                self.aliases.contains(locator)
                    || selector
                        .split(',')
                        .any(|part| part.trim().eq_ignore_ascii_case(&self.tag))
            }
            Strategy::XPath => self.aliases.contains(locator),
            Strategy::Text => self.text.to_lowercase().contains(&selector.to_lowercase()),
        }
    }
}

impl fmt::Debug for MockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockNode")
            .field("key", &self.key)
            .field("tag", &self.tag)
            .field("text", &self.text)
            .field("value", &self.value)
            .field("displayed", &self.displayed)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// A page the mock can load by path
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub title: String,
    pub nodes: Vec<MockNode>,
}

impl MockPage {
    pub fn new<S: Into<String>>(title: S) -> Self {
        Self {
            title: title.into(),
            nodes: Vec::new(),
        }
    }

    pub fn with(mut self, node: MockNode) -> Self {
        self.nodes.push(node);
        self
    }
}

/// Mutable document state shared by a driver and its element handles
#[derive(Debug, Default)]
pub struct MockDom {
    origin: String,
    url: String,
    title: String,
    nodes: Vec<MockNode>,
    routes: HashMap<String, MockPage>,
    scripts: HashMap<String, Value>,
    lookups: HashMap<String, u32>,
    journal: Vec<String>,
    screenshots: u32,
    screenshot_failure: Option<String>,
    closed: bool,
}

impl MockDom {
    fn new<S: Into<String>>(origin: S) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
            url: "about:blank".to_string(),
            ..Default::default()
        }
    }

    /// Load the page routed at `path`, or an empty page if none is routed
    pub fn visit(&mut self, path: &str) {
        let page = self.routes.get(path).cloned().unwrap_or_else(|| MockPage::new("Not Found"));
        self.url = format!("{}{}", self.origin, path);
        self.title = page.title;
        self.nodes = page.nodes;
        self.lookups.clear();
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn node(&self, key: &str) -> Option<&MockNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn node_mut(&mut self, key: &str) -> Option<&mut MockNode> {
        self.nodes.iter_mut().find(|n| n.key == key)
    }

    /// Current value of an input, empty when the node is missing
    pub fn value_of(&self, key: &str) -> String {
        self.node(key).map(|n| n.value.clone()).unwrap_or_default()
    }

    pub fn insert(&mut self, node: MockNode) {
        self.nodes.push(node);
    }

    pub fn remove(&mut self, key: &str) {
        self.nodes.retain(|n| n.key != key);
    }

    pub fn show(&mut self, key: &str) {
        if let Some(node) = self.node_mut(key) {
            node.displayed = true;
        }
    }

    pub fn set_text(&mut self, key: &str, text: &str) {
        if let Some(node) = self.node_mut(key) {
            node.text = text.to_string();
        }
    }

    pub fn record<S: Into<String>>(&mut self, entry: S) {
        self.journal.push(entry.into());
    }

    fn path_of(&self, url: &str) -> String {
        match url::Url::parse(url) {
            Ok(parsed) => parsed.path().to_string(),
            Err(_) => url.strip_prefix(&self.origin).unwrap_or(url).to_string(),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::driver("session closed"));
        }
        Ok(())
    }

    fn lookup(&mut self, locator: &Locator) -> Vec<(String, String)> {
        let mut matched = Vec::new();
        for node in &self.nodes {
            if !node.answers_to(locator) {
                continue;
            }
            let seen = self.lookups.entry(node.key.clone()).or_insert(0);
            *seen += 1;
            if *seen > node.reveal_after {
                matched.push((node.key.clone(), node.tag.clone()));
            }
        }
        matched
    }

    fn has_invalid_field(&self) -> bool {
        self.nodes.iter().any(|n| n.required && n.value.is_empty())
    }

    fn react(&mut self, key: &str) {
        let reaction = self.node(key).and_then(|n| n.on_click.clone());
        if let Some(reaction) = reaction {
            reaction(self);
        }
    }
}

/// In-memory [`WebDriver`]
#[derive(Clone)]
pub struct MockDriver {
    dom: Arc<RwLock<MockDom>>,
}

impl MockDriver {
    /// Driver serving pages below `origin`
    pub fn new<S: Into<String>>(origin: S) -> Self {
        Self {
            dom: Arc::new(RwLock::new(MockDom::new(origin))),
        }
    }

    /// Driver serving each `(path, page)` of `routes`
    pub fn with_routes<S, I>(origin: S, routes: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (String, MockPage)>,
    {
        let mut dom = MockDom::new(origin);
        dom.routes.extend(routes);
        Self {
            dom: Arc::new(RwLock::new(dom)),
        }
    }

    /// Serve `page` at `path`
    pub async fn route<S: Into<String>>(&self, path: S, page: MockPage) {
        self.dom.write().await.routes.insert(path.into(), page);
    }

    /// Canned result for a script not handled by the mock itself
    pub async fn script_result<S: Into<String>>(&self, script: S, result: Value) {
        self.dom.write().await.scripts.insert(script.into(), result);
    }

    /// Make every further screenshot fail with `reason`
    pub async fn fail_screenshots<S: Into<String>>(&self, reason: S) {
        self.dom.write().await.screenshot_failure = Some(reason.into());
    }

    /// Run `f` against the document
    pub async fn with_dom<R>(&self, f: impl FnOnce(&mut MockDom) -> R) -> R {
        let mut dom = self.dom.write().await;
        f(&mut dom)
    }

    pub async fn journal(&self) -> Vec<String> {
        self.dom.read().await.journal.clone()
    }

    pub async fn screenshots_taken(&self) -> u32 {
        self.dom.read().await.screenshots
    }

    pub async fn is_closed(&self) -> bool {
        self.dom.read().await.closed
    }

    fn handle(&self, key: String, tag: String) -> Arc<dyn ElementHandle> {
        Arc::new(MockElement {
            dom: self.dom.clone(),
            key,
            tag,
        })
    }
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriver").finish_non_exhaustive()
    }
}

#[async_trait]
impl WebDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<()> {
        let mut dom = self.dom.write().await;
        dom.ensure_open()?;
        let path = dom.path_of(url);
        dom.record(format!("navigate:{}", path));
        dom.visit(&path);
        Ok(())
    }

    async fn find(&self, locator: &Locator) -> Result<Option<Arc<dyn ElementHandle>>> {
        let mut dom = self.dom.write().await;
        dom.ensure_open()?;
        Ok(dom
            .lookup(locator)
            .into_iter()
            .next()
            .map(|(key, tag)| self.handle(key, tag)))
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Arc<dyn ElementHandle>>> {
        let mut dom = self.dom.write().await;
        dom.ensure_open()?;
        Ok(dom
            .lookup(locator)
            .into_iter()
            .map(|(key, tag)| self.handle(key, tag))
            .collect())
    }

    async fn current_url(&self) -> Result<String> {
        let dom = self.dom.read().await;
        dom.ensure_open()?;
        Ok(dom.url.clone())
    }

    async fn title(&self) -> Result<String> {
        let dom = self.dom.read().await;
        dom.ensure_open()?;
        Ok(dom.title.clone())
    }

    async fn execute_script(&self, script: &str, _args: Vec<Value>) -> Result<Value> {
        let dom = self.dom.read().await;
        dom.ensure_open()?;
        Ok(match script {
            DOCUMENT_READY => Value::Bool(true),
            HAS_INVALID_FIELD => Value::Bool(dom.has_invalid_field()),
            other => dom.scripts.get(other).cloned().unwrap_or(Value::Null),
        })
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let mut dom = self.dom.write().await;
        dom.ensure_open()?;
        if let Some(reason) = &dom.screenshot_failure {
            return Err(Error::driver(format!("screenshot failed: {}", reason)));
        }
        dom.screenshots += 1;
        dom.record("screenshot");
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }

    async fn quit(&self) -> Result<()> {
        let mut dom = self.dom.write().await;
        dom.ensure_open()?;
        dom.closed = true;
        dom.record("quit");
        Ok(())
    }
}

/// Handle to a [`MockNode`], looked up by key on every call
pub struct MockElement {
    dom: Arc<RwLock<MockDom>>,
    key: String,
    tag: String,
}

impl MockElement {
    fn check<'a>(&self, dom: &'a MockDom) -> Result<&'a MockNode> {
        dom.ensure_open()?;
        dom.node(&self.key)
            .ok_or_else(|| Error::stale_element(self.describe()))
    }

    fn check_native(&self, dom: &MockDom) -> Result<()> {
        let node = self.check(dom)?;
        if !node.displayed || !node.interactable {
            return Err(Error::not_interactable(self.describe()));
        }
        Ok(())
    }
}

#[async_trait]
impl ElementHandle for MockElement {
    fn describe(&self) -> String {
        format!("<{} key={}>", self.tag, self.key)
    }

    async fn click(&self) -> Result<()> {
        let mut dom = self.dom.write().await;
        self.check_native(&dom)?;
        let enabled = self.check(&dom)?.enabled;
        dom.record(format!("click:{}", self.key));
        if enabled {
            dom.react(&self.key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut dom = self.dom.write().await;
        self.check_native(&dom)?;
        dom.record(format!("clear:{}", self.key));
        if let Some(node) = dom.node_mut(&self.key) {
            node.value.clear();
        }
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        let mut dom = self.dom.write().await;
        self.check_native(&dom)?;
        dom.record(format!("type:{}:{}", self.key, text));
        if let Some(node) = dom.node_mut(&self.key) {
            node.value.push_str(text);
        }
        Ok(())
    }

    async fn text(&self) -> Result<String> {
        let dom = self.dom.read().await;
        let node = self.check(&dom)?;
        // Hidden elements render no text
        Ok(if node.displayed { node.text.clone() } else { String::new() })
    }

    async fn is_displayed(&self) -> Result<bool> {
        let dom = self.dom.read().await;
        Ok(self.check(&dom)?.displayed)
    }

    async fn is_enabled(&self) -> Result<bool> {
        let dom = self.dom.read().await;
        Ok(self.check(&dom)?.enabled)
    }

    async fn script_click(&self) -> Result<()> {
        let mut dom = self.dom.write().await;
        self.check(&dom)?;
        dom.record(format!("script_click:{}", self.key));
        dom.react(&self.key);
        Ok(())
    }

    async fn script_set_value(&self, value: &str) -> Result<()> {
        let mut dom = self.dom.write().await;
        self.check(&dom)?;
        dom.record(format!("script_set_value:{}:{}", self.key, value));
        if let Some(node) = dom.node_mut(&self.key) {
            node.value = value.to_string();
        }
        Ok(())
    }

    async fn scroll_into_view(&self) -> Result<()> {
        let mut dom = self.dom.write().await;
        self.check(&dom)?;
        dom.record(format!("scroll:{}", self.key));
        Ok(())
    }
}

type DriverBuilder = Arc<dyn Fn() -> MockDriver + Send + Sync>;

/// [`DriverFactory`] handing out mock drivers
pub struct MockDriverFactory {
    build: DriverBuilder,
    failure: Option<String>,
    connections: AtomicUsize,
    created: Mutex<Vec<MockDriver>>,
}

impl MockDriverFactory {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> MockDriver + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(build),
            failure: None,
            connections: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Factory whose every connection attempt fails
    pub fn failing<S: Into<String>>(reason: S) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new(|| MockDriver::new("http://localhost"))
        }
    }

    /// Number of connection attempts
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Drivers handed out so far
    pub async fn created(&self) -> Vec<MockDriver> {
        self.created.lock().await.clone()
    }
}

impl fmt::Debug for MockDriverFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockDriverFactory")
            .field("failure", &self.failure)
            .field("connections", &self.connections())
            .finish()
    }
}

#[async_trait]
impl DriverFactory for MockDriverFactory {
    async fn connect(&self, _options: &BrowserOptions) -> Result<Arc<dyn WebDriver>> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            return Err(Error::session_acquisition(reason.clone()));
        }

        let driver = (self.build)();
        self.created.lock().await.push(driver.clone());
        Ok(Arc::new(driver))
    }
}
