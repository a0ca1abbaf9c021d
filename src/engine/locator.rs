//! Locators, fallback chains and the chain resolver
//!
//! A [`LocatorChain`] lists selection strategies in priority order. The
//! [`LocatorResolver`] walks the chain front to back and returns the first
//! element that satisfies the requested [`Readiness`]; a chain in which every
//! locator fails yields [`Resolution::NotFound`], never an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::wait::WaitPolicy;
use crate::driver::{ElementHandle, WebDriver};
use crate::{Error, Result};

/// Element selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Case-insensitive text content match
    Text,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::Text => "text",
        }
    }
}

/// A strategy plus selector identifying a UI element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    by: Strategy,
    selector: String,
}

impl Locator {
    pub fn new<S: Into<String>>(by: Strategy, selector: S) -> Self {
        Self {
            by,
            selector: selector.into(),
        }
    }

    pub fn id<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::Id, selector)
    }

    pub fn name<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::Name, selector)
    }

    pub fn css<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::Css, selector)
    }

    pub fn xpath<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::XPath, selector)
    }

    pub fn text<S: Into<String>>(selector: S) -> Self {
        Self::new(Strategy::Text, selector)
    }

    pub fn strategy(&self) -> Strategy {
        self.by
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by.as_str(), self.selector)
    }
}

/// Ordered, non-empty list of locators; priority is position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Locator>", into = "Vec<Locator>")]
pub struct LocatorChain {
    label: Option<String>,
    locators: Vec<Locator>,
}

impl LocatorChain {
    /// Chain with a single locator
    pub fn new(first: Locator) -> Self {
        Self {
            label: None,
            locators: vec![first],
        }
    }

    /// Append a lower-priority fallback
    pub fn or(mut self, next: Locator) -> Self {
        self.locators.push(next);
        self
    }

    /// Attach a human-readable name used in logs and assertion messages
    pub fn labeled<S: Into<String>>(mut self, label: S) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Highest-priority locator
    pub fn primary(&self) -> &Locator {
        &self.locators[0]
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.locators.iter()
    }

    /// Number of locators; always at least one
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Always false; present for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl TryFrom<Vec<Locator>> for LocatorChain {
    type Error = Error;

    fn try_from(locators: Vec<Locator>) -> Result<Self> {
        if locators.is_empty() {
            return Err(Error::configuration(
                "a locator chain must contain at least one locator",
            ));
        }
        Ok(Self {
            label: None,
            locators,
        })
    }
}

impl From<LocatorChain> for Vec<Locator> {
    fn from(chain: LocatorChain) -> Self {
        chain.locators
    }
}

impl From<Locator> for LocatorChain {
    fn from(locator: Locator) -> Self {
        LocatorChain::new(locator)
    }
}

impl<'a> IntoIterator for &'a LocatorChain {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}

impl fmt::Display for LocatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{} ", label)?;
        }
        write!(f, "[")?;
        for (i, locator) in self.locators.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", locator)?;
        }
        write!(f, "]")
    }
}

/// State an element must reach before a locator counts as resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Attached to the document
    Present,
    /// Present and displayed
    Visible,
    /// Displayed and enabled
    Clickable,
}

/// An element resolved from a chain
#[derive(Clone)]
pub struct ResolvedElement {
    pub element: Arc<dyn ElementHandle>,
    /// The locator that matched
    pub locator: Locator,
    /// Its position in the chain
    pub position: usize,
}

impl fmt::Debug for ResolvedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedElement")
            .field("element", &self.element.describe())
            .field("locator", &self.locator)
            .field("position", &self.position)
            .finish()
    }
}

/// Outcome of resolving a chain
#[derive(Debug, Clone)]
pub enum Resolution {
    Found(ResolvedElement),
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn found(self) -> Option<ResolvedElement> {
        match self {
            Resolution::Found(resolved) => Some(resolved),
            Resolution::NotFound => None,
        }
    }

    /// The winning locator, if any
    pub fn locator(&self) -> Option<&Locator> {
        match self {
            Resolution::Found(resolved) => Some(&resolved.locator),
            Resolution::NotFound => None,
        }
    }
}

/// Single lookup of `locator` checked against `readiness`
///
/// Driver failures count as "not ready" so callers can keep polling.
pub async fn probe_element(
    driver: &dyn WebDriver,
    locator: &Locator,
    readiness: Readiness,
) -> Option<Arc<dyn ElementHandle>> {
    let element = match driver.find(locator).await {
        Ok(Some(element)) => element,
        Ok(None) => return None,
        Err(e) => {
            debug!("Lookup of {} failed: {}", locator, e);
            return None;
        }
    };

    let ready = match readiness {
        Readiness::Present => Ok(true),
        Readiness::Visible => element.is_displayed().await,
        Readiness::Clickable => match element.is_displayed().await {
            Ok(true) => element.is_enabled().await,
            other => other,
        },
    };

    match ready {
        Ok(true) => Some(element),
        Ok(false) => None,
        Err(e) => {
            debug!("Readiness check on {} failed: {}", locator, e);
            None
        }
    }
}

/// Resolves chains against a driver
#[derive(Clone)]
pub struct LocatorResolver {
    driver: Arc<dyn WebDriver>,
    policy: WaitPolicy,
}

impl LocatorResolver {
    /// `policy` bounds the wait spent on each individual locator
    pub fn new(driver: Arc<dyn WebDriver>, policy: WaitPolicy) -> Self {
        Self { driver, policy }
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    /// Same driver with a different per-locator policy
    pub fn with_policy(&self, policy: WaitPolicy) -> Self {
        Self {
            driver: self.driver.clone(),
            policy,
        }
    }

    /// Walk the chain in order, giving each locator the per-locator wait
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn resolve(&self, chain: &LocatorChain, readiness: Readiness) -> Resolution {
        let driver = self.driver.as_ref();

        for (position, locator) in chain.iter().enumerate() {
            let found = self
                .policy
                .until_some(|| probe_element(driver, locator, readiness))
                .await;

            if let Some(element) = found {
                debug!("Resolved {} at position {}", locator, position);
                return Resolution::Found(ResolvedElement {
                    element,
                    locator: locator.clone(),
                    position,
                });
            }

            debug!("{} did not resolve within {:?}", locator, self.policy.timeout());
        }

        Resolution::NotFound
    }

    /// Check every locator once, in order, without waiting
    pub async fn resolve_now(&self, chain: &LocatorChain, readiness: Readiness) -> Resolution {
        Self::scan(self.driver.as_ref(), chain, readiness).await
    }

    /// Poll the whole chain under `policy`; each poll returns the first
    /// locator in chain order that is ready
    #[instrument(skip(self, chain, policy), fields(chain = %chain))]
    pub async fn await_any(
        &self,
        chain: &LocatorChain,
        readiness: Readiness,
        policy: WaitPolicy,
    ) -> Resolution {
        let driver = self.driver.as_ref();
        policy
            .until_some(|| async move { Self::scan(driver, chain, readiness).await.found() })
            .await
            .map(Resolution::Found)
            .unwrap_or(Resolution::NotFound)
    }

    async fn scan(driver: &dyn WebDriver, chain: &LocatorChain, readiness: Readiness) -> Resolution {
        for (position, locator) in chain.iter().enumerate() {
            if let Some(element) = probe_element(driver, locator, readiness).await {
                return Resolution::Found(ResolvedElement {
                    element,
                    locator: locator.clone(),
                    position,
                });
            }
        }
        Resolution::NotFound
    }

    /// Text-content fallback
    ///
    /// Lists every element matching `scope` and returns the first whose
    /// lowercase text contains any word of `vocabulary`.
    #[instrument(skip(self, vocabulary))]
    pub async fn resolve_by_text(&self, scope: &Locator, vocabulary: &[&str]) -> Resolution {
        let driver = self.driver.as_ref();
        let words: Vec<String> = vocabulary.iter().map(|w| w.to_lowercase()).collect();
        let words = &words;

        self.policy
            .until_some(|| async move {
                let candidates = match driver.find_all(scope).await {
                    Ok(candidates) => candidates,
                    Err(e) => {
                        debug!("Listing {} failed: {}", scope, e);
                        return None;
                    }
                };

                for (position, element) in candidates.into_iter().enumerate() {
                    let text = match element.text().await {
                        Ok(text) => text.to_lowercase(),
                        Err(_) => continue,
                    };
                    if words.iter().any(|word| text.contains(word.as_str())) {
                        debug!("Text fallback matched '{}' at position {}", text.trim(), position);
                        return Some(ResolvedElement {
                            element,
                            locator: scope.clone(),
                            position,
                        });
                    }
                }
                None
            })
            .await
            .map(Resolution::Found)
            .unwrap_or(Resolution::NotFound)
    }
}
