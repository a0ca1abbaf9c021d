//! Resilient element interactions
//!
//! Actions resolve their target through a [`LocatorChain`] and fall back to
//! scripted interaction when the driver rejects the native one. Only actions
//! that must touch an element report [`Error::ElementNotFound`]; the probes
//! (`is_visible`, `is_present`, `read_text`) answer with a default instead.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::locator::{Locator, LocatorChain, LocatorResolver, Readiness, Resolution};
use super::wait::{WaitCondition, WaitOutcome, WaitPolicy};
use crate::driver::{ElementHandle, WebDriver};
use crate::{Config, Error, Result};

/// Element actions bound to one browser session
#[derive(Clone)]
pub struct ElementActions {
    driver: Arc<dyn WebDriver>,
    resolver: LocatorResolver,
    explicit: WaitPolicy,
}

impl ElementActions {
    /// `per_locator` bounds each chain entry, `explicit` bounds page-level waits
    pub fn new(driver: Arc<dyn WebDriver>, per_locator: WaitPolicy, explicit: WaitPolicy) -> Self {
        Self {
            resolver: LocatorResolver::new(driver.clone(), per_locator),
            driver,
            explicit,
        }
    }

    pub fn from_config(driver: Arc<dyn WebDriver>, config: &Config) -> Self {
        Self::new(driver, WaitPolicy::per_locator(config), WaitPolicy::explicit(config))
    }

    pub fn driver(&self) -> &Arc<dyn WebDriver> {
        &self.driver
    }

    pub fn resolver(&self) -> &LocatorResolver {
        &self.resolver
    }

    pub fn explicit_policy(&self) -> WaitPolicy {
        self.explicit
    }

    #[instrument(skip(self))]
    pub async fn navigate(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.driver.navigate(url).await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.driver.current_url().await
    }

    pub async fn page_title(&self) -> Result<String> {
        self.driver.title().await
    }

    /// Replace the element's value with `text`
    ///
    /// An empty `text` only clears the field. When the driver rejects native
    /// typing the value is assigned through script instead.
    #[instrument(skip(self, chain, text), fields(chain = %chain))]
    pub async fn enter_text(&self, chain: &LocatorChain, text: &str) -> Result<()> {
        let element = self.require(chain, Readiness::Present).await?;

        match type_natively(element.as_ref(), text).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_interaction_rejection() => {
                warn!("Native typing into {} rejected ({}), assigning value by script", chain, e);
                element.script_set_value(text).await.map_err(|script_err| {
                    Error::interaction_rejected(
                        chain.to_string(),
                        format!("native: {}; scripted: {}", e, script_err),
                    )
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Click the first clickable element of the chain
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn click(&self, chain: &LocatorChain) -> Result<()> {
        let element = self.require(chain, Readiness::Clickable).await?;
        click_element(element.as_ref(), &chain.to_string()).await
    }

    /// Click when the chain resolves; `Ok(false)` when nothing matched
    #[instrument(skip(self, chain), fields(chain = %chain))]
    pub async fn click_if_present(&self, chain: &LocatorChain) -> Result<bool> {
        match self.resolver.resolve(chain, Readiness::Clickable).await {
            Resolution::Found(resolved) => {
                click_element(resolved.element.as_ref(), &resolved.locator.to_string()).await?;
                Ok(true)
            }
            Resolution::NotFound => Ok(false),
        }
    }

    /// Click the first element under `scope` whose text contains any word of
    /// `vocabulary`; `Ok(false)` when none does
    #[instrument(skip(self, vocabulary))]
    pub async fn click_by_text(&self, scope: &Locator, vocabulary: &[&str]) -> Result<bool> {
        match self.resolver.resolve_by_text(scope, vocabulary).await {
            Resolution::Found(resolved) => {
                let target = resolved.element.describe();
                click_element(resolved.element.as_ref(), &target).await?;
                Ok(true)
            }
            Resolution::NotFound => Ok(false),
        }
    }

    /// Whether any locator of the chain is displayed right now
    pub async fn is_visible(&self, chain: &LocatorChain) -> bool {
        self.resolver.resolve_now(chain, Readiness::Visible).await.is_found()
    }

    /// Whether any locator of the chain becomes visible within the explicit wait
    pub async fn is_present(&self, chain: &LocatorChain) -> bool {
        self.is_present_within(chain, self.explicit).await
    }

    pub async fn is_present_within(&self, chain: &LocatorChain, policy: WaitPolicy) -> bool {
        self.resolver
            .await_any(chain, Readiness::Visible, policy)
            .await
            .is_found()
    }

    /// Text of the first present element, empty when none resolves
    pub async fn read_text(&self, chain: &LocatorChain) -> String {
        let resolved = match self.resolver.resolve_now(chain, Readiness::Present).await {
            Resolution::Found(resolved) => resolved,
            Resolution::NotFound => return String::new(),
        };

        match resolved.element.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!("Reading text of {} failed: {}", resolved.locator, e);
                String::new()
            }
        }
    }

    /// Scroll the first present element of the chain into view
    pub async fn scroll_into_view(&self, chain: &LocatorChain) -> Result<()> {
        let element = self.require(chain, Readiness::Present).await?;
        element.scroll_into_view().await
    }

    /// Wait under the explicit policy for the URL to contain `fragment`
    pub async fn wait_for_url_contains(&self, fragment: &str) -> WaitOutcome {
        self.wait_for(&WaitCondition::url_contains(fragment)).await
    }

    /// Wait under the explicit policy
    pub async fn wait_for(&self, condition: &WaitCondition) -> WaitOutcome {
        self.wait_for_with(condition, self.explicit).await
    }

    pub async fn wait_for_with(&self, condition: &WaitCondition, policy: WaitPolicy) -> WaitOutcome {
        let outcome = policy.await_condition(self.driver.as_ref(), condition).await;
        if !outcome.is_satisfied() {
            debug!("Condition {} not met after {:?}", condition, outcome.elapsed());
        }
        outcome
    }

    async fn require(&self, chain: &LocatorChain, readiness: Readiness) -> Result<Arc<dyn ElementHandle>> {
        match self.resolver.resolve(chain, readiness).await {
            Resolution::Found(resolved) => Ok(resolved.element),
            Resolution::NotFound => Err(Error::element_not_found(chain.to_string())),
        }
    }
}

impl std::fmt::Debug for ElementActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementActions")
            .field("per_locator", &self.resolver.policy())
            .field("explicit", &self.explicit)
            .finish()
    }
}

async fn type_natively(element: &dyn ElementHandle, text: &str) -> Result<()> {
    element.clear().await?;
    if !text.is_empty() {
        element.send_keys(text).await?;
    }
    Ok(())
}

async fn click_element(element: &dyn ElementHandle, target: &str) -> Result<()> {
    match element.click().await {
        Ok(()) => Ok(()),
        Err(e) if e.is_interaction_rejection() => {
            warn!("Native click on {} rejected ({}), clicking by script", target, e);
            element
                .script_click()
                .await
                .map_err(|script_err| {
                    Error::interaction_rejected(target, format!("native: {}; scripted: {}", e, script_err))
                })
        }
        Err(e) => Err(e),
    }
}
