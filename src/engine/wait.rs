//! Bounded polling
//!
//! Every wait in the suite goes through a [`WaitPolicy`]: probe, sleep for
//! the poll interval, probe again, give up once the timeout has elapsed. A
//! single probe is cut off at the remaining time (at least one poll interval)
//! and counts as a miss, so a hung driver call cannot outlive the wait. A
//! timeout is reported as [`WaitOutcome::TimedOut`] and callers decide
//! whether that is a failure.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::locator::{probe_element, Locator, Readiness};
use crate::driver::WebDriver;
use crate::Config;

/// Bound on the single probe of [`WaitPolicy::immediate`]
pub const IMMEDIATE_PROBE_LIMIT: Duration = Duration::from_secs(2);

/// Timeout and poll interval for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    timeout: Duration,
    poll_interval: Duration,
}

impl WaitPolicy {
    /// A zero poll interval is raised to one millisecond
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Policy for page-level conditions (redirects, error banners)
    pub fn explicit(config: &Config) -> Self {
        Self::new(config.explicit_wait(), config.poll_interval())
    }

    /// Policy for a single locator inside a fallback chain
    pub fn per_locator(config: &Config) -> Self {
        Self::new(config.locator_wait(), config.poll_interval())
    }

    /// Probe exactly once; the probe itself may take up to [`IMMEDIATE_PROBE_LIMIT`]
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, IMMEDIATE_PROBE_LIMIT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Poll `probe` until it returns true or the timeout elapses
    pub async fn until<F, Fut>(&self, mut probe: F) -> WaitOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let (found, elapsed, attempts) = self.poll(|| probe().map(|ok| ok.then_some(()))).await;
        match found {
            Some(()) => WaitOutcome::Satisfied { elapsed, attempts },
            None => WaitOutcome::TimedOut { elapsed, attempts },
        }
    }

    /// Poll `probe` until it yields a value or the timeout elapses
    pub async fn until_some<T, F, Fut>(&self, probe: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        self.poll(probe).await.0
    }

    /// Poll a [`WaitCondition`] against `driver`
    pub async fn await_condition(&self, driver: &dyn WebDriver, condition: &WaitCondition) -> WaitOutcome {
        let outcome = self.until(|| condition.evaluate(driver)).await;
        trace!("{} -> {:?}", condition, outcome);
        outcome
    }

    async fn poll<T, F, Fut>(&self, mut probe: F) -> (Option<T>, Duration, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let start = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let limit = self.timeout.saturating_sub(start.elapsed()).max(self.poll_interval);
            match tokio::time::timeout(limit, probe()).await {
                Ok(Some(value)) => return (Some(value), start.elapsed(), attempts),
                Ok(None) => {}
                Err(_) => debug!("Probe {} cut off after {:?}", attempts, limit),
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return (None, elapsed, attempts);
            }

            let remaining = self.timeout - elapsed;
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

/// Result of a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Satisfied { elapsed: Duration, attempts: u32 },
    TimedOut { elapsed: Duration, attempts: u32 },
}

impl WaitOutcome {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, WaitOutcome::Satisfied { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            WaitOutcome::Satisfied { elapsed, .. } | WaitOutcome::TimedOut { elapsed, .. } => *elapsed,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitOutcome::Satisfied { attempts, .. } | WaitOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }
}

/// Page condition evaluated by [`WaitPolicy::await_condition`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    ElementPresent(Locator),
    ElementVisible(Locator),
    ElementClickable(Locator),
    /// Current URL contains the fragment
    UrlContains(String),
    /// Current URL does not contain the fragment
    UrlLacks(String),
    /// Script result is truthy
    Script(String),
    Any(Vec<WaitCondition>),
    All(Vec<WaitCondition>),
}

impl WaitCondition {
    pub fn url_contains<S: Into<String>>(fragment: S) -> Self {
        WaitCondition::UrlContains(fragment.into())
    }

    pub fn url_lacks<S: Into<String>>(fragment: S) -> Self {
        WaitCondition::UrlLacks(fragment.into())
    }

    /// Single evaluation; driver failures evaluate to false
    pub fn evaluate<'a>(&'a self, driver: &'a dyn WebDriver) -> BoxFuture<'a, bool> {
        async move {
            match self {
                WaitCondition::ElementPresent(locator) => {
                    probe_element(driver, locator, Readiness::Present).await.is_some()
                }
                WaitCondition::ElementVisible(locator) => {
                    probe_element(driver, locator, Readiness::Visible).await.is_some()
                }
                WaitCondition::ElementClickable(locator) => {
                    probe_element(driver, locator, Readiness::Clickable).await.is_some()
                }
                WaitCondition::UrlContains(fragment) => driver
                    .current_url()
                    .await
                    .map(|url| url.contains(fragment.as_str()))
                    .unwrap_or(false),
                WaitCondition::UrlLacks(fragment) => driver
                    .current_url()
                    .await
                    .map(|url| !url.contains(fragment.as_str()))
                    .unwrap_or(false),
                WaitCondition::Script(script) => driver
                    .execute_script(script, Vec::new())
                    .await
                    .map(|value| is_truthy(&value))
                    .unwrap_or(false),
                WaitCondition::Any(conditions) => {
                    for condition in conditions {
                        if condition.evaluate(driver).await {
                            return true;
                        }
                    }
                    false
                }
                WaitCondition::All(conditions) => {
                    for condition in conditions {
                        if !condition.evaluate(driver).await {
                            return false;
                        }
                    }
                    true
                }
            }
        }
        .boxed()
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::ElementPresent(locator) => write!(f, "present({})", locator),
            WaitCondition::ElementVisible(locator) => write!(f, "visible({})", locator),
            WaitCondition::ElementClickable(locator) => write!(f, "clickable({})", locator),
            WaitCondition::UrlContains(fragment) => write!(f, "url contains '{}'", fragment),
            WaitCondition::UrlLacks(fragment) => write!(f, "url lacks '{}'", fragment),
            WaitCondition::Script(_) => write!(f, "script"),
            WaitCondition::Any(conditions) => write_joined(f, "any", conditions),
            WaitCondition::All(conditions) => write_joined(f, "all", conditions),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, name: &str, conditions: &[WaitCondition]) -> fmt::Result {
    write!(f, "{}(", name)?;
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", condition)?;
    }
    write!(f, ")")
}

/// JavaScript truthiness of a script result
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
