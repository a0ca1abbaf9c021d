//! Scenario-scoped browser session

use chrono::Local;
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::driver::{BrowserOptions, DriverFactory, WebDriver};
use crate::engine::ElementActions;
use crate::{Config, Error, Result};

/// Lifecycle state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Active,
    TornDown,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Uninitialized => f.write_str("uninitialized"),
            SessionState::Active => f.write_str("active"),
            SessionState::TornDown => f.write_str("torn down"),
        }
    }
}

/// What teardown managed to do
///
/// Failures are collected here instead of being returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// False when teardown had already run
    pub performed: bool,
    pub screenshot: Option<PathBuf>,
    pub driver_released: bool,
    pub errors: Vec<String>,
}

impl TeardownReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The exclusive browser of one scenario
pub struct Session {
    id: Uuid,
    tag: String,
    state: SessionState,
    config: Arc<Config>,
    driver: Option<Arc<dyn WebDriver>>,
    started_at: Option<Instant>,
}

impl Session {
    /// `tag` names the scenario in logs and screenshot files
    pub fn new<S: Into<String>>(tag: S, config: Arc<Config>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: tag.into(),
            state: SessionState::Uninitialized,
            config,
            driver: None,
            started_at: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Rename the session, e.g. once the scenario name is known
    pub fn set_tag<S: Into<String>>(&mut self, tag: S) {
        self.tag = tag.into();
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Acquire the browser
    ///
    /// Only valid from `Uninitialized`. Acquisition failures are returned
    /// as-is and leave the session uninitialized.
    #[instrument(skip(self, factory), fields(session = %self.id, tag = %self.tag))]
    pub async fn start(&mut self, factory: &dyn DriverFactory) -> Result<Arc<dyn WebDriver>> {
        if self.state != SessionState::Uninitialized {
            return Err(Error::session_state(format!(
                "cannot start session {} while {}",
                self.id, self.state
            )));
        }

        let options = BrowserOptions::from_config(&self.config);
        let driver = factory.connect(&options).await?;

        self.driver = Some(driver.clone());
        self.state = SessionState::Active;
        self.started_at = Some(Instant::now());
        info!("Session started");
        Ok(driver)
    }

    /// The live driver
    pub fn driver(&self) -> Result<Arc<dyn WebDriver>> {
        match (&self.state, &self.driver) {
            (SessionState::Active, Some(driver)) => Ok(driver.clone()),
            _ => Err(Error::session_state(format!(
                "session {} is {}, no browser available",
                self.id, self.state
            ))),
        }
    }

    /// Element actions bound to the live driver
    pub fn actions(&self) -> Result<ElementActions> {
        Ok(ElementActions::from_config(self.driver()?, &self.config))
    }

    /// Capture a screenshot, then release the browser
    ///
    /// Runs at most once; later calls return a report with `performed` unset.
    /// Never fails and never panics.
    #[instrument(skip(self), fields(session = %self.id, tag = %self.tag))]
    pub async fn teardown(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();

        match self.state {
            SessionState::TornDown => {
                debug!("Teardown already performed");
                return report;
            }
            SessionState::Uninitialized => {
                self.state = SessionState::TornDown;
                report.performed = true;
                return report;
            }
            SessionState::Active => {}
        }

        self.state = SessionState::TornDown;
        report.performed = true;

        let Some(driver) = self.driver.take() else {
            return report;
        };

        match self.capture_screenshot(driver.as_ref()).await {
            Ok(path) => {
                info!("Screenshot saved to {}", path.display());
                report.screenshot = Some(path);
            }
            Err(e) => {
                warn!("Screenshot capture failed: {}", e);
                report.errors.push(format!("screenshot: {}", e));
            }
        }

        match driver.quit().await {
            Ok(()) => report.driver_released = true,
            Err(e) => {
                warn!("Driver quit failed: {}", e);
                report.errors.push(format!("quit: {}", e));
            }
        }

        if let Some(started) = self.started_at {
            info!("Session closed after {:?}", started.elapsed());
        }
        report
    }

    /// Start, run `body`, and tear down on every exit path
    ///
    /// A panic inside `body` is caught long enough to tear down, then resumed.
    pub async fn run<F, Fut, T>(&mut self, factory: &dyn DriverFactory, body: F) -> (Result<T>, TeardownReport)
    where
        F: FnOnce(ElementActions) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let actions = match self.start(factory).await.and_then(|_| self.actions()) {
            Ok(actions) => actions,
            Err(e) => {
                let report = self.teardown().await;
                return (Err(e), report);
            }
        };

        let outcome = AssertUnwindSafe(body(actions)).catch_unwind().await;
        let report = self.teardown().await;

        match outcome {
            Ok(result) => (result, report),
            Err(panic) => {
                error!("Scenario body panicked, teardown completed before resuming");
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn capture_screenshot(&self, driver: &dyn WebDriver) -> Result<PathBuf> {
        let png = driver.screenshot().await?;
        let dir = &self.config.screenshot_dir;
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(screenshot_file_name(&self.tag));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("tag", &self.tag)
            .field("state", &self.state)
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.state == SessionState::Active {
            warn!("Session {} dropped without teardown", self.id);
        }
    }
}

/// `<tag>_<timestamp>.png` with the tag reduced to filename-safe characters
pub fn screenshot_file_name(tag: &str) -> String {
    let safe: String = tag
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let safe = if safe.is_empty() { "scenario".to_string() } else { safe };
    format!("{}_{}.png", safe, Local::now().format("%Y%m%d_%H%M%S_%3f"))
}
