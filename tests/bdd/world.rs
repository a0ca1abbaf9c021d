//! Scenario state shared by the step definitions
//!
//! Each scenario gets a fresh [`YatrikWorld`] holding its own [`Session`] and
//! [`ScenarioContext`]. Only the config and the role catalog are shared, both
//! behind `Arc` and never mutated.

use std::fmt;
use std::sync::Arc;

use cucumber::World;
use tempfile::TempDir;
use tracing::{info, warn};
use yatrik_e2e::driver::{DriverFactory, RemoteDriverFactory};
use yatrik_e2e::engine::ElementActions;
use yatrik_e2e::flows::{BookingFlow, LoginFlow};
use yatrik_e2e::scenario::{BookingPage, LoginPage, RoleCatalog, ScenarioContext};
use yatrik_e2e::session::{Session, TeardownReport};
use yatrik_e2e::simulated::SimulatedErp;
use yatrik_e2e::Config;

/// Where scenario browsers come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverMode {
    /// In-memory copy of the front end
    Simulated,
    /// A WebDriver endpoint from the config
    Remote,
}

impl DriverMode {
    /// `YATRIK_DRIVER=webdriver` selects a real browser
    pub fn from_env() -> Self {
        match std::env::var("YATRIK_DRIVER").as_deref() {
            Ok("webdriver") => DriverMode::Remote,
            _ => DriverMode::Simulated,
        }
    }
}

#[derive(World)]
#[world(init = Self::new)]
pub struct YatrikWorld {
    pub config: Arc<Config>,
    pub catalog: Arc<RoleCatalog>,
    pub login_page: LoginPage,
    pub booking_page: BookingPage,
    pub ctx: ScenarioContext,
    pub session: Session,
    /// Teardown of a browser replaced by a second `open_browser`
    pub replaced: Option<TeardownReport>,
    scenario: String,
    mode: DriverMode,
    factory: Option<Box<dyn DriverFactory>>,
    _screenshots: Option<TempDir>,
}

impl YatrikWorld {
    fn new() -> Self {
        let mode = DriverMode::from_env();
        let (config, screenshots) = match mode {
            DriverMode::Remote => (Config::load().expect("load YATRIK configuration"), None),
            DriverMode::Simulated => {
                let dir = tempfile::tempdir().expect("create screenshot dir");
                let config = Config {
                    explicit_wait_ms: 2_000,
                    locator_wait_ms: 50,
                    poll_interval_ms: 10,
                    screenshot_dir: dir.path().to_path_buf(),
                    ..Config::default()
                };
                (config, Some(dir))
            }
        };

        let catalog = RoleCatalog::from_config(&config).expect("build role catalog");
        let config = Arc::new(config);

        Self {
            session: Session::new("scenario", config.clone()),
            replaced: None,
            config,
            catalog: Arc::new(catalog),
            login_page: LoginPage::default(),
            booking_page: BookingPage::default(),
            ctx: ScenarioContext::new(),
            scenario: "scenario".to_string(),
            mode,
            factory: None,
            _screenshots: screenshots,
        }
    }

    /// Name used for the teardown screenshot
    pub fn set_scenario(&mut self, name: &str) {
        self.scenario = name.to_string();
        self.session.set_tag(name);
    }

    /// Point the suite at `base_url` and open this scenario's browser
    ///
    /// A browser already open for this scenario is torn down first so the
    /// scenario never holds two sessions.
    pub async fn open_browser(&mut self, base_url: &str) {
        if self.session.is_active() {
            warn!("Scenario '{}' reopened its browser", self.scenario);
            self.replaced = Some(self.finish().await);
        }

        let mut config = (*self.config).clone();
        config.base_url = base_url.trim_end_matches('/').to_string();
        self.config = Arc::new(config);

        let factory: Box<dyn DriverFactory> = match self.mode {
            DriverMode::Simulated => Box::new(
                SimulatedErp::new(&self.config.base_url, &self.config.login_path, &self.catalog).factory(),
            ),
            DriverMode::Remote => Box::new(RemoteDriverFactory::new(self.config.webdriver_url.clone())),
        };
        let factory = self.factory.insert(factory);

        self.session = Session::new(self.scenario.clone(), self.config.clone());
        if let Err(e) = self.session.start(factory.as_ref()).await {
            panic!("{}", e);
        }
        info!("Scenario '{}' running against {}", self.scenario, self.config.base_url);
    }

    /// Actions on the live browser; panics when no browser was opened
    pub fn actions(&self) -> ElementActions {
        self.session
            .actions()
            .unwrap_or_else(|e| panic!("{} (is the application step missing?)", e))
    }

    pub fn login_flow<'a>(&'a self, actions: &'a ElementActions) -> LoginFlow<'a> {
        LoginFlow::new(actions, &self.config, &self.catalog, &self.login_page)
    }

    pub fn booking_flow<'a>(&'a self, actions: &'a ElementActions) -> BookingFlow<'a> {
        BookingFlow::new(actions, &self.config, &self.booking_page)
    }

    /// Screenshot and release the browser
    pub async fn finish(&mut self) -> TeardownReport {
        let report = self.session.teardown().await;
        for err in &report.errors {
            warn!("Teardown of '{}': {}", self.scenario, err);
        }
        if let Some(path) = &report.screenshot {
            info!("Screenshot for '{}': {}", self.scenario, path.display());
        }
        report
    }
}

impl fmt::Debug for YatrikWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YatrikWorld")
            .field("scenario", &self.scenario)
            .field("mode", &self.mode)
            .field("session", &self.session)
            .field("ctx", &self.ctx)
            .finish()
    }
}

/// Unwrap a step result, failing the step with the error's message
pub fn check<T>(result: yatrik_e2e::Result<T>) -> T {
    result.unwrap_or_else(|e| panic!("{}", e))
}
