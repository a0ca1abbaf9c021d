//! Common test utilities
//!
//! Shared fixtures for the integration tests: a config with short waits that
//! writes screenshots into a temporary directory, and the simulated front end.

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use yatrik_e2e::driver::{MockDriverFactory, DriverFactory};
use yatrik_e2e::scenario::RoleCatalog;
use yatrik_e2e::simulated::SimulatedErp;
use yatrik_e2e::Config;

/// Config pointing at the simulated deployment with short waits
pub fn fast_config(dir: &TempDir) -> Config {
    Config {
        explicit_wait_ms: 300,
        locator_wait_ms: 20,
        poll_interval_ms: 5,
        screenshot_dir: dir.path().join("screenshots"),
        ..Config::default()
    }
}

/// Everything a test needs to run sessions against the simulated front end
pub struct Fixture {
    pub config: Arc<Config>,
    pub catalog: Arc<RoleCatalog>,
    pub factory: MockDriverFactory,
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_app(|app| app)
    }

    pub fn with_app(customize: impl FnOnce(SimulatedErp) -> SimulatedErp) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = fast_config(&dir);
        let catalog = RoleCatalog::from_config(&config).expect("builtin catalog");
        let factory = customize(SimulatedErp::new(&config.base_url, &config.login_path, &catalog)).factory();

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            factory,
            dir,
        }
    }

    pub fn factory(&self) -> &dyn DriverFactory {
        &self.factory
    }

    /// Screenshots written so far
    pub fn screenshots(&self) -> Vec<std::path::PathBuf> {
        match std::fs::read_dir(&self.config.screenshot_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }
}
