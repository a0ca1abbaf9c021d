//! YATRIK ERP end-to-end suite
//!
//! Drives the YATRIK web front end over WebDriver: a wait engine, locator
//! fallback chains and resilient element actions underneath role login,
//! logout and booking flows. Scenarios live in `tests/features` and run
//! through the cucumber harness; `yatrik-smoke` runs the role cycle
//! standalone.

pub mod error;
pub mod config;
pub mod telemetry;

pub mod driver;
pub mod engine;
pub mod flows;
pub mod scenario;
pub mod session;
pub mod simulated;

// Re-exports
pub use config::{BrowserKind, Config};
pub use error::{Error, Result};

/// yatrik-e2e library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
