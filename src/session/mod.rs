//! # Session lifecycle
//!
//! One [`Session`] owns the browser of one scenario and moves through
//! `Uninitialized -> Active -> TornDown`, never back.
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use yatrik_e2e::driver::RemoteDriverFactory;
//! use yatrik_e2e::session::Session;
//! use yatrik_e2e::Config;
//!
//! # async fn example() -> yatrik_e2e::Result<()> {
//! let config = Arc::new(Config::load()?);
//! let factory = RemoteDriverFactory::new(config.webdriver_url.clone());
//! let mut session = Session::new("admin_login", config.clone());
//!
//! let (result, report) = session
//!     .run(&factory, |actions| async move {
//!         actions.navigate("http://localhost:5173/login").await?;
//!         actions.page_title().await
//!     })
//!     .await;
//! println!("title: {:?}, screenshot: {:?}", result, report.screenshot);
//! # Ok(())
//! # }
//! ```

pub mod lifecycle;


pub use lifecycle::{screenshot_file_name, Session, SessionState, TeardownReport};
