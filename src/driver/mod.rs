//! Browser driver layer
//!
//! [`WebDriver`] and [`ElementHandle`] are the only way the suite touches a
//! browser. [`remote`] implements them over the W3C protocol and [`mock`]
//! provides an in-memory browser for tests.

pub mod mock;
pub mod scripts;
pub mod traits;
pub mod remote;


pub use mock::{MockDom, MockDriver, MockDriverFactory, MockElement, MockNode, MockPage};
pub use traits::{BrowserOptions, DriverFactory, ElementHandle, WebDriver};
pub use remote::{FantocciniDriver, RemoteDriverFactory};
