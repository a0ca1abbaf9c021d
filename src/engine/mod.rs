//! Wait, locate and act
//!
//! - [`wait`]: bounded polling and page conditions
//! - [`locator`]: locator chains and their resolution
//! - [`actions`]: element interactions with scripted fallbacks

pub mod actions;
pub mod locator;
pub mod wait;


pub use actions::ElementActions;
pub use locator::{
    probe_element, Locator, LocatorChain, LocatorResolver, Readiness, Resolution, ResolvedElement,
    Strategy,
};
pub use wait::{is_truthy, WaitCondition, WaitOutcome, WaitPolicy, IMMEDIATE_PROBE_LIMIT};
