//! Scenario reference data and state
//!
//! [`RoleCatalog`] and the page locator tables are built once and shared
//! read-only; a [`ScenarioContext`] lives for exactly one scenario.

pub mod catalog;
pub mod context;
pub mod pages;

#[cfg(test)]
mod tests;

pub use catalog::{dashboard_markers, generic_dashboard_markers, Role, RoleCatalog, RoleProfile};
pub use context::{Outcome, ScenarioContext, Subject};
pub use pages::{BookingPage, LoginPage, LOGOUT_VOCABULARY};
