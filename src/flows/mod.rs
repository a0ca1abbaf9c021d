//! Scenario orchestration over [`crate::engine::ElementActions`]
//!
//! - [`login`]: role login, dashboard checks, logout, invalid and empty
//!   credential checks
//! - [`booking`]: passenger trip search
//! - [`smoke`]: login/logout cycle over every role with a printable summary

pub mod booking;
pub mod login;
pub mod smoke;


pub use booking::{BookingEvidence, BookingFlow};
pub use login::{DashboardEvidence, LoginFlow, LogoutMethod, RedirectEvidence};
pub use smoke::{run_all, run_role, RoleRun, SmokeSummary};
