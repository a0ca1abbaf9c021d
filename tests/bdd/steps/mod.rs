//! Step definitions, grouped by page

mod booking_steps;
mod login_steps;
