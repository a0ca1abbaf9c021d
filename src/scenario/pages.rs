//! Locator tables for the pages the scenarios touch

use crate::engine::{Locator, LocatorChain};

/// Words that identify a logout control by its text
pub const LOGOUT_VOCABULARY: &[&str] = &["logout", "sign out"];

/// Login page and the session controls reachable after login
#[derive(Debug, Clone)]
pub struct LoginPage {
    pub email: LocatorChain,
    pub password: LocatorChain,
    pub submit: LocatorChain,
    pub error_message: LocatorChain,
    pub validation_error: LocatorChain,
    pub logout: LocatorChain,
    /// Elements scanned by text when no logout locator matches
    pub clickable_scope: Locator,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            email: LocatorChain::new(Locator::id("email"))
                .or(Locator::name("email"))
                .or(Locator::css("input[type='email']"))
                .labeled("email field"),
            password: LocatorChain::new(Locator::id("password"))
                .or(Locator::name("password"))
                .or(Locator::css("input[type='password']"))
                .labeled("password field"),
            submit: LocatorChain::new(Locator::css("button[type='submit']"))
                .or(Locator::css(".login-btn--primary"))
                .or(Locator::xpath("//button[contains(., 'Sign in')]"))
                .labeled("login button"),
            error_message: LocatorChain::new(Locator::css(".login-alert"))
                .or(Locator::css("[role='alert']"))
                .or(Locator::css(".error-message"))
                .labeled("login error"),
            validation_error: LocatorChain::new(Locator::css(".validation-error"))
                .or(Locator::css(".field-error"))
                .or(Locator::css("[aria-invalid='true']"))
                .labeled("validation error"),
            logout: LocatorChain::new(Locator::css("[data-testid='logout-btn']"))
                .or(Locator::css(".logout-btn"))
                .or(Locator::css("button[class*='logout']"))
                .or(Locator::css("a[class*='logout']"))
                .or(Locator::css("a[href*='logout']"))
                .labeled("logout control"),
            clickable_scope: Locator::css("button, a"),
        }
    }
}

/// Passenger trip search
#[derive(Debug, Clone)]
pub struct BookingPage {
    pub path: String,
    pub from: LocatorChain,
    pub to: LocatorChain,
    pub search: LocatorChain,
    /// Trip list or the empty-result notice
    pub results: LocatorChain,
    pub results_fragment: String,
}

impl Default for BookingPage {
    fn default() -> Self {
        Self {
            path: "/pax/booking".to_string(),
            from: LocatorChain::new(Locator::css("input[placeholder='Departure city']"))
                .or(Locator::name("from"))
                .labeled("departure field"),
            to: LocatorChain::new(Locator::css("input[placeholder='Destination city']"))
                .or(Locator::name("to"))
                .labeled("destination field"),
            search: LocatorChain::new(Locator::xpath("//button[contains(., 'Search')]"))
                .or(Locator::css("button[type='submit']"))
                .labeled("search button"),
            results: LocatorChain::new(Locator::css("[data-testid='trip-results']"))
                .or(Locator::css(".trip-card"))
                .or(Locator::css(".no-results"))
                .labeled("trip results"),
            results_fragment: "/results".to_string(),
        }
    }
}
