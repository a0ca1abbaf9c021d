//! Scripted copy of the YATRIK front end on top of [`MockDriver`]
//!
//! Serves the login page, one dashboard per role and the passenger booking
//! pages with the markup the real application renders, so flows and
//! scenarios can run without a browser. Markup variations (missing markers,
//! text-only logout, overlays rejecting native clicks) are switched on through
//! [`SimulatedErp`]'s builder methods.

use std::sync::Arc;

use crate::driver::{MockDom, MockDriver, MockDriverFactory, MockNode, MockPage};
use crate::engine::Locator;
use crate::scenario::{Role, RoleCatalog};

/// Message rendered by the login page for rejected credentials
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// How the dashboards render their logout control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoutControl {
    /// `<button data-testid="logout-btn">Logout</button>`
    #[default]
    Marked,
    /// Unmarked button reading "Sign Out"
    TextOnly,
    /// No logout control
    Missing,
}

/// Which dashboard markers the dashboards render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardMarkup {
    /// Role marker and shared header
    #[default]
    Full,
    /// Shared header only
    GenericOnly,
    /// Neither
    Bare,
}

#[derive(Debug, Clone)]
struct Account {
    email: String,
    password: String,
    landing: String,
    role: Role,
}

/// Builder for a simulated YATRIK deployment
#[derive(Debug, Clone)]
pub struct SimulatedErp {
    origin: String,
    login_path: String,
    accounts: Vec<Account>,
    logout: LogoutControl,
    dashboards: DashboardMarkup,
    landing_override: Option<String>,
    submit_rejects_native: bool,
    email_rejects_native: bool,
    form_delay: u32,
}

impl SimulatedErp {
    /// One account per catalog role, landing on the role's fragment
    pub fn new(origin: &str, login_path: &str, catalog: &RoleCatalog) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            login_path: login_path.to_string(),
            accounts: catalog
                .profiles()
                .map(|p| Account {
                    email: p.email.clone(),
                    password: p.password.clone(),
                    landing: p.expected_fragment.clone(),
                    role: p.role,
                })
                .collect(),
            logout: LogoutControl::default(),
            dashboards: DashboardMarkup::default(),
            landing_override: None,
            submit_rejects_native: false,
            email_rejects_native: false,
            form_delay: 0,
        }
    }

    pub fn logout_control(mut self, control: LogoutControl) -> Self {
        self.logout = control;
        self
    }

    pub fn dashboard_markup(mut self, markup: DashboardMarkup) -> Self {
        self.dashboards = markup;
        self
    }

    /// Send every successful login to `path` instead of the role's page
    pub fn landing_override<S: Into<String>>(mut self, path: S) -> Self {
        self.landing_override = Some(path.into());
        self
    }

    /// Cover the login button with an overlay that swallows native clicks
    pub fn overlay_on_submit(mut self) -> Self {
        self.submit_rejects_native = true;
        self
    }

    /// Make the email input reject native typing
    pub fn readonly_email_input(mut self) -> Self {
        self.email_rejects_native = true;
        self
    }

    /// Render the login form only after `lookups` element lookups
    pub fn slow_form(mut self, lookups: u32) -> Self {
        self.form_delay = lookups;
        self
    }

    /// A fresh browser showing a blank page
    pub fn driver(&self) -> MockDriver {
        MockDriver::with_routes(self.origin.clone(), self.routes())
    }

    /// Factory handing out a fresh simulated browser per session
    pub fn factory(&self) -> MockDriverFactory {
        let app = self.clone();
        MockDriverFactory::new(move || app.driver())
    }

    fn routes(&self) -> Vec<(String, MockPage)> {
        let mut routes = vec![
            (self.login_path.clone(), self.login_page()),
            ("/".to_string(), self.login_page()),
        ];

        let mut seen = Vec::new();
        for account in &self.accounts {
            if !seen.contains(&account.landing) {
                seen.push(account.landing.clone());
                routes.push((account.landing.clone(), self.dashboard_page(Some(account.role))));
            }
        }
        if let Some(path) = &self.landing_override {
            routes.push((path.clone(), self.dashboard_page(None)));
        }

        routes.push(("/pax/booking".to_string(), self.booking_page()));
        routes.push(("/pax/results".to_string(), self.results_page()));
        routes
    }

    fn login_page(&self) -> MockPage {
        let accounts = Arc::new(self.accounts.clone());
        let landing_override = self.landing_override.clone();

        let mut email = MockNode::new("email", "input")
            .id("email")
            .name("email")
            .matches(Locator::css("input[type='email']"))
            .required()
            .revealed_after(self.form_delay);
        if self.email_rejects_native {
            email = email.rejecting_native();
        }

        let password = MockNode::new("password", "input")
            .id("password")
            .name("password")
            .matches(Locator::css("input[type='password']"))
            .required()
            .revealed_after(self.form_delay);

        let mut submit = MockNode::new("login-submit", "button")
            .text("Sign in")
            .matches(Locator::css("button[type='submit']"))
            .matches(Locator::css(".login-btn--primary"))
            .revealed_after(self.form_delay)
            .on_click(move |dom| {
                authenticate(dom, &accounts, landing_override.as_deref());
            });
        if self.submit_rejects_native {
            submit = submit.rejecting_native();
        }

        MockPage::new("YATRIK | Login")
            .with(email)
            .with(password)
            .with(submit)
            .with(
                MockNode::new("login-error", "div")
                    .matches(Locator::css(".login-alert"))
                    .matches(Locator::css("[role='alert']"))
                    .hidden(),
            )
            .with(MockNode::new("signup-link", "a").text("Create an account"))
    }

    fn dashboard_page(&self, role: Option<Role>) -> MockPage {
        let title = match role {
            Some(role) => format!("YATRIK | {} dashboard", role),
            None => "YATRIK | Dashboard".to_string(),
        };
        let mut page = MockPage::new(title);

        if self.dashboards != DashboardMarkup::Bare {
            page = page.with(
                MockNode::new("header", "header")
                    .matches(Locator::css(".dashboard-header"))
                    .text("YATRIK"),
            );
        }
        if let (DashboardMarkup::Full, Some(role)) = (self.dashboards, role) {
            page = page.with(
                MockNode::new("role-dashboard", "main")
                    .matches(Locator::css(format!("[data-testid='{}-dashboard']", role)))
                    .matches(Locator::css(format!(".{}-dashboard", role))),
            );
        }

        page = page.with(MockNode::new("profile-link", "a").text("Profile"));

        let logout = match self.logout {
            LogoutControl::Marked => Some(
                MockNode::new("logout", "button")
                    .text("Logout")
                    .matches(Locator::css("[data-testid='logout-btn']"))
                    .matches(Locator::css(".logout-btn")),
            ),
            LogoutControl::TextOnly => Some(MockNode::new("logout", "button").text("Sign Out")),
            LogoutControl::Missing => None,
        };
        if let Some(logout) = logout {
            let login_path = self.login_path.clone();
            page = page.with(logout.on_click(move |dom| dom.visit(&login_path)));
        }

        if role == Some(Role::Passenger) {
            page = page.with(
                MockNode::new("book-link", "a")
                    .text("Book a trip")
                    .on_click(|dom| dom.visit("/pax/booking")),
            );
        }
        page
    }

    fn booking_page(&self) -> MockPage {
        MockPage::new("YATRIK | Book")
            .with(
                MockNode::new("from", "input")
                    .name("from")
                    .matches(Locator::css("input[placeholder='Departure city']")),
            )
            .with(
                MockNode::new("to", "input")
                    .name("to")
                    .matches(Locator::css("input[placeholder='Destination city']")),
            )
            .with(
                MockNode::new("search", "button")
                    .text("Search Buses")
                    .matches(Locator::xpath("//button[contains(., 'Search')]"))
                    .on_click(|dom| {
                        if !dom.value_of("from").is_empty() && !dom.value_of("to").is_empty() {
                            dom.visit("/pax/results");
                        }
                    }),
            )
    }

    fn results_page(&self) -> MockPage {
        MockPage::new("YATRIK | Results").with(
            MockNode::new("trip-results", "section")
                .matches(Locator::css("[data-testid='trip-results']"))
                .text("3 buses found"),
        )
    }
}

fn authenticate(dom: &mut MockDom, accounts: &[Account], landing_override: Option<&str>) {
    let email = dom.value_of("email");
    let password = dom.value_of("password");

    // Native constraint validation blocks submission of required fields
    if email.is_empty() || password.is_empty() {
        dom.record("submit:blocked");
        return;
    }

    let account = accounts
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(&email) && a.password == password);

    match account {
        Some(account) => {
            dom.record(format!("login:{}", account.role));
            let landing = landing_override.unwrap_or(&account.landing).to_string();
            dom.visit(&landing);
        }
        None => {
            dom.record("login:rejected");
            dom.set_text("login-error", INVALID_CREDENTIALS_MESSAGE);
            dom.show("login-error");
        }
    }
}
