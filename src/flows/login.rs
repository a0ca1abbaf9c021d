//! Role login and logout with layered verification
//!
//! Redirects are checked in two tiers (role fragment, then "left the login
//! page") and dashboards in three (role markers, shared layout markers, then
//! the URL). Only the failure of the last tier is an assertion failure. The
//! URL tier of the dashboard check accepts any post-login page and is logged
//! as a weak signal.

use std::fmt;
use tracing::{info, instrument, warn};

use crate::driver::scripts::HAS_INVALID_FIELD;
use crate::engine::{ElementActions, Locator, Readiness, Resolution, WaitCondition};
use crate::scenario::{LoginPage, Role, RoleCatalog, ScenarioContext, Subject, LOGOUT_VOCABULARY};
use crate::{Config, Error, Result};

/// Which tier confirmed a redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectEvidence {
    /// URL reached the role's fragment
    FragmentReached { url: String },
    /// URL left the login page without reaching the fragment
    LeftLoginPage { url: String },
}

impl RedirectEvidence {
    pub fn url(&self) -> &str {
        match self {
            RedirectEvidence::FragmentReached { url } | RedirectEvidence::LeftLoginPage { url } => url,
        }
    }
}

/// Which tier confirmed a dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvidence {
    RoleMarker(Locator),
    LayoutMarker(Locator),
    /// Only the URL says we are past the login page
    UrlHeuristic { url: String },
}

impl DashboardEvidence {
    /// Whether an element on the page confirmed the dashboard
    pub fn is_strong(&self) -> bool {
        !matches!(self, DashboardEvidence::UrlHeuristic { .. })
    }
}

/// How the logout control was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutMethod {
    Locator,
    TextMatch,
}

impl fmt::Display for LogoutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogoutMethod::Locator => f.write_str("logout locator"),
            LogoutMethod::TextMatch => f.write_str("text match"),
        }
    }
}

/// Login page orchestration for one session
pub struct LoginFlow<'a> {
    actions: &'a ElementActions,
    config: &'a Config,
    catalog: &'a RoleCatalog,
    page: &'a LoginPage,
}

impl<'a> LoginFlow<'a> {
    pub fn new(
        actions: &'a ElementActions,
        config: &'a Config,
        catalog: &'a RoleCatalog,
        page: &'a LoginPage,
    ) -> Self {
        Self {
            actions,
            config,
            catalog,
            page,
        }
    }

    pub fn page(&self) -> &LoginPage {
        self.page
    }

    pub async fn open_login_page(&self) -> Result<()> {
        self.actions.navigate(&self.config.login_url()).await
    }

    /// Email, password and submit must all be present
    pub async fn verify_login_form(&self) -> Result<()> {
        for chain in [&self.page.email, &self.page.password, &self.page.submit] {
            if !self.actions.is_present(chain).await {
                let url = self.actions.current_url().await.unwrap_or_default();
                return Err(Error::assertion(
                    "login form",
                    format!("{} not found on {}", chain, url),
                ));
            }
        }
        Ok(())
    }

    pub async fn enter_credentials(
        &self,
        ctx: &mut ScenarioContext,
        subject: Subject,
        email: &str,
        password: &str,
    ) -> Result<()> {
        self.actions.enter_text(&self.page.email, email).await?;
        self.actions.enter_text(&self.page.password, password).await?;

        let fragment = match subject {
            Subject::Role(role) => Some(self.catalog.profile(role).expected_fragment.as_str()),
            Subject::Invalid | Subject::Empty => None,
        };
        ctx.record_credentials(subject, email, password, fragment);
        info!("Entered credentials for {}", subject);
        Ok(())
    }

    pub async fn enter_role_credentials(&self, ctx: &mut ScenarioContext, role: Role) -> Result<()> {
        let profile = self.catalog.profile(role);
        self.enter_credentials(ctx, Subject::Role(role), &profile.email, &profile.password)
            .await
    }

    pub async fn leave_credentials_empty(&self, ctx: &mut ScenarioContext) -> Result<()> {
        self.enter_credentials(ctx, Subject::Empty, "", "").await
    }

    pub async fn submit(&self) -> Result<()> {
        self.actions.click(&self.page.submit).await
    }

    /// Open the login page, sign in as `role` and confirm the redirect
    pub async fn login_as(&self, ctx: &mut ScenarioContext, role: Role) -> Result<RedirectEvidence> {
        self.open_login_page().await?;
        self.verify_login_form().await?;
        self.enter_role_credentials(ctx, role).await?;
        self.submit().await?;
        self.verify_redirect(ctx, role).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn verify_redirect(&self, ctx: &mut ScenarioContext, role: Role) -> Result<RedirectEvidence> {
        let fragment = &self.catalog.profile(role).expected_fragment;

        let outcome = self.actions.wait_for_url_contains(fragment).await;
        let url = self.actions.current_url().await?;

        if outcome.is_satisfied() {
            info!("Redirected to {} dashboard at {}", role, url);
            ctx.mark_login_succeeded();
            return Ok(RedirectEvidence::FragmentReached { url });
        }

        warn!(
            "URL did not contain '{}' within {:?}, checking that the login page was left",
            fragment,
            outcome.elapsed()
        );
        if !self.config.is_login_url(&url) {
            info!("Left the login page for {}", url);
            ctx.mark_login_succeeded();
            return Ok(RedirectEvidence::LeftLoginPage { url });
        }

        Err(Error::assertion(
            "redirect",
            format!(
                "{} login did not reach a URL containing '{}', still at {}",
                role, fragment, url
            ),
        ))
    }

    #[instrument(skip(self))]
    pub async fn verify_dashboard(&self, role: Role) -> Result<DashboardEvidence> {
        let resolver = self.actions.resolver();
        let role_chain = &self.catalog.profile(role).dashboard;

        if let Resolution::Found(found) = resolver.resolve(role_chain, Readiness::Visible).await {
            info!("{} dashboard confirmed by {}", role, found.locator);
            return Ok(DashboardEvidence::RoleMarker(found.locator));
        }

        let generic = self.catalog.generic_dashboard();
        if let Resolution::Found(found) = resolver.resolve(generic, Readiness::Visible).await {
            warn!("{} markers missing, layout confirmed by {}", role, found.locator);
            return Ok(DashboardEvidence::LayoutMarker(found.locator));
        }

        let url = self.actions.current_url().await?;
        if !self.config.is_login_url(&url) {
            warn!("No dashboard markers found, accepting {} on URL alone", url);
            return Ok(DashboardEvidence::UrlHeuristic { url });
        }

        Err(Error::assertion(
            "dashboard",
            format!(
                "no {} dashboard: {} and {} not found, still on login page {}",
                role, role_chain, generic, url
            ),
        ))
    }

    /// Click logout by locator, falling back to a text match
    #[instrument(skip(self, ctx))]
    pub async fn logout(&self, ctx: &mut ScenarioContext) -> Result<LogoutMethod> {
        let method = if self.actions.click_if_present(&self.page.logout).await? {
            LogoutMethod::Locator
        } else {
            warn!("{} not found, scanning controls by text", self.page.logout);
            if !self
                .actions
                .click_by_text(&self.page.clickable_scope, LOGOUT_VOCABULARY)
                .await?
            {
                return Err(Error::assertion(
                    "logout",
                    format!(
                        "no logout control: {} not found and no {} reads any of {:?}",
                        self.page.logout, self.page.clickable_scope, LOGOUT_VOCABULARY
                    ),
                ));
            }
            LogoutMethod::TextMatch
        };

        info!("Logged out via {}", method);
        ctx.mark_logout_succeeded();
        Ok(method)
    }

    /// URL denotes the login page, or the login form is back
    pub async fn verify_returned_to_login(&self) -> Result<()> {
        let actions = self.actions;
        let config = self.config;
        let email = &self.page.email;

        let outcome = actions
            .explicit_policy()
            .until(|| async move {
                let on_login = match actions.current_url().await {
                    Ok(url) => config.is_login_url(&url),
                    Err(_) => false,
                };
                on_login || actions.is_visible(email).await
            })
            .await;

        if outcome.is_satisfied() {
            return Ok(());
        }

        let url = self.actions.current_url().await.unwrap_or_default();
        Err(Error::assertion(
            "login redirect",
            format!(
                "expected a URL containing '{}' or the base URL, got {}",
                self.config.login_path, url
            ),
        ))
    }

    /// Wait for a non-empty error message
    pub async fn verify_error_message(&self, ctx: &mut ScenarioContext) -> Result<String> {
        let actions = self.actions;
        let chain = &self.page.error_message;

        let text = actions
            .explicit_policy()
            .until_some(|| async move {
                let text = actions.read_text(chain).await;
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            })
            .await;

        match text {
            Some(text) => {
                info!("Login error shown: {}", text);
                ctx.record_error_text(&text);
                Ok(text)
            }
            None => Err(Error::assertion(
                "error message",
                format!(
                    "{} showed no text within {:?}",
                    chain,
                    actions.explicit_policy().timeout()
                ),
            )),
        }
    }

    pub async fn verify_remains_on_login(&self) -> Result<()> {
        let url = self.actions.current_url().await?;
        if self.config.is_login_url(&url) {
            Ok(())
        } else {
            Err(Error::assertion(
                "login page",
                format!("expected to stay on the login page, navigated to {}", url),
            ))
        }
    }

    /// A validation marker or a natively invalid field, without leaving the page
    pub async fn verify_validation_errors(&self) -> Result<()> {
        let mut indicators: Vec<WaitCondition> = self
            .page
            .validation_error
            .iter()
            .cloned()
            .map(WaitCondition::ElementVisible)
            .collect();
        indicators.push(WaitCondition::Script(HAS_INVALID_FIELD.to_string()));

        let outcome = self.actions.wait_for(&WaitCondition::Any(indicators)).await;
        if !outcome.is_satisfied() {
            return Err(Error::assertion(
                "validation",
                format!(
                    "neither {} nor an invalid form field appeared",
                    self.page.validation_error
                ),
            ));
        }

        self.verify_remains_on_login().await
    }
}
