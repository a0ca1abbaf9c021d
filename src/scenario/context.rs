//! Per-scenario state

use std::fmt;

use super::catalog::Role;

/// Who the scenario is logging in as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Role(Role),
    /// Credentials that must be rejected
    Invalid,
    /// Nothing entered
    Empty,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Role(role) => write!(f, "{}", role),
            Subject::Invalid => f.write_str("invalid credentials"),
            Subject::Empty => f.write_str("empty credentials"),
        }
    }
}

/// Outcome flags of a scenario
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub login_succeeded: bool,
    pub logout_succeeded: bool,
}

/// Mutable state threaded through the steps of one scenario
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    subject: Option<Subject>,
    email: String,
    password: String,
    expected_fragment: Option<String>,
    outcome: Outcome,
    last_error_text: Option<String>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record what was typed into the login form
    pub fn record_credentials(
        &mut self,
        subject: Subject,
        email: &str,
        password: &str,
        expected_fragment: Option<&str>,
    ) {
        self.subject = Some(subject);
        self.email = email.to_string();
        self.password = password.to_string();
        self.expected_fragment = expected_fragment.map(str::to_string);
    }

    pub fn mark_login_succeeded(&mut self) {
        self.outcome.login_succeeded = true;
    }

    pub fn mark_logout_succeeded(&mut self) {
        self.outcome.logout_succeeded = true;
    }

    pub fn record_error_text(&mut self, text: &str) {
        self.last_error_text = Some(text.to_string());
    }

    pub fn subject(&self) -> Option<Subject> {
        self.subject
    }

    pub fn role(&self) -> Option<Role> {
        match self.subject {
            Some(Subject::Role(role)) => Some(role),
            _ => None,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn expected_fragment(&self) -> Option<&str> {
        self.expected_fragment.as_deref()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn login_succeeded(&self) -> bool {
        self.outcome.login_succeeded
    }

    pub fn logout_succeeded(&self) -> bool {
        self.outcome.logout_succeeded
    }

    pub fn last_error_text(&self) -> Option<&str> {
        self.last_error_text.as_deref()
    }
}
