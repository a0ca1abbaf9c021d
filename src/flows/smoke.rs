//! Login/logout smoke run over every role

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use super::login::{DashboardEvidence, LoginFlow};
use crate::driver::DriverFactory;
use crate::scenario::{LoginPage, Outcome, Role, RoleCatalog, ScenarioContext};
use crate::session::Session;
use crate::Config;

/// Result of one role's login -> dashboard -> logout cycle
#[derive(Debug, Clone)]
pub struct RoleRun {
    pub role: Role,
    pub outcome: Outcome,
    pub dashboard: Option<DashboardEvidence>,
    pub duration: Duration,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
}

impl RoleRun {
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Totals over a smoke run
#[derive(Debug, Clone, Default)]
pub struct SmokeSummary {
    runs: Vec<RoleRun>,
}

impl SmokeSummary {
    pub fn push(&mut self, run: RoleRun) {
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[RoleRun] {
        &self.runs
    }

    pub fn total(&self) -> usize {
        self.runs.len()
    }

    pub fn passed(&self) -> usize {
        self.runs.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// Percentage of passing roles; 0 for an empty run
    pub fn success_rate(&self) -> f64 {
        if self.runs.is_empty() {
            return 0.0;
        }
        self.passed() as f64 * 100.0 / self.total() as f64
    }

    pub fn duration(&self) -> Duration {
        self.runs.iter().map(|r| r.duration).sum()
    }

    pub fn is_success(&self) -> bool {
        !self.runs.is_empty() && self.failed() == 0
    }
}

impl fmt::Display for SmokeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "YATRIK login smoke run")?;
        writeln!(f, "{}", "-".repeat(60))?;
        for run in &self.runs {
            let status = if run.passed() { "PASS" } else { "FAIL" };
            writeln!(
                f,
                "{:<4}  {:<10} {:>8.2}s",
                status,
                run.role.as_str(),
                run.duration.as_secs_f64()
            )?;
            if let Some(err) = &run.error {
                writeln!(f, "      {}", err)?;
            }
            if let Some(path) = &run.screenshot {
                writeln!(f, "      screenshot: {}", path.display())?;
            }
        }
        writeln!(f, "{}", "-".repeat(60))?;
        write!(
            f,
            "{} passed, {} failed, {} total in {:.2}s ({:.1}% success)",
            self.passed(),
            self.failed(),
            self.total(),
            self.duration().as_secs_f64(),
            self.success_rate()
        )
    }
}

/// Run one role in its own session
pub async fn run_role(
    config: Arc<Config>,
    catalog: Arc<RoleCatalog>,
    factory: &dyn DriverFactory,
    role: Role,
) -> RoleRun {
    let started = Instant::now();
    let mut session = Session::new(format!("smoke_{}", role), config.clone());

    let (result, report) = session
        .run(factory, move |actions| async move {
            let page = LoginPage::default();
            let flow = LoginFlow::new(&actions, &config, &catalog, &page);
            let mut ctx = ScenarioContext::new();

            flow.login_as(&mut ctx, role).await?;
            let dashboard = flow.verify_dashboard(role).await?;
            flow.logout(&mut ctx).await?;
            flow.verify_returned_to_login().await?;
            flow.verify_login_form().await?;
            Ok((ctx.outcome(), dashboard))
        })
        .await;

    let duration = started.elapsed();
    match result {
        Ok((outcome, dashboard)) => {
            info!("{} passed in {:?}", role, duration);
            RoleRun {
                role,
                outcome,
                dashboard: Some(dashboard),
                duration,
                error: None,
                screenshot: report.screenshot,
            }
        }
        Err(e) => {
            error!("{} failed: {}", role, e);
            RoleRun {
                role,
                outcome: Outcome::default(),
                dashboard: None,
                duration,
                error: Some(e.to_string()),
                screenshot: report.screenshot,
            }
        }
    }
}

/// Run `roles` one after another
pub async fn run_all(
    config: Arc<Config>,
    catalog: Arc<RoleCatalog>,
    factory: &dyn DriverFactory,
    roles: &[Role],
) -> SmokeSummary {
    let mut summary = SmokeSummary::default();
    for role in roles {
        summary.push(run_role(config.clone(), catalog.clone(), factory, *role).await);
    }
    summary
}
