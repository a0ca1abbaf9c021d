//! # yatrik-smoke
//!
//! Logs in and out as each role, one fresh browser per role, and prints a
//! pass/fail summary. Exits non-zero when any role fails.
//!
//! ## Usage
//! `yatrik-smoke [ROLE...]` runs the named roles (all roles when none given).
//!
//! ## Environment variables
//! - `YATRIK_CONFIG`: TOML config file
//! - `YATRIK_BASE_URL`, `YATRIK_WEBDRIVER_URL`, `YATRIK_BROWSER`, `YATRIK_HEADLESS`, ...
//! - `YATRIK_DRIVER`: `webdriver` (default) or `mock` for the simulated front end

use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};
use yatrik_e2e::{
    config::Config,
    driver::{DriverFactory, RemoteDriverFactory},
    flows::{run_role, SmokeSummary},
    scenario::{Role, RoleCatalog},
    simulated::SimulatedErp,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    telemetry::init_tracing(&config.log_level);

    info!("yatrik-smoke v{}", yatrik_e2e::VERSION);
    info!("Target {} via {} ({:?})", config.base_url, config.webdriver_url, config.browser);

    let roles = parse_roles(std::env::args().skip(1))?;
    let catalog = Arc::new(RoleCatalog::from_config(&config).context("building role catalog")?);
    let config = Arc::new(config);

    let factory: Box<dyn DriverFactory> = match std::env::var("YATRIK_DRIVER").as_deref() {
        Ok("mock") => {
            warn!("Running against the simulated front end");
            Box::new(SimulatedErp::new(&config.base_url, &config.login_path, &catalog).factory())
        }
        _ => Box::new(RemoteDriverFactory::new(config.webdriver_url.clone())),
    };

    // Stop scheduling roles on Ctrl+C; the running role still tears down
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, finishing the current role");
            let _ = stop_tx.send(true);
        }
    });

    let mut summary = SmokeSummary::default();
    for role in roles {
        if *stop_rx.borrow() {
            warn!("Interrupted, skipping remaining roles");
            break;
        }
        summary.push(run_role(config.clone(), catalog.clone(), factory.as_ref(), role).await);
    }

    println!("{}", summary);

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_roles(args: impl Iterator<Item = String>) -> anyhow::Result<Vec<Role>> {
    let roles = args
        .map(|arg| arg.parse::<Role>().with_context(|| format!("invalid role argument '{}'", arg)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(if roles.is_empty() { Role::ALL.to_vec() } else { roles })
}
