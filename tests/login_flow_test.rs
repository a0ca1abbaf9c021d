//! Role login integration tests
//!
//! Full login -> dashboard -> logout cycles through [`Session::run`] against
//! the simulated front end, one isolated session per role.

mod common;

use common::Fixture;
use yatrik_e2e::flows::{run_all, run_role, DashboardEvidence, LoginFlow, RedirectEvidence};
use yatrik_e2e::scenario::{LoginPage, Role, ScenarioContext, Subject};
use yatrik_e2e::session::Session;
use yatrik_e2e::simulated::{DashboardMarkup, LogoutControl, INVALID_CREDENTIALS_MESSAGE};
use yatrik_e2e::Error;

/// Test 1: every role completes the cycle in its own session
#[tokio::test]
async fn test_all_roles_pass() {
    let fixture = Fixture::new();

    let summary = run_all(
        fixture.config.clone(),
        fixture.catalog.clone(),
        fixture.factory(),
        &Role::ALL,
    )
    .await;

    assert!(summary.is_success(), "{}", summary);
    assert_eq!(summary.total(), Role::ALL.len());
    for run in summary.runs() {
        assert!(run.outcome.login_succeeded);
        assert!(run.outcome.logout_succeeded);
        assert!(matches!(run.dashboard, Some(DashboardEvidence::RoleMarker(_))));
    }

    // One teardown screenshot per session
    assert_eq!(fixture.screenshots().len(), Role::ALL.len());
}

/// Test 2: weak markup still passes through the fallback tiers
#[tokio::test]
async fn test_fallback_tiers_keep_roles_passing() {
    let fixture = Fixture::with_app(|app| {
        app.dashboard_markup(DashboardMarkup::Bare)
            .logout_control(LogoutControl::TextOnly)
            .overlay_on_submit()
    });

    let run = run_role(
        fixture.config.clone(),
        fixture.catalog.clone(),
        fixture.factory(),
        Role::Conductor,
    )
    .await;

    assert!(run.passed(), "{:?}", run.error);
    assert!(matches!(run.dashboard, Some(DashboardEvidence::UrlHeuristic { .. })));
}

/// Test 3: a missing logout control fails the role and still tears down
#[tokio::test]
async fn test_missing_logout_fails_role() {
    let fixture = Fixture::with_app(|app| app.logout_control(LogoutControl::Missing));

    let run = run_role(
        fixture.config.clone(),
        fixture.catalog.clone(),
        fixture.factory(),
        Role::Driver,
    )
    .await;

    assert!(!run.passed());
    assert!(run.error.as_deref().unwrap().contains("logout"));
    assert!(run.screenshot.is_some());
    assert!(fixture.factory.created().await[0].is_closed().await);
}

/// Test 4: invalid credentials inside a managed session
#[tokio::test]
async fn test_invalid_credentials_in_session() {
    let fixture = Fixture::new();
    let mut session = Session::new("invalid login", fixture.config.clone());
    let config = fixture.config.clone();
    let catalog = fixture.catalog.clone();

    let (result, report) = session
        .run(fixture.factory(), move |actions| async move {
            let page = LoginPage::default();
            let flow = LoginFlow::new(&actions, &config, &catalog, &page);
            let mut ctx = ScenarioContext::new();

            flow.open_login_page().await?;
            flow.enter_credentials(&mut ctx, Subject::Invalid, "invalid@test.com", "wrongpass")
                .await?;
            flow.submit().await?;
            let message = flow.verify_error_message(&mut ctx).await?;
            flow.verify_remains_on_login().await?;
            Ok(message)
        })
        .await;

    assert_eq!(result.unwrap(), INVALID_CREDENTIALS_MESSAGE);
    assert!(report.is_clean());
}

/// Test 5: a redirect outside the role fragment is still accepted
#[tokio::test]
async fn test_redirect_to_shared_dashboard() {
    let fixture = Fixture::with_app(|app| app.landing_override("/home"));
    let mut session = Session::new("shared landing", fixture.config.clone());
    let config = fixture.config.clone();
    let catalog = fixture.catalog.clone();

    let (result, _report) = session
        .run(fixture.factory(), move |actions| async move {
            let page = LoginPage::default();
            let flow = LoginFlow::new(&actions, &config, &catalog, &page);
            flow.login_as(&mut ScenarioContext::new(), Role::Admin).await
        })
        .await;

    match result.unwrap() {
        RedirectEvidence::LeftLoginPage { url } => assert!(url.ends_with("/home")),
        other => panic!("expected the second tier, got {:?}", other),
    }
}

/// Test 6: an unreachable driver endpoint fails fast
#[tokio::test]
async fn test_unreachable_driver_fails_role() {
    let fixture = Fixture::new();
    let factory = yatrik_e2e::driver::MockDriverFactory::failing("connection refused");

    let run = run_role(fixture.config.clone(), fixture.catalog.clone(), &factory, Role::Admin).await;

    assert!(!run.passed());
    assert!(run.screenshot.is_none());
    let err = run.error.unwrap();
    assert!(err.contains("connection refused"), "{}", err);
    assert!(err.contains(&Error::session_acquisition("connection refused").to_string()));
}
