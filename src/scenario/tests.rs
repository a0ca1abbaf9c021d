//! Catalog and context tests

use super::*;
use crate::engine::Locator;
use crate::Config;

#[test]
fn test_role_aliases() {
    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("Depot Manager".parse::<Role>().unwrap(), Role::Depot);
    assert_eq!(" PAX ".parse::<Role>().unwrap(), Role::Passenger);
    assert!("cashier".parse::<Role>().is_err());

    for role in Role::ALL {
        assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
}

#[test]
fn test_builtin_catalog_covers_every_role() {
    let catalog = RoleCatalog::builtin();

    for role in Role::ALL {
        let profile = catalog.profile(role);
        assert_eq!(profile.role, role);
        assert!(!profile.email.is_empty());
        assert!(profile.expected_fragment.starts_with('/'));
    }
    assert_eq!(catalog.profile(Role::Depot).expected_fragment, "/depot");
    assert_eq!(catalog.profile(Role::Passenger).expected_fragment, "/pax");
    assert_eq!(
        catalog.profile(Role::Admin).dashboard.primary(),
        &Locator::css("[data-testid='admin-dashboard']")
    );
    assert_eq!(catalog.generic_dashboard().len(), 4);
}

#[test]
fn test_catalog_applies_config_overrides() {
    let config = Config::from_toml(
        r#"
        [roles.conductor]
        email = "conductor2@yatrik.com"
        password = "Secret@1"

        [roles.pax]
        expected_fragment = "/passenger"
        "#,
    )
    .unwrap();

    let catalog = RoleCatalog::from_config(&config).unwrap();
    let conductor = catalog.profile(Role::Conductor);
    assert_eq!(conductor.email, "conductor2@yatrik.com");
    assert_eq!(conductor.password, "Secret@1");
    assert_eq!(conductor.expected_fragment, "/conductor");
    assert_eq!(catalog.profile(Role::Passenger).expected_fragment, "/passenger");
    assert_eq!(catalog.profile(Role::Admin).email, "admin@yatrik.com");
}

#[test]
fn test_catalog_rejects_bad_overrides() {
    let unknown = Config::from_toml("[roles.cashier]\nemail = \"c@y.com\"").unwrap();
    assert!(RoleCatalog::from_config(&unknown).is_err());

    let relative = Config::from_toml("[roles.admin]\nexpected_fragment = \"admin\"").unwrap();
    assert!(RoleCatalog::from_config(&relative).is_err());
}

#[test]
fn test_login_page_chains_prefer_semantic_ids() {
    let page = LoginPage::default();
    assert_eq!(page.email.primary(), &Locator::id("email"));
    assert_eq!(page.password.primary(), &Locator::id("password"));
    assert_eq!(page.logout.primary(), &Locator::css("[data-testid='logout-btn']"));
    assert!(LOGOUT_VOCABULARY.contains(&"sign out"));
}

#[test]
fn test_context_tracks_outcome() {
    let mut ctx = ScenarioContext::new();
    assert_eq!(ctx.subject(), None);
    assert_eq!(ctx.outcome(), Outcome::default());

    ctx.record_credentials(Subject::Role(Role::Driver), "rejith@gmail.com", "pw", Some("/driver"));
    assert_eq!(ctx.role(), Some(Role::Driver));
    assert_eq!(ctx.email(), "rejith@gmail.com");
    assert_eq!(ctx.expected_fragment(), Some("/driver"));

    ctx.mark_login_succeeded();
    ctx.mark_logout_succeeded();
    assert!(ctx.login_succeeded() && ctx.logout_succeeded());

    ctx.record_credentials(Subject::Invalid, "invalid@test.com", "wrongpass", None);
    assert_eq!(ctx.role(), None);
    assert_eq!(ctx.expected_fragment(), None);
    assert_eq!(Subject::Invalid.to_string(), "invalid credentials");
}
