//! Login and logout steps

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use yatrik_e2e::flows::LoginFlow;
use yatrik_e2e::scenario::{Role, Subject};

use crate::bdd::world::{check, YatrikWorld};

/// Role named in a step; "invalid" selects the rejected credentials
fn subject(name: &str) -> Subject {
    match name {
        "invalid" => Subject::Invalid,
        "empty" => Subject::Empty,
        role => Subject::Role(role.parse::<Role>().unwrap_or_else(|e| panic!("{}", e))),
    }
}

/// `email` and `password` from a step table with that header row
fn table_credentials(step: &Step) -> (String, String) {
    let table = step
        .table
        .as_ref()
        .unwrap_or_else(|| panic!("'{}' needs an email/password table", step.value));
    let header = &table.rows[0];
    let column = |name: &str| {
        header
            .iter()
            .position(|cell| cell == name)
            .unwrap_or_else(|| panic!("credentials table has no '{}' column", name))
    };
    let (email, password) = (column("email"), column("password"));
    let row = table
        .rows
        .get(1)
        .unwrap_or_else(|| panic!("credentials table has no data row"));
    (row[email].clone(), row[password].clone())
}

fn role(name: &str) -> Role {
    name.parse().unwrap_or_else(|e| panic!("{}", e))
}

#[given(expr = "the YATRIK ERP application is running on {string}")]
async fn application_running(world: &mut YatrikWorld, base_url: String) {
    world.open_browser(&base_url).await;
}

#[then("the first browser was released")]
async fn first_browser_released(world: &mut YatrikWorld) {
    let report = world.replaced.as_ref().expect("no browser was replaced");
    assert!(report.performed);
    assert!(report.driver_released);
    assert!(report.screenshot.is_some());
    assert!(report.is_clean(), "{:?}", report.errors);
    assert!(world.session.is_active());
}

#[given("I am on the login page")]
#[then("I am on the login page")]
async fn on_login_page(world: &mut YatrikWorld) {
    let actions = world.actions();
    let flow = world.login_flow(&actions);
    check(flow.open_login_page().await);
    check(flow.verify_login_form().await);
}

#[when(regex = r"^I enter (\w+) credentials$")]
async fn enter_credentials(world: &mut YatrikWorld, step: &Step, name: String) {
    let actions = world.actions();
    let flow = LoginFlow::new(&actions, &world.config, &world.catalog, &world.login_page);

    match subject(&name) {
        Subject::Role(role) => check(flow.enter_role_credentials(&mut world.ctx, role).await),
        Subject::Invalid => {
            let (email, password) = table_credentials(step);
            check(
                flow.enter_credentials(&mut world.ctx, Subject::Invalid, &email, &password)
                    .await,
            )
        }
        Subject::Empty => check(flow.leave_credentials_empty(&mut world.ctx).await),
    }
}

#[when("I leave credentials empty")]
async fn leave_credentials_empty(world: &mut YatrikWorld) {
    let actions = world.actions();
    let flow = LoginFlow::new(&actions, &world.config, &world.catalog, &world.login_page);
    check(flow.leave_credentials_empty(&mut world.ctx).await);
}

#[when("I click the login button")]
async fn click_login(world: &mut YatrikWorld) {
    let actions = world.actions();
    check(world.login_flow(&actions).submit().await);
}

#[then(regex = r"^I should be redirected to the (\w+) dashboard$")]
async fn redirected_to_dashboard(world: &mut YatrikWorld, name: String) {
    let role = role(&name);
    let actions = world.actions();
    let flow = LoginFlow::new(&actions, &world.config, &world.catalog, &world.login_page);
    check(flow.verify_redirect(&mut world.ctx, role).await);
}

#[then(regex = r"^I should see the (\w+) dashboard elements$")]
async fn dashboard_elements(world: &mut YatrikWorld, name: String) {
    let role = role(&name);
    let actions = world.actions();
    check(world.login_flow(&actions).verify_dashboard(role).await);
}

#[when("I click the logout button")]
async fn click_logout(world: &mut YatrikWorld) {
    let actions = world.actions();
    let flow = LoginFlow::new(&actions, &world.config, &world.catalog, &world.login_page);
    check(flow.logout(&mut world.ctx).await);
}

#[then("I should be redirected back to the login page")]
async fn back_on_login(world: &mut YatrikWorld) {
    let actions = world.actions();
    check(world.login_flow(&actions).verify_returned_to_login().await);
    assert!(world.ctx.logout_succeeded());
}

#[then("I should see the login form elements")]
async fn login_form_elements(world: &mut YatrikWorld) {
    let actions = world.actions();
    check(world.login_flow(&actions).verify_login_form().await);
}

#[then("I should see an error message")]
async fn error_message(world: &mut YatrikWorld) {
    let actions = world.actions();
    let flow = LoginFlow::new(&actions, &world.config, &world.catalog, &world.login_page);
    let text = check(flow.verify_error_message(&mut world.ctx).await);
    assert!(!text.is_empty());
}

#[then("I should remain on the login page")]
async fn remain_on_login(world: &mut YatrikWorld) {
    let actions = world.actions();
    check(world.login_flow(&actions).verify_remains_on_login().await);
    assert!(!world.ctx.login_succeeded());
}

#[then("I should see validation error messages")]
async fn validation_errors(world: &mut YatrikWorld) {
    let actions = world.actions();
    check(world.login_flow(&actions).verify_validation_errors().await);
}
