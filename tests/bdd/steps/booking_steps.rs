//! Passenger booking steps

use cucumber::{given, then, when};
use yatrik_e2e::flows::{BookingEvidence, LoginFlow};
use yatrik_e2e::scenario::Role;

use crate::bdd::world::{check, YatrikWorld};

#[given("I am logged in as a passenger")]
async fn logged_in_as_passenger(world: &mut YatrikWorld) {
    let actions = world.actions();
    let flow = LoginFlow::new(&actions, &world.config, &world.catalog, &world.login_page);
    check(flow.login_as(&mut world.ctx, Role::Passenger).await);
}

#[when(expr = "I search for trips from {string} to {string}")]
async fn search_trips(world: &mut YatrikWorld, from: String, to: String) {
    let actions = world.actions();
    let flow = world.booking_flow(&actions);
    check(flow.open().await);
    check(flow.search(&from, &to).await);
}

#[then("I should see trip results")]
async fn trip_results(world: &mut YatrikWorld) {
    let actions = world.actions();
    match check(world.booking_flow(&actions).verify_results().await) {
        BookingEvidence::ResultsUrl { url } => assert!(url.contains(&world.booking_page.results_fragment)),
        BookingEvidence::ResultsMarker(_) => {}
    }
}
