//! Cucumber scenarios for the YATRIK front end
//!
//! Runs every `.feature` file under `tests/features/`. Scenarios use the
//! simulated front end unless `YATRIK_DRIVER=webdriver`, in which case they
//! drive the browser behind `YATRIK_WEBDRIVER_URL` against `YATRIK_BASE_URL`.
//!
//! To run these tests:
//!   cargo test --test cucumber
//!
//! Each scenario owns its browser; the `after` hook tears it down (screenshot,
//! then quit) whether the scenario passed or failed.

use cucumber::World as _;
use futures::FutureExt;

mod bdd;

use bdd::world::YatrikWorld;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    yatrik_e2e::telemetry::init_tracing("warn");

    YatrikWorld::cucumber()
        .fail_on_skipped()
        // One browser at a time
        .max_concurrent_scenarios(1)
        .before(|_feature, _rule, scenario, world| {
            world.set_scenario(&scenario.name);
            async {}.boxed_local()
        })
        .after(|_feature, _rule, _scenario, _finished, world| {
            async move {
                if let Some(world) = world {
                    world.finish().await;
                }
            }
            .boxed_local()
        })
        .run_and_exit("tests/features")
        .await;
}
