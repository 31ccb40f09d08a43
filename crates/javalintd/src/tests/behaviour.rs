//! Behavioural tests for the daemon bootstrap sequence.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use super::support::{self, HealthEvent, TestWorld};

#[fixture]
fn world() -> RefCell<TestWorld> {
    support::world()
}

#[given("a healthy configuration loader")]
fn given_healthy_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_successful_loader();
}

#[given("a failing configuration loader")]
fn given_failing_loader(world: &RefCell<TestWorld>) {
    world.borrow_mut().use_failing_loader();
}

#[given("no Java compiler is installed")]
fn given_no_compiler(world: &RefCell<TestWorld>) {
    world.borrow_mut().remove_toolchain();
}

#[when("the daemon bootstrap runs")]
fn when_bootstrap_runs(world: &RefCell<TestWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    assert!(
        world.bootstrap_error().is_none(),
        "bootstrap error: {:?}",
        world.bootstrap_error()
    );
    assert!(world.daemon().is_some(), "daemon should have been initialised");
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<TestWorld>) {
    assert!(
        world.borrow().bootstrap_error().is_some(),
        "bootstrap succeeded unexpectedly"
    );
}

#[then("the compiler is ready")]
fn then_compiler_ready(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let daemon = world.daemon().expect("daemon missing");
    assert!(daemon.toolchain_ready(), "compiler should be ready");
}

#[then("the compiler is unavailable")]
fn then_compiler_unavailable(world: &RefCell<TestWorld>) {
    let world = world.borrow();
    let daemon = world.daemon().expect("daemon missing");
    assert!(!daemon.toolchain_ready(), "compiler should be unavailable");
}

#[then("the reporter recorded bootstrap start")]
fn then_reporter_start(world: &RefCell<TestWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .events()
            .contains(&HealthEvent::BootstrapStarting),
        "bootstrap start event missing"
    );
}

#[then("the reporter recorded bootstrap success")]
fn then_reporter_success(world: &RefCell<TestWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .events()
            .contains(&HealthEvent::BootstrapSucceeded),
        "bootstrap success event missing"
    );
}

#[then("the reporter recorded bootstrap failure")]
fn then_reporter_failure(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    let failed = events
        .iter()
        .any(|event| matches!(event, HealthEvent::BootstrapFailed(_)));
    assert!(failed, "bootstrap failure event missing: {events:?}");
}

#[then("the reporter recorded that the compiler is unavailable")]
fn then_reporter_toolchain_unavailable(world: &RefCell<TestWorld>) {
    let events = world.borrow().reporter.events();
    let missing = events
        .iter()
        .any(|event| matches!(event, HealthEvent::ToolchainUnavailable(_)));
    assert!(missing, "toolchain event missing: {events:?}");
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Bootstrap succeeds with a healthy configuration"
)]
fn bootstrap_succeeds(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "Bootstrap fails when the configuration is invalid"
)]
fn bootstrap_fails(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_bootstrap.feature",
    name = "A missing compiler does not stop bootstrap"
)]
fn bootstrap_without_compiler(world: RefCell<TestWorld>) {
    drop(world);
}
