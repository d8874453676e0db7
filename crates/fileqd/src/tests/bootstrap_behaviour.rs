//! Behavioural tests for the bootstrap sequence.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::{BootstrapError, ConfigLoader, Service, bootstrap_with};
use crate::tests::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader, strip_quotes,
};

type StepResult = Result<(), String>;

struct BootstrapWorld {
    loader: TestConfigLoader,
    failing: bool,
    reporter: Arc<RecordingHealthReporter>,
    result: Option<Result<Service, BootstrapError>>,
}

impl BootstrapWorld {
    fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            failing: false,
            reporter: Arc::new(RecordingHealthReporter::default()),
            result: None,
        }
    }

    fn bootstrap(&mut self) {
        let loader: &dyn ConfigLoader = if self.failing {
            &FailingConfigLoader
        } else {
            &self.loader
        };
        self.result = Some(bootstrap_with(loader, self.reporter.clone()));
    }

    fn error(&self) -> Result<&BootstrapError, String> {
        match &self.result {
            Some(Err(error)) => Ok(error),
            Some(Ok(_)) => Err("bootstrap succeeded unexpectedly".to_owned()),
            None => Err("bootstrap has not run".to_owned()),
        }
    }
}

#[fixture]
fn world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::new())
}

#[given("a valid service configuration")]
fn given_valid_configuration(world: &RefCell<BootstrapWorld>) {
    let _ = world;
}

#[given("a configuration loader that fails")]
fn given_failing_loader(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().failing = true;
}

#[given("the worker limit is {limit}")]
fn given_worker_limit(world: &RefCell<BootstrapWorld>, limit: usize) {
    world
        .borrow_mut()
        .loader
        .adjust(|config| config.max_workers = limit);
}

#[given("the root directory does not exist")]
fn given_missing_root(world: &RefCell<BootstrapWorld>) {
    let mut world = world.borrow_mut();
    let missing = world.loader.root().path().join("absent");
    world.loader.adjust(|config| config.root = missing);
}

#[given("the root directory is a regular file")]
fn given_file_root(world: &RefCell<BootstrapWorld>) {
    let mut world = world.borrow_mut();
    let file = world.loader.root().path().join("notes.txt");
    world.loader.adjust(|config| config.root = file);
}

#[when("the service bootstraps")]
fn when_bootstraps(world: &RefCell<BootstrapWorld>) {
    world.borrow_mut().bootstrap();
}

#[then("bootstrap succeeds")]
fn then_bootstrap_succeeds(world: &RefCell<BootstrapWorld>) -> StepResult {
    let world = world.borrow();
    match &world.result {
        Some(Ok(service)) => {
            if service.config().root() == world.loader.root().path() {
                Ok(())
            } else {
                Err(format!("unexpected root {}", service.config().root()))
            }
        }
        Some(Err(error)) => Err(format!("bootstrap failed: {error}")),
        None => Err("bootstrap has not run".to_owned()),
    }
}

#[then("bootstrap fails")]
fn then_bootstrap_fails(world: &RefCell<BootstrapWorld>) -> StepResult {
    world.borrow().error().map(|_| ())
}

#[then("bootstrap fails with {message}")]
fn then_bootstrap_fails_with(world: &RefCell<BootstrapWorld>, message: String) -> StepResult {
    let expected = strip_quotes(&message);
    let world = world.borrow();
    let rendered = world.error()?.to_string();
    if rendered.contains(expected) {
        Ok(())
    } else {
        Err(format!("expected '{expected}' in '{rendered}'"))
    }
}

#[then("the reporter recorded bootstrap start")]
fn then_reporter_start(world: &RefCell<BootstrapWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .recorded(|event| *event == HealthEvent::BootstrapStarting),
        "bootstrap start event missing"
    );
}

#[then("the reporter recorded bootstrap success")]
fn then_reporter_success(world: &RefCell<BootstrapWorld>) {
    assert!(
        world
            .borrow()
            .reporter
            .recorded(|event| *event == HealthEvent::BootstrapSucceeded),
        "bootstrap success event missing"
    );
}

#[then("the reporter recorded bootstrap failure")]
fn then_reporter_failure(world: &RefCell<BootstrapWorld>) {
    let events = world.borrow().reporter.events();
    let failed = events
        .iter()
        .any(|event| matches!(event, HealthEvent::BootstrapFailed(_)));
    assert!(failed, "bootstrap failure event missing: {events:?}");
}

#[scenario(path = "tests/features/service_bootstrap.feature")]
fn service_bootstrap(#[from(world)] world: RefCell<BootstrapWorld>) {
    drop(world);
}
