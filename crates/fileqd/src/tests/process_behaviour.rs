//! Behavioural tests covering service launch and shutdown.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::ConfigLoader;
use crate::health::HealthReporter;
use crate::process::{LaunchError, ShutdownError, ShutdownSignal, run_service_with};
use crate::tests::support::{
    FailingConfigLoader, HealthEvent, RecordingHealthReporter, TestConfigLoader, strip_quotes,
};

const WAIT_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

type StepResult = Result<(), String>;

/// Shutdown signal released by the test instead of the operating system.
#[derive(Clone, Default)]
struct TestShutdownSignal {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl TestShutdownSignal {
    fn trigger(&self) {
        let (flag, condvar) = &*self.state;
        *flag.lock().expect("shutdown mutex poisoned") = true;
        condvar.notify_all();
    }
}

impl ShutdownSignal for TestShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let (flag, condvar) = &*self.state;
        let mut triggered = flag.lock().expect("shutdown mutex poisoned");
        while !*triggered {
            triggered = condvar.wait(triggered).expect("shutdown mutex poisoned");
        }
        Ok(())
    }
}

struct ProcessWorld {
    loader: TestConfigLoader,
    failing: bool,
    reporter: Arc<RecordingHealthReporter>,
    shutdown: TestShutdownSignal,
    handle: Option<thread::JoinHandle<Result<(), LaunchError>>>,
    result: Option<Result<(), LaunchError>>,
    occupant: Option<UnixListener>,
    response: String,
}

impl ProcessWorld {
    fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            failing: false,
            reporter: Arc::new(RecordingHealthReporter::default()),
            shutdown: TestShutdownSignal::default(),
            handle: None,
            result: None,
            occupant: None,
            response: String::new(),
        }
    }

    fn start_background(&mut self) {
        let loader = self.loader.clone();
        let reporter = self.reporter.clone() as Arc<dyn HealthReporter>;
        let shutdown = self.shutdown.clone();
        self.handle = Some(thread::spawn(move || {
            run_service_with(&loader, reporter, &shutdown)
        }));
    }

    fn run_foreground(&mut self) {
        let loader: &dyn ConfigLoader = if self.failing {
            &FailingConfigLoader
        } else {
            &self.loader
        };
        // Launch never reaches the wait when it fails, but a pre-triggered
        // signal keeps a successful launch from blocking the scenario.
        let shutdown = TestShutdownSignal::default();
        shutdown.trigger();
        let reporter = self.reporter.clone() as Arc<dyn HealthReporter>;
        self.result = Some(run_service_with(loader, reporter, &shutdown));
    }

    fn wait_for_listening(&self) -> StepResult {
        let deadline = Instant::now() + WAIT_TIMEOUT;
        while !self
            .reporter
            .recorded(|event| matches!(event, HealthEvent::ServiceListening(_)))
        {
            if Instant::now() >= deadline {
                return Err(format!(
                    "service never reported listening: {:?}",
                    self.reporter.events()
                ));
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    fn join(&mut self) -> StepResult {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| "service not running".to_owned())?;
        let result = handle
            .join()
            .map_err(|_| "service thread panicked".to_owned())?;
        self.result = Some(result);
        Ok(())
    }
}

impl Drop for ProcessWorld {
    fn drop(&mut self) {
        self.shutdown.trigger();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[fixture]
fn world() -> RefCell<ProcessWorld> {
    RefCell::new(ProcessWorld::new())
}

#[given("a service configured on a Unix socket")]
fn given_unix_service(world: &RefCell<ProcessWorld>) {
    let _ = world;
}

#[given("the service configuration cannot be loaded")]
fn given_failing_loader(world: &RefCell<ProcessWorld>) {
    world.borrow_mut().failing = true;
}

#[given("another process is listening on that socket")]
fn given_socket_occupied(world: &RefCell<ProcessWorld>) -> StepResult {
    let mut world = world.borrow_mut();
    let path = world.loader.socket_path();
    let parent = path.parent().ok_or("socket path has no parent")?;
    std::fs::create_dir_all(parent).map_err(|error| error.to_string())?;
    let listener = UnixListener::bind(path.as_std_path()).map_err(|error| error.to_string())?;
    world.occupant = Some(listener);
    Ok(())
}

#[when("the service starts")]
fn when_service_starts(world: &RefCell<ProcessWorld>) -> StepResult {
    world.borrow_mut().start_background();
    world.borrow().wait_for_listening()
}

#[when("a socket client lists directories")]
fn when_client_lists(world: &RefCell<ProcessWorld>) -> StepResult {
    let mut world = world.borrow_mut();
    let path = world.loader.socket_path();
    let mut stream = UnixStream::connect(path.as_std_path()).map_err(|error| error.to_string())?;
    stream
        .set_read_timeout(Some(WAIT_TIMEOUT))
        .map_err(|error| error.to_string())?;
    stream
        .write_all(b"dirlist -a\nquitc\n")
        .map_err(|error| error.to_string())?;
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .map_err(|error| error.to_string())?;
    world.response = response;
    Ok(())
}

#[when("shutdown is triggered")]
fn when_shutdown_triggered(world: &RefCell<ProcessWorld>) {
    world.borrow().shutdown.trigger();
}

#[when("the service runs to completion")]
fn when_service_runs(world: &RefCell<ProcessWorld>) {
    world.borrow_mut().run_foreground();
}

#[then("the service stops cleanly")]
fn then_service_stops(world: &RefCell<ProcessWorld>) -> StepResult {
    let mut world = world.borrow_mut();
    world.join()?;
    match &world.result {
        Some(Ok(())) => Ok(()),
        Some(Err(error)) => Err(format!("service failed: {error}")),
        None => Err("service result missing".to_owned()),
    }
}

#[then("the socket file is removed")]
fn then_socket_removed(world: &RefCell<ProcessWorld>) {
    let path = world.borrow().loader.socket_path();
    assert!(!path.exists(), "socket file {path} still present");
}

#[then("the client received {expected}")]
fn then_client_received(world: &RefCell<ProcessWorld>, expected: String) {
    let expected: Vec<&str> = strip_quotes(&expected).split('|').collect();
    let world = world.borrow();
    assert_eq!(world.response.lines().collect::<Vec<_>>(), expected);
}

#[then("the reporter recorded the service stopping")]
fn then_reporter_stopping(world: &RefCell<ProcessWorld>) {
    let events = world.borrow().reporter.events();
    assert!(
        events.contains(&HealthEvent::ServiceStopping),
        "stopping event missing: {events:?}"
    );
}

#[then("launch fails during bootstrap")]
fn then_launch_fails_bootstrap(world: &RefCell<ProcessWorld>) {
    let world = world.borrow();
    assert!(
        matches!(world.result, Some(Err(LaunchError::Bootstrap { .. }))),
        "expected bootstrap failure, got {:?}",
        world.result
    );
}

#[then("launch fails while binding the listener")]
fn then_launch_fails_listener(world: &RefCell<ProcessWorld>) {
    let world = world.borrow();
    assert!(
        matches!(world.result, Some(Err(LaunchError::Listener { .. }))),
        "expected listener failure, got {:?}",
        world.result
    );
}

#[scenario(path = "tests/features/service_process.feature")]
fn service_process(#[from(world)] world: RefCell<ProcessWorld>) {
    drop(world);
}
