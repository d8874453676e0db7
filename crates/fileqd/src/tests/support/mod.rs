//! Shared harness for the behavioural suites.

mod client;
mod config_loader;
mod reporter;
mod tree;

pub use client::{converse, strip_quotes};
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use tree::FixtureRoot;
