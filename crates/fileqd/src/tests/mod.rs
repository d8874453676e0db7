//! Behavioural suites for the file-query service.

mod bootstrap_behaviour;
#[cfg(unix)]
mod process_behaviour;
mod support;
