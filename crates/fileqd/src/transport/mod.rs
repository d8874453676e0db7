//! Socket transport for service endpoints.
//!
//! The transport module binds the configured endpoint, accepts connections on
//! a background thread and hands each one to a [`ConnectionHandler`]. It also
//! dials other service instances when the distributor proxies a connection.

mod connect;
mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub(crate) use self::connect::connect;
pub use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionHandler, ConnectionStream};
#[cfg(test)]
pub(crate) use self::listener::ListenerHandle;
pub(crate) use self::listener::SocketListener;
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
