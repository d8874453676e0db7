//! Outbound connections to other service instances.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use fileq_config::SocketEndpoint;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use super::{ConnectionStream, ListenerError};

/// Opens a stream to `endpoint`, giving up after `timeout`.
pub(crate) fn connect(
    endpoint: &SocketEndpoint,
    timeout: Duration,
) -> Result<ConnectionStream, ListenerError> {
    let failed = |source: io::Error| ListenerError::Connect {
        endpoint: endpoint.to_string(),
        source,
    };
    match endpoint {
        SocketEndpoint::Tcp { host, port } => {
            let address = resolve_tcp(host, *port)?;
            TcpStream::connect_timeout(&address, timeout)
                .map(ConnectionStream::Tcp)
                .map_err(failed)
        }
        #[cfg(unix)]
        SocketEndpoint::Unix { path } => connect_unix(path.as_str(), timeout).map_err(failed),
        #[cfg(not(unix))]
        SocketEndpoint::Unix { .. } => Err(ListenerError::UnsupportedUnix {
            endpoint: endpoint.to_string(),
        }),
    }
}

/// Resolves the first usable address for a TCP endpoint.
pub(super) fn resolve_tcp(host: &str, port: u16) -> Result<SocketAddr, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    addrs
        .find(|addr| matches!(addr, SocketAddr::V4(_) | SocketAddr::V6(_)))
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })
}

#[cfg(unix)]
fn connect_unix(path: &str, timeout: Duration) -> io::Result<ConnectionStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, timeout)?;
    Ok(ConnectionStream::Unix(std::os::fd::OwnedFd::from(socket).into()))
}
