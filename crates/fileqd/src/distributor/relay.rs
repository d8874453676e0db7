//! Byte relay between a client and a mirror instance.

use std::io;
use std::net::Shutdown;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::transport::ConnectionStream;

use super::DISTRIBUTOR_TARGET;

/// Bytes moved in each direction by a finished relay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RelayStats {
    pub(crate) to_upstream: u64,
    pub(crate) to_client: u64,
}

/// Copies bytes both ways until the upstream side closes.
///
/// `timeout` becomes the read and write deadline of both streams, so a
/// client that stalls releases the relay threads. Client bytes flow upstream on a helper thread; when the client stops
/// sending, the upstream write half is shut so the mirror sees end of stream.
/// Once the mirror closes, both streams are shut down, which also ends the
/// helper thread.
pub(crate) fn relay(
    client: ConnectionStream,
    upstream: ConnectionStream,
    sequence: u64,
    timeout: Option<Duration>,
) -> io::Result<RelayStats> {
    client.set_timeouts(timeout)?;
    upstream.set_timeouts(timeout)?;
    let mut client_reader = client.try_clone()?;
    let mut upstream_writer = upstream.try_clone()?;
    let forward = thread::Builder::new()
        .name(format!("fileq-relay-{sequence}"))
        .spawn(move || {
            let copied = io::copy(&mut client_reader, &mut upstream_writer);
            if let Err(error) = upstream_writer.shutdown(Shutdown::Write)
                && error.kind() != io::ErrorKind::NotConnected
            {
                debug!(
                    target: DISTRIBUTOR_TARGET,
                    sequence,
                    %error,
                    "failed to half-close mirror"
                );
            }
            copied
        })?;

    let mut upstream_reader = upstream;
    let mut client_writer = client;
    let backward = io::copy(&mut upstream_reader, &mut client_writer);

    for stream in [&client_writer, &upstream_reader] {
        if let Err(error) = stream.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            debug!(target: DISTRIBUTOR_TARGET, sequence, %error, "relay shutdown failed");
        }
    }

    let to_upstream = match forward.join() {
        Ok(copied) => copied.unwrap_or_else(|error| {
            debug!(target: DISTRIBUTOR_TARGET, sequence, %error, "client side of relay failed");
            0
        }),
        Err(_) => 0,
    };
    Ok(RelayStats {
        to_upstream,
        to_client: backward?,
    })
}
