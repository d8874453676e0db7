//! Connection distribution across the primary and its mirrors.
//!
//! The distributor is the listener's connection handler. It numbers every
//! accepted connection in accept order and asks the [`DistributionPolicy`]
//! which [`Tier`] owns it. Primary-tier connections need a permit from the
//! local [`WorkerPool`] and run on their own thread; when the pool is full the
//! client is told the server is busy and the connection is closed. Mirror-tier
//! connections are proxied to the mirror endpoint on a dedicated thread.

mod pool;
mod relay;
mod tier;

use std::io::{self, Write};
use std::net::Shutdown;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use fileq_config::SocketEndpoint;
use tracing::{debug, info, warn};

use crate::dispatch::ConnectionWorker;
use crate::transport::{ConnectionHandler, ConnectionStream, connect};

pub use self::pool::{WorkerPermit, WorkerPool};
pub use self::tier::{DistributionPolicy, Tier};

/// Tracing target for distribution decisions.
pub(crate) const DISTRIBUTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::distributor");

/// How long the primary waits for a mirror to accept a proxied connection.
pub(crate) const MIRROR_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sent when every local worker is busy.
pub const BUSY_MESSAGE: &str = "Server is busy. Try again later.\n";
/// Sent when a mirror endpoint cannot be reached.
pub const MIRROR_UNAVAILABLE_MESSAGE: &str = "Mirror service unavailable. Try again later.\n";

/// Bookkeeping for one accepted connection.
///
/// A slot lives from accept until its worker or proxy thread finishes. Local
/// slots hold a [`WorkerPermit`], so dropping the slot frees pool capacity.
#[derive(Debug)]
pub(crate) struct ConnectionSlot {
    sequence: u64,
    tier: Tier,
    stream: ConnectionStream,
    permit: Option<WorkerPermit>,
}

impl ConnectionSlot {
    fn serve_locally(self, worker: &ConnectionWorker) {
        let Self {
            sequence, stream, permit, ..
        } = self;
        worker.serve(stream, sequence);
        drop(permit);
    }

    fn proxy_to(
        self,
        endpoint: &SocketEndpoint,
        connect_timeout: Duration,
        io_timeout: Option<Duration>,
    ) {
        let Self {
            sequence,
            tier,
            stream,
            ..
        } = self;
        let upstream = match connect(endpoint, connect_timeout) {
            Ok(upstream) => upstream,
            Err(error) => {
                warn!(
                    target: DISTRIBUTOR_TARGET,
                    sequence,
                    %tier,
                    %error,
                    "mirror unreachable"
                );
                reject(stream, MIRROR_UNAVAILABLE_MESSAGE, sequence);
                return;
            }
        };
        match relay::relay(stream, upstream, sequence, io_timeout) {
            Ok(stats) => debug!(
                target: DISTRIBUTOR_TARGET,
                sequence,
                %tier,
                to_upstream = stats.to_upstream,
                to_client = stats.to_client,
                "proxied connection finished"
            ),
            Err(error) => warn!(
                target: DISTRIBUTOR_TARGET,
                sequence,
                %tier,
                %error,
                "proxied connection failed"
            ),
        }
    }
}

/// Assigns accepted connections to local workers or mirror proxies.
#[derive(Debug)]
pub(crate) struct Distributor {
    policy: DistributionPolicy,
    pool: WorkerPool,
    worker: ConnectionWorker,
    connect_timeout: Duration,
    next_sequence: AtomicU64,
}

impl Distributor {
    pub(crate) fn new(
        policy: DistributionPolicy,
        pool: WorkerPool,
        worker: ConnectionWorker,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            policy,
            pool,
            worker,
            connect_timeout,
            next_sequence: AtomicU64::new(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn admit(&self, sequence: u64, stream: ConnectionStream) {
        let Some(permit) = self.pool.try_acquire() else {
            info!(
                target: DISTRIBUTOR_TARGET,
                sequence,
                capacity = self.pool.capacity(),
                "worker pool full, rejecting connection"
            );
            reject(stream, BUSY_MESSAGE, sequence);
            return;
        };
        let slot = ConnectionSlot {
            sequence,
            tier: Tier::Primary,
            stream,
            permit: Some(permit),
        };
        let worker = self.worker.clone();
        let spawned = thread::Builder::new()
            .name(format!("fileq-worker-{sequence}"))
            .spawn(move || slot.serve_locally(&worker));
        if let Err(error) = spawned {
            warn!(target: DISTRIBUTOR_TARGET, sequence, %error, "failed to spawn worker");
        }
    }

    fn forward(&self, sequence: u64, tier: Tier, stream: ConnectionStream) {
        let Some(endpoint) = self.policy.mirror_endpoint(tier).cloned() else {
            self.admit(sequence, stream);
            return;
        };
        let slot = ConnectionSlot {
            sequence,
            tier,
            stream,
            permit: None,
        };
        let connect_timeout = self.connect_timeout;
        let io_timeout = self.worker.timeout();
        let spawned = thread::Builder::new()
            .name(format!("fileq-proxy-{sequence}"))
            .spawn(move || slot.proxy_to(&endpoint, connect_timeout, io_timeout));
        if let Err(error) = spawned {
            warn!(target: DISTRIBUTOR_TARGET, sequence, %error, "failed to spawn proxy");
        }
    }
}

impl ConnectionHandler for Distributor {
    fn handle(&self, stream: ConnectionStream) {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        let tier = self.policy.tier_for(sequence);
        debug!(target: DISTRIBUTOR_TARGET, sequence, %tier, "connection accepted");
        match tier {
            Tier::Primary => self.admit(sequence, stream),
            Tier::MirrorOne | Tier::MirrorTwo => self.forward(sequence, tier, stream),
        }
    }
}

/// Writes a refusal and closes the connection without reading from it.
fn reject(mut stream: ConnectionStream, message: &str, sequence: u64) {
    if let Err(error) = stream
        .write_all(message.as_bytes())
        .and_then(|()| stream.flush())
    {
        debug!(target: DISTRIBUTOR_TARGET, sequence, %error, "failed to send refusal");
    }
    if let Err(error) = stream.shutdown(Shutdown::Both)
        && error.kind() != io::ErrorKind::NotConnected
    {
        debug!(
            target: DISTRIBUTOR_TARGET,
            sequence,
            %error,
            "failed to close refused connection"
        );
    }
}
