//! Per-connection request loop.
//!
//! A worker owns one client stream and answers its requests strictly in
//! order: read a line, dispatch it, write the response, repeat. The loop ends
//! on `quitc`, end of stream, or a transport failure. Malformed requests and
//! query failures are answered and the loop carries on.

use std::io::{self, Read, Write};
use std::net::Shutdown;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::transport::ConnectionStream;

use super::errors::DispatchError;
use super::request::CommandRequest;
use super::response::ResponseWriter;
use super::router::{CommandRouter, DISPATCH_TARGET, DispatchOutcome};

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 4 * 1024;

const READ_CHUNK_BYTES: usize = 1024;

/// Runs the read-dispatch-respond loop for accepted connections.
#[derive(Debug, Clone)]
pub struct ConnectionWorker {
    router: Arc<CommandRouter>,
    timeout: Option<Duration>,
}

impl ConnectionWorker {
    /// Creates a worker applying `timeout` as read and write deadline.
    pub fn new(router: Arc<CommandRouter>, timeout: Option<Duration>) -> Self {
        Self { router, timeout }
    }

    /// Read and write deadline applied to every served stream.
    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Serves `stream` until the client quits or disconnects.
    pub(crate) fn serve(&self, mut stream: ConnectionStream, sequence: u64) {
        if let Err(error) = stream.set_timeouts(self.timeout) {
            warn!(target: DISPATCH_TARGET, sequence, %error, "failed to apply deadlines");
        }

        let mut reader = RequestReader::default();
        let mut served = 0_usize;
        loop {
            let line = match reader.next_line(&mut stream) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!(target: DISPATCH_TARGET, sequence, "client disconnected");
                    break;
                }
                Err(error) => {
                    if matches!(error, DispatchError::RequestTooLarge { .. })
                        && let Err(reply) = ResponseWriter::new(&mut stream).write_error(&error)
                    {
                        debug!(
                            target: DISPATCH_TARGET,
                            sequence,
                            error = %reply,
                            "failed to send rejection"
                        );
                    }
                    warn!(target: DISPATCH_TARGET, sequence, %error, "failed to read request");
                    break;
                }
            };

            served += 1;
            match self.dispatch(&line, &mut stream) {
                Ok(DispatchOutcome::Continue) => {}
                Ok(DispatchOutcome::Close) => {
                    debug!(target: DISPATCH_TARGET, sequence, "client quit");
                    break;
                }
                Err(error) => {
                    warn!(target: DISPATCH_TARGET, sequence, %error, "connection failed");
                    break;
                }
            }
        }

        if let Err(error) = stream.shutdown(Shutdown::Both)
            && error.kind() != io::ErrorKind::NotConnected
        {
            debug!(target: DISPATCH_TARGET, sequence, %error, "failed to shut down stream");
        }
        info!(target: DISPATCH_TARGET, sequence, requests = served, "connection closed");
    }

    /// Answers one request line. Only fatal errors are returned.
    fn dispatch<W: Write>(
        &self,
        line: &[u8],
        stream: W,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut writer = ResponseWriter::new(stream);
        let result = CommandRequest::parse(line)
            .and_then(CommandRequest::into_command)
            .and_then(|command| self.router.route(&command, &mut writer));

        match result {
            Ok(outcome) => Ok(outcome),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => {
                debug!(target: DISPATCH_TARGET, %error, "request rejected");
                writer.write_error(&error)?;
                Ok(DispatchOutcome::Continue)
            }
        }
    }
}

/// Splits a byte stream into request lines, keeping bytes read past a
/// newline for the next call.
#[derive(Debug, Default)]
pub(crate) struct RequestReader {
    pending: Vec<u8>,
    exhausted: bool,
}

impl RequestReader {
    /// Returns the next line without its terminator, or `None` at end of
    /// stream. A final unterminated line is still returned.
    pub(crate) fn next_line<R: Read>(
        &mut self,
        source: &mut R,
    ) -> Result<Option<Vec<u8>>, DispatchError> {
        loop {
            if let Some(position) = self.pending.iter().position(|byte| *byte == b'\n') {
                enforce_limit(position)?;
                let mut line: Vec<u8> = self.pending.drain(..=position).collect();
                line.pop();
                return Ok(Some(line));
            }
            enforce_limit(self.pending.len())?;

            if self.exhausted {
                return Ok((!self.pending.is_empty()).then(|| std::mem::take(&mut self.pending)));
            }

            let mut chunk = [0_u8; READ_CHUNK_BYTES];
            let read = read_with_retry(source, &mut chunk)?;
            if read == 0 {
                self.exhausted = true;
            } else {
                self.pending.extend_from_slice(&chunk[..read]);
            }
        }
    }
}

fn read_with_retry<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

fn enforce_limit(size: usize) -> Result<(), DispatchError> {
    if size > MAX_REQUEST_BYTES {
        return Err(DispatchError::request_too_large(size, MAX_REQUEST_BYTES));
    }
    Ok(())
}
