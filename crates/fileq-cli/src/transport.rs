//! Socket transport for the client.
//!
//! [`Connection`] hides whether the server listens on TCP or a Unix socket.
//! The protocol carries no framing, so [`Connection::receive`] treats one
//! blocking read plus whatever follows within a short idle window as a
//! complete response.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use fileq_config::SocketEndpoint;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use crate::errors::{AppError, is_disconnect};

pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Quiet period after which a response is considered complete.
pub(crate) const IDLE_WINDOW: Duration = Duration::from_millis(150);

const READ_CHUNK_BYTES: usize = 4096;

pub(crate) enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

/// Text received from the server in one exchange.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Received {
    pub(crate) text: String,
    /// The server closed its side while or before sending `text`.
    pub(crate) closed: bool,
}

impl Connection {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(timeout),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_read_timeout(timeout),
        }
    }

    /// Sends one command line.
    pub(crate) fn send(&mut self, command: &str) -> io::Result<()> {
        let mut line = String::with_capacity(command.len() + 1);
        line.push_str(command);
        line.push('\n');
        self.write_all(line.as_bytes())?;
        self.flush()
    }

    /// Reads the next response.
    ///
    /// `first_wait` bounds the wait for the first byte; `None` blocks until
    /// data or end of stream arrives. An expired first wait yields an empty,
    /// open [`Received`].
    pub(crate) fn receive(&mut self, first_wait: Option<Duration>) -> io::Result<Received> {
        let mut bytes = Vec::new();
        let mut chunk = [0_u8; READ_CHUNK_BYTES];

        self.set_read_timeout(first_wait)?;
        match self.read_chunk(&mut chunk) {
            Chunk::Data(read) => bytes.extend_from_slice(&chunk[..read]),
            Chunk::Closed => return Ok(closed(bytes)),
            Chunk::Idle => return Ok(Received::default()),
            Chunk::Failed(error) => return Err(error),
        }

        self.set_read_timeout(Some(IDLE_WINDOW))?;
        loop {
            match self.read_chunk(&mut chunk) {
                Chunk::Data(read) => bytes.extend_from_slice(&chunk[..read]),
                Chunk::Closed => return Ok(closed(bytes)),
                Chunk::Idle => break,
                Chunk::Failed(error) => return Err(error),
            }
        }
        Ok(Received {
            text: String::from_utf8_lossy(&bytes).into_owned(),
            closed: false,
        })
    }

    fn read_chunk(&mut self, chunk: &mut [u8]) -> Chunk {
        loop {
            match self.read(chunk) {
                Ok(0) => return Chunk::Closed,
                Ok(read) => return Chunk::Data(read),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error)
                    if matches!(
                        error.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Chunk::Idle;
                }
                Err(error) if is_disconnect(&error) => return Chunk::Closed,
                Err(error) => return Chunk::Failed(error),
            }
        }
    }
}

enum Chunk {
    Data(usize),
    Closed,
    Idle,
    Failed(io::Error),
}

fn closed(bytes: Vec<u8>) -> Received {
    Received {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        closed: true,
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

pub(crate) fn connect(endpoint: &SocketEndpoint) -> Result<Connection, AppError> {
    match endpoint {
        SocketEndpoint::Tcp { host, port } => {
            let address = resolve_tcp_address(host, *port).map_err(|source| AppError::Resolve {
                endpoint: endpoint.to_string(),
                source,
            })?;
            TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
                .map(Connection::Tcp)
                .map_err(|source| AppError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })
        }
        SocketEndpoint::Unix { path } => {
            #[cfg(unix)]
            {
                connect_unix(path.as_str()).map_err(|source| AppError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                })
            }

            #[cfg(not(unix))]
            {
                let _ = path;
                Err(AppError::UnsupportedUnixTransport(endpoint.to_string()))
            }
        }
    }
}

fn resolve_tcp_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

#[cfg(unix)]
fn connect_unix(path: &str) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, CONNECTION_TIMEOUT)?;
    let stream: UnixStream = std::os::fd::OwnedFd::from(socket).into();
    Ok(Connection::Unix(stream))
}
