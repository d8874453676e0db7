//! Minimal line client used to talk to listeners under test.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sends `requests` verbatim and returns everything the server writes before
/// closing the connection.
pub fn converse(address: SocketAddr, requests: &str) -> String {
    let mut stream = TcpStream::connect(address).expect("connect to listener");
    stream
        .set_read_timeout(Some(CLIENT_TIMEOUT))
        .expect("set read timeout");
    if !requests.is_empty() {
        stream
            .write_all(requests.as_bytes())
            .expect("write requests");
    }
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .expect("read responses");
    response
}

/// Strips surrounding double quotes from a step argument.
pub fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}
