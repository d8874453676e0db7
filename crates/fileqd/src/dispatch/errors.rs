//! Error types for request dispatch failures.
//!
//! Malformed requests and query failures are recoverable: their display text
//! is written back to the client and the connection keeps reading. Transport
//! failures and oversized requests are fatal to the connection.

use std::io;

use thiserror::Error;

use crate::query::QueryError;

/// Errors surfaced while reading, parsing or answering one request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Command token is empty or not part of the protocol.
    #[error("Invalid command")]
    UnknownCommand {
        /// Token received from the client.
        command: String,
    },

    /// Command is known but its arguments do not fit its shape.
    #[error("Invalid {command} command syntax")]
    InvalidSyntax {
        /// Canonical command name.
        command: &'static str,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// Request line exceeds the maximum size.
    #[error("Request exceeds {max_size} bytes")]
    RequestTooLarge {
        /// Bytes buffered when the limit was hit.
        size: usize,
        /// Configured limit.
        max_size: usize,
    },

    /// Query failed for a filesystem reason.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// IO error while reading from or writing to the connection.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DispatchError {
    /// Returns `true` when the connection must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_) | Self::RequestTooLarge { .. })
    }

    /// Creates an unknown command error.
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            command: command.into(),
        }
    }

    /// Creates a syntax error for `command`.
    pub fn invalid_syntax(command: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            command,
            reason: reason.into(),
        }
    }

    /// Creates a request too large error.
    pub fn request_too_large(size: usize, max_size: usize) -> Self {
        Self::RequestTooLarge { size, max_size }
    }
}
