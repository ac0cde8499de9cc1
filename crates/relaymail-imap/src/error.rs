//! Error types for the IMAP engine.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::command::CommandType;

/// Errors that can occur while encoding commands, driving a session,
/// or mapping responses.
///
/// The type is `Clone` so that a single failure can be delivered to
/// every observer of an [`ImapFuture`](crate::ImapFuture).
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// I/O error during network operations.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(String),

    /// Connecting to the server did not finish in time.
    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// Protocol parsing error.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte position where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Malformed command arguments, non-ASCII outside a literal, empty
    /// required data, or a server response that cannot be mapped.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Continuation or termination requested from a command that does
    /// not model it.
    #[error("{operation} is not supported for {command:?}")]
    OperationNotSupportedForCommand {
        /// The command that was asked.
        command: CommandType,
        /// The unsupported operation.
        operation: &'static str,
    },

    /// The response mapper was asked for a result type it does not know.
    #[error("Unknown parse result type: {0}")]
    UnknownParseResultType(String),

    /// The exchange was aborted because the session was torn down.
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// A command was executed while another one is still in flight.
    #[error("Another command is in flight")]
    Busy,

    /// Waiting for a result timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The result was cancelled by its observer.
    #[error("Operation cancelled")]
    Cancelled,

    /// Protocol violation or unexpected data.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns `true` for failures that originate in the transport.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Tls(_) | Self::InvalidDnsName(_) | Self::ConnectTimeout(_)
        )
    }

    pub(crate) fn not_supported(command: CommandType, operation: &'static str) -> Self {
        Self::OperationNotSupportedForCommand { command, operation }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

impl From<rustls::pki_types::InvalidDnsNameError> for Error {
    fn from(e: rustls::pki_types::InvalidDnsNameError) -> Self {
        Self::InvalidDnsName(e.to_string())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
