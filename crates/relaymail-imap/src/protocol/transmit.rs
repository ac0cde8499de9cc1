//! Outgoing data and the transport seam.
//!
//! The session never touches a socket. It hands every line it wants on the
//! wire to a [`Transport`] as a [`Transmit`], in order.

// Bytes methods aren't const.
#![allow(clippy::missing_const_for_fn)]

use bytes::{BufMut, Bytes, BytesMut};

use crate::Result;
use crate::command::CommandLine;
use crate::future::ImapFuture;

/// Data to transmit to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmit {
    /// Raw bytes to send, CRLF included.
    pub data: Bytes,
    /// Whether the bytes carry credentials.
    pub sensitive: bool,
}

impl Transmit {
    /// Creates a transmit that is safe to log.
    #[must_use]
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            sensitive: false,
        }
    }

    /// Builds the first line of a command: `tag SP line`.
    #[must_use]
    pub fn tagged(tag: &str, line: &CommandLine) -> Self {
        let mut buf = BytesMut::with_capacity(tag.len() + 1 + line.bytes.len());
        buf.put_slice(tag.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(&line.bytes);
        Self {
            data: buf.freeze(),
            sensitive: line.sensitive,
        }
    }

    /// Returns the data as a string slice, if valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Returns the length of the data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the transmit is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<CommandLine> for Transmit {
    fn from(line: CommandLine) -> Self {
        Self {
            data: line.bytes,
            sensitive: line.sensitive,
        }
    }
}

impl AsRef<[u8]> for Transmit {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Where the session writes.
///
/// Writes must reach the wire in call order. `write` is called while the
/// session lock is held, so it must not call back into the session; an
/// implementation typically pushes onto a channel drained by a writer task.
pub trait Transport: Send + Sync {
    /// Queues bytes for the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is already gone.
    fn write(&self, transmit: Transmit) -> Result<()>;

    /// Shuts the transport down. Resolves once the socket is closed.
    fn close(&self) -> ImapFuture<bool>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn write(&self, transmit: Transmit) -> Result<()> {
        (**self).write(transmit)
    }

    fn close(&self) -> ImapFuture<bool> {
        (**self).close()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tagged_prefixes_tag() {
        let t = Transmit::tagged("A0001", &CommandLine::new(&b"NOOP\r\n"[..]));
        assert_eq!(t.as_str(), Some("A0001 NOOP\r\n"));
        assert_eq!(t.len(), 12);
        assert!(!t.sensitive);
    }

    #[test]
    fn sensitivity_travels_with_the_line() {
        let line = CommandLine::sensitive(&b"LOGIN u p\r\n"[..]);
        assert!(Transmit::tagged("A1", &line).sensitive);
        assert!(Transmit::from(line).sensitive);
    }

    #[test]
    fn empty_and_binary() {
        assert!(Transmit::new(Bytes::new()).is_empty());
        let t = Transmit::new(vec![0xff, 0xfe]);
        assert_eq!(t.as_str(), None);
        assert_eq!(t.as_ref(), &[0xff, 0xfe]);
    }
}
