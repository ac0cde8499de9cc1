//! Literal framing (RFC 3501 §4.3, RFC 7888).
//!
//! A command holding literals is built as a list of wire chunks. The first
//! chunk is the command line; every synchronizing literal ends a chunk, so
//! the next one is only sent once the server answers with `+`. Non-sync
//! literals stay inline.

use std::collections::VecDeque;

use super::CRLF;

/// How a literal is announced to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralMode {
    /// `{n}`: wait for a continuation before sending the payload.
    Sync,
    /// `{n+}` (LITERAL+): send the payload right away.
    NonSync,
    /// `{n-}` (LITERAL-): like `NonSync`, limited to small payloads.
    NonSyncMinus,
}

impl LiteralMode {
    /// Returns true if the server must send `+` before the payload.
    #[must_use]
    pub const fn is_sync(self) -> bool {
        matches!(self, Self::Sync)
    }

    /// Writes the `{n}` prefix for a payload of `len` bytes, without CRLF.
    pub fn write_prefix(self, buf: &mut Vec<u8>, len: usize) {
        let marker = match self {
            Self::Sync => "",
            Self::NonSync => "+",
            Self::NonSyncMinus => "-",
        };
        buf.extend_from_slice(format!("{{{len}{marker}}}").as_bytes());
    }
}

/// Accumulates a command and splits it at synchronizing literals.
#[derive(Debug, Default)]
pub(crate) struct LineBuilder {
    done: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl LineBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Buffer of the chunk under construction, for the argument writers.
    pub(crate) const fn buf(&mut self) -> &mut Vec<u8> {
        &mut self.current
    }

    pub(crate) fn push(&mut self, bytes: &[u8]) -> &mut Self {
        self.current.extend_from_slice(bytes);
        self
    }

    pub(crate) fn sp(&mut self) -> &mut Self {
        self.current.push(b' ');
        self
    }

    /// Appends a literal. A sync literal closes the current chunk after
    /// its prefix and starts the next chunk with the payload.
    pub(crate) fn literal(&mut self, payload: &[u8], mode: LiteralMode) -> &mut Self {
        mode.write_prefix(&mut self.current, payload.len());
        self.current.extend_from_slice(CRLF);
        if mode.is_sync() {
            self.done.push(std::mem::take(&mut self.current));
        }
        self.current.extend_from_slice(payload);
        self
    }

    /// Terminates the command with CRLF and returns its chunks in send order.
    pub(crate) fn finish(mut self) -> VecDeque<Vec<u8>> {
        self.current.extend_from_slice(CRLF);
        self.done.push(self.current);
        self.done.into()
    }
}
