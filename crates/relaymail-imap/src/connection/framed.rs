//! Record framing for the read side of a connection.
//!
//! A server record is one CRLF-terminated line, extended by every literal
//! announced at the end of a line: `{n}\r\n` is followed by exactly `n`
//! bytes and then the rest of the record.

#![allow(clippy::missing_errors_doc)]

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::{Error, Result};

const READ_BUFFER_SIZE: usize = 8192;

/// Longest line accepted between literals.
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Largest literal accepted.
pub const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024;

/// Buffered reader that yields whole records.
pub struct FramedStream<S> {
    reader: BufReader<S>,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + Unpin,
{
    /// Wraps a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(READ_BUFFER_SIZE, stream),
        }
    }

    /// Reads the next record, literals included.
    ///
    /// Returns `Ok(None)` when the peer closes the stream between records.
    /// A close in the middle of a record is an error.
    pub async fn read_record(&mut self) -> Result<Option<Bytes>> {
        let mut record = BytesMut::new();

        loop {
            let Some(line) = self.read_line().await? else {
                if record.is_empty() {
                    return Ok(None);
                }
                return Err(Error::ConnectionClosed(
                    "stream ended inside a record".to_string(),
                ));
            };
            record.extend_from_slice(&line);

            let Some(len) = literal_length(&line) else {
                return Ok(Some(record.freeze()));
            };
            if len > MAX_LITERAL_SIZE {
                return Err(Error::Protocol(format!(
                    "literal of {len} bytes exceeds {MAX_LITERAL_SIZE}"
                )));
            }

            let start = record.len();
            record.resize(start + len, 0);
            self.reader.read_exact(&mut record[start..]).await?;
        }
    }

    /// Reads up to and including the next CRLF. `None` on EOF before any
    /// byte of the line.
    async fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                return Err(Error::ConnectionClosed(
                    "stream ended inside a line".to_string(),
                ));
            }

            // CR may be the last byte of the previous chunk
            let search_from = line.len().saturating_sub(1);
            line.extend_from_slice(buf);
            let consumed = buf.len();

            if let Some(pos) = find_crlf(&line[search_from..]) {
                let end = search_from + pos + 2;
                let overshoot = line.len() - end;
                line.truncate(end);
                self.reader.consume(consumed - overshoot);
                return Ok(Some(line));
            }
            self.reader.consume(consumed);

            if line.len() > MAX_LINE_LENGTH {
                return Err(Error::Protocol(format!(
                    "line exceeds {MAX_LINE_LENGTH} bytes"
                )));
            }
        }
    }

    /// Unwraps the stream. Buffered bytes are lost.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Length announced by a trailing `{n}`, `{n+}` or `{n-}`.
fn literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\r\n")?;
    let inner = line.strip_suffix(b"}")?;
    let open = inner.iter().rposition(|&b| b == b'{')?;
    let digits = &inner[open + 1..];
    let digits = digits
        .strip_suffix(b"+")
        .or_else(|| digits.strip_suffix(b"-"))
        .unwrap_or(digits);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
