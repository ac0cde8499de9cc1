//! Aggregated result of one command exchange.

use std::time::Duration;

use bytes::Bytes;

use crate::command::CommandType;
use crate::types::Status;

/// Everything the server said in reply to one command.
///
/// `lines` holds the untagged lines in arrival order followed by the
/// tagged completion line. NO and BAD completions are delivered here as
/// data; deciding what they mean is up to the caller or the mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImapResponse {
    /// Verb of the command.
    pub command_type: CommandType,
    /// Tag the command was sent with.
    pub tag: String,
    /// Bytes written for this command, continuations included.
    pub request_bytes: usize,
    /// Bytes read for this command.
    pub response_bytes: usize,
    /// Untagged lines, then the tagged line.
    pub lines: Vec<Bytes>,
    /// Status of the tagged line, if it had a recognizable one.
    pub status: Option<Status>,
    /// Time between writing the command and reading its completion.
    pub elapsed: Duration,
}

impl ImapResponse {
    /// The tagged completion line.
    #[must_use]
    pub fn tagged_line(&self) -> Option<&Bytes> {
        self.lines.last()
    }

    /// The untagged lines.
    #[must_use]
    pub fn untagged(&self) -> &[Bytes] {
        self.lines.split_last().map_or(&[], |(_, rest)| rest)
    }

    /// Returns true if the command completed with OK.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_some_and(Status::is_ok)
    }
}

/// Reads the status keyword that follows the tag on a tagged line.
pub(crate) fn tagged_status(line: &[u8]) -> Option<Status> {
    let text = std::str::from_utf8(line).ok()?;
    let mut words = text.trim_end().splitn(3, ' ');
    words.next()?;
    Status::from_keyword(words.next()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(lines: &[&'static [u8]]) -> ImapResponse {
        let lines: Vec<Bytes> = lines.iter().copied().map(Bytes::from_static).collect();
        let status = lines.last().and_then(|l| tagged_status(l));
        ImapResponse {
            command_type: CommandType::Noop,
            tag: "A0001".to_string(),
            request_bytes: 12,
            response_bytes: lines.iter().map(Bytes::len).sum(),
            lines,
            status,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn splits_tagged_from_untagged() {
        let r = response(&[b"* 3 EXISTS\r\n", b"* 1 RECENT\r\n", b"A0001 OK NOOP done\r\n"]);
        assert_eq!(r.untagged().len(), 2);
        assert_eq!(r.tagged_line().unwrap().as_ref(), b"A0001 OK NOOP done\r\n");
        assert!(r.is_ok());
        assert_eq!(r.response_bytes, 44);
    }

    #[test]
    fn status_keywords() {
        assert_eq!(tagged_status(b"A1 no [TRYCREATE] nope\r\n"), Some(Status::No));
        assert_eq!(tagged_status(b"A1 BAD\r\n"), Some(Status::Bad));
        assert_eq!(tagged_status(b"A1 WHAT\r\n"), None);
        assert_eq!(tagged_status(b"A1"), None);
        assert!(!response(&[b"A0001 NO failed\r\n"]).is_ok());
    }

    #[test]
    fn empty_response_has_no_tagged_line() {
        let r = response(&[]);
        assert!(r.tagged_line().is_none());
        assert!(r.untagged().is_empty());
        assert!(!r.is_ok());
    }
}
