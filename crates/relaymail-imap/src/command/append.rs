//! APPEND (RFC 3501 §6.3.11).

use std::collections::VecDeque;

use bytes::Bytes;
use chrono::{DateTime, FixedOffset};

use super::args::{write_date_time, write_flag_list, write_mailbox};
use super::{CommandLine, CommandType, ImapCommand, LineBuilder, LiteralMode};
use crate::types::{Capabilities, Flag, Mailbox};
use crate::{Error, Result};

/// Uploads one message as a literal.
#[derive(Debug)]
pub struct AppendCommand {
    mailbox: Mailbox,
    flags: Vec<Flag>,
    date: Option<DateTime<FixedOffset>>,
    message: Bytes,
    literal_mode: LiteralMode,
    pending: VecDeque<Vec<u8>>,
}

impl AppendCommand {
    /// Creates the command. The literal form is picked from `capabilities`.
    #[must_use]
    pub fn new(mailbox: Mailbox, message: impl Into<Bytes>, capabilities: &Capabilities) -> Self {
        let message = message.into();
        Self {
            literal_mode: capabilities.literal_mode(message.len()),
            mailbox,
            flags: Vec::new(),
            date: None,
            message,
            pending: VecDeque::new(),
        }
    }

    /// Sets the flags stored with the message.
    #[must_use]
    pub fn with_flags(mut self, flags: Vec<Flag>) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the internal date.
    #[must_use]
    pub fn with_date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }
}

impl ImapCommand for AppendCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Append
    }

    fn command_line(&mut self) -> Result<CommandLine> {
        if self.message.is_empty() {
            return Err(Error::InvalidInput("APPEND message is empty".to_string()));
        }

        let mut b = LineBuilder::new();
        b.push(b"APPEND ");
        write_mailbox(b.buf(), &self.mailbox)?;
        if !self.flags.is_empty() {
            b.sp();
            write_flag_list(b.buf(), &self.flags)?;
        }
        if let Some(date) = &self.date {
            b.sp();
            write_date_time(b.buf(), date);
        }
        b.sp().literal(&self.message, self.literal_mode);

        self.pending = b.finish();
        let first = self
            .pending
            .pop_front()
            .ok_or_else(|| Error::InvalidInput("APPEND produced no line".to_string()))?;
        Ok(CommandLine::new(first))
    }

    fn next_line_after_continuation(&mut self, _line: &[u8]) -> Result<Option<CommandLine>> {
        self.pending
            .pop_front()
            .map(|chunk| Some(CommandLine::new(chunk)))
            .ok_or_else(|| Error::Protocol("continuation after APPEND literal was sent".to_string()))
    }

    fn debug_data(&self) -> String {
        format!(
            "APPEND {} flags={} literal={} bytes {:?}",
            self.mailbox,
            self.flags.len(),
            self.message.len(),
            self.literal_mode
        )
    }

    fn cleanup(&mut self) {
        self.message = Bytes::new();
        self.pending.clear();
    }
}
