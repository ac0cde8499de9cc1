//! IDLE (RFC 2177).

use bytes::Bytes;
use tokio::sync::mpsc;

use super::{CommandLine, CommandType, DONE, ImapCommand, StreamingSink};
use crate::{Error, Result};

/// IDLE: untagged lines stream to the caller until `DONE` is sent.
#[derive(Debug)]
pub struct IdleCommand {
    sink: StreamingSink,
    idling: bool,
    done_sent: bool,
}

impl IdleCommand {
    /// Creates the command and the receiver for pushed untagged lines.
    ///
    /// The receiver yields `None` once the exchange is over.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (sink, rx) = mpsc::unbounded_channel();
        (
            Self {
                sink,
                idling: false,
                done_sent: false,
            },
            rx,
        )
    }
}

impl ImapCommand for IdleCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Idle
    }

    fn command_line(&mut self) -> Result<CommandLine> {
        Ok(CommandLine::new(&b"IDLE\r\n"[..]))
    }

    fn next_line_after_continuation(&mut self, _line: &[u8]) -> Result<Option<CommandLine>> {
        self.idling = true;
        Ok(None)
    }

    fn terminate_line(&mut self) -> Result<CommandLine> {
        if !self.idling {
            return Err(Error::Protocol(
                "IDLE cannot be ended before the server's continuation".to_string(),
            ));
        }
        if self.done_sent {
            return Err(Error::Protocol("IDLE already terminated".to_string()));
        }
        self.done_sent = true;
        Ok(CommandLine::new(DONE))
    }

    fn streaming_sink(&self) -> Option<StreamingSink> {
        Some(self.sink.clone())
    }

    fn debug_data(&self) -> String {
        format!("IDLE idling={} done_sent={}", self.idling, self.done_sent)
    }
}
