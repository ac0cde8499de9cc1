//! AUTHENTICATE (RFC 3501 §6.2.2) with optional SASL-IR (RFC 4959).

use tracing::debug;

use super::{CRLF, CommandLine, CommandType, ImapCommand, SASL_CANCEL};
use crate::Result;
use crate::sasl::{SaslMechanism, decode_challenge};
use crate::types::Capabilities;

/// AUTHENTICATE with a single-response SASL mechanism.
///
/// With SASL-IR the response rides on the command line. Without it the
/// response answers the first `+`. A second `+` is a server error
/// challenge and is answered with `*`, which aborts the exchange.
#[derive(Debug)]
pub struct AuthenticateCommand {
    mechanism: SaslMechanism,
    sasl_ir: bool,
    continuations: u32,
}

impl AuthenticateCommand {
    /// Creates the command; SASL-IR is used if `capabilities` advertise it.
    #[must_use]
    pub fn new(mechanism: SaslMechanism, capabilities: &Capabilities) -> Self {
        Self {
            mechanism,
            sasl_ir: capabilities.sasl_ir(),
            continuations: 0,
        }
    }

    fn response_line(&self) -> Vec<u8> {
        let mut buf = self.mechanism.initial_response().into_bytes();
        buf.extend_from_slice(CRLF);
        buf
    }
}

impl ImapCommand for AuthenticateCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Authenticate
    }

    fn command_line(&mut self) -> Result<CommandLine> {
        let mut buf = format!("AUTHENTICATE {}", self.mechanism.name()).into_bytes();
        if self.sasl_ir {
            buf.push(b' ');
            buf.extend_from_slice(self.mechanism.initial_response().as_bytes());
            buf.extend_from_slice(CRLF);
            return Ok(CommandLine::sensitive(buf));
        }
        buf.extend_from_slice(CRLF);
        Ok(CommandLine::new(buf))
    }

    fn next_line_after_continuation(&mut self, line: &[u8]) -> Result<Option<CommandLine>> {
        self.continuations += 1;
        if !self.sasl_ir && self.continuations == 1 {
            return Ok(Some(CommandLine::sensitive(self.response_line())));
        }
        if let Some(challenge) = decode_challenge(line) {
            debug!(mechanism = self.mechanism.name(), %challenge, "SASL error challenge");
        }
        Ok(Some(CommandLine::new(SASL_CANCEL)))
    }

    fn debug_data(&self) -> String {
        format!(
            "AUTHENTICATE {} user={} sasl_ir={}",
            self.mechanism.name(),
            self.mechanism.user(),
            self.sasl_ir
        )
    }

    fn cleanup(&mut self) {
        self.mechanism.clear();
    }
}
