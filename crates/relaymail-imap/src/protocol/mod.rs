//! Session engine.
//!
//! [`ImapSession`] owns the one-command-at-a-time exchange with the server.
//! It performs no I/O of its own: outgoing bytes go to a [`Transport`], and
//! server records come in through [`ImapSession::handle_line`], one whole
//! record (line plus any literals) per call.
//!
//! # Example
//!
//! ```ignore
//! use relaymail_imap::command::Command;
//! use relaymail_imap::protocol::ImapSession;
//!
//! let session = ImapSession::new(transport);
//! let future = session.execute(Command::Noop)?;   // writes "A0001 NOOP\r\n"
//! session.handle_line("A0001 OK done\r\n")?;       // resolves the future
//! assert!(future.get()?.is_ok());
//! ```

mod response;
mod state;
mod transmit;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use bytes::Bytes;

pub use response::ImapResponse;
pub use state::SessionState;
pub use transmit::{Transmit, Transport};

use crate::command::{CommandType, ImapCommand, StreamingSink, TagGenerator};
use crate::future::ImapFuture;
use crate::time::{Clock, SystemClock};
use crate::{Error, Result};
use response::tagged_status;

/// Tag prefix used unless configured otherwise.
pub const DEFAULT_TAG_PREFIX: &str = "A";

/// Shape of a server record.
enum LineKind<'a> {
    Continuation,
    Untagged,
    Tagged(&'a [u8]),
}

fn classify(line: &[u8]) -> LineKind<'_> {
    match line.first() {
        Some(b'+') => LineKind::Continuation,
        Some(b'*') => LineKind::Untagged,
        _ => {
            let end = line
                .iter()
                .position(|&b| matches!(b, b' ' | b'\r' | b'\n'))
                .unwrap_or(line.len());
            LineKind::Tagged(&line[..end])
        }
    }
}

/// Log form of a wire line: lossy UTF-8 without the trailing CRLF.
fn printable(data: &[u8]) -> String {
    let trimmed = data.strip_suffix(b"\r\n").unwrap_or(data);
    String::from_utf8_lossy(trimmed).into_owned()
}

/// The command in flight and everything collected for it so far.
struct PendingExchange {
    command: Box<dyn ImapCommand>,
    future: ImapFuture<ImapResponse>,
    tag: String,
    lines: Vec<Bytes>,
    sink: Option<StreamingSink>,
    started: Instant,
    request_bytes: usize,
    response_bytes: usize,
}

impl PendingExchange {
    /// Fails the caller's future after wiping the command.
    fn abort(mut self, error: Error) {
        self.command.cleanup();
        tracing::debug!(tag = %self.tag, %error, "aborting command in flight");
        self.future.fail(error);
    }
}

struct Inner {
    state: SessionState,
    pending: Option<PendingExchange>,
    closing: Option<ImapFuture<bool>>,
}

/// Drives commands over one connection.
///
/// At most one command is in flight; [`execute`](Self::execute) fails fast
/// with [`Error::Busy`] while one is pending. Futures are resolved after the
/// internal lock is released, so their callbacks may execute the next
/// command right away.
pub struct ImapSession<T: Transport> {
    transport: T,
    inner: Mutex<Inner>,
    tags: TagGenerator,
    clock: Arc<dyn Clock>,
    debug: AtomicBool,
}

impl<T: Transport> ImapSession<T> {
    /// Creates an idle session writing to `transport`.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                pending: None,
                closing: None,
            }),
            tags: TagGenerator::new(DEFAULT_TAG_PREFIX),
            clock: Arc::new(SystemClock),
            debug: AtomicBool::new(false),
        }
    }

    /// Uses `prefix` for command tags instead of `A`.
    #[must_use]
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tags = TagGenerator::new(prefix);
        self
    }

    /// Measures elapsed time with `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The transport this session writes to.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Returns true once the session was closed or lost its transport.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().is_closed()
    }

    /// Turns wire logging on or off.
    pub fn set_debug_mode(&self, enabled: bool) {
        self.debug.store(enabled, Ordering::Relaxed);
    }

    /// Returns true if wire logging is on.
    #[must_use]
    pub fn debug_mode(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends a command and returns the future of its aggregated response.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] once the session is closed.
    /// - [`Error::Busy`] while another command is in flight.
    /// - Any error from encoding the command or writing it; in that case
    ///   no exchange is started.
    pub fn execute(
        &self,
        command: impl ImapCommand + 'static,
    ) -> Result<ImapFuture<ImapResponse>> {
        let mut command: Box<dyn ImapCommand> = Box::new(command);
        let mut inner = self.lock();
        if inner.state.is_closed() {
            return Err(Error::ConnectionClosed("session is closed".to_string()));
        }
        if inner.state.is_busy() {
            return Err(Error::Busy);
        }

        let line = command.command_line()?;
        let tag = self.tags.next();
        let transmit = Transmit::tagged(&tag, &line);
        let request_bytes = transmit.len();
        self.log_write(&tag, &transmit, &*command);
        if let Err(e) = self.transport.write(transmit) {
            command.cleanup();
            return Err(e);
        }

        tracing::trace!(tag = %tag, command = ?command.command_type(), "command sent");
        let future = ImapFuture::new();
        inner.pending = Some(PendingExchange {
            sink: command.streaming_sink(),
            command,
            future: future.clone(),
            tag,
            lines: Vec::new(),
            started: self.clock.now(),
            request_bytes,
            response_bytes: 0,
        });
        inner.state = SessionState::AwaitingResponse;
        Ok(future)
    }

    /// Feeds one server record into the session.
    ///
    /// Lines that arrive with no command pending, or tagged with a tag
    /// other than the pending one, are logged and dropped.
    ///
    /// # Errors
    ///
    /// If the pending command cannot answer a continuation (or the answer
    /// cannot be written), the command's future fails with that error, the
    /// session is closed, and the error is returned.
    pub fn handle_line(&self, line: impl Into<Bytes>) -> Result<()> {
        let line = line.into();
        let mut completed = None;
        let mut failure = None;
        let mut aborted = None;
        {
            let mut guard = self.lock();
            let inner = &mut *guard;
            if self.debug_mode() {
                tracing::debug!(bytes = line.len(), "S: {}", printable(&line));
            }
            let Some(pending) = inner.pending.as_mut() else {
                tracing::warn!(line = %printable(&line), "dropping server line, no command pending");
                return Ok(());
            };

            let mut finished = false;
            match classify(&line) {
                LineKind::Continuation => {
                    pending.response_bytes += line.len();
                    match pending.command.next_line_after_continuation(&line) {
                        Ok(Some(next)) => {
                            let transmit = Transmit::from(next);
                            pending.request_bytes += transmit.len();
                            self.log_write(&pending.tag, &transmit, &*pending.command);
                            if let Err(e) = self.transport.write(transmit) {
                                failure = Some(e);
                            }
                        }
                        Ok(None) => inner.state = SessionState::AwaitingPush,
                        Err(e) => failure = Some(e),
                    }
                }
                LineKind::Untagged => {
                    pending.response_bytes += line.len();
                    match &pending.sink {
                        Some(sink) if inner.state == SessionState::AwaitingPush => {
                            if sink.send(line.clone()).is_err() {
                                tracing::trace!(tag = %pending.tag, "streaming receiver dropped");
                            }
                        }
                        _ => pending.lines.push(line.clone()),
                    }
                }
                LineKind::Tagged(tag) if tag == pending.tag.as_bytes() => finished = true,
                LineKind::Tagged(tag) => {
                    tracing::warn!(
                        tag = %String::from_utf8_lossy(tag),
                        expected = %pending.tag,
                        "dropping line with foreign tag"
                    );
                }
            }

            if finished {
                if let Some(p) = inner.pending.take() {
                    inner.state = SessionState::Idle;
                    completed = Some(self.complete(p, line));
                }
            } else if failure.is_some() {
                aborted = self.shut_down(inner).1;
            }
        }

        if let Some((future, response)) = completed {
            future.done(response);
        }
        if let Some(error) = failure {
            if let Some(p) = aborted {
                p.abort(error.clone());
            }
            return Err(error);
        }
        Ok(())
    }

    fn complete(
        &self,
        mut p: PendingExchange,
        tagged: Bytes,
    ) -> (ImapFuture<ImapResponse>, ImapResponse) {
        p.command.cleanup();
        p.response_bytes += tagged.len();
        let status = tagged_status(&tagged);
        p.lines.push(tagged);
        let command_type: CommandType = p.command.command_type();
        tracing::debug!(
            tag = %p.tag,
            command = ?command_type,
            ?status,
            request_bytes = p.request_bytes,
            response_bytes = p.response_bytes,
            "command complete"
        );
        let response = ImapResponse {
            command_type,
            tag: p.tag,
            request_bytes: p.request_bytes,
            response_bytes: p.response_bytes,
            lines: p.lines,
            status,
            elapsed: self.clock.elapsed(p.started),
        };
        (p.future, response)
    }

    /// Ends a long-running command (IDLE) by writing its terminator.
    ///
    /// Returns the same future; it resolves when the server sends the
    /// tagged completion.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] once the session is closed.
    /// - [`Error::InvalidInput`] if `future` is not the pending command's.
    /// - [`Error::OperationNotSupportedForCommand`] if the command cannot
    ///   be terminated.
    pub fn terminate_command(
        &self,
        future: &ImapFuture<ImapResponse>,
    ) -> Result<ImapFuture<ImapResponse>> {
        let mut inner = self.lock();
        if inner.state.is_closed() {
            return Err(Error::ConnectionClosed("session is closed".to_string()));
        }
        let pending = inner
            .pending
            .as_mut()
            .filter(|p| p.future.ptr_eq(future))
            .ok_or_else(|| {
                Error::InvalidInput("future does not belong to the command in flight".to_string())
            })?;

        let transmit = Transmit::from(pending.command.terminate_line()?);
        pending.request_bytes += transmit.len();
        self.log_write(&pending.tag, &transmit, &*pending.command);
        self.transport.write(transmit)?;
        Ok(pending.future.clone())
    }

    /// Closes the session and its transport.
    ///
    /// A pending command fails with [`Error::ConnectionClosed`]. Calling
    /// this again returns the first call's future.
    pub fn close(&self) -> ImapFuture<bool> {
        let (closing, pending) = {
            let mut inner = self.lock();
            self.shut_down(&mut inner)
        };
        if let Some(p) = pending {
            p.abort(Error::ConnectionClosed("session closed".to_string()));
        }
        closing
    }

    /// Tears the session down after the transport failed.
    pub fn handle_disconnect(&self, reason: &str) {
        let pending = {
            let mut inner = self.lock();
            if inner.state.is_closed() {
                return;
            }
            tracing::debug!(reason, "transport disconnected");
            self.shut_down(&mut inner).1
        };
        if let Some(p) = pending {
            p.abort(Error::ConnectionClosed(reason.to_string()));
        }
    }

    fn shut_down(&self, inner: &mut Inner) -> (ImapFuture<bool>, Option<PendingExchange>) {
        if let Some(closing) = &inner.closing {
            return (closing.clone(), None);
        }
        inner.state = SessionState::Closed;
        let closing = self.transport.close();
        inner.closing = Some(closing.clone());
        (closing, inner.pending.take())
    }

    fn log_write(&self, tag: &str, transmit: &Transmit, command: &dyn ImapCommand) {
        if !self.debug_mode() {
            return;
        }
        if transmit.sensitive {
            tracing::debug!(
                tag,
                bytes = transmit.len(),
                command = %command.debug_data(),
                "C: <redacted>"
            );
        } else {
            tracing::debug!(tag, bytes = transmit.len(), "C: {}", printable(&transmit.data));
        }
    }
}

impl<T: Transport> fmt::Debug for ImapSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ImapSession")
            .field("state", &inner.state)
            .field("pending", &inner.pending.as_ref().map(|p| p.tag.as_str()))
            .field("debug", &self.debug_mode())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::command::{AppendCommand, AuthenticateCommand, Command, IdleCommand};
    use crate::sasl::SaslMechanism;
    use crate::time::MockClock;
    use crate::types::{Capabilities, Mailbox, Status};

    #[derive(Default)]
    struct Recorder {
        writes: Mutex<Vec<Transmit>>,
        closes: AtomicUsize,
        refuse_writes: AtomicBool,
    }

    impl Recorder {
        fn written(&self) -> Vec<String> {
            self.writes
                .lock()
                .unwrap()
                .iter()
                .map(|t| String::from_utf8_lossy(&t.data).into_owned())
                .collect()
        }

        fn last(&self) -> Transmit {
            self.writes.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for Recorder {
        fn write(&self, transmit: Transmit) -> Result<()> {
            if self.refuse_writes.load(Ordering::SeqCst) {
                return Err(Error::ConnectionClosed("refused".to_string()));
            }
            self.writes.lock().unwrap().push(transmit);
            Ok(())
        }

        fn close(&self) -> ImapFuture<bool> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            ImapFuture::completed(true)
        }
    }

    fn session() -> (Arc<Recorder>, ImapSession<Arc<Recorder>>) {
        let recorder = Arc::new(Recorder::default());
        (Arc::clone(&recorder), ImapSession::new(Arc::clone(&recorder)))
    }

    mod exchange_tests {
        use super::*;

        #[test]
        fn noop_round_trip() {
            let clock = MockClock::shared();
            let recorder = Arc::new(Recorder::default());
            let session = ImapSession::new(Arc::clone(&recorder)).with_clock(clock.clone());

            let future = session.execute(Command::Noop).unwrap();
            assert_eq!(recorder.written(), ["A0001 NOOP\r\n"]);
            assert_eq!(session.state(), SessionState::AwaitingResponse);

            session.handle_line("* 4 EXISTS\r\n").unwrap();
            clock.advance(Duration::from_millis(40));
            session.handle_line("A0001 OK NOOP completed\r\n").unwrap();

            let response = future.get().unwrap();
            assert_eq!(response.command_type, CommandType::Noop);
            assert_eq!(response.tag, "A0001");
            assert_eq!(response.lines.len(), 2);
            assert_eq!(response.untagged()[0].as_ref(), b"* 4 EXISTS\r\n");
            assert_eq!(response.status, Some(Status::Ok));
            assert_eq!(response.request_bytes, 12);
            assert_eq!(response.response_bytes, 12 + 25);
            assert_eq!(response.elapsed, Duration::from_millis(40));
            assert_eq!(session.state(), SessionState::Idle);
        }

        #[test]
        fn no_and_bad_complete_successfully() {
            let (_, session) = session();
            let future = session.execute(Command::select(Mailbox::new("Nope"))).unwrap();
            session.handle_line("A0001 NO [NONEXISTENT] no such mailbox\r\n").unwrap();
            let response = future.get().unwrap();
            assert_eq!(response.status, Some(Status::No));
            assert!(!response.is_ok());
        }

        #[test]
        fn busy_while_pending_then_next_tag() {
            let (recorder, session) = session();
            let first = session.execute(Command::Noop).unwrap();
            assert!(matches!(session.execute(Command::Capability), Err(Error::Busy)));

            session.handle_line("A0001 OK\r\n").unwrap();
            assert!(first.is_done());

            session.execute(Command::Capability).unwrap();
            assert_eq!(recorder.written(), ["A0001 NOOP\r\n", "A0002 CAPABILITY\r\n"]);
        }

        #[test]
        fn encoding_error_starts_no_exchange() {
            let (recorder, session) = session();
            let bad = Command::Enable {
                capabilities: Vec::new(),
            };
            assert!(matches!(session.execute(bad), Err(Error::InvalidInput(_))));
            assert_eq!(session.state(), SessionState::Idle);
            assert!(recorder.written().is_empty());

            session.execute(Command::Noop).unwrap();
            assert_eq!(recorder.written(), ["A0001 NOOP\r\n"]);
        }

        #[test]
        fn write_failure_starts_no_exchange() {
            let (recorder, session) = session();
            recorder.refuse_writes.store(true, Ordering::SeqCst);
            assert!(session.execute(Command::Noop).is_err());
            assert_eq!(session.state(), SessionState::Idle);
        }

        #[test]
        fn stray_lines_are_dropped() {
            let (_, session) = session();
            session.handle_line("* OK still here\r\n").unwrap();

            let future = session.execute(Command::Noop).unwrap();
            session.handle_line("B0007 OK not ours\r\n").unwrap();
            assert!(!future.is_done());

            session.handle_line("A0001 OK\r\n").unwrap();
            assert_eq!(future.get().unwrap().lines.len(), 1);
        }

        #[test]
        fn custom_tag_prefix() {
            let recorder = Arc::new(Recorder::default());
            let session = ImapSession::new(Arc::clone(&recorder)).with_tag_prefix("rm");
            session.execute(Command::Noop).unwrap();
            assert_eq!(recorder.written(), ["rm0001 NOOP\r\n"]);
        }
    }

    mod continuation_tests {
        use super::*;

        #[test]
        fn append_sends_literal_on_continuation() {
            let (recorder, session) = session();
            let append = AppendCommand::new(Mailbox::new("Sent"), &b"hello"[..], &Capabilities::new());
            let future = session.execute(append).unwrap();
            assert_eq!(recorder.written(), ["A0001 APPEND Sent {5}\r\n"]);

            session.handle_line("+ Ready for literal data\r\n").unwrap();
            assert_eq!(recorder.written()[1], "hello\r\n");

            session.handle_line("A0001 OK [APPENDUID 38505 3955] APPEND completed\r\n").unwrap();
            let response = future.get().unwrap();
            assert_eq!(response.request_bytes, 23 + 7);
        }

        #[test]
        fn authenticate_without_sasl_ir() {
            let (recorder, session) = session();
            let auth = AuthenticateCommand::new(SaslMechanism::plain("user", "pass"), &Capabilities::new());
            session.execute(auth).unwrap();
            assert!(!recorder.last().sensitive);

            session.handle_line("+ \r\n").unwrap();
            let reply = recorder.last();
            assert!(reply.sensitive);
            assert_eq!(reply.as_str(), Some("AHVzZXIAcGFzcw==\r\n"));

            session.handle_line("+ eyJzdGF0dXMiOiI0MDEifQ==\r\n").unwrap();
            let cancel = recorder.last();
            assert!(!cancel.sensitive);
            assert_eq!(cancel.as_str(), Some("*\r\n"));
        }

        #[test]
        fn unsupported_continuation_closes_session() {
            let (recorder, session) = session();
            let future = session.execute(Command::Noop).unwrap();

            let err = session.handle_line("+ huh\r\n").unwrap_err();
            assert!(matches!(
                err,
                Error::OperationNotSupportedForCommand {
                    command: CommandType::Noop,
                    ..
                }
            ));
            assert!(matches!(
                future.get(),
                Err(Error::OperationNotSupportedForCommand { .. })
            ));
            assert!(session.is_closed());
            assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn failed_reply_write_closes_session() {
            let (recorder, session) = session();
            let append = AppendCommand::new(Mailbox::inbox(), &b"hello"[..], &Capabilities::new());
            let future = session.execute(append).unwrap();

            recorder.refuse_writes.store(true, Ordering::SeqCst);
            let err = session.handle_line("+ Ready\r\n").unwrap_err();
            assert!(matches!(err, Error::ConnectionClosed(_)));
            assert!(matches!(future.get(), Err(Error::ConnectionClosed(_))));
            assert!(session.is_closed());
            assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
            assert!(matches!(
                session.execute(Command::Noop),
                Err(Error::ConnectionClosed(_))
            ));
        }
    }

    mod idle_tests {
        use super::*;

        #[test]
        fn idle_streams_until_done() {
            let (recorder, session) = session();
            let (idle, mut rx) = IdleCommand::new();
            let future = session.execute(idle).unwrap();

            session.handle_line("+ idling\r\n").unwrap();
            assert_eq!(session.state(), SessionState::AwaitingPush);
            assert_eq!(recorder.written().len(), 1);

            session.handle_line("* 5 EXISTS\r\n").unwrap();
            assert_eq!(rx.try_recv().unwrap().as_ref(), b"* 5 EXISTS\r\n");

            let same = session.terminate_command(&future).unwrap();
            assert!(same.ptr_eq(&future));
            assert_eq!(recorder.written()[1], "DONE\r\n");

            session.handle_line("A0001 OK IDLE terminated\r\n").unwrap();
            let response = future.get().unwrap();
            assert_eq!(response.lines.len(), 1);
            assert_eq!(response.request_bytes, 12 + 6);
            assert!(rx.try_recv().is_err());
            assert_eq!(session.state(), SessionState::Idle);
        }

        #[test]
        fn terminate_rules() {
            let (_, session) = session();
            let future = session.execute(Command::Noop).unwrap();
            assert!(matches!(
                session.terminate_command(&future),
                Err(Error::OperationNotSupportedForCommand { .. })
            ));
            assert!(matches!(
                session.terminate_command(&ImapFuture::new()),
                Err(Error::InvalidInput(_))
            ));
        }

        #[test]
        fn done_is_not_sent_before_continuation() {
            let (recorder, session) = session();
            let (idle, _rx) = IdleCommand::new();
            let future = session.execute(idle).unwrap();
            assert!(matches!(
                session.terminate_command(&future),
                Err(Error::Protocol(_))
            ));
            assert_eq!(recorder.written(), ["A0001 IDLE\r\n"]);
            assert_eq!(session.state(), SessionState::AwaitingResponse);
        }
    }

    mod close_tests {
        use super::*;

        #[test]
        fn close_fails_pending_and_is_idempotent() {
            let (recorder, session) = session();
            let future = session.execute(Command::Noop).unwrap();

            let closing = session.close();
            assert!(closing.get().unwrap());
            assert!(matches!(future.get(), Err(Error::ConnectionClosed(_))));
            assert!(matches!(
                session.execute(Command::Noop),
                Err(Error::ConnectionClosed(_))
            ));

            assert!(session.close().ptr_eq(&closing));
            assert_eq!(recorder.closes.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn disconnect_fails_pending() {
            let (_, session) = session();
            let future = session.execute(Command::Noop).unwrap();
            session.handle_disconnect("connection reset");
            match future.get() {
                Err(Error::ConnectionClosed(reason)) => assert_eq!(reason, "connection reset"),
                other => panic!("unexpected {other:?}"),
            }
            assert!(session.is_closed());
            session.handle_disconnect("again");
        }

        #[test]
        fn lines_after_close_are_ignored() {
            let (_, session) = session();
            session.close();
            session.handle_line("A0001 OK\r\n").unwrap();
        }
    }

    mod callback_tests {
        use super::*;

        #[test]
        fn done_callback_can_execute_next_command() {
            let recorder = Arc::new(Recorder::default());
            let session = Arc::new(ImapSession::new(Arc::clone(&recorder)));
            let future = session.execute(Command::Noop).unwrap();

            let next = Arc::new(Mutex::new(None));
            let (s, slot) = (Arc::clone(&session), Arc::clone(&next));
            future.set_done_callback(move |_| {
                *slot.lock().unwrap() = Some(s.execute(Command::Capability));
            });

            session.handle_line("A0001 OK\r\n").unwrap();
            let chained = next.lock().unwrap().take().unwrap();
            assert!(chained.is_ok());
            assert_eq!(recorder.written()[1], "A0002 CAPABILITY\r\n");
        }
    }

    mod logging_tests {
        use super::*;

        #[test]
        fn login_line_is_sensitive() {
            let (recorder, session) = session();
            session.set_debug_mode(true);
            assert!(session.debug_mode());
            session.execute(Command::login("user", "hunter2")).unwrap();
            assert!(recorder.last().sensitive);
            assert!(format!("{session:?}").contains("A0001"));
        }
    }

    #[test]
    fn printable_strips_crlf() {
        assert_eq!(printable(b"A1 OK\r\n"), "A1 OK");
        assert_eq!(printable(b"+"), "+");
    }
}
