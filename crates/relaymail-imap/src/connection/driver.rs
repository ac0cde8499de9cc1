//! The reactor: one reader task and one writer task per connection.
//!
//! The reader feeds every framed record into [`ImapSession::handle_line`];
//! the writer drains the session's transmits in order. Neither task touches
//! session state except through the session's own methods. Either side
//! failing tears the session down through
//! [`ImapSession::handle_disconnect`].

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Notify, mpsc};

use super::config::Config;
use super::framed::FramedStream;
use super::stream;
use crate::future::ImapFuture;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::protocol::{ImapSession, Transmit, Transport};
use crate::types::Status;
use crate::{Error, Result};

enum WriterCommand {
    Send(Transmit),
    Shutdown(ImapFuture<bool>),
}

/// [`Transport`] backed by the connection's writer task.
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<WriterCommand>,
    stop_reader: Arc<Notify>,
    closing: Mutex<Option<ImapFuture<bool>>>,
}

impl ChannelTransport {
    fn new(tx: mpsc::UnboundedSender<WriterCommand>, stop_reader: Arc<Notify>) -> Self {
        Self {
            tx,
            stop_reader,
            closing: Mutex::new(None),
        }
    }
}

impl Transport for ChannelTransport {
    fn write(&self, transmit: Transmit) -> Result<()> {
        self.tx
            .send(WriterCommand::Send(transmit))
            .map_err(|_| Error::ConnectionClosed("writer has stopped".to_string()))
    }

    fn close(&self) -> ImapFuture<bool> {
        let mut closing = self.closing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(future) = closing.as_ref() {
            return future.clone();
        }
        let future = ImapFuture::new();
        if let Err(mpsc::error::SendError(WriterCommand::Shutdown(f))) =
            self.tx.send(WriterCommand::Shutdown(future.clone()))
        {
            // writer already gone; nothing left to flush
            f.done(true);
        }
        self.stop_reader.notify_one();
        *closing = Some(future.clone());
        future
    }
}

impl std::fmt::Debug for ChannelTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelTransport")
            .field("open", &!self.tx.is_closed())
            .finish_non_exhaustive()
    }
}

/// A running connection.
#[derive(Debug)]
pub struct Connection {
    session: Arc<ImapSession<ChannelTransport>>,
    greeting: Bytes,
}

impl Connection {
    /// Opens a socket for `config`, reads the greeting and starts the
    /// reactor. Connect, handshake and greeting share `connect_timeout`.
    ///
    /// # Errors
    ///
    /// [`Error::ConnectTimeout`], transport errors, or a refused greeting.
    pub async fn connect(config: &Config) -> Result<Self> {
        let timeout = config.connect_timeout;
        tokio::time::timeout(timeout, async {
            let socket = stream::open(config).await?;
            Self::start(socket, config).await
        })
        .await
        .map_err(|_| Error::ConnectTimeout(timeout))?
    }

    /// Reads the greeting from an already connected stream and spawns the
    /// reader and writer tasks. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if the stream ends before the greeting, or the server greets
    /// with BYE or anything other than OK/PREAUTH.
    pub async fn start<S>(socket: S, config: &Config) -> Result<Self>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(socket);
        let mut framed = FramedStream::new(read_half);

        let greeting = framed.read_record().await?.ok_or_else(|| {
            Error::ConnectionClosed("server closed before the greeting".to_string())
        })?;
        check_greeting(&greeting)?;
        tracing::debug!(host = %config.host, "greeting received");

        let (tx, rx) = mpsc::unbounded_channel();
        let stop_reader = Arc::new(Notify::new());
        let transport = ChannelTransport::new(tx, Arc::clone(&stop_reader));
        let session =
            Arc::new(ImapSession::new(transport).with_tag_prefix(config.tag_prefix.clone()));
        session.set_debug_mode(config.debug);

        tokio::spawn(write_loop(
            write_half,
            rx,
            config.io_timeout,
            Arc::downgrade(&session),
        ));
        tokio::spawn(read_loop(framed, Arc::clone(&session), stop_reader));

        Ok(Self { session, greeting })
    }

    /// The session driven by this connection.
    #[must_use]
    pub const fn session(&self) -> &Arc<ImapSession<ChannelTransport>> {
        &self.session
    }

    /// The greeting line, as sent.
    #[must_use]
    pub const fn greeting(&self) -> &Bytes {
        &self.greeting
    }

    /// Gives up the handle, keeping the session.
    #[must_use]
    pub fn into_session(self) -> Arc<ImapSession<ChannelTransport>> {
        self.session
    }
}

fn check_greeting(greeting: &[u8]) -> Result<()> {
    match ResponseParser::parse(greeting)? {
        Response::Untagged(UntaggedResponse::Condition {
            status: Status::Ok | Status::PreAuth,
            ..
        }) => Ok(()),
        Response::Untagged(UntaggedResponse::Condition {
            status: Status::Bye,
            text,
            ..
        }) => Err(Error::ConnectionClosed(format!("server refused: {text}"))),
        other => Err(Error::Protocol(format!("unexpected greeting: {other:?}"))),
    }
}

async fn read_loop<R, T>(
    mut framed: FramedStream<R>,
    session: Arc<ImapSession<T>>,
    stop: Arc<Notify>,
) where
    R: AsyncRead + Unpin,
    T: Transport,
{
    loop {
        let record = tokio::select! {
            record = framed.read_record() => record,
            () = stop.notified() => {
                tracing::trace!("reader stopped by close");
                return;
            }
        };
        match record {
            Ok(Some(line)) => {
                if let Err(e) = session.handle_line(line) {
                    tracing::warn!(error = %e, "command aborted while handling server data");
                }
                if session.is_closed() {
                    return;
                }
            }
            Ok(None) => {
                session.handle_disconnect("server closed the connection");
                return;
            }
            Err(e) => {
                session.handle_disconnect(&e.to_string());
                return;
            }
        }
    }
}

async fn write_loop<W, T>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<WriterCommand>,
    io_timeout: Duration,
    session: Weak<ImapSession<T>>,
) where
    W: AsyncWrite + Unpin,
    T: Transport,
{
    let mut failure = None;
    while let Some(command) = rx.recv().await {
        match command {
            WriterCommand::Send(transmit) => {
                let write = async {
                    writer.write_all(&transmit.data).await?;
                    writer.flush().await
                };
                match tokio::time::timeout(io_timeout, write).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "socket write failed");
                        failure = Some(format!("socket write failed: {e}"));
                        break;
                    }
                    Err(_) => {
                        tracing::warn!(timeout = ?io_timeout, "socket write timed out");
                        failure = Some(format!("socket write timed out after {io_timeout:?}"));
                        break;
                    }
                }
            }
            WriterCommand::Shutdown(done) => {
                let clean = writer.shutdown().await.is_ok();
                tracing::debug!(clean, "connection closed");
                done.done(clean);
                return;
            }
        }
    }

    // the Shutdown this queues is answered by the drain below
    if let Some(reason) = failure {
        if let Some(session) = session.upgrade() {
            session.handle_disconnect(&reason);
        }
    }

    rx.close();
    while let Ok(command) = rx.try_recv() {
        if let WriterCommand::Shutdown(done) = command {
            done.done(false);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    use crate::command::Command;

    fn config() -> Config {
        Config::builder("mock").build()
    }

    #[test]
    fn greeting_is_checked() {
        assert!(check_greeting(b"* OK ready\r\n").is_ok());
        assert!(check_greeting(b"* PREAUTH hi\r\n").is_ok());
        assert!(matches!(
            check_greeting(b"* BYE too busy\r\n"),
            Err(Error::ConnectionClosed(_))
        ));
        assert!(matches!(
            check_greeting(b"+ what\r\n"),
            Err(Error::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn eof_before_greeting() {
        let mock = Builder::new().build();
        assert!(matches!(
            Connection::start(mock, &config()).await,
            Err(Error::ConnectionClosed(_))
        ));
    }

    #[tokio::test]
    async fn runs_a_command() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 NOOP\r\n")
            .read(b"* 4 EXISTS\r\nA0001 OK done\r\n")
            .build();
        let connection = Connection::start(mock, &config()).await.unwrap();
        assert_eq!(connection.greeting().as_ref(), b"* OK ready\r\n");

        let session = connection.into_session();
        let response = session.execute(Command::Noop).unwrap().wait().await.unwrap();
        assert!(response.is_ok());
        assert_eq!(response.lines.len(), 2);
    }

    #[tokio::test]
    async fn eof_fails_the_pending_command() {
        let mock = Builder::new()
            .read(b"* OK ready\r\n")
            .write(b"A0001 NOOP\r\n")
            .build();
        let connection = Connection::start(mock, &config()).await.unwrap();
        let future = connection.session().execute(Command::Noop).unwrap();
        assert!(matches!(
            future.wait().await,
            Err(Error::ConnectionClosed(_))
        ));
        assert!(connection.session().is_closed());
    }

    #[tokio::test]
    async fn stalled_write_fails_the_pending_command() {
        let (client, mut server) = tokio::io::duplex(64);
        server.write_all(b"* OK ready\r\n").await.unwrap();
        let config = Config::builder("mock")
            .io_timeout(Duration::from_millis(50))
            .build();
        let connection = Connection::start(client, &config).await.unwrap();
        let session = connection.session();

        let password = "x".repeat(4096);
        let future = session.execute(Command::login("user", password)).unwrap();
        let outcome = tokio::time::timeout(Duration::from_secs(5), future.wait())
            .await
            .unwrap();
        assert!(matches!(outcome, Err(Error::ConnectionClosed(_))));
        assert!(session.is_closed());
        assert!(matches!(
            session.execute(Command::Noop),
            Err(Error::ConnectionClosed(_))
        ));
        assert!(!session.close().wait().await.unwrap());
        drop(server);
    }

    #[tokio::test]
    async fn close_shuts_the_writer() {
        let (client, server) = tokio::io::duplex(1024);
        let (mut server_read, mut server_write) = tokio::io::split(server);
        server_write.write_all(b"* OK ready\r\n").await.unwrap();

        let connection = Connection::start(client, &config()).await.unwrap();
        let closed = connection.session().close();
        assert!(closed.wait().await.unwrap());
        assert!(connection.session().close().ptr_eq(&closed));

        let mut rest = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut server_read, &mut rest)
            .await
            .unwrap();
        assert!(rest.is_empty());
    }
}
