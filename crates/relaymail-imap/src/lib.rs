//! # relaymail-imap
//!
//! A non-blocking IMAP4rev1 command/response engine.
//!
//! The crate is split along the life of one command:
//!
//! - **Encoding**: [`command`] turns a verb and its arguments into wire
//!   lines, choosing atoms, quoted strings or literals per argument.
//! - **Exchange**: [`ImapSession`] tags the command, writes it through a
//!   [`Transport`], answers `+` continuations, and gathers every line until
//!   the tagged completion. It never blocks and never touches a socket.
//! - **Result**: the caller gets an [`ImapFuture`] that resolves to the
//!   aggregated [`ImapResponse`].
//! - **Mapping**: [`ResponseMapper`] folds an aggregated response into a
//!   [`TypedResult`] such as mailbox status, search hits or fetched
//!   messages.
//!
//! [`Connection`] supplies the I/O: a TCP or TLS socket, one task reading
//! records into the session and one task writing its transmits.
//!
//! ## Quick Start
//!
//! ```ignore
//! use relaymail_imap::command::{Command, StatusAttribute};
//! use relaymail_imap::types::Mailbox;
//! use relaymail_imap::{Config, Connection, ResponseMapper, TypedResult};
//!
//! #[tokio::main]
//! async fn main() -> relaymail_imap::Result<()> {
//!     let connection = Connection::connect(&Config::new("imap.example.com")).await?;
//!     let session = connection.session();
//!
//!     let login = Command::Login {
//!         username: "user@example.com".to_string(),
//!         password: "secret".to_string().into(),
//!     };
//!     session.execute(login)?.wait().await?;
//!
//!     let status = Command::Status {
//!         mailbox: Mailbox::inbox(),
//!         items: vec![StatusAttribute::Messages, StatusAttribute::UidNext],
//!     };
//!     let response = session.execute(status)?.wait().await?;
//!     if let TypedResult::Status(info) = ResponseMapper::map(&response)? {
//!         println!("{:?} messages", info.messages);
//!     }
//!
//!     session.close().wait().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod future;
pub mod mapper;
pub mod parser;
pub mod protocol;
pub mod qresync;
pub mod sasl;
pub mod time;
pub mod types;

pub use command::{Command, CommandType, ImapCommand, TagGenerator};
pub use connection::{Config, ConfigBuilder, Connection, Security};
pub use error::{Error, Result};
pub use future::ImapFuture;
pub use mapper::{ResponseMapper, ResultKind, TypedResult};
pub use protocol::{ImapResponse, ImapSession, SessionState, Transmit, Transport};
pub use sasl::SaslMechanism;
pub use types::{
    Capabilities, Capability, Flag, Flags, Mailbox, ResponseCode, SeqNum, SequenceSet, Status,
    Uid, UidValidity,
};

/// IMAP protocol revision spoken by the engine.
pub const IMAP_VERSION: &str = "IMAP4rev1";
