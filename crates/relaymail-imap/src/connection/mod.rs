//! Socket side of a session.
//!
//! - [`Config`] describes where to connect and how.
//! - [`FramedStream`] cuts the byte stream into whole server records.
//! - [`Connection`] runs the reader and writer tasks that move records
//!   into an [`ImapSession`](crate::ImapSession) and its transmits out.

mod config;
mod driver;
mod framed;
mod stream;

pub use config::{Config, ConfigBuilder, Security};
pub use driver::{ChannelTransport, Connection};
pub use framed::{FramedStream, MAX_LINE_LENGTH, MAX_LITERAL_SIZE};
pub use stream::{ImapStream, open, tls_connector};
