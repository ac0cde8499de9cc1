//! Sans-I/O parser for server records.
//!
//! The [`lexer`] turns bytes into tokens; [`response`] builds typed records
//! from them. Neither side knows about sockets or sessions.
//!
//! ```
//! use relaymail_imap::parser::{Response, ResponseParser, UntaggedResponse};
//!
//! let record = ResponseParser::parse(b"* 3 EXISTS\r\n").unwrap();
//! assert_eq!(record, Response::Untagged(UntaggedResponse::Exists(3)));
//! ```

pub mod lexer;
pub mod response;

pub use lexer::{Lexer, Token};
pub use response::{
    Address, BodyStructure, Envelope, FetchItem, Response, ResponseParser, StatusItem,
    UntaggedResponse,
};
