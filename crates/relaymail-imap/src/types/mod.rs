//! Core IMAP types.
//!
//! Values shared by the command encoders, the response parser and the
//! typed results, following RFC 3501 (`IMAP4rev1`) and its extensions.

#![allow(clippy::missing_const_for_fn)]

mod capability;
mod flags;
mod identifiers;
mod mailbox;
mod response_code;
mod sequence;

pub use capability::{Capabilities, Capability, LITERAL_MINUS_MAX, Status};
pub(crate) use flags::canonical_order;
pub use flags::{Flag, Flags};
pub use identifiers::{SeqNum, Tag, Uid, UidValidity};
pub use mailbox::{
    ListResponse, Mailbox, MailboxAttribute, decode_mailbox_name, encode_mailbox_name,
};
pub use response_code::ResponseCode;
pub use sequence::SequenceSet;
