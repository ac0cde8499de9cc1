//! Parsed response data.

use crate::qresync::VanishedResponse;
use crate::types::{
    Capability, Flags, ListResponse, Mailbox, ResponseCode, SeqNum, Status, Uid, UidValidity,
};

/// One data item of a FETCH response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItem {
    /// FLAGS
    Flags(Flags),
    /// INTERNALDATE, as sent.
    InternalDate(String),
    /// RFC822.SIZE
    Rfc822Size(u32),
    /// ENVELOPE
    Envelope(Box<Envelope>),
    /// UID
    Uid(Uid),
    /// BODY[section]<origin>, RFC822, RFC822.HEADER or RFC822.TEXT.
    Body {
        /// Section inside the brackets; for the RFC822 forms, the suffix.
        section: Option<String>,
        /// Partial-fetch origin.
        origin: Option<u32>,
        /// Content; `None` for NIL.
        data: Option<Vec<u8>>,
    },
    /// BODYSTRUCTURE or BODY without a section.
    BodyStructure(BodyStructure),
    /// MODSEQ (CONDSTORE).
    ModSeq(u64),
}

/// Message envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Envelope {
    /// Date header.
    pub date: Option<String>,
    /// Subject header.
    pub subject: Option<String>,
    /// From
    pub from: Vec<Address>,
    /// Sender
    pub sender: Vec<Address>,
    /// Reply-To
    pub reply_to: Vec<Address>,
    /// To
    pub to: Vec<Address>,
    /// Cc
    pub cc: Vec<Address>,
    /// Bcc
    pub bcc: Vec<Address>,
    /// In-Reply-To header.
    pub in_reply_to: Option<String>,
    /// Message-ID header.
    pub message_id: Option<String>,
}

/// Address from an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Display name.
    pub name: Option<String>,
    /// Source route.
    pub adl: Option<String>,
    /// Local part.
    pub mailbox: Option<String>,
    /// Domain.
    pub host: Option<String>,
}

impl Address {
    /// `mailbox@host`, when both parts are present.
    #[must_use]
    pub fn email(&self) -> Option<String> {
        Some(format!("{}@{}", self.mailbox.as_ref()?, self.host.as_ref()?))
    }
}

/// MIME structure of a message, trimmed to what clients usually need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyStructure {
    /// A leaf part.
    Single {
        /// Media type, upper case (`TEXT`, `IMAGE`, ...).
        media_type: String,
        /// Media subtype, upper case.
        subtype: String,
        /// Content-Type parameters.
        params: Vec<(String, String)>,
        /// Content-Transfer-Encoding.
        encoding: String,
        /// Size in octets.
        size: u32,
        /// Line count, for `TEXT` parts.
        lines: Option<u32>,
    },
    /// A multipart container.
    Multipart {
        /// Child parts.
        parts: Vec<Self>,
        /// Multipart subtype, upper case.
        subtype: String,
    },
}

/// One attribute of a STATUS response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusItem {
    /// MESSAGES
    Messages(u32),
    /// RECENT
    Recent(u32),
    /// UIDNEXT
    UidNext(Uid),
    /// UIDVALIDITY
    UidValidity(UidValidity),
    /// UNSEEN
    Unseen(u32),
    /// HIGHESTMODSEQ
    HighestModSeq(u64),
}

/// Untagged server data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UntaggedResponse {
    /// `* OK`, `* NO`, `* BAD`, `* PREAUTH` or `* BYE`.
    Condition {
        /// Status keyword.
        status: Status,
        /// Bracketed code.
        code: Option<ResponseCode>,
        /// Text after the code.
        text: String,
    },
    /// CAPABILITY
    Capability(Vec<Capability>),
    /// ENABLED (RFC 5161).
    Enabled(Vec<Capability>),
    /// ID (RFC 2971); `None` for `ID NIL`.
    Id(Option<Vec<(String, Option<String>)>>),
    /// LIST
    List(ListResponse),
    /// LSUB
    Lsub(ListResponse),
    /// FLAGS
    Flags(Flags),
    /// n EXISTS
    Exists(u32),
    /// n RECENT
    Recent(u32),
    /// n EXPUNGE
    Expunge(SeqNum),
    /// n FETCH (...)
    Fetch {
        /// Sequence number.
        seq: SeqNum,
        /// Data items in server order.
        items: Vec<FetchItem>,
    },
    /// SEARCH, with the CONDSTORE `(MODSEQ n)` suffix if present.
    Search {
        /// Matching numbers (sequence numbers or UIDs).
        numbers: Vec<u32>,
        /// Highest mod-sequence of the matches.
        modseq: Option<u64>,
    },
    /// STATUS
    MailboxStatus {
        /// Mailbox, as sent on the wire.
        mailbox: Mailbox,
        /// Attributes in server order.
        items: Vec<StatusItem>,
    },
    /// VANISHED (QRESYNC).
    Vanished(VanishedResponse),
    /// Any other keyword, kept raw.
    Other {
        /// Keyword, upper case.
        keyword: String,
        /// Remainder of the line.
        text: String,
    },
}
