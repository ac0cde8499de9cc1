//! Argument types for command variants.

use chrono::NaiveDate;

use crate::types::{Flag, SequenceSet};

/// STATUS attributes to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAttribute {
    /// Number of messages.
    Messages,
    /// Number of recent messages.
    Recent,
    /// Next UID.
    UidNext,
    /// UIDVALIDITY.
    UidValidity,
    /// Number of unseen messages.
    Unseen,
    /// Highest mod-sequence (CONDSTORE).
    HighestModSeq,
}

impl StatusAttribute {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Messages => "MESSAGES",
            Self::Recent => "RECENT",
            Self::UidNext => "UIDNEXT",
            Self::UidValidity => "UIDVALIDITY",
            Self::Unseen => "UNSEEN",
            Self::HighestModSeq => "HIGHESTMODSEQ",
        }
    }

    pub(crate) fn write_list(buf: &mut Vec<u8>, items: &[Self]) {
        buf.push(b'(');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            buf.extend_from_slice(item.as_str().as_bytes());
        }
        buf.push(b')');
    }
}

/// FETCH items to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchItems {
    /// `ALL` macro (FLAGS INTERNALDATE RFC822.SIZE ENVELOPE).
    All,
    /// `FULL` macro (ALL plus BODY).
    Full,
    /// `FAST` macro (FLAGS INTERNALDATE RFC822.SIZE).
    Fast,
    /// Explicit list of items.
    Items(Vec<FetchAttribute>),
}

impl FetchItems {
    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        match self {
            Self::All => buf.extend_from_slice(b"ALL"),
            Self::Full => buf.extend_from_slice(b"FULL"),
            Self::Fast => buf.extend_from_slice(b"FAST"),
            Self::Items(attrs) if attrs.len() == 1 => attrs[0].write(buf),
            Self::Items(attrs) => {
                buf.push(b'(');
                for (i, attr) in attrs.iter().enumerate() {
                    if i > 0 {
                        buf.push(b' ');
                    }
                    attr.write(buf);
                }
                buf.push(b')');
            }
        }
    }
}

/// Individual FETCH attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// Message flags.
    Flags,
    /// Internal date.
    InternalDate,
    /// RFC822 size.
    Rfc822Size,
    /// Envelope structure.
    Envelope,
    /// Body structure.
    BodyStructure,
    /// UID.
    Uid,
    /// Body section, optionally peeked and partial.
    Body {
        /// Section specifier, e.g. `HEADER` or `1.2`.
        section: Option<String>,
        /// Use `BODY.PEEK` so `\Seen` is not set.
        peek: bool,
        /// Partial range `<start.len>`.
        partial: Option<(u32, u32)>,
    },
    /// RFC822 (full message).
    Rfc822,
    /// RFC822.HEADER.
    Rfc822Header,
    /// MODSEQ (CONDSTORE).
    ModSeq,
}

impl FetchAttribute {
    fn write(&self, buf: &mut Vec<u8>) {
        let name: &[u8] = match self {
            Self::Flags => b"FLAGS",
            Self::InternalDate => b"INTERNALDATE",
            Self::Rfc822Size => b"RFC822.SIZE",
            Self::Envelope => b"ENVELOPE",
            Self::BodyStructure => b"BODYSTRUCTURE",
            Self::Uid => b"UID",
            Self::Rfc822 => b"RFC822",
            Self::Rfc822Header => b"RFC822.HEADER",
            Self::ModSeq => b"MODSEQ",
            Self::Body {
                section,
                peek,
                partial,
            } => {
                buf.extend_from_slice(if *peek { b"BODY.PEEK[" } else { b"BODY[" });
                if let Some(s) = section {
                    buf.extend_from_slice(s.as_bytes());
                }
                buf.push(b']');
                if let Some((start, len)) = partial {
                    buf.extend_from_slice(format!("<{start}.{len}>").as_bytes());
                }
                return;
            }
        };
        buf.extend_from_slice(name);
    }
}

/// Whether STORE replaces, adds or removes flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// `FLAGS`
    Replace,
    /// `+FLAGS`
    Add,
    /// `-FLAGS`
    Remove,
}

impl StoreMode {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "FLAGS",
            Self::Add => "+FLAGS",
            Self::Remove => "-FLAGS",
        }
    }
}

/// Options for SELECT and EXAMINE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Send the `CONDSTORE` parameter.
    pub condstore: bool,
    /// Send the `QRESYNC` parameter.
    pub qresync: Option<crate::qresync::QresyncParams>,
}

/// SEARCH criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// All messages.
    All,
    /// Messages with \Answered flag.
    Answered,
    /// Messages with \Deleted flag.
    Deleted,
    /// Messages with \Draft flag.
    Draft,
    /// Messages with \Flagged flag.
    Flagged,
    /// Recent and unseen.
    New,
    /// Messages without \Deleted flag.
    Undeleted,
    /// Messages without \Seen flag.
    Unseen,
    /// Messages with \Seen flag.
    Seen,
    /// Messages carrying a keyword.
    Keyword(Flag),
    /// Messages not carrying a keyword.
    Unkeyword(Flag),
    /// Sequence number set.
    SequenceSet(SequenceSet),
    /// UID set.
    Uid(SequenceSet),
    /// Subject contains text.
    Subject(String),
    /// From contains text.
    From(String),
    /// To contains text.
    To(String),
    /// Cc contains text.
    Cc(String),
    /// Body contains text.
    Body(String),
    /// Text in header or body.
    Text(String),
    /// Internal date on or after.
    Since(NaiveDate),
    /// Internal date before.
    Before(NaiveDate),
    /// Internal date on.
    On(NaiveDate),
    /// Larger than size.
    Larger(u32),
    /// Smaller than size.
    Smaller(u32),
    /// Header field contains value.
    Header(String, String),
    /// Mod-sequence at or above a value (CONDSTORE).
    ModSeq(u64),
    /// All of the criteria.
    And(Vec<Self>),
    /// Either criterion.
    Or(Box<Self>, Box<Self>),
    /// Negation.
    Not(Box<Self>),
}
