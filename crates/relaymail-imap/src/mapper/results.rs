//! Typed results produced by the mapper.

use crate::parser::{FetchItem, StatusItem};
use crate::qresync::{ChangedMessage, VanishedResponse};
use crate::types::{
    Capabilities, Capability, Flag, Flags, ListResponse, Mailbox, SeqNum, SequenceSet, Uid,
    UidValidity,
};

/// Answer to ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdResult {
    /// Field/value pairs in server order; empty for `ID NIL`.
    pub fields: Vec<(String, Option<String>)>,
}

impl IdResult {
    /// Looks up a field, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }
}

/// State of a mailbox after SELECT or EXAMINE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxInfo {
    /// Number of messages.
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// Flags defined for the mailbox.
    pub flags: Flags,
    /// Flags the client may change permanently.
    pub permanent_flags: Vec<Flag>,
    /// UIDVALIDITY
    pub uidvalidity: Option<UidValidity>,
    /// Predicted next UID.
    pub uidnext: Option<Uid>,
    /// First unseen message.
    pub unseen: Option<SeqNum>,
    /// HIGHESTMODSEQ (CONDSTORE).
    pub highest_modseq: Option<u64>,
    /// The server sent NOMODSEQ.
    pub no_modseq: bool,
    /// The completion carried `[READ-ONLY]`.
    pub read_only: bool,
    /// VANISHED (EARLIER) data sent for a QRESYNC select.
    pub vanished: Vec<VanishedResponse>,
    /// Messages changed since the QRESYNC mod-sequence.
    pub changed: Vec<ChangedMessage>,
}

/// Mailboxes from LIST or LSUB, plus any STATUS data that rode along.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListInfo {
    /// Mailboxes in server order.
    pub mailboxes: Vec<ListResponse>,
    /// STATUS answers returned by LIST-STATUS.
    pub statuses: Vec<StatusInfo>,
}

/// Answer to STATUS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusInfo {
    /// Mailbox the data is for.
    pub mailbox: Option<Mailbox>,
    /// MESSAGES
    pub messages: Option<u32>,
    /// RECENT
    pub recent: Option<u32>,
    /// UIDNEXT
    pub uidnext: Option<Uid>,
    /// UIDVALIDITY
    pub uidvalidity: Option<UidValidity>,
    /// UNSEEN
    pub unseen: Option<u32>,
    /// HIGHESTMODSEQ
    pub highest_modseq: Option<u64>,
}

impl StatusInfo {
    /// Folds one STATUS line in. A line for another mailbox replaces
    /// everything gathered so far.
    pub(super) fn apply(&mut self, mailbox: Mailbox, items: &[StatusItem]) {
        if self.mailbox.as_ref() != Some(&mailbox) {
            *self = Self::default();
        }
        self.mailbox = Some(mailbox);
        for item in items {
            match *item {
                StatusItem::Messages(n) => self.messages = Some(n),
                StatusItem::Recent(n) => self.recent = Some(n),
                StatusItem::UidNext(uid) => self.uidnext = Some(uid),
                StatusItem::UidValidity(v) => self.uidvalidity = Some(v),
                StatusItem::Unseen(n) => self.unseen = Some(n),
                StatusItem::HighestModSeq(m) => self.highest_modseq = Some(m),
            }
        }
    }
}

/// Answer to SEARCH or UID SEARCH.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Matching sequence numbers or UIDs.
    pub numbers: Vec<u32>,
    /// Highest mod-sequence among the matches (CONDSTORE).
    pub modseq: Option<u64>,
}

/// Data items the server returned for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMessage {
    /// Sequence number.
    pub seq: SeqNum,
    /// Items in server order.
    pub items: Vec<FetchItem>,
}

impl FetchedMessage {
    /// UID, if it was returned.
    #[must_use]
    pub fn uid(&self) -> Option<Uid> {
        self.items.iter().find_map(|item| match item {
            FetchItem::Uid(uid) => Some(*uid),
            _ => None,
        })
    }

    /// Flags, if they were returned.
    #[must_use]
    pub fn flags(&self) -> Option<&Flags> {
        self.items.iter().find_map(|item| match item {
            FetchItem::Flags(flags) => Some(flags),
            _ => None,
        })
    }

    /// MODSEQ, if it was returned.
    #[must_use]
    pub fn modseq(&self) -> Option<u64> {
        self.items.iter().find_map(|item| match item {
            FetchItem::ModSeq(m) => Some(*m),
            _ => None,
        })
    }

    /// Content of the first body section with the given name.
    #[must_use]
    pub fn body(&self, section: &str) -> Option<&[u8]> {
        self.items.iter().find_map(|item| match item {
            FetchItem::Body {
                section: Some(s),
                data: Some(data),
                ..
            } if s.eq_ignore_ascii_case(section) => Some(data.as_slice()),
            _ => None,
        })
    }
}

/// Answer to STORE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreResult {
    /// FETCH data the server sent for the updated messages.
    pub messages: Vec<FetchedMessage>,
    /// Messages that failed the UNCHANGEDSINCE test.
    pub modified: Option<SequenceSet>,
}

impl StoreResult {
    /// True if every message passed the UNCHANGEDSINCE test.
    #[must_use]
    pub const fn all_applied(&self) -> bool {
        self.modified.is_none()
    }
}

/// Answer to FETCH.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    /// Messages in server order.
    pub messages: Vec<FetchedMessage>,
    /// UIDs reported expunged (QRESYNC `VANISHED`).
    pub vanished: Vec<VanishedResponse>,
    /// Messages that failed the UNCHANGEDSINCE test.
    pub modified: Option<SequenceSet>,
}

/// Answer to ENABLE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnableResult {
    /// Extensions the server turned on.
    pub enabled: Vec<Capability>,
}

/// Answer to APPEND (UIDPLUS).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendResult {
    /// UIDVALIDITY of the destination.
    pub uidvalidity: Option<UidValidity>,
    /// UIDs given to the appended messages.
    pub uids: Option<SequenceSet>,
}

/// Answer to COPY or MOVE (UIDPLUS).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyResult {
    /// UIDVALIDITY of the destination.
    pub uidvalidity: Option<UidValidity>,
    /// Source UIDs.
    pub source: Option<SequenceSet>,
    /// Destination UIDs, in the same order as `source`.
    pub dest: Option<SequenceSet>,
}

/// A typed result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedResult {
    /// CAPABILITY
    Capabilities(Capabilities),
    /// ID
    Id(IdResult),
    /// SELECT / EXAMINE
    Mailbox(MailboxInfo),
    /// LIST / LSUB
    List(ListInfo),
    /// STATUS
    Status(StatusInfo),
    /// SEARCH
    Search(SearchResult),
    /// STORE
    Store(StoreResult),
    /// FETCH
    Fetch(FetchResult),
    /// ENABLE
    Enable(EnableResult),
    /// APPEND
    Append(AppendResult),
    /// COPY / MOVE
    Copy(CopyResult),
}
