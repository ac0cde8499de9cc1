//! Response codes.

use super::{Capability, Flag, SeqNum, SequenceSet, Uid, UidValidity};

/// Bracketed response code carried by a status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// ALERT: Human-readable message that MUST be shown to user.
    Alert,
    /// CAPABILITY response.
    Capability(Vec<Capability>),
    /// PARSE: Error parsing message.
    Parse,
    /// PERMANENTFLAGS: Flags that can be changed permanently.
    PermanentFlags(Vec<Flag>),
    /// READ-ONLY: Mailbox selected as read-only.
    ReadOnly,
    /// READ-WRITE: Mailbox selected as read-write.
    ReadWrite,
    /// TRYCREATE: Mailbox doesn't exist, but can be created.
    TryCreate,
    /// UIDNEXT: Next UID to be assigned.
    UidNext(Uid),
    /// UIDVALIDITY: Unique identifier validity value.
    UidValidity(UidValidity),
    /// UNSEEN: First unseen message sequence number.
    Unseen(SeqNum),
    /// APPENDUID (RFC 4315).
    AppendUid {
        /// UIDVALIDITY of the destination mailbox.
        uidvalidity: UidValidity,
        /// UID(s) assigned to the appended message(s).
        uids: SequenceSet,
    },
    /// COPYUID (RFC 4315).
    CopyUid {
        /// UIDVALIDITY of the destination mailbox.
        uidvalidity: UidValidity,
        /// Source UIDs.
        source: SequenceSet,
        /// Destination UIDs, in the same order.
        dest: SequenceSet,
    },
    /// HIGHESTMODSEQ (CONDSTORE).
    HighestModSeq(u64),
    /// NOMODSEQ: mailbox does not keep mod-sequences.
    NoModSeq,
    /// MODIFIED: messages that failed an UNCHANGEDSINCE test.
    Modified(SequenceSet),
    /// CLOSED: the previous mailbox was closed by a new SELECT (QRESYNC).
    Closed,
    /// Unknown response code, kept verbatim.
    Unknown(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn modified_carries_set() {
        let code = ResponseCode::Modified("7,9".parse().unwrap());
        let ResponseCode::Modified(set) = code else {
            panic!("Expected Modified variant");
        };
        assert!(set.contains(9));
    }

    #[test]
    fn copy_uid_keeps_order() {
        let code = ResponseCode::CopyUid {
            uidvalidity: UidValidity::new(888).unwrap(),
            source: "1:2".parse().unwrap(),
            dest: "101:102".parse().unwrap(),
        };
        if let ResponseCode::CopyUid { source, dest, .. } = code {
            assert_eq!(source.to_string(), "1:2");
            assert_eq!(dest.to_string(), "101:102");
        } else {
            panic!("Expected CopyUid variant");
        }
    }
}
