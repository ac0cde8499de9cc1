//! QRESYNC and CONDSTORE support (RFC 7162).
//!
//! CONDSTORE gives every message a mod-sequence that grows whenever its
//! metadata changes. QRESYNC lets a client that remembers a mailbox's
//! UIDVALIDITY and HIGHESTMODSEQ reopen it and receive only what changed:
//! `VANISHED` for expunged UIDs and `FETCH` for changed flags.

use crate::types::{Flags, SequenceSet, Uid, UidValidity};
use crate::{Error, Result};

/// Parameters for a QRESYNC SELECT/EXAMINE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QresyncParams {
    /// The last known UIDVALIDITY.
    pub uidvalidity: UidValidity,
    /// HIGHESTMODSEQ from the previous session.
    pub modseq: u64,
    /// UIDs the client still holds; lets the server report them as VANISHED.
    pub known_uids: Option<SequenceSet>,
    /// Known sequence numbers paired with their UIDs.
    pub seq_match: Option<(SequenceSet, SequenceSet)>,
}

impl QresyncParams {
    /// Creates minimal QRESYNC parameters.
    #[must_use]
    pub const fn new(uidvalidity: UidValidity, modseq: u64) -> Self {
        Self {
            uidvalidity,
            modseq,
            known_uids: None,
            seq_match: None,
        }
    }

    /// Adds known UIDs.
    #[must_use]
    pub fn with_known_uids(mut self, uids: SequenceSet) -> Self {
        self.known_uids = Some(uids);
        self
    }

    /// Adds a sequence-to-UID sample.
    #[must_use]
    pub fn with_seq_match(mut self, seqs: SequenceSet, uids: SequenceSet) -> Self {
        self.seq_match = Some((seqs, uids));
        self
    }

    /// Writes `(QRESYNC (uidvalidity modseq [known-uids [(seqs uids)]]))`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when a sequence match is given
    /// without known UIDs, which the grammar does not allow.
    pub fn write(&self, buf: &mut Vec<u8>) -> Result<()> {
        let mut inner = format!("{} {}", self.uidvalidity, self.modseq);
        match (&self.known_uids, &self.seq_match) {
            (Some(uids), Some((seqs, seq_uids))) => {
                inner.push_str(&format!(" {uids} ({seqs} {seq_uids})"));
            }
            (Some(uids), None) => inner.push_str(&format!(" {uids}")),
            (None, Some(_)) => {
                return Err(Error::InvalidInput(
                    "QRESYNC sequence match requires known UIDs".to_string(),
                ));
            }
            (None, None) => {}
        }
        buf.extend_from_slice(format!("(QRESYNC ({inner}))").as_bytes());
        Ok(())
    }
}

/// A VANISHED response: UIDs expunged since the client last looked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VanishedResponse {
    /// `(EARLIER)`: reports expunges that happened before this command.
    pub earlier: bool,
    /// UIDs that have been expunged.
    pub uids: SequenceSet,
}

/// A message whose metadata changed since a given mod-sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedMessage {
    /// Sequence number in the FETCH response.
    pub seq: u32,
    /// The message UID, when reported.
    pub uid: Option<Uid>,
    /// The new MODSEQ value.
    pub modseq: u64,
    /// The current flags, when reported.
    pub flags: Option<Flags>,
}
