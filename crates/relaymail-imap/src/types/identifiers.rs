//! Core IMAP identifiers: tags, sequence numbers, UIDs, and UIDVALIDITY.

use std::num::NonZeroU32;

/// IMAP command tag.
///
/// The client prefixes every command with a tag and the server echoes it
/// on the line that completes that command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! nonzero_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub NonZeroU32);

        impl $name {
            /// Wraps a value, returning `None` for 0.
            #[must_use]
            pub fn new(n: u32) -> Option<Self> {
                NonZeroU32::new(n).map(Self)
            }

            /// Returns the underlying value.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

nonzero_id!(
    /// Message sequence number (1-based, shifts when messages are expunged).
    SeqNum
);

nonzero_id!(
    /// Unique identifier of a message within one UIDVALIDITY epoch.
    Uid
);

nonzero_id!(
    /// UIDVALIDITY of a mailbox; a change invalidates every known UID.
    UidValidity
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert!(SeqNum::new(0).is_none());
        assert!(Uid::new(0).is_none());
        assert!(UidValidity::new(0).is_none());
    }

    #[test]
    fn values_round_trip_and_order() {
        let a = Uid::new(100).unwrap();
        let b = Uid::new(200).unwrap();
        assert!(a < b);
        assert_eq!(a.get(), 100);
        assert_eq!(SeqNum::new(u32::MAX).unwrap().get(), u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(Tag::new("A0001").to_string(), "A0001");
        assert_eq!(UidValidity::new(42).unwrap().to_string(), "42");
    }
}
