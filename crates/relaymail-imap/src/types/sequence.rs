//! Sequence sets for message ranges.
//!
//! The same type addresses messages by sequence number and by UID; the
//! command that carries the set decides which one the numbers mean.

use std::num::NonZeroU32;
use std::str::FromStr;

use crate::Error;

/// Sequence set (RFC 3501 `sequence-set`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceSet {
    /// Single number.
    Single(NonZeroU32),
    /// Inclusive range.
    Range(NonZeroU32, NonZeroU32),
    /// From a number to the end of the mailbox (`n:*`).
    RangeFrom(NonZeroU32),
    /// Last message (`*`).
    All,
    /// Comma-separated list of the above.
    Set(Vec<Self>),
}

impl SequenceSet {
    /// Creates a sequence set from a single number; `None` for 0.
    #[must_use]
    pub fn single(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self::Single)
    }

    /// Creates a range sequence set; `None` if either end is 0.
    #[must_use]
    pub fn range(start: u32, end: u32) -> Option<Self> {
        Some(Self::Range(NonZeroU32::new(start)?, NonZeroU32::new(end)?))
    }

    /// Creates an open-ended range `start:*`.
    #[must_use]
    pub fn range_from(start: u32) -> Option<Self> {
        NonZeroU32::new(start).map(Self::RangeFrom)
    }

    /// Builds a set from individual numbers, skipping zeros.
    ///
    /// Returns `None` when no usable number remains.
    #[must_use]
    pub fn from_numbers(numbers: impl IntoIterator<Item = u32>) -> Option<Self> {
        let mut items: Vec<Self> = numbers.into_iter().filter_map(Self::single).collect();
        match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(Self::Set(items)),
        }
    }

    /// Returns true if `n` falls inside the set.
    ///
    /// `*` only matches via an explicit `n:*` range since the mailbox size
    /// is unknown here.
    #[must_use]
    pub fn contains(&self, n: u32) -> bool {
        match self {
            Self::Single(v) => v.get() == n,
            Self::Range(a, b) => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                (lo.get()..=hi.get()).contains(&n)
            }
            Self::RangeFrom(start) => n >= start.get(),
            Self::All => false,
            Self::Set(items) => items.iter().any(|s| s.contains(n)),
        }
    }
}

impl std::fmt::Display for SequenceSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(n) => write!(f, "{n}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::RangeFrom(start) => write!(f, "{start}:*"),
            Self::All => f.write_str("*"),
            Self::Set(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for SequenceSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut items = s
            .split(',')
            .map(parse_element)
            .collect::<Result<Vec<_>, _>>()?;
        if items.len() == 1 {
            return items
                .pop()
                .ok_or_else(|| Error::InvalidInput("empty sequence set".to_string()));
        }
        Ok(Self::Set(items))
    }
}

fn parse_element(s: &str) -> Result<SequenceSet, Error> {
    match s.split_once(':') {
        None if s == "*" => Ok(SequenceSet::All),
        None => Ok(SequenceSet::Single(parse_number(s)?)),
        Some((a, "*")) if a != "*" => Ok(SequenceSet::RangeFrom(parse_number(a)?)),
        Some(("*", b)) if b != "*" => Ok(SequenceSet::RangeFrom(parse_number(b)?)),
        Some(("*", "*")) => Ok(SequenceSet::All),
        Some((a, b)) => Ok(SequenceSet::Range(parse_number(a)?, parse_number(b)?)),
    }
}

fn parse_number(s: &str) -> Result<NonZeroU32, Error> {
    s.parse::<NonZeroU32>()
        .map_err(|_| Error::InvalidInput(format!("bad sequence number {s:?}")))
}
