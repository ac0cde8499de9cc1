//! IMAP command tag generator.
//!
//! Tags are used to match commands with their responses.

use std::sync::atomic::{AtomicU32, Ordering};

/// Last counter value handed out before wrapping back to 1.
const MAX_TAG: u32 = u32::MAX - 1;

/// Sequential tag source: `A0001`, `A0002`, ...
///
/// The counter starts at 1 and wraps to 1 before reaching `u32::MAX`.
/// Only one command is ever in flight, so a wrapped tag cannot collide.
#[derive(Debug)]
pub struct TagGenerator {
    counter: AtomicU32,
    prefix: String,
}

impl TagGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            counter: AtomicU32::new(0),
            prefix: prefix.into(),
        }
    }

    /// Generates the next tag.
    #[must_use]
    pub fn next(&self) -> String {
        let prev = self
            .counter
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(if n >= MAX_TAG { 1 } else { n + 1 })
            })
            .unwrap_or_default();
        let n = if prev >= MAX_TAG { 1 } else { prev + 1 };
        format!("{}{n:04}", self.prefix)
    }

    /// Returns the last counter value handed out.
    #[must_use]
    pub fn current(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    fn set_current(&self, n: u32) {
        self.counter.store(n, Ordering::Relaxed);
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new("A")
    }
}
