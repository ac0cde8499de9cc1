//! Session states.

/// Where a session stands in its one-command-at-a-time cycle.
///
/// ```text
/// Idle ──execute──▶ AwaitingResponse ──tagged──▶ Idle
///                        │    ▲
///            `+` → None  ▼    │ terminate
///                     AwaitingPush
/// any ──close / disconnect──▶ Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No command in flight.
    #[default]
    Idle,
    /// A command was written; waiting for its tagged completion.
    AwaitingResponse,
    /// A long-running command (IDLE) is open; untagged lines are pushed to
    /// its streaming sink.
    AwaitingPush,
    /// The session was closed or the transport failed.
    Closed,
}

impl SessionState {
    /// Returns `true` if a command is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::AwaitingResponse | Self::AwaitingPush)
    }

    /// Returns `true` once the session can no longer execute commands.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert_eq!(SessionState::default(), SessionState::Idle);
        assert!(!SessionState::Idle.is_busy());
        assert!(SessionState::AwaitingResponse.is_busy());
        assert!(SessionState::AwaitingPush.is_busy());
        assert!(!SessionState::Closed.is_busy());
        assert!(SessionState::Closed.is_closed());
    }
}
