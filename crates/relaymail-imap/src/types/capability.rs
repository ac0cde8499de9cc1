//! Server capabilities and response status.

use std::collections::HashSet;

use crate::command::LiteralMode;

/// Largest literal LITERAL- lets the client send without waiting (RFC 7888).
pub const LITERAL_MINUS_MAX: usize = 4096;

/// Response status from a tagged or untagged status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Command completed successfully.
    Ok,
    /// Command failed (operational error).
    No,
    /// Command failed (protocol/syntax error).
    Bad,
    /// Server greeting (pre-authenticated).
    PreAuth,
    /// Server is closing connection.
    Bye,
}

impl Status {
    /// Returns true if this is a successful status.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }

    /// Parses a status keyword, ignoring case.
    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "NO" => Some(Self::No),
            "BAD" => Some(Self::Bad),
            "PREAUTH" => Some(Self::PreAuth),
            "BYE" => Some(Self::Bye),
            _ => None,
        }
    }
}

/// Server capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501)
    Imap4Rev1,
    /// IDLE command support (RFC 2177)
    Idle,
    /// NAMESPACE command support (RFC 2342)
    Namespace,
    /// UIDPLUS extension (RFC 4315)
    UidPlus,
    /// MOVE extension (RFC 6851)
    Move,
    /// LITERAL+ extension (RFC 7888)
    LiteralPlus,
    /// LITERAL- extension (RFC 7888)
    LiteralMinus,
    /// SASL initial client response (RFC 4959)
    SaslIr,
    /// STARTTLS support
    StartTls,
    /// LOGIN disabled
    LoginDisabled,
    /// AUTH mechanism
    Auth(String),
    /// ENABLE command (RFC 5161)
    Enable,
    /// CONDSTORE (RFC 7162)
    CondStore,
    /// QRESYNC (RFC 7162)
    QResync,
    /// STATUS return option for LIST (RFC 5819)
    ListStatus,
    /// ID extension (RFC 2971)
    Id,
    /// COMPRESS with the named algorithm (RFC 4978)
    Compress(String),
    /// SPECIAL-USE mailboxes (RFC 6154)
    SpecialUse,
    /// Unknown capability
    Unknown(String),
}

impl Capability {
    /// Parses a capability string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let upper = s.to_ascii_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "IDLE" => Self::Idle,
            "NAMESPACE" => Self::Namespace,
            "UIDPLUS" => Self::UidPlus,
            "MOVE" => Self::Move,
            "LITERAL+" => Self::LiteralPlus,
            "LITERAL-" => Self::LiteralMinus,
            "SASL-IR" => Self::SaslIr,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            "ENABLE" => Self::Enable,
            "CONDSTORE" => Self::CondStore,
            "QRESYNC" => Self::QResync,
            "LIST-STATUS" => Self::ListStatus,
            "ID" => Self::Id,
            "SPECIAL-USE" => Self::SpecialUse,
            _ if upper.starts_with("AUTH=") => Self::Auth(upper[5..].to_string()),
            _ if upper.starts_with("COMPRESS=") => Self::Compress(upper[9..].to_string()),
            _ => Self::Unknown(s.to_string()),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Imap4Rev1 => "IMAP4rev1",
            Self::Idle => "IDLE",
            Self::Namespace => "NAMESPACE",
            Self::UidPlus => "UIDPLUS",
            Self::Move => "MOVE",
            Self::LiteralPlus => "LITERAL+",
            Self::LiteralMinus => "LITERAL-",
            Self::SaslIr => "SASL-IR",
            Self::StartTls => "STARTTLS",
            Self::LoginDisabled => "LOGINDISABLED",
            Self::Enable => "ENABLE",
            Self::CondStore => "CONDSTORE",
            Self::QResync => "QRESYNC",
            Self::ListStatus => "LIST-STATUS",
            Self::Id => "ID",
            Self::SpecialUse => "SPECIAL-USE",
            Self::Auth(mech) => return write!(f, "AUTH={mech}"),
            Self::Compress(alg) => return write!(f, "COMPRESS={alg}"),
            Self::Unknown(s) => s,
        };
        f.write_str(name)
    }
}

/// Snapshot of what a server advertised.
///
/// Commands that can frame their payload more than one way (AUTHENTICATE,
/// APPEND, SEARCH with literals) consult this instead of talking to the
/// server themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    caps: HashSet<Capability>,
}

impl Capabilities {
    /// Creates an empty snapshot (plain IMAP4rev1 behavior).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw capability tokens.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        tokens.into_iter().map(Capability::parse).collect()
    }

    /// Adds a capability.
    pub fn insert(&mut self, cap: Capability) {
        self.caps.insert(cap);
    }

    /// Returns true if the capability was advertised.
    #[must_use]
    pub fn has(&self, cap: &Capability) -> bool {
        self.caps.contains(cap)
    }

    /// Returns true if `AUTH=<mechanism>` was advertised.
    #[must_use]
    pub fn has_auth(&self, mechanism: &str) -> bool {
        self.caps
            .contains(&Capability::Auth(mechanism.to_ascii_uppercase()))
    }

    /// Returns true if AUTHENTICATE may carry an initial response.
    #[must_use]
    pub fn sasl_ir(&self) -> bool {
        self.has(&Capability::SaslIr)
    }

    /// Chooses how a literal of `len` bytes is announced.
    #[must_use]
    pub fn literal_mode(&self, len: usize) -> LiteralMode {
        if self.has(&Capability::LiteralPlus) {
            LiteralMode::NonSync
        } else if self.has(&Capability::LiteralMinus) && len <= LITERAL_MINUS_MAX {
            LiteralMode::NonSyncMinus
        } else {
            LiteralMode::Sync
        }
    }

    /// Returns an iterator over the advertised capabilities.
    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.caps.iter()
    }

    /// Returns the number of capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.caps.len()
    }

    /// Returns true if nothing was advertised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            caps: iter.into_iter().collect(),
        }
    }
}
