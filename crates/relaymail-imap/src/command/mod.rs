//! IMAP commands.
//!
//! Every verb implements [`ImapCommand`], the contract the session engine
//! drives: one initial line, optional replies to `+` continuations, and an
//! optional client-side terminator. Single-line verbs live in the
//! [`Command`] enum; verbs with a multi-step exchange have their own type.

mod append;
pub mod args;
mod authenticate;
mod idle;
mod literal;
mod search;
mod tag_generator;
mod types;

use std::fmt;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::mapper::ResultKind;
use crate::types::{Flag, Mailbox, SequenceSet};
use crate::{Error, Result};
use args::{
    write_astring, write_atom, write_flag_list, write_list_pattern, write_mailbox, write_nstring,
    write_quoted,
};

pub use append::AppendCommand;
pub use authenticate::AuthenticateCommand;
pub use idle::IdleCommand;
pub use literal::LiteralMode;
pub(crate) use literal::LineBuilder;
pub use search::SearchCommand;
pub use tag_generator::TagGenerator;
pub use types::{
    FetchAttribute, FetchItems, SearchCriteria, SelectOptions, StatusAttribute, StoreMode,
};

/// Line terminator.
pub const CRLF: &[u8] = b"\r\n";
/// Ends an IDLE.
pub const DONE: &[u8] = b"DONE\r\n";
/// Cancels a SASL exchange.
pub const SASL_CANCEL: &[u8] = b"*\r\n";

/// Receives untagged lines while a streaming command (IDLE) is open.
pub type StreamingSink = mpsc::UnboundedSender<Bytes>;

/// One encoded client line (or literal chunk) ready for the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Bytes to write, CRLF included.
    pub bytes: Bytes,
    /// Whether the bytes carry credentials and must be kept out of logs.
    pub sensitive: bool,
}

impl CommandLine {
    /// A line safe to log.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            sensitive: false,
        }
    }

    /// A line holding secrets.
    #[must_use]
    pub fn sensitive(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            sensitive: true,
        }
    }
}

impl fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CommandLine");
        if self.sensitive {
            s.field("bytes", &format_args!("<{} bytes redacted>", self.bytes.len()));
        } else {
            s.field("bytes", &String::from_utf8_lossy(&self.bytes));
        }
        s.field("sensitive", &self.sensitive).finish()
    }
}

/// Identifies the verb behind a command, for logging and result mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    /// CAPABILITY
    Capability,
    /// NOOP
    Noop,
    /// LOGOUT
    Logout,
    /// STARTTLS
    StartTls,
    /// LOGIN
    Login,
    /// AUTHENTICATE
    Authenticate,
    /// ID
    Id,
    /// ENABLE
    Enable,
    /// COMPRESS
    Compress,
    /// SELECT
    Select,
    /// EXAMINE
    Examine,
    /// CREATE
    Create,
    /// DELETE
    Delete,
    /// RENAME
    Rename,
    /// SUBSCRIBE
    Subscribe,
    /// UNSUBSCRIBE
    Unsubscribe,
    /// LIST
    List,
    /// LSUB
    Lsub,
    /// NAMESPACE
    Namespace,
    /// STATUS
    Status,
    /// APPEND
    Append,
    /// CHECK
    Check,
    /// CLOSE
    Close,
    /// UNSELECT
    Unselect,
    /// EXPUNGE
    Expunge,
    /// UID EXPUNGE
    UidExpunge,
    /// SEARCH / UID SEARCH
    Search,
    /// FETCH / UID FETCH
    Fetch,
    /// STORE / UID STORE
    Store,
    /// COPY / UID COPY
    Copy,
    /// MOVE / UID MOVE
    Move,
    /// IDLE
    Idle,
}

impl CommandType {
    /// The typed result this verb maps to, if it has one.
    #[must_use]
    pub const fn result_kind(self) -> Option<ResultKind> {
        Some(match self {
            Self::Capability => ResultKind::Capability,
            Self::Id => ResultKind::Id,
            Self::Select | Self::Examine => ResultKind::Mailbox,
            Self::List | Self::Lsub => ResultKind::List,
            Self::Status => ResultKind::Status,
            Self::Search => ResultKind::Search,
            Self::Store => ResultKind::Store,
            Self::Fetch => ResultKind::Fetch,
            Self::Enable => ResultKind::Enable,
            Self::Append => ResultKind::Append,
            Self::Copy | Self::Move => ResultKind::Copy,
            _ => return None,
        })
    }
}

/// The contract between a command and the session engine.
///
/// A command is single-use: the engine asks for the first line once, then
/// calls [`next_line_after_continuation`](Self::next_line_after_continuation)
/// for each `+` the server sends until the tagged response arrives, and
/// calls [`cleanup`](Self::cleanup) when the exchange ends.
pub trait ImapCommand: Send {
    /// Verb of this command.
    fn command_type(&self) -> CommandType;

    /// First wire line without the tag, CRLF-terminated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for arguments that cannot be encoded.
    fn command_line(&mut self) -> Result<CommandLine>;

    /// Reply to a `+` continuation. `Ok(None)` means the command now waits
    /// for server pushes without sending anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationNotSupportedForCommand`] unless the command
    /// models continuations.
    fn next_line_after_continuation(&mut self, _line: &[u8]) -> Result<Option<CommandLine>> {
        Err(Error::not_supported(self.command_type(), "continuation"))
    }

    /// Client-side end of a long-running command (IDLE's `DONE`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationNotSupportedForCommand`] unless the command
    /// can be terminated.
    fn terminate_line(&mut self) -> Result<CommandLine> {
        Err(Error::not_supported(self.command_type(), "terminate"))
    }

    /// Channel for untagged lines that must reach the caller while the
    /// command is still open.
    fn streaming_sink(&self) -> Option<StreamingSink> {
        None
    }

    /// Redacted description for logs.
    fn debug_data(&self) -> String;

    /// Drops credentials and buffers once the exchange is over.
    fn cleanup(&mut self) {}
}

impl<C: ImapCommand + ?Sized> ImapCommand for Box<C> {
    fn command_type(&self) -> CommandType {
        (**self).command_type()
    }

    fn command_line(&mut self) -> Result<CommandLine> {
        (**self).command_line()
    }

    fn next_line_after_continuation(&mut self, line: &[u8]) -> Result<Option<CommandLine>> {
        (**self).next_line_after_continuation(line)
    }

    fn terminate_line(&mut self) -> Result<CommandLine> {
        (**self).terminate_line()
    }

    fn streaming_sink(&self) -> Option<StreamingSink> {
        (**self).streaming_sink()
    }

    fn debug_data(&self) -> String {
        (**self).debug_data()
    }

    fn cleanup(&mut self) {
        (**self).cleanup();
    }
}

/// A credential that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Overwrites and empties the buffer.
    pub fn clear(&mut self) {
        let len = self.0.len();
        self.0.clear();
        self.0.extend(std::iter::repeat_n('\0', len));
        self.0 = String::new();
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Single-line IMAP commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Any state
    /// CAPABILITY
    Capability,
    /// NOOP
    Noop,
    /// LOGOUT
    Logout,

    // Not authenticated
    /// STARTTLS
    StartTls,
    /// LOGIN
    Login {
        /// Username.
        username: String,
        /// Password.
        password: Secret,
    },

    // Authenticated
    /// ID (RFC 2971). `None` or an empty list sends `ID NIL`.
    Id {
        /// Field/value pairs; a `None` value is sent as NIL.
        parameters: Option<Vec<(String, Option<String>)>>,
    },
    /// ENABLE (RFC 5161).
    Enable {
        /// Capabilities to enable.
        capabilities: Vec<String>,
    },
    /// COMPRESS DEFLATE (RFC 4978).
    Compress,
    /// SELECT
    Select {
        /// Mailbox to select.
        mailbox: Mailbox,
        /// CONDSTORE / QRESYNC parameters.
        options: SelectOptions,
    },
    /// EXAMINE (read-only SELECT).
    Examine {
        /// Mailbox to examine.
        mailbox: Mailbox,
        /// CONDSTORE / QRESYNC parameters.
        options: SelectOptions,
    },
    /// CREATE
    Create {
        /// Mailbox to create.
        mailbox: Mailbox,
    },
    /// DELETE
    Delete {
        /// Mailbox to delete.
        mailbox: Mailbox,
    },
    /// RENAME
    Rename {
        /// Current name.
        from: Mailbox,
        /// New name.
        to: Mailbox,
    },
    /// SUBSCRIBE
    Subscribe {
        /// Mailbox to subscribe.
        mailbox: Mailbox,
    },
    /// UNSUBSCRIBE
    Unsubscribe {
        /// Mailbox to unsubscribe.
        mailbox: Mailbox,
    },
    /// LIST, optionally with `RETURN (STATUS (...))` (RFC 5819).
    List {
        /// Reference name.
        reference: Mailbox,
        /// Pattern with `*` / `%` wildcards.
        pattern: Mailbox,
        /// STATUS items to return with each mailbox; empty for plain LIST.
        return_status: Vec<StatusAttribute>,
    },
    /// LSUB
    Lsub {
        /// Reference name.
        reference: Mailbox,
        /// Pattern with `*` / `%` wildcards.
        pattern: Mailbox,
    },
    /// NAMESPACE
    Namespace,
    /// STATUS
    Status {
        /// Mailbox name.
        mailbox: Mailbox,
        /// Items to request.
        items: Vec<StatusAttribute>,
    },

    // Selected
    /// CHECK
    Check,
    /// CLOSE
    Close,
    /// UNSELECT
    Unselect,
    /// EXPUNGE
    Expunge,
    /// UID EXPUNGE (UIDPLUS).
    UidExpunge {
        /// UIDs to expunge.
        uids: SequenceSet,
    },
    /// FETCH / UID FETCH.
    Fetch {
        /// Messages to fetch.
        sequence: SequenceSet,
        /// Items to fetch.
        items: FetchItems,
        /// Address messages by UID.
        uid: bool,
        /// `CHANGEDSINCE` modifier (CONDSTORE).
        changed_since: Option<u64>,
        /// `VANISHED` modifier (QRESYNC, UID FETCH with CHANGEDSINCE only).
        vanished: bool,
    },
    /// STORE / UID STORE.
    Store {
        /// Messages to modify.
        sequence: SequenceSet,
        /// Replace, add or remove.
        mode: StoreMode,
        /// Flags, sent in canonical order.
        flags: Vec<Flag>,
        /// Address messages by UID.
        uid: bool,
        /// Suppress the untagged FETCH echo.
        silent: bool,
        /// `UNCHANGEDSINCE` modifier (CONDSTORE).
        unchanged_since: Option<u64>,
    },
    /// COPY / UID COPY.
    Copy {
        /// Messages to copy.
        sequence: SequenceSet,
        /// Destination.
        mailbox: Mailbox,
        /// Address messages by UID.
        uid: bool,
    },
    /// MOVE / UID MOVE (RFC 6851).
    Move {
        /// Messages to move.
        sequence: SequenceSet,
        /// Destination.
        mailbox: Mailbox,
        /// Address messages by UID.
        uid: bool,
    },
}

impl Command {
    /// Creates a LOGIN command.
    #[must_use]
    pub fn login(username: impl Into<String>, password: impl Into<Secret>) -> Self {
        Self::Login {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates a plain SELECT.
    #[must_use]
    pub fn select(mailbox: Mailbox) -> Self {
        Self::Select {
            mailbox,
            options: SelectOptions::default(),
        }
    }

    /// Creates a plain LIST.
    #[must_use]
    pub fn list(reference: &str, pattern: &str) -> Self {
        Self::List {
            reference: Mailbox::new(reference),
            pattern: Mailbox::new(pattern),
            return_status: Vec::new(),
        }
    }

    /// Creates a non-CONDSTORE STORE.
    #[must_use]
    pub fn store(sequence: SequenceSet, mode: StoreMode, flags: Vec<Flag>, silent: bool) -> Self {
        Self::Store {
            sequence,
            mode,
            flags,
            uid: false,
            silent,
            unchanged_since: None,
        }
    }

    /// Creates a FETCH without modifiers.
    #[must_use]
    pub fn fetch(sequence: SequenceSet, items: FetchItems, uid: bool) -> Self {
        Self::Fetch {
            sequence,
            items,
            uid,
            changed_since: None,
            vanished: false,
        }
    }

    /// Encodes the command without tag, CRLF included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for non-ASCII arguments, empty
    /// required lists, or mutually exclusive options.
    #[allow(clippy::too_many_lines)]
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();

        match self {
            Self::Capability => buf.extend_from_slice(b"CAPABILITY"),
            Self::Noop => buf.extend_from_slice(b"NOOP"),
            Self::Logout => buf.extend_from_slice(b"LOGOUT"),
            Self::StartTls => buf.extend_from_slice(b"STARTTLS"),
            Self::Compress => buf.extend_from_slice(b"COMPRESS DEFLATE"),
            Self::Namespace => buf.extend_from_slice(b"NAMESPACE"),
            Self::Check => buf.extend_from_slice(b"CHECK"),
            Self::Close => buf.extend_from_slice(b"CLOSE"),
            Self::Unselect => buf.extend_from_slice(b"UNSELECT"),
            Self::Expunge => buf.extend_from_slice(b"EXPUNGE"),

            Self::Login { username, password } => {
                buf.extend_from_slice(b"LOGIN ");
                write_astring(&mut buf, username)?;
                buf.push(b' ');
                write_astring(&mut buf, password.expose())?;
            }

            Self::Id { parameters } => {
                buf.extend_from_slice(b"ID ");
                match parameters.as_deref() {
                    None | Some([]) => buf.extend_from_slice(b"NIL"),
                    Some(params) => {
                        buf.push(b'(');
                        for (i, (field, value)) in params.iter().enumerate() {
                            if i > 0 {
                                buf.push(b' ');
                            }
                            write_quoted(&mut buf, field)?;
                            buf.push(b' ');
                            write_nstring(&mut buf, value.as_deref())?;
                        }
                        buf.push(b')');
                    }
                }
            }

            Self::Enable { capabilities } => {
                if capabilities.is_empty() {
                    return Err(Error::InvalidInput(
                        "ENABLE needs at least one capability".to_string(),
                    ));
                }
                buf.extend_from_slice(b"ENABLE");
                for cap in capabilities {
                    buf.push(b' ');
                    write_atom(&mut buf, cap)?;
                }
            }

            Self::Select { mailbox, options } | Self::Examine { mailbox, options } => {
                let verb: &[u8] = if matches!(self, Self::Select { .. }) {
                    b"SELECT "
                } else {
                    b"EXAMINE "
                };
                buf.extend_from_slice(verb);
                write_mailbox(&mut buf, mailbox)?;
                match (options.condstore, &options.qresync) {
                    (true, Some(_)) => {
                        return Err(Error::InvalidInput(
                            "CONDSTORE and QRESYNC select parameters are exclusive".to_string(),
                        ));
                    }
                    (true, None) => buf.extend_from_slice(b" (CONDSTORE)"),
                    (false, Some(params)) => {
                        buf.push(b' ');
                        params.write(&mut buf)?;
                    }
                    (false, None) => {}
                }
            }

            Self::Create { mailbox } => {
                buf.extend_from_slice(b"CREATE ");
                write_mailbox(&mut buf, mailbox)?;
            }

            Self::Delete { mailbox } => {
                buf.extend_from_slice(b"DELETE ");
                write_mailbox(&mut buf, mailbox)?;
            }

            Self::Rename { from, to } => {
                buf.extend_from_slice(b"RENAME ");
                write_mailbox(&mut buf, from)?;
                buf.push(b' ');
                write_mailbox(&mut buf, to)?;
            }

            Self::Subscribe { mailbox } => {
                buf.extend_from_slice(b"SUBSCRIBE ");
                write_mailbox(&mut buf, mailbox)?;
            }

            Self::Unsubscribe { mailbox } => {
                buf.extend_from_slice(b"UNSUBSCRIBE ");
                write_mailbox(&mut buf, mailbox)?;
            }

            Self::List {
                reference,
                pattern,
                return_status,
            } => {
                buf.extend_from_slice(b"LIST ");
                write_mailbox(&mut buf, reference)?;
                buf.push(b' ');
                write_list_pattern(&mut buf, pattern.as_str())?;
                if !return_status.is_empty() {
                    buf.extend_from_slice(b" RETURN (STATUS ");
                    StatusAttribute::write_list(&mut buf, return_status);
                    buf.push(b')');
                }
            }

            Self::Lsub { reference, pattern } => {
                buf.extend_from_slice(b"LSUB ");
                write_mailbox(&mut buf, reference)?;
                buf.push(b' ');
                write_list_pattern(&mut buf, pattern.as_str())?;
            }

            Self::Status { mailbox, items } => {
                if items.is_empty() {
                    return Err(Error::InvalidInput(
                        "STATUS needs at least one item".to_string(),
                    ));
                }
                buf.extend_from_slice(b"STATUS ");
                write_mailbox(&mut buf, mailbox)?;
                buf.push(b' ');
                StatusAttribute::write_list(&mut buf, items);
            }

            Self::UidExpunge { uids } => {
                buf.extend_from_slice(format!("UID EXPUNGE {uids}").as_bytes());
            }

            Self::Fetch {
                sequence,
                items,
                uid,
                changed_since,
                vanished,
            } => {
                if matches!(items, FetchItems::Items(attrs) if attrs.is_empty()) {
                    return Err(Error::InvalidInput(
                        "FETCH needs at least one item".to_string(),
                    ));
                }
                if *vanished && !(*uid && changed_since.is_some()) {
                    return Err(Error::InvalidInput(
                        "VANISHED requires UID FETCH with CHANGEDSINCE".to_string(),
                    ));
                }
                write_uid_prefix(&mut buf, *uid);
                buf.extend_from_slice(format!("FETCH {sequence} ").as_bytes());
                items.write(&mut buf);
                if let Some(modseq) = changed_since {
                    buf.extend_from_slice(format!(" (CHANGEDSINCE {modseq}").as_bytes());
                    if *vanished {
                        buf.extend_from_slice(b" VANISHED");
                    }
                    buf.push(b')');
                }
            }

            Self::Store {
                sequence,
                mode,
                flags,
                uid,
                silent,
                unchanged_since,
            } => {
                write_uid_prefix(&mut buf, *uid);
                buf.extend_from_slice(format!("STORE {sequence} ").as_bytes());
                if let Some(modseq) = unchanged_since {
                    buf.extend_from_slice(format!("(UNCHANGEDSINCE {modseq}) ").as_bytes());
                }
                buf.extend_from_slice(mode.as_str().as_bytes());
                if *silent {
                    buf.extend_from_slice(b".SILENT");
                }
                buf.push(b' ');
                write_flag_list(&mut buf, flags)?;
            }

            Self::Copy {
                sequence,
                mailbox,
                uid,
            } => {
                write_uid_prefix(&mut buf, *uid);
                buf.extend_from_slice(format!("COPY {sequence} ").as_bytes());
                write_mailbox(&mut buf, mailbox)?;
            }

            Self::Move {
                sequence,
                mailbox,
                uid,
            } => {
                write_uid_prefix(&mut buf, *uid);
                buf.extend_from_slice(format!("MOVE {sequence} ").as_bytes());
                write_mailbox(&mut buf, mailbox)?;
            }
        }

        buf.extend_from_slice(CRLF);
        Ok(buf)
    }
}

fn write_uid_prefix(buf: &mut Vec<u8>, uid: bool) {
    if uid {
        buf.extend_from_slice(b"UID ");
    }
}

impl ImapCommand for Command {
    fn command_type(&self) -> CommandType {
        match self {
            Self::Capability => CommandType::Capability,
            Self::Noop => CommandType::Noop,
            Self::Logout => CommandType::Logout,
            Self::StartTls => CommandType::StartTls,
            Self::Login { .. } => CommandType::Login,
            Self::Id { .. } => CommandType::Id,
            Self::Enable { .. } => CommandType::Enable,
            Self::Compress => CommandType::Compress,
            Self::Select { .. } => CommandType::Select,
            Self::Examine { .. } => CommandType::Examine,
            Self::Create { .. } => CommandType::Create,
            Self::Delete { .. } => CommandType::Delete,
            Self::Rename { .. } => CommandType::Rename,
            Self::Subscribe { .. } => CommandType::Subscribe,
            Self::Unsubscribe { .. } => CommandType::Unsubscribe,
            Self::List { .. } => CommandType::List,
            Self::Lsub { .. } => CommandType::Lsub,
            Self::Namespace => CommandType::Namespace,
            Self::Status { .. } => CommandType::Status,
            Self::Check => CommandType::Check,
            Self::Close => CommandType::Close,
            Self::Unselect => CommandType::Unselect,
            Self::Expunge => CommandType::Expunge,
            Self::UidExpunge { .. } => CommandType::UidExpunge,
            Self::Fetch { .. } => CommandType::Fetch,
            Self::Store { .. } => CommandType::Store,
            Self::Copy { .. } => CommandType::Copy,
            Self::Move { .. } => CommandType::Move,
        }
    }

    fn command_line(&mut self) -> Result<CommandLine> {
        let bytes = self.encode()?;
        Ok(if matches!(self, Self::Login { .. }) {
            CommandLine::sensitive(bytes)
        } else {
            CommandLine::new(bytes)
        })
    }

    fn debug_data(&self) -> String {
        format!("{self:?}")
    }

    fn cleanup(&mut self) {
        if let Self::Login { password, .. } = self {
            password.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::qresync::QresyncParams;
    use crate::types::UidValidity;

    fn line(mut cmd: Command) -> Vec<u8> {
        cmd.command_line().unwrap().bytes.to_vec()
    }

    mod encode_tests {
        use super::*;

        #[test]
        fn bare_verbs() {
            assert_eq!(line(Command::Capability), b"CAPABILITY\r\n");
            assert_eq!(line(Command::Noop), b"NOOP\r\n");
            assert_eq!(line(Command::Compress), b"COMPRESS DEFLATE\r\n");
            assert_eq!(line(Command::Check), b"CHECK\r\n");
        }

        #[test]
        fn store_uses_canonical_flag_order() {
            let cmd = Command::store(
                SequenceSet::range(1, 3).unwrap(),
                StoreMode::Add,
                vec![Flag::Seen, Flag::Deleted],
                false,
            );
            assert_eq!(line(cmd), b"STORE 1:3 +FLAGS (\\Deleted \\Seen)\r\n");
        }

        #[test]
        fn store_silent_unchanged_since() {
            let cmd = Command::Store {
                sequence: SequenceSet::single(7).unwrap(),
                mode: StoreMode::Remove,
                flags: vec![Flag::Flagged],
                uid: true,
                silent: true,
                unchanged_since: Some(12_345),
            };
            assert_eq!(
                line(cmd),
                b"UID STORE 7 (UNCHANGEDSINCE 12345) -FLAGS.SILENT (\\Flagged)\r\n"
            );
        }

        #[test]
        fn delete_quotes_spaces() {
            let cmd = Command::Delete {
                mailbox: Mailbox::new("folder ABC"),
            };
            assert_eq!(line(cmd), b"DELETE \"folder ABC\"\r\n");
        }

        #[test]
        fn delete_encodes_unicode_name() {
            let cmd = Command::Delete {
                mailbox: Mailbox::new("测试"),
            };
            assert_eq!(line(cmd), b"DELETE &bUuL1Q-\r\n");
        }

        #[test]
        fn raw_eight_bit_mailbox_is_rejected() {
            let mut cmd = Command::Create {
                mailbox: Mailbox::from_wire("Entwürfe"),
            };
            assert!(matches!(cmd.command_line(), Err(Error::InvalidInput(_))));
        }

        #[test]
        fn login_is_sensitive() {
            let mut cmd = Command::login("user@example.com", "pass word");
            let first = cmd.command_line().unwrap();
            assert!(first.sensitive);
            assert_eq!(
                first.bytes.as_ref(),
                b"LOGIN user@example.com \"pass word\"\r\n"
            );
            assert!(!cmd.debug_data().contains("pass word"));
        }

        #[test]
        fn login_refuses_line_breaks() {
            let mut cmd = Command::login("u", "p\r\nA9 LOGOUT");
            assert!(matches!(cmd.command_line(), Err(Error::InvalidInput(_))));
            let mut cmd = Command::login("u\n", "p");
            assert!(matches!(cmd.command_line(), Err(Error::InvalidInput(_))));
        }

        #[test]
        fn cleanup_wipes_password() {
            let mut cmd = Command::login("u", "secret");
            cmd.cleanup();
            let Command::Login { password, .. } = &cmd else {
                panic!("Expected Login");
            };
            assert_eq!(password.expose(), "");
        }

        #[test]
        fn list_variants() {
            assert_eq!(line(Command::list("", "*")), b"LIST \"\" *\r\n");
            let cmd = Command::List {
                reference: Mailbox::new(""),
                pattern: Mailbox::new("%"),
                return_status: vec![StatusAttribute::Messages, StatusAttribute::Unseen],
            };
            assert_eq!(
                line(cmd),
                b"LIST \"\" % RETURN (STATUS (MESSAGES UNSEEN))\r\n"
            );
        }

        #[test]
        fn id_forms() {
            assert_eq!(line(Command::Id { parameters: None }), b"ID NIL\r\n");
            let cmd = Command::Id {
                parameters: Some(vec![
                    ("name".to_string(), Some("relaymail".to_string())),
                    ("vendor".to_string(), None),
                ]),
            };
            assert_eq!(line(cmd), b"ID (\"name\" \"relaymail\" \"vendor\" NIL)\r\n");
        }

        #[test]
        fn select_condstore_and_qresync() {
            let cmd = Command::Select {
                mailbox: Mailbox::inbox(),
                options: SelectOptions {
                    condstore: true,
                    qresync: None,
                },
            };
            assert_eq!(line(cmd), b"SELECT INBOX (CONDSTORE)\r\n");

            let cmd = Command::Examine {
                mailbox: Mailbox::inbox(),
                options: SelectOptions {
                    condstore: false,
                    qresync: Some(QresyncParams::new(UidValidity::new(3).unwrap(), 20)),
                },
            };
            assert_eq!(line(cmd), b"EXAMINE INBOX (QRESYNC (3 20))\r\n");
        }

        #[test]
        fn fetch_modifiers() {
            let cmd = Command::Fetch {
                sequence: SequenceSet::range_from(1).unwrap(),
                items: FetchItems::Items(vec![FetchAttribute::Flags]),
                uid: true,
                changed_since: Some(394),
                vanished: true,
            };
            assert_eq!(
                line(cmd),
                b"UID FETCH 1:* FLAGS (CHANGEDSINCE 394 VANISHED)\r\n"
            );
        }

        #[test]
        fn misc_mailbox_verbs() {
            let cmd = Command::Rename {
                from: Mailbox::new("Old"),
                to: Mailbox::new("New Name"),
            };
            assert_eq!(line(cmd), b"RENAME Old \"New Name\"\r\n");
            let cmd = Command::Move {
                sequence: SequenceSet::single(4).unwrap(),
                mailbox: Mailbox::new("Trash"),
                uid: true,
            };
            assert_eq!(line(cmd), b"UID MOVE 4 Trash\r\n");
            let cmd = Command::UidExpunge {
                uids: SequenceSet::range(100, 200).unwrap(),
            };
            assert_eq!(line(cmd), b"UID EXPUNGE 100:200\r\n");
        }
    }

    mod invalid_input_tests {
        use super::*;

        fn rejects(mut cmd: Command) {
            assert!(matches!(cmd.command_line(), Err(Error::InvalidInput(_))));
        }

        #[test]
        fn select_with_both_extensions() {
            rejects(Command::Select {
                mailbox: Mailbox::inbox(),
                options: SelectOptions {
                    condstore: true,
                    qresync: Some(QresyncParams::new(UidValidity::new(1).unwrap(), 1)),
                },
            });
        }

        #[test]
        fn vanished_without_uid_or_changedsince() {
            rejects(Command::Fetch {
                sequence: SequenceSet::All,
                items: FetchItems::Fast,
                uid: false,
                changed_since: Some(1),
                vanished: true,
            });
            rejects(Command::Fetch {
                sequence: SequenceSet::All,
                items: FetchItems::Fast,
                uid: true,
                changed_since: None,
                vanished: true,
            });
        }

        #[test]
        fn empty_required_lists() {
            rejects(Command::Enable {
                capabilities: vec![],
            });
            rejects(Command::Status {
                mailbox: Mailbox::inbox(),
                items: vec![],
            });
            rejects(Command::fetch(
                SequenceSet::All,
                FetchItems::Items(vec![]),
                false,
            ));
        }

        #[test]
        fn non_ascii_login() {
            rejects(Command::login("jürgen", "x"));
        }
    }

    mod contract_tests {
        use super::*;

        fn all_single_line() -> Vec<Command> {
            vec![
                Command::Capability,
                Command::Noop,
                Command::Logout,
                Command::StartTls,
                Command::login("u", "p"),
                Command::Id { parameters: None },
                Command::Enable {
                    capabilities: vec!["QRESYNC".to_string()],
                },
                Command::Compress,
                Command::select(Mailbox::inbox()),
                Command::list("", "*"),
                Command::Namespace,
                Command::Check,
                Command::Close,
                Command::Unselect,
                Command::Expunge,
                Command::fetch(SequenceSet::All, FetchItems::Fast, false),
            ]
        }

        #[test]
        fn continuation_is_not_supported() {
            for mut cmd in all_single_line() {
                let kind = cmd.command_type();
                let err = cmd.next_line_after_continuation(b"+ go ahead").unwrap_err();
                assert!(matches!(
                    err,
                    Error::OperationNotSupportedForCommand { command, .. } if command == kind
                ));
            }
        }

        #[test]
        fn terminate_is_not_supported() {
            for mut cmd in all_single_line() {
                assert!(matches!(
                    cmd.terminate_line(),
                    Err(Error::OperationNotSupportedForCommand { .. })
                ));
                assert!(cmd.streaming_sink().is_none());
            }
        }

        #[test]
        fn result_kinds() {
            assert_eq!(
                CommandType::Examine.result_kind(),
                Some(ResultKind::Mailbox)
            );
            assert_eq!(CommandType::Move.result_kind(), Some(ResultKind::Copy));
            assert_eq!(CommandType::Noop.result_kind(), None);
        }
    }
}
