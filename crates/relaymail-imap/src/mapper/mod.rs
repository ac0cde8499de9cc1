//! Typed results from aggregated responses.
//!
//! The session hands back every line of an exchange untouched. The mapper
//! parses those lines, checks the tagged completion, and folds the data it
//! recognizes into a result value for the requested [`ResultKind`]. When a
//! marker repeats, the last occurrence wins; lines that fail to parse or
//! that belong to some other kind of result are skipped.

mod results;

use std::fmt;
use std::str::FromStr;

pub use results::{
    AppendResult, CopyResult, EnableResult, FetchResult, FetchedMessage, IdResult, ListInfo,
    MailboxInfo, SearchResult, StatusInfo, StoreResult, TypedResult,
};

use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::protocol::ImapResponse;
use crate::qresync::{ChangedMessage, VanishedResponse};
use crate::types::{Capabilities, ResponseCode, Status};
use crate::{Error, Result};

/// Kind of typed result to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// [`Capabilities`]
    Capability,
    /// [`IdResult`]
    Id,
    /// [`MailboxInfo`]
    Mailbox,
    /// [`ListInfo`]
    List,
    /// [`StatusInfo`]
    Status,
    /// [`SearchResult`]
    Search,
    /// [`StoreResult`]
    Store,
    /// [`FetchResult`]
    Fetch,
    /// [`EnableResult`]
    Enable,
    /// [`AppendResult`]
    Append,
    /// [`CopyResult`]
    Copy,
}

impl ResultKind {
    /// Lower-case name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capability => "capability",
            Self::Id => "id",
            Self::Mailbox => "mailbox",
            Self::List => "list",
            Self::Status => "status",
            Self::Search => "search",
            Self::Store => "store",
            Self::Fetch => "fetch",
            Self::Enable => "enable",
            Self::Append => "append",
            Self::Copy => "copy",
        }
    }

    /// Whether `NO [MODIFIED set]` still yields a result.
    const fn tolerates_modified(self) -> bool {
        matches!(self, Self::Store | Self::Fetch)
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.to_ascii_lowercase().as_str() {
            "capability" => Self::Capability,
            "id" => Self::Id,
            "mailbox" => Self::Mailbox,
            "list" => Self::List,
            "status" => Self::Status,
            "search" => Self::Search,
            "store" => Self::Store,
            "fetch" => Self::Fetch,
            "enable" => Self::Enable,
            "append" => Self::Append,
            "copy" => Self::Copy,
            _ => return Err(Error::UnknownParseResultType(s.to_string())),
        };
        Ok(kind)
    }
}

/// The tagged line that closed the exchange.
struct Completion {
    status: Status,
    code: Option<ResponseCode>,
    text: String,
}

/// Maps aggregated responses to typed results.
pub struct ResponseMapper;

impl ResponseMapper {
    /// Builds the typed result for a finished exchange, choosing the kind
    /// from the command that produced it.
    ///
    /// # Errors
    ///
    /// `UnknownParseResultType` if the command has no typed result, and
    /// anything [`ResponseMapper::read_value`] reports.
    pub fn map(response: &ImapResponse) -> Result<TypedResult> {
        let kind = response.command_type.result_kind().ok_or_else(|| {
            Error::UnknownParseResultType(format!("{:?}", response.command_type))
        })?;
        Self::read_value(&response.lines, kind)
    }

    /// Builds a typed result of `kind` from server lines in arrival order,
    /// tagged completion last.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `lines` is empty, holds no tagged completion, or
    /// the completion is not OK. STORE and FETCH accept `NO [MODIFIED set]`
    /// and report the set instead.
    pub fn read_value<L: AsRef<[u8]>>(lines: &[L], kind: ResultKind) -> Result<TypedResult> {
        if lines.is_empty() {
            return Err(Error::InvalidInput("no response lines to map".to_string()));
        }

        let mut data = Vec::new();
        let mut completion = None;
        for line in lines {
            match ResponseParser::parse(line.as_ref()) {
                Ok(Response::Untagged(untagged)) => data.push(untagged),
                Ok(Response::Tagged {
                    status, code, text, ..
                }) => completion = Some(Completion { status, code, text }),
                Ok(Response::Continuation { .. }) => {}
                Err(e) => tracing::trace!(error = %e, kind = %kind, "skipping unparsable line"),
            }
        }

        let completion = completion.ok_or_else(|| {
            Error::InvalidInput("response has no tagged completion".to_string())
        })?;
        let modified = match &completion.code {
            Some(ResponseCode::Modified(set)) if kind.tolerates_modified() => Some(set.clone()),
            _ => None,
        };
        if !completion.status.is_ok() && modified.is_none() {
            return Err(Error::InvalidInput(format!(
                "command failed: {:?} {}",
                completion.status, completion.text
            )));
        }

        let result = match kind {
            ResultKind::Capability => TypedResult::Capabilities(capabilities(&data, &completion)),
            ResultKind::Id => TypedResult::Id(id(data)),
            ResultKind::Mailbox => TypedResult::Mailbox(mailbox(data, &completion)),
            ResultKind::List => TypedResult::List(list(data)),
            ResultKind::Status => TypedResult::Status(status(data)),
            ResultKind::Search => TypedResult::Search(search(data)),
            ResultKind::Store => {
                let (messages, _) = messages(data);
                TypedResult::Store(StoreResult { messages, modified })
            }
            ResultKind::Fetch => {
                let (messages, vanished) = messages(data);
                TypedResult::Fetch(FetchResult {
                    messages,
                    vanished,
                    modified,
                })
            }
            ResultKind::Enable => TypedResult::Enable(enable(data)),
            ResultKind::Append => TypedResult::Append(append(&data, &completion)),
            ResultKind::Copy => TypedResult::Copy(copy(&data, &completion)),
        };
        Ok(result)
    }
}

/// Codes from untagged OK lines, then the completion's own code.
fn codes<'a>(
    data: &'a [UntaggedResponse],
    completion: &'a Completion,
) -> impl Iterator<Item = &'a ResponseCode> {
    data.iter()
        .filter_map(|u| match u {
            UntaggedResponse::Condition {
                status: Status::Ok,
                code: Some(code),
                ..
            } => Some(code),
            _ => None,
        })
        .chain(completion.code.as_ref())
}

fn capabilities(data: &[UntaggedResponse], completion: &Completion) -> Capabilities {
    let mut latest = None;
    for u in data {
        if let UntaggedResponse::Capability(caps) = u {
            latest = Some(caps);
        }
    }
    for code in codes(data, completion) {
        if let ResponseCode::Capability(caps) = code {
            latest = Some(caps);
        }
    }
    latest.into_iter().flatten().cloned().collect()
}

fn id(data: Vec<UntaggedResponse>) -> IdResult {
    let mut result = IdResult::default();
    for u in data {
        if let UntaggedResponse::Id(fields) = u {
            result.fields = fields.unwrap_or_default();
        }
    }
    result
}

fn mailbox(data: Vec<UntaggedResponse>, completion: &Completion) -> MailboxInfo {
    let mut info = MailboxInfo::default();
    for code in codes(&data, completion) {
        match code {
            ResponseCode::UidValidity(v) => info.uidvalidity = Some(*v),
            ResponseCode::UidNext(uid) => info.uidnext = Some(*uid),
            ResponseCode::Unseen(seq) => info.unseen = Some(*seq),
            ResponseCode::PermanentFlags(flags) => info.permanent_flags.clone_from(flags),
            ResponseCode::HighestModSeq(m) => info.highest_modseq = Some(*m),
            ResponseCode::NoModSeq => info.no_modseq = true,
            ResponseCode::ReadOnly => info.read_only = true,
            ResponseCode::ReadWrite => info.read_only = false,
            _ => {}
        }
    }

    for u in data {
        match u {
            UntaggedResponse::Exists(n) => info.exists = n,
            UntaggedResponse::Recent(n) => info.recent = n,
            UntaggedResponse::Flags(flags) => info.flags = flags,
            UntaggedResponse::Vanished(v) => info.vanished.push(v),
            UntaggedResponse::Fetch { seq, items } => {
                let message = FetchedMessage { seq, items };
                if let Some(modseq) = message.modseq() {
                    info.changed.push(ChangedMessage {
                        seq: message.seq.get(),
                        uid: message.uid(),
                        modseq,
                        flags: message.flags().cloned(),
                    });
                }
            }
            _ => {}
        }
    }
    info
}

fn list(data: Vec<UntaggedResponse>) -> ListInfo {
    let mut info = ListInfo::default();
    for u in data {
        match u {
            UntaggedResponse::List(entry) | UntaggedResponse::Lsub(entry) => {
                info.mailboxes.push(entry);
            }
            UntaggedResponse::MailboxStatus { mailbox, items } => {
                let mut status = StatusInfo::default();
                status.apply(mailbox, &items);
                info.statuses.push(status);
            }
            _ => {}
        }
    }
    info
}

fn status(data: Vec<UntaggedResponse>) -> StatusInfo {
    let mut info = StatusInfo::default();
    for u in data {
        if let UntaggedResponse::MailboxStatus { mailbox, items } = u {
            info.apply(mailbox, &items);
        }
    }
    info
}

fn search(data: Vec<UntaggedResponse>) -> SearchResult {
    let mut result = SearchResult::default();
    for u in data {
        if let UntaggedResponse::Search { numbers, modseq } = u {
            result = SearchResult { numbers, modseq };
        }
    }
    result
}

fn messages(
    data: Vec<UntaggedResponse>,
) -> (Vec<FetchedMessage>, Vec<VanishedResponse>) {
    let mut messages = Vec::new();
    let mut vanished = Vec::new();
    for u in data {
        match u {
            UntaggedResponse::Fetch { seq, items } => messages.push(FetchedMessage { seq, items }),
            UntaggedResponse::Vanished(v) => vanished.push(v),
            _ => {}
        }
    }
    (messages, vanished)
}

fn enable(data: Vec<UntaggedResponse>) -> EnableResult {
    let mut result = EnableResult::default();
    for u in data {
        if let UntaggedResponse::Enabled(enabled) = u {
            result.enabled = enabled;
        }
    }
    result
}

fn append(data: &[UntaggedResponse], completion: &Completion) -> AppendResult {
    let mut result = AppendResult::default();
    for code in codes(data, completion) {
        if let ResponseCode::AppendUid { uidvalidity, uids } = code {
            result.uidvalidity = Some(*uidvalidity);
            result.uids = Some(uids.clone());
        }
    }
    result
}

fn copy(data: &[UntaggedResponse], completion: &Completion) -> CopyResult {
    let mut result = CopyResult::default();
    for code in codes(data, completion) {
        if let ResponseCode::CopyUid {
            uidvalidity,
            source,
            dest,
        } = code
        {
            result = CopyResult {
                uidvalidity: Some(*uidvalidity),
                source: Some(source.clone()),
                dest: Some(dest.clone()),
            };
        }
    }
    result
}
