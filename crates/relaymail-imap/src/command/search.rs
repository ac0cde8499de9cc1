//! SEARCH / UID SEARCH (RFC 3501 §6.4.4).

use std::collections::VecDeque;

use super::args::{has_line_break, write_astring, write_atom, write_date};
use super::{CommandLine, CommandType, ImapCommand, LineBuilder, SearchCriteria};
use crate::types::{Capabilities, Flag};
use crate::{Error, Result};

/// SEARCH with optional CHARSET.
///
/// 7-bit string arguments are quoted as usual. Strings with line breaks,
/// and non-ASCII strings (which need a CHARSET), travel as literals, so
/// the command may need continuations.
#[derive(Debug)]
pub struct SearchCommand {
    criteria: SearchCriteria,
    uid: bool,
    charset: Option<String>,
    capabilities: Capabilities,
    pending: VecDeque<Vec<u8>>,
}

impl SearchCommand {
    /// Creates a SEARCH (or UID SEARCH when `uid` is set).
    #[must_use]
    pub fn new(criteria: SearchCriteria, uid: bool, capabilities: &Capabilities) -> Self {
        Self {
            criteria,
            uid,
            charset: None,
            capabilities: capabilities.clone(),
            pending: VecDeque::new(),
        }
    }

    /// Declares the charset of string arguments, e.g. `UTF-8`.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    fn write_string(&self, b: &mut LineBuilder, s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidInput(format!(
                "search string {s:?} contains NUL"
            )));
        }
        if s.is_ascii() && !has_line_break(s) {
            return write_astring(b.buf(), s);
        }
        if !s.is_ascii() && self.charset.is_none() {
            return Err(Error::InvalidInput(format!(
                "search string {s:?} is not 7-bit and no CHARSET was given"
            )));
        }
        b.literal(s.as_bytes(), self.capabilities.literal_mode(s.len()));
        Ok(())
    }

    fn write_keyword(b: &mut LineBuilder, flag: &Flag) -> Result<()> {
        match flag {
            Flag::Keyword(k) => write_atom(b.buf(), k),
            system => Err(Error::InvalidInput(format!(
                "{system} is a system flag, not a keyword"
            ))),
        }
    }

    fn write_criteria(&self, b: &mut LineBuilder, criteria: &SearchCriteria) -> Result<()> {
        match criteria {
            SearchCriteria::All => b.push(b"ALL"),
            SearchCriteria::Answered => b.push(b"ANSWERED"),
            SearchCriteria::Deleted => b.push(b"DELETED"),
            SearchCriteria::Draft => b.push(b"DRAFT"),
            SearchCriteria::Flagged => b.push(b"FLAGGED"),
            SearchCriteria::New => b.push(b"NEW"),
            SearchCriteria::Undeleted => b.push(b"UNDELETED"),
            SearchCriteria::Unseen => b.push(b"UNSEEN"),
            SearchCriteria::Seen => b.push(b"SEEN"),
            SearchCriteria::Keyword(flag) => {
                b.push(b"KEYWORD ");
                return Self::write_keyword(b, flag);
            }
            SearchCriteria::Unkeyword(flag) => {
                b.push(b"UNKEYWORD ");
                return Self::write_keyword(b, flag);
            }
            SearchCriteria::SequenceSet(set) => b.push(set.to_string().as_bytes()),
            SearchCriteria::Uid(set) => b.push(format!("UID {set}").as_bytes()),
            SearchCriteria::Subject(s) => return self.keyed_string(b, b"SUBJECT ", s),
            SearchCriteria::From(s) => return self.keyed_string(b, b"FROM ", s),
            SearchCriteria::To(s) => return self.keyed_string(b, b"TO ", s),
            SearchCriteria::Cc(s) => return self.keyed_string(b, b"CC ", s),
            SearchCriteria::Body(s) => return self.keyed_string(b, b"BODY ", s),
            SearchCriteria::Text(s) => return self.keyed_string(b, b"TEXT ", s),
            SearchCriteria::Since(date) => {
                b.push(b"SINCE ");
                write_date(b.buf(), *date);
                b
            }
            SearchCriteria::Before(date) => {
                b.push(b"BEFORE ");
                write_date(b.buf(), *date);
                b
            }
            SearchCriteria::On(date) => {
                b.push(b"ON ");
                write_date(b.buf(), *date);
                b
            }
            SearchCriteria::Larger(size) => b.push(format!("LARGER {size}").as_bytes()),
            SearchCriteria::Smaller(size) => b.push(format!("SMALLER {size}").as_bytes()),
            SearchCriteria::Header(name, value) => {
                b.push(b"HEADER ");
                self.write_string(b, name)?;
                b.sp();
                return self.write_string(b, value);
            }
            SearchCriteria::ModSeq(modseq) => b.push(format!("MODSEQ {modseq}").as_bytes()),
            SearchCriteria::And(all) => {
                if all.is_empty() {
                    return Err(Error::InvalidInput("empty AND in search".to_string()));
                }
                b.push(b"(");
                for (i, c) in all.iter().enumerate() {
                    if i > 0 {
                        b.sp();
                    }
                    self.write_criteria(b, c)?;
                }
                b.push(b")")
            }
            SearchCriteria::Or(left, right) => {
                b.push(b"OR ");
                self.write_criteria(b, left)?;
                b.sp();
                self.write_criteria(b, right)?;
                b
            }
            SearchCriteria::Not(inner) => {
                b.push(b"NOT ");
                self.write_criteria(b, inner)?;
                b
            }
        };
        Ok(())
    }

    fn keyed_string(&self, b: &mut LineBuilder, key: &[u8], s: &str) -> Result<()> {
        b.push(key);
        self.write_string(b, s)
    }
}

impl ImapCommand for SearchCommand {
    fn command_type(&self) -> CommandType {
        CommandType::Search
    }

    fn command_line(&mut self) -> Result<CommandLine> {
        let mut b = LineBuilder::new();
        if self.uid {
            b.push(b"UID ");
        }
        b.push(b"SEARCH ");
        if let Some(charset) = &self.charset {
            b.push(b"CHARSET ");
            write_astring(b.buf(), charset)?;
            b.sp();
        }
        match &self.criteria {
            // top-level AND is the implicit conjunction; no parentheses
            SearchCriteria::And(all) if !all.is_empty() => {
                for (i, c) in all.iter().enumerate() {
                    if i > 0 {
                        b.sp();
                    }
                    self.write_criteria(&mut b, c)?;
                }
            }
            other => self.write_criteria(&mut b, other)?,
        }

        self.pending = b.finish();
        let first = self
            .pending
            .pop_front()
            .ok_or_else(|| Error::InvalidInput("SEARCH produced no line".to_string()))?;
        Ok(CommandLine::new(first))
    }

    fn next_line_after_continuation(&mut self, _line: &[u8]) -> Result<Option<CommandLine>> {
        self.pending
            .pop_front()
            .map(|chunk| Some(CommandLine::new(chunk)))
            .ok_or_else(|| Error::Protocol("continuation after SEARCH literals were sent".to_string()))
    }

    fn debug_data(&self) -> String {
        format!(
            "{}SEARCH charset={:?} {:?}",
            if self.uid { "UID " } else { "" },
            self.charset,
            self.criteria
        )
    }

    fn cleanup(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::types::SequenceSet;

    fn first_line(mut cmd: SearchCommand) -> Vec<u8> {
        cmd.command_line().unwrap().bytes.to_vec()
    }

    #[test]
    fn simple_criteria() {
        let cmd = SearchCommand::new(SearchCriteria::Unseen, false, &Capabilities::new());
        assert_eq!(first_line(cmd), b"SEARCH UNSEEN\r\n");
    }

    #[test]
    fn top_level_and_is_flat() {
        let criteria = SearchCriteria::And(vec![
            SearchCriteria::Since(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()),
            SearchCriteria::From("Smith".to_string()),
            SearchCriteria::Not(Box::new(SearchCriteria::Seen)),
        ]);
        let cmd = SearchCommand::new(criteria, true, &Capabilities::new());
        assert_eq!(
            first_line(cmd),
            b"UID SEARCH SINCE 5-Jan-2024 FROM Smith NOT SEEN\r\n"
        );
    }

    #[test]
    fn nested_and_or() {
        let criteria = SearchCriteria::Or(
            Box::new(SearchCriteria::And(vec![
                SearchCriteria::Flagged,
                SearchCriteria::Subject("weekly report".to_string()),
            ])),
            Box::new(SearchCriteria::Uid(SequenceSet::range(1, 9).unwrap())),
        );
        let cmd = SearchCommand::new(criteria, false, &Capabilities::new());
        assert_eq!(
            first_line(cmd),
            b"SEARCH OR (FLAGGED SUBJECT \"weekly report\") UID 1:9\r\n"
        );
    }

    #[test]
    fn non_ascii_without_charset_is_rejected() {
        let mut cmd = SearchCommand::new(
            SearchCriteria::Subject("Grüße".to_string()),
            false,
            &Capabilities::new(),
        );
        assert!(matches!(cmd.command_line(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn non_ascii_with_charset_uses_sync_literal() {
        let mut cmd = SearchCommand::new(
            SearchCriteria::Subject("Grüße".to_string()),
            false,
            &Capabilities::new(),
        )
        .with_charset("UTF-8");
        let first = cmd.command_line().unwrap();
        assert_eq!(
            first.bytes.as_ref(),
            b"SEARCH CHARSET UTF-8 SUBJECT {7}\r\n"
        );
        let rest = cmd.next_line_after_continuation(b"+\r\n").unwrap().unwrap();
        let mut expected = "Grüße".as_bytes().to_vec();
        expected.extend_from_slice(b"\r\n");
        assert_eq!(rest.bytes.as_ref(), expected.as_slice());
    }

    #[test]
    fn non_ascii_with_literal_plus_is_inline() {
        let caps = Capabilities::from_tokens(["LITERAL+"]);
        let mut cmd = SearchCommand::new(SearchCriteria::Text("ü".to_string()), false, &caps)
            .with_charset("UTF-8");
        let first = cmd.command_line().unwrap();
        let mut expected = b"SEARCH CHARSET UTF-8 TEXT {2+}\r\n".to_vec();
        expected.extend_from_slice("ü".as_bytes());
        expected.extend_from_slice(b"\r\n");
        assert_eq!(first.bytes.as_ref(), expected.as_slice());
    }

    #[test]
    fn keyword_must_not_be_system_flag() {
        let mut cmd = SearchCommand::new(
            SearchCriteria::Keyword(Flag::Seen),
            false,
            &Capabilities::new(),
        );
        assert!(cmd.command_line().is_err());

        let cmd = SearchCommand::new(
            SearchCriteria::Unkeyword(Flag::Keyword("$Junk".to_string())),
            false,
            &Capabilities::new(),
        );
        assert_eq!(first_line(cmd), b"SEARCH UNKEYWORD $Junk\r\n");
    }

    #[test]
    fn line_break_goes_as_literal() {
        let mut cmd = SearchCommand::new(
            SearchCriteria::Subject("x\r\nA9 LOGOUT".to_string()),
            false,
            &Capabilities::new(),
        );
        let first = cmd.command_line().unwrap();
        assert_eq!(first.bytes.as_ref(), b"SEARCH SUBJECT {12}\r\n");
        let rest = cmd.next_line_after_continuation(b"+\r\n").unwrap().unwrap();
        assert_eq!(rest.bytes.as_ref(), b"x\r\nA9 LOGOUT\r\n");
    }

    #[test]
    fn nul_is_rejected() {
        let mut cmd = SearchCommand::new(
            SearchCriteria::Body("a\0b".to_string()),
            false,
            &Capabilities::new(),
        );
        assert!(matches!(cmd.command_line(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn modseq_criterion() {
        let cmd = SearchCommand::new(SearchCriteria::ModSeq(620), false, &Capabilities::new());
        assert_eq!(first_line(cmd), b"SEARCH MODSEQ 620\r\n");
    }
}
