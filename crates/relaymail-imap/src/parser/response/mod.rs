//! Server record parser.
//!
//! [`ResponseParser::parse`] takes one complete record, literals included,
//! exactly as the framing layer hands it over.

#![allow(clippy::missing_errors_doc)]

mod fetch;
mod helpers;
mod types;

pub use types::{Address, BodyStructure, Envelope, FetchItem, StatusItem, UntaggedResponse};

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::{ResponseCode, SeqNum, Status, Tag};

use helpers::{
    parse_capability_list, parse_flag_list, parse_id, parse_list_response, parse_resp_text,
    parse_search, parse_status, parse_vanished,
};

/// One parsed server record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Completion of the command with this tag.
    Tagged {
        /// Tag echoed by the server.
        tag: Tag,
        /// OK, NO or BAD.
        status: Status,
        /// Bracketed code.
        code: Option<ResponseCode>,
        /// Text after the code.
        text: String,
    },
    /// `*` data.
    Untagged(UntaggedResponse),
    /// `+` request for more client data.
    Continuation {
        /// Text after `+`, or `None` if there is none.
        text: Option<String>,
    },
}

/// Parses server records.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses one record.
    pub fn parse(input: &[u8]) -> Result<Response> {
        let mut lexer = Lexer::new(input);
        match lexer.next_token()? {
            Token::Asterisk => {
                lexer.expect_space()?;
                Ok(Response::Untagged(Self::untagged(&mut lexer)?))
            }
            Token::Plus => {
                lexer.eat(b' ');
                let text = lexer.rest_of_line();
                Ok(Response::Continuation {
                    text: (!text.is_empty()).then_some(text),
                })
            }
            Token::Atom(tag) => Self::tagged(&mut lexer, Tag::new(tag)),
            Token::Number(tag) => Self::tagged(&mut lexer, Tag::new(tag.to_string())),
            token => Err(lexer.error(format!("expected '*', '+' or a tag, got {token:?}"))),
        }
    }

    fn tagged(lexer: &mut Lexer<'_>, tag: Tag) -> Result<Response> {
        lexer.expect_space()?;
        let keyword = lexer.read_atom()?;
        let status = Status::from_keyword(keyword)
            .ok_or_else(|| lexer.error(format!("unknown status {keyword}")))?;
        lexer.eat(b' ');
        let (code, text) = parse_resp_text(lexer)?;
        Ok(Response::Tagged {
            tag,
            status,
            code,
            text,
        })
    }

    fn untagged(lexer: &mut Lexer<'_>) -> Result<UntaggedResponse> {
        match lexer.next_token()? {
            Token::Number(n) => {
                lexer.expect_space()?;
                Self::message_data(lexer, n)
            }
            Token::Atom(keyword) => {
                let keyword = keyword.to_ascii_uppercase();
                if let Some(status) = Status::from_keyword(&keyword) {
                    lexer.eat(b' ');
                    let (code, text) = parse_resp_text(lexer)?;
                    return Ok(UntaggedResponse::Condition { status, code, text });
                }
                Self::server_data(lexer, keyword)
            }
            token => Err(lexer.error(format!("unexpected {token:?} after '*'"))),
        }
    }

    fn server_data(lexer: &mut Lexer<'_>, keyword: String) -> Result<UntaggedResponse> {
        let response = match keyword.as_str() {
            "CAPABILITY" => UntaggedResponse::Capability(parse_capability_list(lexer)?),
            "ENABLED" => UntaggedResponse::Enabled(parse_capability_list(lexer)?),
            "SEARCH" => {
                let (numbers, modseq) = parse_search(lexer)?;
                UntaggedResponse::Search { numbers, modseq }
            }
            "FLAGS" => {
                lexer.expect_space()?;
                UntaggedResponse::Flags(parse_flag_list(lexer)?)
            }
            "LIST" => {
                lexer.expect_space()?;
                UntaggedResponse::List(parse_list_response(lexer)?)
            }
            "LSUB" => {
                lexer.expect_space()?;
                UntaggedResponse::Lsub(parse_list_response(lexer)?)
            }
            "STATUS" => {
                lexer.expect_space()?;
                let (mailbox, items) = parse_status(lexer)?;
                UntaggedResponse::MailboxStatus { mailbox, items }
            }
            "ID" => {
                lexer.expect_space()?;
                UntaggedResponse::Id(parse_id(lexer)?)
            }
            "VANISHED" => {
                lexer.expect_space()?;
                UntaggedResponse::Vanished(parse_vanished(lexer)?)
            }
            _ => {
                lexer.eat(b' ');
                UntaggedResponse::Other {
                    text: lexer.rest_of_line(),
                    keyword,
                }
            }
        };
        Ok(response)
    }

    fn message_data(lexer: &mut Lexer<'_>, n: u64) -> Result<UntaggedResponse> {
        let n = u32::try_from(n).map_err(|_| lexer.error(format!("{n} does not fit 32 bits")))?;
        let keyword = lexer.read_atom()?.to_ascii_uppercase();
        let seq = || SeqNum::new(n);

        let response = match keyword.as_str() {
            "EXISTS" => UntaggedResponse::Exists(n),
            "RECENT" => UntaggedResponse::Recent(n),
            "EXPUNGE" => UntaggedResponse::Expunge(
                seq().ok_or_else(|| lexer.error("EXPUNGE of message 0"))?,
            ),
            "FETCH" => {
                let seq = seq().ok_or_else(|| lexer.error("FETCH of message 0"))?;
                lexer.expect_space()?;
                UntaggedResponse::Fetch {
                    seq,
                    items: fetch::parse_fetch(lexer)?,
                }
            }
            _ => {
                lexer.eat(b' ');
                UntaggedResponse::Other {
                    text: format!("{n} {}", lexer.rest_of_line()),
                    keyword,
                }
            }
        };
        Ok(response)
    }
}
