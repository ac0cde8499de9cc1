//! Parsers for response codes and the simpler untagged data.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::qresync::VanishedResponse;
use crate::types::{
    Capability, Flag, Flags, ListResponse, Mailbox, MailboxAttribute, ResponseCode, SeqNum, Uid,
    UidValidity,
};

use super::types::StatusItem;

/// Reads a number that must not be zero and wraps it with `wrap`.
pub fn read_nonzero<T>(
    lexer: &mut Lexer<'_>,
    wrap: fn(u32) -> Option<T>,
    what: &str,
) -> Result<T> {
    let n = lexer.read_number()?;
    wrap(n).ok_or_else(|| lexer.error(format!("{what} must not be 0")))
}

/// Reads `[code args]`.
pub fn parse_response_code(lexer: &mut Lexer<'_>) -> Result<ResponseCode> {
    lexer.expect(Token::LBracket)?;
    let name = lexer.read_atom()?.to_ascii_uppercase();

    let code = match name.as_str() {
        "ALERT" => ResponseCode::Alert,
        "PARSE" => ResponseCode::Parse,
        "READ-ONLY" => ResponseCode::ReadOnly,
        "READ-WRITE" => ResponseCode::ReadWrite,
        "TRYCREATE" => ResponseCode::TryCreate,
        "NOMODSEQ" => ResponseCode::NoModSeq,
        "CLOSED" => ResponseCode::Closed,
        "CAPABILITY" => ResponseCode::Capability(parse_capability_list(lexer)?),
        "UIDNEXT" => {
            lexer.expect_space()?;
            ResponseCode::UidNext(read_nonzero(lexer, Uid::new, "UIDNEXT")?)
        }
        "UIDVALIDITY" => {
            lexer.expect_space()?;
            ResponseCode::UidValidity(read_nonzero(lexer, UidValidity::new, "UIDVALIDITY")?)
        }
        "UNSEEN" => {
            lexer.expect_space()?;
            ResponseCode::Unseen(read_nonzero(lexer, SeqNum::new, "UNSEEN")?)
        }
        "HIGHESTMODSEQ" => {
            lexer.expect_space()?;
            ResponseCode::HighestModSeq(lexer.read_u64()?)
        }
        "PERMANENTFLAGS" => {
            lexer.expect_space()?;
            ResponseCode::PermanentFlags(parse_flag_list(lexer)?.into_iter().collect())
        }
        "APPENDUID" => {
            lexer.expect_space()?;
            let uidvalidity = read_nonzero(lexer, UidValidity::new, "UIDVALIDITY")?;
            lexer.expect_space()?;
            ResponseCode::AppendUid {
                uidvalidity,
                uids: lexer.read_sequence_set()?,
            }
        }
        "COPYUID" => {
            lexer.expect_space()?;
            let uidvalidity = read_nonzero(lexer, UidValidity::new, "UIDVALIDITY")?;
            lexer.expect_space()?;
            let source = lexer.read_sequence_set()?;
            lexer.expect_space()?;
            ResponseCode::CopyUid {
                uidvalidity,
                source,
                dest: lexer.read_sequence_set()?,
            }
        }
        "MODIFIED" => {
            lexer.expect_space()?;
            ResponseCode::Modified(lexer.read_sequence_set()?)
        }
        _ => ResponseCode::Unknown(name),
    };

    // arguments of unknown codes
    while !matches!(lexer.peek(), Some(b']') | None) {
        lexer.advance();
    }
    lexer.expect(Token::RBracket)?;
    Ok(code)
}

/// Reads optional `[code]` and the human-readable text after it.
pub fn parse_resp_text(lexer: &mut Lexer<'_>) -> Result<(Option<ResponseCode>, String)> {
    let code = if lexer.peek() == Some(b'[') {
        Some(parse_response_code(lexer)?)
    } else {
        None
    };
    lexer.skip_spaces();
    Ok((code, lexer.rest_of_line()))
}

/// Reads space-separated capability atoms, as in CAPABILITY and ENABLED.
pub fn parse_capability_list(lexer: &mut Lexer<'_>) -> Result<Vec<Capability>> {
    let mut caps = Vec::new();
    while lexer.eat(b' ') {
        match lexer.next_token()? {
            Token::Atom(s) => caps.push(Capability::parse(s)),
            Token::Number(n) => caps.push(Capability::parse(&n.to_string())),
            _ => break,
        }
    }
    Ok(caps)
}

/// Reads `(flag flag ...)`.
pub fn parse_flag_list(lexer: &mut Lexer<'_>) -> Result<Flags> {
    lexer.expect(Token::LParen)?;
    let mut flags = Flags::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => return Ok(flags),
            Token::Space => {}
            Token::Atom(s) => flags.insert(Flag::parse(s)),
            token => return Err(lexer.error(format!("unexpected {token:?} in flag list"))),
        }
    }
}

/// Reads the body of a LIST or LSUB line.
pub fn parse_list_response(lexer: &mut Lexer<'_>) -> Result<ListResponse> {
    lexer.expect(Token::LParen)?;
    let mut attributes = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => break,
            Token::Space => {}
            Token::Atom(s) => attributes.push(MailboxAttribute::parse(s)),
            token => return Err(lexer.error(format!("unexpected {token:?} in LIST attributes"))),
        }
    }
    lexer.expect_space()?;

    let delimiter = match lexer.next_token()? {
        Token::Nil => None,
        Token::QuotedString(s) => s.chars().next(),
        token => return Err(lexer.error(format!("expected delimiter, got {token:?}"))),
    };
    lexer.expect_space()?;

    let mailbox = Mailbox::from_wire(lexer.read_astring()?);
    Ok(ListResponse {
        attributes,
        delimiter,
        mailbox,
    })
}

/// Reads SEARCH results and the optional `(MODSEQ n)`.
pub fn parse_search(lexer: &mut Lexer<'_>) -> Result<(Vec<u32>, Option<u64>)> {
    let mut numbers = Vec::new();
    let mut modseq = None;
    loop {
        match lexer.next_token()? {
            Token::Space => {}
            Token::Number(n) => numbers.push(
                u32::try_from(n).map_err(|_| lexer.error(format!("{n} is not a message number")))?,
            ),
            Token::LParen => {
                let name = lexer.read_atom()?;
                if !name.eq_ignore_ascii_case("MODSEQ") {
                    return Err(lexer.error(format!("unexpected {name} in SEARCH")));
                }
                lexer.expect_space()?;
                modseq = Some(lexer.read_u64()?);
                lexer.expect(Token::RParen)?;
            }
            Token::Crlf | Token::Eof => return Ok((numbers, modseq)),
            token => return Err(lexer.error(format!("unexpected {token:?} in SEARCH"))),
        }
    }
}

/// Reads `mailbox (ATTR n ...)` of a STATUS line.
pub fn parse_status(lexer: &mut Lexer<'_>) -> Result<(Mailbox, Vec<StatusItem>)> {
    let mailbox = Mailbox::from_wire(lexer.read_astring()?);
    lexer.expect_space()?;
    lexer.expect(Token::LParen)?;

    let mut items = Vec::new();
    loop {
        match lexer.next_token()? {
            Token::RParen => return Ok((mailbox, items)),
            Token::Space => {}
            Token::Atom(name) => {
                lexer.expect_space()?;
                let item = match name.to_ascii_uppercase().as_str() {
                    "MESSAGES" => StatusItem::Messages(lexer.read_number()?),
                    "RECENT" => StatusItem::Recent(lexer.read_number()?),
                    "UNSEEN" => StatusItem::Unseen(lexer.read_number()?),
                    "UIDNEXT" => StatusItem::UidNext(read_nonzero(lexer, Uid::new, "UIDNEXT")?),
                    "UIDVALIDITY" => StatusItem::UidValidity(read_nonzero(
                        lexer,
                        UidValidity::new,
                        "UIDVALIDITY",
                    )?),
                    "HIGHESTMODSEQ" => StatusItem::HighestModSeq(lexer.read_u64()?),
                    _ => {
                        lexer.skip_value()?;
                        continue;
                    }
                };
                items.push(item);
            }
            token => return Err(lexer.error(format!("unexpected {token:?} in STATUS"))),
        }
    }
}

/// Reads `NIL` or `("field" "value" ...)` of an ID line.
pub fn parse_id(lexer: &mut Lexer<'_>) -> Result<Option<Vec<(String, Option<String>)>>> {
    match lexer.next_token()? {
        Token::Nil => Ok(None),
        Token::LParen => {
            let mut fields = Vec::new();
            loop {
                lexer.skip_spaces();
                if lexer.eat(b')') {
                    return Ok(Some(fields));
                }
                let key = lexer.read_astring()?;
                lexer.expect_space()?;
                fields.push((key, lexer.read_nstring()?));
            }
        }
        token => Err(lexer.error(format!("expected ID list, got {token:?}"))),
    }
}

/// Reads `[(EARLIER) ]uid-set` of a VANISHED line.
pub fn parse_vanished(lexer: &mut Lexer<'_>) -> Result<VanishedResponse> {
    let earlier = if lexer.eat(b'(') {
        let tag = lexer.read_atom()?;
        if !tag.eq_ignore_ascii_case("EARLIER") {
            return Err(lexer.error(format!("unexpected VANISHED modifier {tag}")));
        }
        lexer.expect(Token::RParen)?;
        lexer.expect_space()?;
        true
    } else {
        false
    };
    Ok(VanishedResponse {
        earlier,
        uids: lexer.read_sequence_set()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn copyuid_code() {
        let mut lexer = Lexer::new(b"[COPYUID 38505 304,319:320 3956:3958]");
        let ResponseCode::CopyUid {
            uidvalidity,
            source,
            dest,
        } = parse_response_code(&mut lexer).unwrap()
        else {
            panic!("expected COPYUID");
        };
        assert_eq!(uidvalidity.get(), 38505);
        assert_eq!(source.to_string(), "304,319:320");
        assert_eq!(dest.to_string(), "3956:3958");
    }

    #[test]
    fn permanent_flags_with_wildcard() {
        let mut lexer = Lexer::new(b"[PERMANENTFLAGS (\\Deleted \\Seen \\*)] Limited");
        let ResponseCode::PermanentFlags(flags) = parse_response_code(&mut lexer).unwrap() else {
            panic!("expected PERMANENTFLAGS");
        };
        assert_eq!(flags.len(), 3);
        assert!(flags.contains(&Flag::Seen));
    }

    #[test]
    fn unknown_code_keeps_name() {
        let mut lexer = Lexer::new(b"[REFERRAL imap://other/] go away\r\n");
        let (code, text) = parse_resp_text(&mut lexer).unwrap();
        assert_eq!(code, Some(ResponseCode::Unknown("REFERRAL".to_string())));
        assert_eq!(text, "go away");
    }

    #[test]
    fn zero_uidvalidity_is_rejected() {
        let mut lexer = Lexer::new(b"[UIDVALIDITY 0]");
        assert!(parse_response_code(&mut lexer).is_err());
    }

    #[test]
    fn search_with_modseq() {
        let mut lexer = Lexer::new(b" 2 5 6 (MODSEQ 917162500)\r\n");
        let (numbers, modseq) = parse_search(&mut lexer).unwrap();
        assert_eq!(numbers, [2, 5, 6]);
        assert_eq!(modseq, Some(917_162_500));
    }

    #[test]
    fn id_fields() {
        let mut lexer = Lexer::new(b"(\"name\" \"Cyrus\" \"support-url\" NIL)");
        let fields = parse_id(&mut lexer).unwrap().unwrap();
        assert_eq!(fields[0], ("name".to_string(), Some("Cyrus".to_string())));
        assert_eq!(fields[1], ("support-url".to_string(), None));
        assert_eq!(parse_id(&mut Lexer::new(b"NIL")).unwrap(), None);
    }

    #[test]
    fn vanished_earlier() {
        let v = parse_vanished(&mut Lexer::new(b"(EARLIER) 41,43:116")).unwrap();
        assert!(v.earlier);
        assert!(v.uids.contains(100));
        let v = parse_vanished(&mut Lexer::new(b"405,407")).unwrap();
        assert!(!v.earlier);
    }

    #[test]
    fn status_skips_unknown_attributes() {
        let mut lexer = Lexer::new(b"blurdybloop (MESSAGES 231 SIZE 4096 UIDNEXT 44292)");
        let (mailbox, items) = parse_status(&mut lexer).unwrap();
        assert_eq!(mailbox.as_str(), "blurdybloop");
        assert_eq!(
            items,
            [
                StatusItem::Messages(231),
                StatusItem::UidNext(Uid::new(44292).unwrap())
            ]
        );
    }
}
