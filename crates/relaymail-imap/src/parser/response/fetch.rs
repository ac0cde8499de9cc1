//! FETCH data items.

use crate::Result;
use crate::parser::lexer::{Lexer, Token};
use crate::types::Uid;

use super::helpers::{parse_flag_list, read_nonzero};
use super::types::{Address, BodyStructure, Envelope, FetchItem};

/// Reads the parenthesized item list after `n FETCH `.
pub fn parse_fetch(lexer: &mut Lexer<'_>) -> Result<Vec<FetchItem>> {
    lexer.expect(Token::LParen)?;
    let mut items = Vec::new();

    loop {
        lexer.skip_spaces();
        if lexer.eat(b')') {
            return Ok(items);
        }

        let name = lexer.read_atom()?.to_ascii_uppercase();
        let item = match name.as_str() {
            "FLAGS" => {
                lexer.expect_space()?;
                FetchItem::Flags(parse_flag_list(lexer)?)
            }
            "UID" => {
                lexer.expect_space()?;
                FetchItem::Uid(read_nonzero(lexer, Uid::new, "UID")?)
            }
            "RFC822.SIZE" => {
                lexer.expect_space()?;
                FetchItem::Rfc822Size(lexer.read_number()?)
            }
            "INTERNALDATE" => {
                lexer.expect_space()?;
                FetchItem::InternalDate(lexer.read_astring()?)
            }
            "ENVELOPE" => {
                lexer.expect_space()?;
                FetchItem::Envelope(Box::new(parse_envelope(lexer)?))
            }
            "BODYSTRUCTURE" => {
                lexer.expect_space()?;
                FetchItem::BodyStructure(parse_body_structure(lexer)?)
            }
            "MODSEQ" => {
                lexer.expect_space()?;
                lexer.expect(Token::LParen)?;
                let modseq = lexer.read_u64()?;
                lexer.expect(Token::RParen)?;
                FetchItem::ModSeq(modseq)
            }
            "BODY" if lexer.peek() == Some(b' ') => {
                lexer.expect_space()?;
                FetchItem::BodyStructure(parse_body_structure(lexer)?)
            }
            "BODY" => {
                let section = read_section(lexer)?;
                let origin = read_origin(lexer)?;
                lexer.expect_space()?;
                FetchItem::Body {
                    section: Some(section),
                    origin,
                    data: read_body_data(lexer)?,
                }
            }
            "RFC822" | "RFC822.HEADER" | "RFC822.TEXT" => {
                lexer.expect_space()?;
                FetchItem::Body {
                    section: name.strip_prefix("RFC822.").map(str::to_string),
                    origin: None,
                    data: read_body_data(lexer)?,
                }
            }
            _ => {
                tracing::trace!(item = %name, "skipping unknown fetch item");
                lexer.expect_space()?;
                lexer.skip_value()?;
                continue;
            }
        };
        items.push(item);
    }
}

/// Reads `[section]` verbatim; the section may itself contain spaces and
/// parentheses, as in `HEADER.FIELDS (FROM)`.
fn read_section(lexer: &mut Lexer<'_>) -> Result<String> {
    lexer.expect(Token::LBracket)?;
    let mut section = Vec::new();
    loop {
        match lexer.advance() {
            Some(b']') => return Ok(String::from_utf8_lossy(&section).into_owned()),
            Some(b) => section.push(b),
            None => return Err(lexer.error("unterminated section")),
        }
    }
}

/// Reads an optional `<origin>`.
fn read_origin(lexer: &mut Lexer<'_>) -> Result<Option<u32>> {
    if !lexer.eat(b'<') {
        return Ok(None);
    }
    let mut origin: u32 = 0;
    loop {
        match lexer.advance() {
            Some(b'>') => return Ok(Some(origin)),
            Some(b) if b.is_ascii_digit() => {
                origin = origin
                    .checked_mul(10)
                    .and_then(|o| o.checked_add(u32::from(b - b'0')))
                    .ok_or_else(|| lexer.error("origin out of range"))?;
            }
            _ => return Err(lexer.error("malformed origin")),
        }
    }
}

fn read_body_data(lexer: &mut Lexer<'_>) -> Result<Option<Vec<u8>>> {
    match lexer.next_token()? {
        Token::Nil => Ok(None),
        Token::Literal(data) => Ok(Some(data)),
        Token::QuotedString(s) => Ok(Some(s.into_bytes())),
        token => Err(lexer.error(format!("expected body data, got {token:?}"))),
    }
}

fn parse_envelope(lexer: &mut Lexer<'_>) -> Result<Envelope> {
    lexer.expect(Token::LParen)?;
    let date = lexer.read_nstring()?;
    lexer.expect_space()?;
    let subject = lexer.read_nstring()?;
    lexer.expect_space()?;
    let from = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let sender = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let reply_to = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let to = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let cc = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let bcc = parse_address_list(lexer)?;
    lexer.expect_space()?;
    let in_reply_to = lexer.read_nstring()?;
    lexer.expect_space()?;
    let message_id = lexer.read_nstring()?;
    lexer.expect(Token::RParen)?;

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
    })
}

fn parse_address_list(lexer: &mut Lexer<'_>) -> Result<Vec<Address>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut addresses = Vec::new();
            loop {
                match lexer.next_token()? {
                    Token::RParen => return Ok(addresses),
                    Token::Space => {}
                    Token::LParen => addresses.push(parse_address(lexer)?),
                    token => {
                        return Err(lexer.error(format!("unexpected {token:?} in address list")));
                    }
                }
            }
        }
        token => Err(lexer.error(format!("expected address list, got {token:?}"))),
    }
}

/// Reads the four fields of an address; the opening paren is already gone.
fn parse_address(lexer: &mut Lexer<'_>) -> Result<Address> {
    let name = lexer.read_nstring()?;
    lexer.expect_space()?;
    let adl = lexer.read_nstring()?;
    lexer.expect_space()?;
    let mailbox = lexer.read_nstring()?;
    lexer.expect_space()?;
    let host = lexer.read_nstring()?;
    lexer.expect(Token::RParen)?;
    Ok(Address {
        name,
        adl,
        mailbox,
        host,
    })
}

/// Reads a body structure. Extension data and the nested envelope of
/// `MESSAGE/RFC822` parts are skipped.
pub fn parse_body_structure(lexer: &mut Lexer<'_>) -> Result<BodyStructure> {
    lexer.expect(Token::LParen)?;

    if lexer.peek() == Some(b'(') {
        let mut parts = Vec::new();
        while lexer.peek() == Some(b'(') {
            parts.push(parse_body_structure(lexer)?);
        }
        lexer.expect_space()?;
        let subtype = upper(lexer.read_nstring()?);
        finish_list(lexer)?;
        return Ok(BodyStructure::Multipart { parts, subtype });
    }

    let media_type = upper(lexer.read_nstring()?);
    lexer.expect_space()?;
    let subtype = upper(lexer.read_nstring()?);
    lexer.expect_space()?;
    let params = parse_params(lexer)?;
    lexer.expect_space()?;
    let _id = lexer.read_nstring()?;
    lexer.expect_space()?;
    let _description = lexer.read_nstring()?;
    lexer.expect_space()?;
    let encoding = upper(lexer.read_nstring()?);
    lexer.expect_space()?;
    let size = lexer.read_number()?;

    let lines = if media_type == "TEXT" && lexer.eat(b' ') {
        Some(lexer.read_number()?)
    } else {
        None
    };
    finish_list(lexer)?;

    Ok(BodyStructure::Single {
        media_type,
        subtype,
        params,
        encoding,
        size,
        lines,
    })
}

fn parse_params(lexer: &mut Lexer<'_>) -> Result<Vec<(String, String)>> {
    match lexer.next_token()? {
        Token::Nil => Ok(Vec::new()),
        Token::LParen => {
            let mut params = Vec::new();
            loop {
                lexer.skip_spaces();
                if lexer.eat(b')') {
                    return Ok(params);
                }
                let key = lexer.read_astring()?;
                lexer.expect_space()?;
                let value = lexer.read_nstring()?.unwrap_or_default();
                params.push((key.to_ascii_uppercase(), value));
            }
        }
        token => Err(lexer.error(format!("expected parameter list, got {token:?}"))),
    }
}

/// Skips whatever is left before the closing paren and consumes it.
fn finish_list(lexer: &mut Lexer<'_>) -> Result<()> {
    loop {
        lexer.skip_spaces();
        if lexer.eat(b')') {
            return Ok(());
        }
        lexer.skip_value()?;
    }
}

fn upper(value: Option<String>) -> String {
    value.map(|v| v.to_ascii_uppercase()).unwrap_or_default()
}
