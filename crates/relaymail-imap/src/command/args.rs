//! Argument formatting (RFC 3501 §4).
//!
//! Every helper appends to a caller-owned buffer and refuses bytes above
//! 0x7F: anything 8-bit has to travel as a literal or be pre-encoded.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::types::{Flag, Mailbox, canonical_order};
use crate::{Error, Result};

/// Returns true if `s` cannot be sent as a bare atom.
#[must_use]
pub fn needs_quoting(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("NIL") || s.bytes().any(is_special)
}

const fn is_special(b: u8) -> bool {
    matches!(b, b'*' | b'%' | b'(' | b')' | b'{' | b'"' | b'\\') || b <= 0x20 || b == 0x7F
}

/// Fails with [`Error::InvalidInput`] if `s` holds a byte above 0x7F.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] naming `what` and the offending offset.
pub fn ensure_seven_bit(s: &str, what: &str) -> Result<()> {
    match s.bytes().position(|b| b > 0x7F) {
        Some(pos) => Err(Error::InvalidInput(format!(
            "{what} has a non-ASCII byte at offset {pos}"
        ))),
        None => Ok(()),
    }
}

/// Returns true if `s` holds CR, LF or NUL, none of which may appear
/// inside a quoted string.
#[must_use]
pub fn has_line_break(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0))
}

fn ensure_quotable(s: &str, what: &str) -> Result<()> {
    ensure_seven_bit(s, what)?;
    if has_line_break(s) {
        return Err(Error::InvalidInput(format!(
            "{what} cannot contain CR, LF or NUL"
        )));
    }
    Ok(())
}

/// Writes an astring: bare if safe, quoted otherwise.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for non-ASCII input, CR, LF or NUL.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    ensure_quotable(s, "argument")?;
    if needs_quoting(s) {
        push_quoted(buf, s);
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
    Ok(())
}

/// Writes a quoted string regardless of content.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for non-ASCII input, CR, LF or NUL.
pub fn write_quoted(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    ensure_quotable(s, "quoted string")?;
    push_quoted(buf, s);
    Ok(())
}

fn push_quoted(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for b in s.bytes() {
        if b == b'"' || b == b'\\' {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

/// Writes an nstring: `NIL` for `None`, a quoted string otherwise.
///
/// # Errors
///
/// See [`write_quoted`].
pub fn write_nstring(buf: &mut Vec<u8>, s: Option<&str>) -> Result<()> {
    match s {
        Some(s) => write_quoted(buf, s),
        None => {
            buf.extend_from_slice(b"NIL");
            Ok(())
        }
    }
}

/// Writes a mailbox name already in modified UTF-7 form.
///
/// # Errors
///
/// See [`write_astring`].
pub fn write_mailbox(buf: &mut Vec<u8>, mailbox: &Mailbox) -> Result<()> {
    write_astring(buf, mailbox.as_str())
}

/// Writes a LIST pattern, where `*` and `%` are wildcards rather than
/// quoting triggers.
///
/// # Errors
///
/// See [`write_astring`].
pub fn write_list_pattern(buf: &mut Vec<u8>, pattern: &str) -> Result<()> {
    ensure_quotable(pattern, "list pattern")?;
    let bare = !pattern.is_empty()
        && !pattern.eq_ignore_ascii_case("NIL")
        && pattern
            .bytes()
            .all(|b| matches!(b, b'*' | b'%') || !is_special(b));
    if bare {
        buf.extend_from_slice(pattern.as_bytes());
    } else {
        push_quoted(buf, pattern);
    }
    Ok(())
}

/// Writes an atom that must be sent bare (verbs, keywords, capabilities).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the atom would need quoting.
pub fn write_atom(buf: &mut Vec<u8>, atom: &str) -> Result<()> {
    ensure_seven_bit(atom, "atom")?;
    if atom.is_empty() || atom.bytes().any(is_special) {
        return Err(Error::InvalidInput(format!("{atom:?} is not a valid atom")));
    }
    buf.extend_from_slice(atom.as_bytes());
    Ok(())
}

/// Writes a parenthesized flag list in canonical order.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a keyword that is not an atom.
pub fn write_flag_list(buf: &mut Vec<u8>, flags: &[Flag]) -> Result<()> {
    buf.push(b'(');
    for (i, flag) in canonical_order(flags).into_iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        match flag {
            Flag::Keyword(k) => write_atom(buf, k)?,
            system => buf.extend_from_slice(system.as_str().as_bytes()),
        }
    }
    buf.push(b')');
    Ok(())
}

/// Writes a SEARCH date (`d-Mon-yyyy`).
pub fn write_date(buf: &mut Vec<u8>, date: NaiveDate) {
    buf.extend_from_slice(date.format("%-d-%b-%Y").to_string().as_bytes());
}

/// Writes an APPEND date-time (`"dd-Mon-yyyy hh:mm:ss +zzzz"`).
pub fn write_date_time(buf: &mut Vec<u8>, when: &DateTime<FixedOffset>) {
    buf.push(b'"');
    buf.extend_from_slice(when.format("%e-%b-%Y %H:%M:%S %z").to_string().as_bytes());
    buf.push(b'"');
}
