//! Tokenizer for server records.
//!
//! The lexer works on one complete record, literals included, and hands
//! out borrowed atoms so that most records parse without allocating.

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::types::SequenceSet;
use crate::{Error, Result};

/// Cursor over one server record.
pub struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Starts at the beginning of `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Input not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    /// Returns true at the end of input.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Current byte, not consumed.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Consumes one byte.
    pub fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Consumes `n` bytes, stopping at the end of input.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Consumes `byte` if it is next.
    pub fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Builds a parse error at the cursor.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            position: self.pos,
            message: message.into(),
        }
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>> {
        let Some(byte) = self.peek() else {
            return Ok(Token::Eof);
        };

        let single = match byte {
            b'\r' if self.peek_at(1) == Some(b'\n') => {
                self.skip(2);
                return Ok(Token::Crlf);
            }
            b'\r' => return Err(self.error("CR without LF")),
            b' ' => Token::Space,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b'*' => Token::Asterisk,
            b'+' => Token::Plus,
            b'"' => return self.quoted(),
            b'{' => return self.literal(),
            _ if is_atom_char(byte) => return self.atom(),
            _ => return Err(self.error(format!("unexpected byte {byte:#04x}"))),
        };
        self.pos += 1;
        Ok(single)
    }

    fn quoted(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let mut out = Vec::new();
        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => out.push(c),
                    Some(c) => return Err(self.error(format!("bad escape \\{}", c as char))),
                    None => return Err(self.error("unterminated quoted string")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated quoted string")),
            }
        }
        Ok(Token::QuotedString(String::from_utf8_lossy(&out).into_owned()))
    }

    /// `{n}`, `{n+}` or `{n-}`, CRLF, then n bytes.
    fn literal(&mut self) -> Result<Token<'a>> {
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.input[start..self.pos];
        let len: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.error("bad literal length"))?;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        if !self.eat(b'}') || !self.eat(b'\r') || !self.eat(b'\n') {
            return Err(self.error("malformed literal prefix"));
        }
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or_else(|| self.error("literal runs past end of record"))?;
        let data = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(Token::Literal(data))
    }

    fn atom(&mut self) -> Result<Token<'a>> {
        let start = self.pos;
        while self.peek().is_some_and(is_atom_char) {
            self.pos += 1;
        }
        // `\*` in PERMANENTFLAGS
        if self.pos - start == 1 && self.input[start] == b'\\' && self.peek() == Some(b'*') {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("atom is not UTF-8"))?;

        if text.bytes().all(|b| b.is_ascii_digit()) {
            return text
                .parse()
                .map(Token::Number)
                .map_err(|_| self.error(format!("number out of range: {text}")));
        }
        if text.eq_ignore_ascii_case("NIL") {
            return Ok(Token::Nil);
        }
        Ok(Token::Atom(text))
    }

    /// Consumes `expected`, comparing variants only.
    #[allow(clippy::needless_pass_by_value)]
    pub fn expect(&mut self, expected: Token<'_>) -> Result<()> {
        let token = self.next_token()?;
        if std::mem::discriminant(&token) == std::mem::discriminant(&expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected {expected:?}, got {token:?}")))
        }
    }

    /// Consumes a single space.
    pub fn expect_space(&mut self) -> Result<()> {
        if self.eat(b' ') {
            Ok(())
        } else {
            Err(self.error("expected space"))
        }
    }

    /// Skips any run of spaces.
    pub fn skip_spaces(&mut self) {
        while self.eat(b' ') {}
    }

    /// Reads an atom, quoted string or literal as text. Numbers are
    /// accepted too, since a mailbox may be called `2024`.
    pub fn read_astring(&mut self) -> Result<String> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s.to_string()),
            Token::Number(n) => Ok(n.to_string()),
            Token::QuotedString(s) => Ok(s),
            Token::Literal(data) => Ok(String::from_utf8_lossy(&data).into_owned()),
            Token::Nil => Ok("NIL".to_string()),
            token => Err(self.error(format!("expected string, got {token:?}"))),
        }
    }

    /// Reads NIL or a string. Bare atoms and numbers are tolerated.
    pub fn read_nstring(&mut self) -> Result<Option<String>> {
        match self.next_token()? {
            Token::Nil => Ok(None),
            Token::QuotedString(s) => Ok(Some(s)),
            Token::Atom(s) => Ok(Some(s.to_string())),
            Token::Number(n) => Ok(Some(n.to_string())),
            Token::Literal(data) => Ok(Some(String::from_utf8_lossy(&data).into_owned())),
            token => Err(self.error(format!("expected nstring, got {token:?}"))),
        }
    }

    /// Reads a 64-bit number.
    pub fn read_u64(&mut self) -> Result<u64> {
        match self.next_token()? {
            Token::Number(n) => Ok(n),
            token => Err(self.error(format!("expected number, got {token:?}"))),
        }
    }

    /// Reads a 32-bit number.
    pub fn read_number(&mut self) -> Result<u32> {
        let n = self.read_u64()?;
        u32::try_from(n).map_err(|_| self.error(format!("{n} does not fit 32 bits")))
    }

    /// Reads an atom.
    pub fn read_atom(&mut self) -> Result<&'a str> {
        match self.next_token()? {
            Token::Atom(s) => Ok(s),
            token => Err(self.error(format!("expected atom, got {token:?}"))),
        }
    }

    /// Reads a sequence set such as `4`, `1:3,7` or `5:*`.
    pub fn read_sequence_set(&mut self) -> Result<SequenceSet> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_digit() || matches!(b, b':' | b',' | b'*'))
        {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.input[start..self.pos]).unwrap_or_default();
        if text.is_empty() {
            return Err(self.error("expected sequence set"));
        }
        text.parse().map_err(|_| Error::Parse {
            position: start,
            message: format!("bad sequence set {text:?}"),
        })
    }

    /// Consumes the rest of the line as text; the CRLF is dropped.
    pub fn rest_of_line(&mut self) -> String {
        let rest = self.remaining();
        let end = rest
            .windows(2)
            .position(|w| w == b"\r\n")
            .unwrap_or(rest.len());
        self.skip(end + 2);
        String::from_utf8_lossy(&rest[..end]).into_owned()
    }

    /// Skips one value: an atom, number, string, literal or a balanced
    /// parenthesized list.
    pub fn skip_value(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.next_token()? {
                Token::LParen => depth += 1,
                Token::RParen if depth > 0 => depth -= 1,
                Token::RParen => return Err(self.error("unbalanced ')'")),
                Token::Eof | Token::Crlf => return Err(self.error("value runs past end of line")),
                _ => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}

/// Returns true for bytes that may appear in an atom.
///
/// `\` is accepted so that flags like `\Seen` lex as one atom; `<` and `>`
/// are accepted so that partial-fetch origins stay attached to their item.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    !matches!(
        b,
        b'(' | b')' | b'{' | b' ' | b'%' | b'*' | b'"' | b']' | b'['
    ) && b > 0x20
        && b < 0x7F
}
