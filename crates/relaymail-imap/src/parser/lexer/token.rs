//! Lexical tokens of a server record.

/// One token of a server record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Bare atom, including flag atoms like `\Seen` and `\*`.
    Atom(&'a str),
    /// Quoted string with escapes resolved.
    QuotedString(String),
    /// Literal payload (`{n}` prefix consumed).
    Literal(Vec<u8>),
    /// Unsigned number; mod-sequences need the full 64 bits.
    Number(u64),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// A single space.
    Space,
    /// `*`
    Asterisk,
    /// `+`
    Plus,
    /// `NIL`, any case.
    Nil,
    /// `\r\n`
    Crlf,
    /// End of input.
    Eof,
}
