//! Tokens of the layout DSL and the byte classes the tokenizer dispatches on.

use std::fmt;

/// Kind of a token emitted by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Integer,
    String,
    Identifier,
    Comma,
    Colon,
    Slash,
    Dot,
    BracketLeft,
    BracketRight,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Integer => "Integer",
            TokenKind::String => "String",
            TokenKind::Identifier => "Identifier",
            TokenKind::Comma => "Comma",
            TokenKind::Colon => "Colon",
            TokenKind::Slash => "Slash",
            TokenKind::Dot => "Dot",
            TokenKind::BracketLeft => "BracketLeft",
            TokenKind::BracketRight => "BracketRight",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token: its kind and the exact source text it was built from.
///
/// String tokens keep their surrounding quotes and escapes verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.kind)
    }
}

/// Class of a byte that may start a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// One-byte token, complete as soon as it is seen.
    Punct(TokenKind),
    Whitespace,
    Quote,
    Digit,
    Letter,
    /// Not allowed anywhere outside a string body.
    Invalid,
}

impl ByteClass {
    /// Class of `b`.
    pub fn of(b: u8) -> ByteClass {
        BYTE_CLASSES[b as usize]
    }

    /// Class of a lookahead; end of input behaves as whitespace.
    pub fn of_lookahead(lookahead: Option<u8>) -> ByteClass {
        lookahead.map_or(ByteClass::Whitespace, ByteClass::of)
    }
}

static BYTE_CLASSES: [ByteClass; 256] = build_byte_classes();

const fn build_byte_classes() -> [ByteClass; 256] {
    let mut table = [ByteClass::Invalid; 256];
    let mut b = 0usize;
    while b < 256 {
        let c = b as u8;
        table[b] = match c {
            b',' => ByteClass::Punct(TokenKind::Comma),
            b':' => ByteClass::Punct(TokenKind::Colon),
            b'/' => ByteClass::Punct(TokenKind::Slash),
            b'.' => ByteClass::Punct(TokenKind::Dot),
            b'[' => ByteClass::Punct(TokenKind::BracketLeft),
            b']' => ByteClass::Punct(TokenKind::BracketRight),
            b' ' | b'\n' | b'\r' => ByteClass::Whitespace,
            b'"' => ByteClass::Quote,
            b'0'..=b'9' => ByteClass::Digit,
            b'a'..=b'z' | b'A'..=b'Z' => ByteClass::Letter,
            _ => ByteClass::Invalid,
        };
        b += 1;
    }
    table
}
