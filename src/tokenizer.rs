//! Byte-stream tokenizer for the layout DSL.
//!
//! One forward pass with one byte of lookahead. The bytes of the token being
//! built are kept in a buffer; each incoming byte is first offered as
//! lookahead to decide whether the buffer is complete. A complete buffer is
//! emitted (whitespace is dropped) and the incoming byte starts the next one.
//! At end of input the buffer is flushed with "no lookahead", which behaves
//! like whitespace.

use crate::token::{ByteClass, Token, TokenKind};
use log::{debug, trace};
use std::fmt;
use std::io::{self, Read};

/// Bytes requested per `read` call unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    #[error("unknown character {} at offset {offset}", escape_byte(.byte))]
    UnknownCharacter { byte: u8, offset: usize },
    #[error("floating point not supported (offset {offset})")]
    FloatingPoint { offset: usize },
    #[error("unexpected character {} after integer at offset {offset}", escape_byte(.byte))]
    UnexpectedAfterInteger { byte: u8, offset: usize },
    #[error("invalid digit {} for {base} integer at offset {offset}", escape_byte(.byte))]
    InvalidDigit {
        byte: u8,
        base: IntegerBase,
        offset: usize,
    },
    #[error("integer prefix {text} has no digits (offset {offset})")]
    MissingDigits { text: String, offset: usize },
    #[error("unfinished token: {kind} {text}")]
    Unfinished { kind: TokenKind, text: String },
    #[error("string is not valid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("input exceeds {limit} bytes")]
    InputTooLarge { limit: usize },
}

fn escape_byte(b: &u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", *b as char)
    } else {
        format!("0x{:02x}", b)
    }
}

/// Radix of an integer token, chosen by its `0x` / `0o` / `0b` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerBase {
    Decimal,
    Hex,
    Octal,
    Binary,
}

impl IntegerBase {
    /// Base of the integer text in `buf` (which starts with a digit).
    pub fn of(buf: &[u8]) -> IntegerBase {
        match buf {
            [b'0', b'x', ..] => IntegerBase::Hex,
            [b'0', b'o', ..] => IntegerBase::Octal,
            [b'0', b'b', ..] => IntegerBase::Binary,
            _ => IntegerBase::Decimal,
        }
    }

    pub fn radix(self) -> u32 {
        match self {
            IntegerBase::Decimal => 10,
            IntegerBase::Hex => 16,
            IntegerBase::Octal => 8,
            IntegerBase::Binary => 2,
        }
    }

    pub fn has_prefix(self) -> bool {
        self != IntegerBase::Decimal
    }

    pub fn accepts(self, b: u8) -> bool {
        match self {
            IntegerBase::Decimal => b.is_ascii_digit(),
            IntegerBase::Hex => b.is_ascii_hexdigit(),
            IntegerBase::Octal => matches!(b, b'0'..=b'7'),
            IntegerBase::Binary => matches!(b, b'0' | b'1'),
        }
    }
}

impl fmt::Display for IntegerBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntegerBase::Decimal => "decimal",
            IntegerBase::Hex => "hexadecimal",
            IntegerBase::Octal => "octal",
            IntegerBase::Binary => "binary",
        })
    }
}

/// Tokenizer configuration.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    chunk_size: usize,
    max_input_len: Option<usize>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_input_len: None,
        }
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes requested per read (at least 1).
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Fail with [`LexError::InputTooLarge`] once more than `limit` bytes are read.
    pub fn max_input_len(mut self, limit: usize) -> Self {
        self.max_input_len = Some(limit);
        self
    }

    /// Read `reader` to the end and return its tokens, whitespace removed.
    pub fn tokenize<R: Read>(&self, mut reader: R) -> Result<Vec<Token>, LexError> {
        let mut chunk = vec![0u8; self.chunk_size];
        let mut scanner = Scanner::default();
        loop {
            let n = match reader.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LexError::Io(e)),
            };
            // Bytes under the limit are lexed first, so an earlier lexical
            // error wins over the size error whatever the chunk size.
            let allowed = match self.max_input_len {
                Some(limit) => n.min(limit.saturating_sub(scanner.offset)),
                None => n,
            };
            for &b in &chunk[..allowed] {
                scanner.feed(b)?;
            }
            if allowed < n {
                if let Some(limit) = self.max_input_len {
                    return Err(LexError::InputTooLarge { limit });
                }
            }
        }
        let tokens = scanner.finish()?;
        debug!("tokenized {} tokens", tokens.len());
        Ok(tokens)
    }
}

/// Tokenize a reader with the default configuration.
pub fn tokenize<R: Read>(reader: R) -> Result<Vec<Token>, LexError> {
    Tokenizer::default().tokenize(reader)
}

pub fn tokenize_str(source: &str) -> Result<Vec<Token>, LexError> {
    tokenize(source.as_bytes())
}

#[derive(Debug, Default)]
struct Scanner {
    tokens: Vec<Token>,
    current: Vec<u8>,
    /// Class of `current[0]`; `None` while `current` is empty.
    class: Option<ByteClass>,
    /// Offset of `current[0]`.
    start: usize,
    /// Offset of the next byte to be fed.
    offset: usize,
}

impl Scanner {
    fn feed(&mut self, b: u8) -> Result<(), LexError> {
        if self.class.is_some() {
            if self.completes(Some(b))? {
                self.emit()?;
                self.begin(b)?;
            } else {
                self.current.push(b);
            }
        } else {
            self.begin(b)?;
        }
        self.offset += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, LexError> {
        if let Some(class) = self.class {
            if !self.completes(None)? {
                return Err(LexError::Unfinished {
                    kind: pending_kind(class),
                    text: String::from_utf8_lossy(&self.current).into_owned(),
                });
            }
            self.emit()?;
        }
        Ok(self.tokens)
    }

    fn begin(&mut self, b: u8) -> Result<(), LexError> {
        let class = ByteClass::of(b);
        if class == ByteClass::Invalid {
            return Err(LexError::UnknownCharacter {
                byte: b,
                offset: self.offset,
            });
        }
        self.current.clear();
        self.current.push(b);
        self.class = Some(class);
        self.start = self.offset;
        Ok(())
    }

    fn emit(&mut self) -> Result<(), LexError> {
        let class = match self.class.take() {
            Some(class) => class,
            None => return Ok(()),
        };
        let bytes = std::mem::take(&mut self.current);
        let kind = match class {
            ByteClass::Whitespace => return Ok(()),
            class => pending_kind(class),
        };
        let text = String::from_utf8(bytes).map_err(|e| LexError::InvalidUtf8 {
            offset: self.start + e.utf8_error().valid_up_to(),
        })?;
        let token = Token::new(kind, text);
        trace!("token {} at offset {}", token, self.start);
        self.tokens.push(token);
        Ok(())
    }

    /// Whether the buffered bytes form a complete token, given the next byte.
    fn completes(&self, lookahead: Option<u8>) -> Result<bool, LexError> {
        let class = match self.class {
            Some(class) => class,
            None => return Ok(false),
        };
        match class {
            ByteClass::Punct(_) => Ok(true),
            ByteClass::Whitespace => {
                Ok(!matches!(lookahead.map(ByteClass::of), Some(ByteClass::Whitespace)))
            }
            ByteClass::Quote => Ok(string_closed(&self.current)),
            ByteClass::Digit => self.integer_completes(lookahead),
            ByteClass::Letter => Ok(!matches!(
                ByteClass::of_lookahead(lookahead),
                ByteClass::Letter | ByteClass::Digit
            )),
            ByteClass::Invalid => Err(LexError::UnknownCharacter {
                byte: self.current.first().copied().unwrap_or_default(),
                offset: self.start,
            }),
        }
    }

    fn integer_completes(&self, lookahead: Option<u8>) -> Result<bool, LexError> {
        let buf = self.current.as_slice();
        let base = IntegerBase::of(buf);
        let b = match lookahead {
            Some(b'x' | b'o' | b'b') if buf == b"0" => return Ok(false),
            // Any decimal run followed by `.` is a float, not only a single digit.
            Some(b'.') if base == IntegerBase::Decimal => {
                return Err(LexError::FloatingPoint {
                    offset: self.offset,
                })
            }
            Some(b) if !terminates_integer(b) => b,
            _ => {
                if base.has_prefix() && buf.len() == 2 {
                    return Err(LexError::MissingDigits {
                        text: String::from_utf8_lossy(buf).into_owned(),
                        offset: self.start,
                    });
                }
                return Ok(true);
            }
        };
        if base.accepts(b) {
            Ok(false)
        } else if base.has_prefix() && b.is_ascii_alphanumeric() {
            Err(LexError::InvalidDigit {
                byte: b,
                base,
                offset: self.offset,
            })
        } else {
            Err(LexError::UnexpectedAfterInteger {
                byte: b,
                offset: self.offset,
            })
        }
    }
}

fn pending_kind(class: ByteClass) -> TokenKind {
    match class {
        ByteClass::Punct(kind) => kind,
        ByteClass::Quote => TokenKind::String,
        ByteClass::Digit => TokenKind::Integer,
        // Whitespace is never emitted and invalid bytes never start a buffer.
        ByteClass::Letter | ByteClass::Whitespace | ByteClass::Invalid => TokenKind::Identifier,
    }
}

fn terminates_integer(b: u8) -> bool {
    matches!(b, b',' | b'/' | b']') || ByteClass::of(b) == ByteClass::Whitespace
}

/// A quoted string is closed once it ends in a `"` that is not escaped by a
/// single preceding backslash.
fn string_closed(buf: &[u8]) -> bool {
    match buf {
        [_, .., b'\\', b'"'] if buf.len() >= 3 && buf[buf.len() - 3] != b'\\' => false,
        [_, .., b'"'] => true,
        _ => false,
    }
}
