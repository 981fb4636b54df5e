//! # bite — binary layout DSL front-end
//!
//! Lexer and recursive-descent parser for a small language that describes
//! the layout of binary data as a comma-separated list of terms:
//!
//! ```text
//! 0x89, "PNG\r\n", Len:32/integer, Type:32, Chunk:Len, CRC:32
//! ```
//!
//! ## Terms
//!
//! - **Literal**: an integer (`42`, `0x1A`, `0o17`, `0b101`) or a quoted string
//! - **Variable**: `Name[:length][/type]`
//! - **List**: `Name[...][:length]` (the bracket body is skipped)
//!
//! A length is an integer, the name of an earlier field, or `...` for the
//! rest of the input. A type is one of `bytes`, `integer`, `float`.
//!
//! ## Usage
//!
//! ```
//! use bite::{parse, Node};
//!
//! let root = parse("Len:32/integer, Chunk:Len").expect("valid layout");
//! assert_eq!(root.nodes.len(), 2);
//! assert!(matches!(&root.nodes[1], Node::Variable(v) if v.name == "Chunk"));
//! assert_eq!(root.to_string(), "Len:32/integer, Chunk:Len");
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod token;
pub mod tokenizer;

pub use ast::{FieldType, Length, List, Literal, LiteralKind, Node, Root, Variable, TYPE_KEYWORDS};
pub use error::Error;
pub use parser::{parse_tokens, Found, ParseError, Parser};
pub use token::{Token, TokenKind};
pub use tokenizer::{tokenize, tokenize_str, IntegerBase, LexError, Tokenizer};

use std::io::Read;

/// Tokenize and parse layout source.
pub fn parse(source: &str) -> Result<Root, Error> {
    parse_reader(source.as_bytes())
}

/// Tokenize `reader` to its end, then parse the tokens.
pub fn parse_reader<R: Read>(reader: R) -> Result<Root, Error> {
    let tokens = tokenize(reader)?;
    Ok(parse_tokens(&tokens)?)
}

/// Like [`parse_reader`] with a custom tokenizer configuration.
pub fn parse_with<R: Read>(tokenizer: &Tokenizer, reader: R) -> Result<Root, Error> {
    let tokens = tokenizer.tokenize(reader)?;
    Ok(parse_tokens(&tokens)?)
}
