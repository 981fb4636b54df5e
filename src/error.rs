//! Crate-level error returned by the parse entry points.

use crate::parser::ParseError;
use crate::tokenizer::LexError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn is_lex(&self) -> bool {
        matches!(self, Error::Lex(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse(_))
    }
}
