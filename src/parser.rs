//! Recursive-descent parser from tokens to [`Root`].
//!
//! ```text
//! Root     := (Term (Comma Term)*)?
//! Term     := Integer | String | List | Variable
//! List     := Identifier BracketLeft <skipped> BracketRight Length?
//! Variable := Identifier Length? Type?
//! Length   := Colon (Integer | Identifier | Dot Dot Dot)
//! Type     := Slash Identifier        (bytes | integer | float)
//! ```
//!
//! One token of lookahead, no backtracking. The first error aborts the parse.

use crate::ast::*;
use crate::token::{Token, TokenKind};
use log::{debug, trace};
use std::fmt;

/// What the parser found where it expected something else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Token(Token),
    EndOfInput,
}

impl From<Option<&Token>> for Found {
    fn from(token: Option<&Token>) -> Self {
        match token {
            Some(t) => Found::Token(t.clone()),
            None => Found::EndOfInput,
        }
    }
}

impl From<&Token> for Found {
    fn from(token: &Token) -> Self {
        Found::Token(token.clone())
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Token(t) => write!(f, "{} // {}", t.text, t.kind),
            Found::EndOfInput => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown token: {found}")]
    UnknownToken { found: Found },
    #[error("expected comma, got {found}")]
    ExpectedComma { found: Found },
    #[error("trailing comma: expected a term, got end of input")]
    TrailingComma,
    #[error("expected closing bracket, got end of input (list {name})")]
    UnclosedBracket { name: String },
    #[error("expected integer or identifier for length, got {found}")]
    ExpectedLength { found: Found },
    #[error("expected three dots in an ellipsis, got {found}")]
    IncompleteEllipsis { found: Found },
    #[error("expected identifier for type, got {found}")]
    ExpectedType { found: Found },
    #[error("expected a correct type (bytes, integer or float), got {text}")]
    UnknownType { text: String },
}

/// Cursor over a token slice.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn parse_root(mut self) -> Result<Root, ParseError> {
        let mut nodes = Vec::new();
        while let Some(token) = self.next_token() {
            let node = self.parse_term(token)?;
            trace!("node {}", node);
            nodes.push(node);
            match self.next_token() {
                None => break,
                Some(t) if t.kind == TokenKind::Comma => {
                    if self.peek(0).is_none() {
                        return Err(ParseError::TrailingComma);
                    }
                }
                Some(t) => return Err(ParseError::ExpectedComma { found: t.into() }),
            }
        }
        Ok(Root { nodes })
    }

    fn parse_term(&mut self, token: &'a Token) -> Result<Node, ParseError> {
        match token.kind {
            TokenKind::Integer => Ok(Node::Literal(Literal::integer(token.text.clone()))),
            TokenKind::String => Ok(Node::Literal(Literal::string(token.text.clone()))),
            TokenKind::Identifier => {
                if self.peek_kind(0) == Some(TokenKind::BracketLeft) {
                    self.parse_list(token).map(Node::List)
                } else {
                    self.parse_variable(token).map(Node::Variable)
                }
            }
            _ => Err(ParseError::UnknownToken {
                found: token.into(),
            }),
        }
    }

    /// The bracket body is skipped up to its matching `]`; `elements` stays empty.
    fn parse_list(&mut self, name: &Token) -> Result<List, ParseError> {
        self.eat(TokenKind::BracketLeft);
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_token().map(|t| t.kind) {
                Some(TokenKind::BracketLeft) => depth += 1,
                Some(TokenKind::BracketRight) => depth -= 1,
                Some(_) => {}
                None => {
                    return Err(ParseError::UnclosedBracket {
                        name: name.text.clone(),
                    })
                }
            }
        }
        let length = self.parse_length()?;
        Ok(List {
            name: name.text.clone(),
            elements: Vec::new(),
            length,
        })
    }

    fn parse_variable(&mut self, name: &Token) -> Result<Variable, ParseError> {
        let length = self.parse_length()?;
        let ty = self.parse_type()?;
        Ok(Variable::new(name.text.clone(), length, ty))
    }

    fn parse_length(&mut self) -> Result<Option<Length>, ParseError> {
        if !self.eat(TokenKind::Colon) {
            return Ok(None);
        }
        match self.next_token() {
            Some(t) if t.kind == TokenKind::Integer => Ok(Some(Length::Literal(t.text.clone()))),
            Some(t) if t.kind == TokenKind::Identifier => Ok(Some(Length::Field(t.text.clone()))),
            Some(t) if t.kind == TokenKind::Dot => {
                for _ in 0..2 {
                    let next = self.next_token();
                    if next.map(|t| t.kind) != Some(TokenKind::Dot) {
                        return Err(ParseError::IncompleteEllipsis { found: next.into() });
                    }
                }
                Ok(Some(Length::Rest))
            }
            other => Err(ParseError::ExpectedLength {
                found: other.into(),
            }),
        }
    }

    fn parse_type(&mut self) -> Result<Option<FieldType>, ParseError> {
        if !self.eat(TokenKind::Slash) {
            return Ok(None);
        }
        match self.next_token() {
            Some(t) if t.kind == TokenKind::Identifier => FieldType::from_keyword(&t.text)
                .map(Some)
                .ok_or_else(|| ParseError::UnknownType {
                    text: t.text.clone(),
                }),
            other => Err(ParseError::ExpectedType {
                found: other.into(),
            }),
        }
    }

    fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.peek(offset).map(|t| t.kind)
    }

    fn next_token(&mut self) -> Option<&'a Token> {
        let token = self.peek(0)?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind(0) == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// Parse a token sequence into a [`Root`].
pub fn parse_tokens(tokens: &[Token]) -> Result<Root, ParseError> {
    let root = Parser::new(tokens).parse_root()?;
    debug!("parsed {} nodes from {} tokens", root.len(), tokens.len());
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_str;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text)
    }

    fn parse_src(src: &str) -> Result<Root, ParseError> {
        parse_tokens(&tokenize_str(src).expect("tokenize"))
    }

    #[test]
    fn no_tokens_parse_to_empty_root() {
        assert_eq!(parse_tokens(&[]), Ok(Root::default()));
    }

    #[test]
    fn lone_punctuation_is_unknown_token() {
        for (kind, text) in [(TokenKind::Colon, ":"), (TokenKind::BracketRight, "]")] {
            assert_eq!(
                parse_tokens(&[tok(kind, text)]),
                Err(ParseError::UnknownToken {
                    found: Found::Token(tok(kind, text))
                })
            );
        }
    }

    #[test]
    fn literal_tokens_become_literal_nodes() {
        let tokens = [
            tok(TokenKind::Integer, "0x89"),
            tok(TokenKind::Comma, ","),
            tok(TokenKind::String, "\"IHDR\""),
        ];
        let root = parse_tokens(&tokens).expect("parse");
        assert_eq!(
            root.nodes,
            vec![
                Node::Literal(Literal::integer("0x89")),
                Node::Literal(Literal::string("\"IHDR\"")),
            ]
        );
    }

    #[test]
    fn identifier_followed_by_bracket_is_list() {
        let tokens = [
            tok(TokenKind::Identifier, "Chunk"),
            tok(TokenKind::BracketLeft, "["),
            tok(TokenKind::BracketRight, "]"),
        ];
        let root = parse_tokens(&tokens).expect("parse");
        assert!(matches!(&root.nodes[..], [Node::List(l)] if l.name == "Chunk" && l.length.is_none()));
    }

    #[test]
    fn variable_suffixes() {
        let root = parse_src("A, B:8, C/float, D:Len/bytes, E:...").expect("parse");
        assert_eq!(
            root.nodes,
            vec![
                Node::Variable(Variable::new("A", None, None)),
                Node::Variable(Variable::new("B", Some(Length::Literal("8".into())), None)),
                Node::Variable(Variable::new("C", None, Some(FieldType::Float))),
                Node::Variable(Variable::new(
                    "D",
                    Some(Length::Field("Len".into())),
                    Some(FieldType::Bytes)
                )),
                Node::Variable(Variable::new("E", Some(Length::Rest), None)),
            ]
        );
    }

    // The bracket body is not parsed into elements.
    #[test]
    fn list_body_is_skipped() {
        let root = parse_src("Chunk[Foo:64, \"x\", 1]:Len").expect("parse");
        match &root.nodes[..] {
            [Node::List(l)] => {
                assert_eq!(l.name, "Chunk");
                assert!(l.elements.is_empty());
                assert_eq!(l.length, Some(Length::Field("Len".into())));
            }
            other => panic!("unexpected nodes: {other:?}"),
        }
    }

    #[test]
    fn list_skip_stops_at_matching_bracket() {
        let root = parse_src("A[B[C]], D").expect("parse");
        assert_eq!(root.len(), 2);
        assert!(matches!(&root.nodes[0], Node::List(l) if l.elements.is_empty()));
        assert_eq!(root.nodes[1], Node::Variable(Variable::new("D", None, None)));
    }

    #[test]
    fn unclosed_bracket() {
        assert_eq!(
            parse_src("Chunk[Foo:64"),
            Err(ParseError::UnclosedBracket {
                name: "Chunk".into()
            })
        );
        assert!(matches!(
            parse_src("A[B[]"),
            Err(ParseError::UnclosedBracket { .. })
        ));
    }

    #[test]
    fn commas_between_terms() {
        assert_eq!(parse_src("A,"), Err(ParseError::TrailingComma));
        assert_eq!(
            parse_src(", A"),
            Err(ParseError::UnknownToken {
                found: Found::Token(tok(TokenKind::Comma, ","))
            })
        );
        assert_eq!(
            parse_src("A,,B"),
            Err(ParseError::UnknownToken {
                found: Found::Token(tok(TokenKind::Comma, ","))
            })
        );
        assert_eq!(
            parse_src("A B"),
            Err(ParseError::ExpectedComma {
                found: Found::Token(tok(TokenKind::Identifier, "B"))
            })
        );
        assert_eq!(
            parse_src("1 2"),
            Err(ParseError::ExpectedComma {
                found: Found::Token(tok(TokenKind::Integer, "2"))
            })
        );
    }

    #[test]
    fn terms_cannot_start_with_punctuation() {
        for src in [":", "/", ".", "[", "]"] {
            assert!(
                matches!(parse_src(src), Err(ParseError::UnknownToken { .. })),
                "{src}"
            );
        }
    }

    #[test]
    fn bad_lengths() {
        assert_eq!(
            parse_src("A:"),
            Err(ParseError::ExpectedLength {
                found: Found::EndOfInput
            })
        );
        assert_eq!(
            parse_src("A:\"x\""),
            Err(ParseError::ExpectedLength {
                found: Found::Token(tok(TokenKind::String, "\"x\""))
            })
        );
        assert_eq!(
            parse_src("A:..B"),
            Err(ParseError::IncompleteEllipsis {
                found: Found::Token(tok(TokenKind::Identifier, "B"))
            })
        );
        assert_eq!(
            parse_src("A:.."),
            Err(ParseError::IncompleteEllipsis {
                found: Found::EndOfInput
            })
        );
    }

    #[test]
    fn bad_types() {
        assert_eq!(
            parse_src("A:8/u32"),
            Err(ParseError::UnknownType { text: "u32".into() })
        );
        assert_eq!(
            parse_src("A/8"),
            Err(ParseError::ExpectedType {
                found: Found::Token(tok(TokenKind::Integer, "8"))
            })
        );
        assert_eq!(
            parse_src("A/"),
            Err(ParseError::ExpectedType {
                found: Found::EndOfInput
            })
        );
    }

    #[test]
    fn type_before_length_is_rejected() {
        assert_eq!(
            parse_src("A/bytes:8"),
            Err(ParseError::ExpectedComma {
                found: Found::Token(tok(TokenKind::Colon, ":"))
            })
        );
    }

    #[test]
    fn lists_take_no_type() {
        assert!(matches!(
            parse_src("A[]:8/bytes"),
            Err(ParseError::ExpectedComma { .. })
        ));
    }

    #[test]
    fn error_messages_name_the_token() {
        let err = parse_src("A B").unwrap_err();
        assert_eq!(err.to_string(), "expected comma, got B // Identifier");
        let err = parse_src("A:").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected integer or identifier for length, got end of input"
        );
        let err = parse_src("A/bits").unwrap_err();
        assert!(err.to_string().starts_with("expected a correct type"));
    }
}
