//! Abstract Syntax Tree for the layout DSL.
//!
//! A [`Root`] is the ordered list of terms; order mirrors the byte layout.
//! `Display` renders every node in canonical form, which parses back to an
//! equal tree.

use crate::tokenizer::IntegerBase;
use std::fmt;

/// Parsed layout: terms in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Root {
    pub nodes: Vec<Node>,
}

impl Root {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// First variable or list named `name`.
    pub fn field(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == Some(name))
    }
}

/// One term of a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(Literal),
    Variable(Variable),
    List(List),
}

impl Node {
    /// Field name of a variable or list; literals are unnamed.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Literal(_) => None,
            Node::Variable(v) => Some(&v.name),
            Node::List(l) => Some(&l.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Integer,
    String,
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LiteralKind::Integer => "Integer",
            LiteralKind::String => "String",
        })
    }
}

/// Constant term. `value` is the token text: strings keep their quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub kind: LiteralKind,
}

impl Literal {
    pub fn integer(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            kind: LiteralKind::Integer,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            kind: LiteralKind::String,
        }
    }

    /// Numeric value of an integer literal in its base. `None` for strings or on overflow.
    pub fn as_u64(&self) -> Option<u64> {
        match self.kind {
            LiteralKind::Integer => integer_value(&self.value),
            LiteralKind::String => None,
        }
    }

    /// Body of a string literal without its quotes, escapes untouched.
    pub fn unquoted(&self) -> Option<&str> {
        match self.kind {
            LiteralKind::String => self
                .value
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"')),
            LiteralKind::Integer => None,
        }
    }

    /// Bytes a string literal stands for, with escapes decoded.
    ///
    /// Understands `\n`, `\r`, `\t`, `\0`, `\\`, `\"` and `\xNN`. Any other
    /// backslash sequence is kept as written.
    pub fn string_bytes(&self) -> Option<Vec<u8>> {
        let body = self.unquoted()?.as_bytes();
        let mut out = Vec::with_capacity(body.len());
        let mut i = 0;
        while i < body.len() {
            if body[i] != b'\\' || i + 1 == body.len() {
                out.push(body[i]);
                i += 1;
                continue;
            }
            let decoded = match body[i + 1] {
                b'n' => Some(b'\n'),
                b'r' => Some(b'\r'),
                b't' => Some(b'\t'),
                b'0' => Some(0),
                b'\\' => Some(b'\\'),
                b'"' => Some(b'"'),
                _ => None,
            };
            if let Some(b) = decoded {
                out.push(b);
                i += 2;
                continue;
            }
            let hex = body
                .get(i + 2..i + 4)
                .filter(|_| body[i + 1] == b'x')
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            match hex {
                Some(b) => {
                    out.push(b);
                    i += 4;
                }
                None => {
                    out.push(b'\\');
                    i += 1;
                }
            }
        }
        Some(out)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Named field: `Name[:length][/type]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub length: Option<Length>,
    pub ty: Option<FieldType>,
}

impl Variable {
    pub fn new(name: impl Into<String>, length: Option<Length>, ty: Option<FieldType>) -> Self {
        Variable {
            name: name.into(),
            length,
            ty,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(length) = &self.length {
            write!(f, ":{}", length)?;
        }
        if let Some(ty) = self.ty {
            write!(f, "/{}", ty)?;
        }
        Ok(())
    }
}

/// Bracketed field: `Name[...][:length]`.
///
/// The parser skips the bracket body, so `elements` is currently always empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    pub name: String,
    pub elements: Vec<Node>,
    pub length: Option<Length>,
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.name)?;
        write_joined(f, &self.elements)?;
        f.write_str("]")?;
        if let Some(length) = &self.length {
            write!(f, ":{}", length)?;
        }
        Ok(())
    }
}

/// Length suffix of a field. Back-references are resolved by the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Length {
    /// Integer token text, e.g. `32` or `0x20`.
    Literal(String),
    /// Name of an earlier field whose value is the length.
    Field(String),
    /// `...`: the rest of the input.
    Rest,
}

impl Length {
    pub fn as_str(&self) -> &str {
        match self {
            Length::Literal(s) | Length::Field(s) => s,
            Length::Rest => "...",
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Length::Literal(s) => integer_value(s),
            Length::Field(_) | Length::Rest => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type suffix of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bytes,
    Integer,
    Float,
}

/// Identifiers accepted after `/`.
pub const TYPE_KEYWORDS: [(&str, FieldType); 3] = [
    ("bytes", FieldType::Bytes),
    ("integer", FieldType::Integer),
    ("float", FieldType::Float),
];

impl FieldType {
    pub fn from_keyword(s: &str) -> Option<FieldType> {
        TYPE_KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == s)
            .map(|&(_, ty)| ty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Bytes => "bytes",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Literal(n) => fmt::Display::fmt(n, f),
            Node::Variable(n) => fmt::Display::fmt(n, f),
            Node::List(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.nodes)
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, nodes: &[Node]) -> fmt::Result {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", node)?;
    }
    Ok(())
}

fn integer_value(text: &str) -> Option<u64> {
    let base = IntegerBase::of(text.as_bytes());
    let digits = if base.has_prefix() { &text[2..] } else { text };
    u64::from_str_radix(digits, base.radix()).ok()
}
