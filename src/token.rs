//! Token types and the `Token` record produced by the tokenizer.

use crate::source::SourceId;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// The closed set of token kinds, per spec.md §3.
///
/// `Apply` and `Many` exist only as node tags synthesized by the parser
/// (never produced by the tokenizer); the `D*` variants are destructure
/// retaggings of `Name`/`[`/`{`/`Many` applied by the parser in binding
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // atoms
    Name,
    Str,
    Number,
    Template,
    Literal,

    // punctuation
    Eq,
    Arrow,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Ellipsis,
    Question,
    EqEqEq,
    Backtick,

    // keywords
    Import,
    From,
    Export,
    Default,
    Const,

    Newline,
    Eof,
    Unexpected,

    // synthetic, parser-only
    Apply,
    Many,
    DName,
    DBrack,
    DBrace,
    DMany,
}

impl TokenType {
    /// Atom kinds: tokens that stand for a value with no children.
    pub fn is_atom(self) -> bool {
        matches!(
            self,
            TokenType::Name
                | TokenType::Str
                | TokenType::Number
                | TokenType::Template
                | TokenType::Literal
                | TokenType::DName
        )
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub ty: TokenType,
    /// The raw lexeme text (decoded strings/templates keep their source
    /// spelling here; the interpreter decodes escapes at evaluation time).
    pub value: Rc<str>,
    pub source: SourceId,
    pub byte_pos: usize,
    pub line_no: usize,
    /// 0-indexed byte offset within the line.
    pub col: usize,
}

impl Token {
    pub fn new(
        ty: TokenType,
        value: impl Into<Rc<str>>,
        source: SourceId,
        byte_pos: usize,
        line_no: usize,
        col: usize,
    ) -> Self {
        Self {
            ty,
            value: value.into(),
            source,
            byte_pos,
            line_no,
            col,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:?})@{}:{}", self.ty, self.value, self.line_no, self.col)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.value == other.value
    }
}
