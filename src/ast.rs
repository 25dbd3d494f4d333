//! The uniform AST node: one record shape for every construct, distinguished
//! by `token.ty` plus the child-shape schema (see `schema.rs`).

use crate::token::{Token, TokenType};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
pub struct Node {
    pub token: Token,
    pub children: Vec<Node>,
    /// Set only on the body of `=>` and on both arms of `?` (spec.md §4.2,
    /// "Quoting"). A quoted node is not evaluated where it sits in the
    /// tree; the owning construct evaluates it later (call-time for a
    /// closure body, branch-selection time for a ternary arm).
    pub is_quoted: bool,
}

impl Node {
    pub fn leaf(token: Token) -> Self {
        Self {
            token,
            children: Vec::new(),
            is_quoted: false,
        }
    }

    pub fn new(token: Token, children: Vec<Node>) -> Self {
        Self {
            token,
            children,
            is_quoted: false,
        }
    }

    pub fn quoted(mut self) -> Self {
        self.is_quoted = true;
        self
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = if self.is_quoted { "'" } else { "" };
        if self.token.ty.is_atom() {
            write!(f, "{}{}", prefix, self.token.value)
        } else {
            let args = self
                .children
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if args.is_empty() {
                write!(f, "{}({:?})", prefix, self.token.ty)
            } else {
                write!(f, "{}({:?} {})", prefix, self.token.ty, args)
            }
        }
    }
}

/// Pretty-printing support, mirroring the teacher crate's `ASTNode` /
/// `ptree::TreeItem` pairing.
impl ptree::TreeItem for Node {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(
            f,
            "{:?}{} # {}:{}",
            self.token.ty,
            if self.is_quoted { " (quoted)" } else { "" },
            self.token.line_no,
            self.token.col
        )
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}

impl Node {
    pub fn print(&self) -> std::io::Result<()> {
        ptree::print_tree(self)
    }

    /// The maximum `line_no` over this node and all descendants, used by the
    /// parser's statement-boundary check (spec.md §4.2).
    pub fn max_line(&self) -> usize {
        self.children
            .iter()
            .map(Node::max_line)
            .fold(self.token.line_no, usize::max)
    }

    pub fn is_type(&self, ty: TokenType) -> bool {
        self.token.ty == ty
    }
}
