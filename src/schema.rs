//! Child-shape schema: the parser's grammar table expressed as data, so it
//! can be checked independently of the hand-written `nud`/`led` functions
//! that build nodes (spec.md §4.2's grammar table).
//!
//! Every non-atom node type has a fixed-arity shape (each position
//! constrained to a specific set of allowed child token types) or a variadic
//! shape (any number of children, each drawn from one allowed set).
//! `validate` catches a parser bug (wrong child count, or a child in the
//! wrong position) before it becomes a silent interpreter misbehavior
//! further downstream.

use crate::ast::Node;
use crate::token::{Token, TokenType};

/// What token types are allowed in a given child position.
#[derive(Debug, Clone, Copy)]
pub enum Allowed {
    /// Any node shape is acceptable here (used for general expression
    /// positions and variadic containers, where the valid token-type set is
    /// effectively "every expression-producing construct").
    Any,
    OneOf(&'static [TokenType]),
}

impl Allowed {
    fn accepts(self, ty: TokenType) -> bool {
        match self {
            Allowed::Any => true,
            Allowed::OneOf(set) => set.contains(&ty),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Atom: no children.
    Leaf,
    /// Exactly `positions.len()` children, each checked against its own
    /// allowed set.
    Fixed(&'static [Allowed]),
    /// Zero or more children, all checked against the same allowed set
    /// (array/object/call argument lists, destructure element lists).
    Variadic(Allowed),
}

const D_NAME: Allowed = Allowed::OneOf(&[TokenType::DName]);
const PATTERN: Allowed = Allowed::OneOf(&[
    TokenType::DName,
    TokenType::DBrack,
    TokenType::DBrace,
    TokenType::DMany,
]);
const BINDING_SOURCE: Allowed = Allowed::OneOf(&[TokenType::DName, TokenType::DBrace]);
const KEY: Allowed = Allowed::OneOf(&[TokenType::DName, TokenType::Str]);
/// An element of an array/parameter destructure list: a nested pattern, or
/// a `...rest` wrapping one.
const PATTERN_OR_REST: Allowed = Allowed::OneOf(&[
    TokenType::DName,
    TokenType::DBrack,
    TokenType::DBrace,
    TokenType::DMany,
    TokenType::Ellipsis,
]);
/// An element of an object destructure list: a `key: pattern` pair, or a
/// `...rest` wrapping one.
const PAIR_OR_REST: Allowed = Allowed::OneOf(&[TokenType::Colon, TokenType::Ellipsis]);

pub fn shape_of(ty: TokenType) -> Shape {
    use TokenType::*;
    match ty {
        // atoms
        Name | Str | Number | Template | Literal | DName => Shape::Leaf,

        // `const NAME = E` / destructuring const: one `Eq` child.
        Const => Shape::Fixed(&[Allowed::OneOf(&[Eq])]),
        // `import ... from "..."`: one `From` child.
        Import => Shape::Fixed(&[Allowed::OneOf(&[From])]),
        // `export const ...` / `export default ...`: one child, either shape.
        Export => Shape::Fixed(&[Allowed::OneOf(&[Const, Default])]),
        // `export default E`: the exported value.
        Default => Shape::Fixed(&[Allowed::Any]),
        // `...x`: the spread/rest source expression (or, in binding
        // position, the name/pattern it introduces).
        Ellipsis => Shape::Fixed(&[Allowed::Any]),

        // `pattern = value`
        Eq => Shape::Fixed(&[PATTERN, Allowed::Any]),
        // `.` member access: a value, then a literal property name.
        Dot => Shape::Fixed(&[Allowed::Any, D_NAME]),
        // object-literal / destructure pair: a key, then a value.
        Colon => Shape::Fixed(&[KEY, Allowed::Any]),
        EqEqEq => Shape::Fixed(&[Allowed::Any, Allowed::Any]),
        // `pattern from "path"`
        From => Shape::Fixed(&[BINDING_SOURCE, Allowed::OneOf(&[Str])]),
        // `cond ? then : else` — ternary, three children.
        Question => Shape::Fixed(&[Allowed::Any, Allowed::Any, Allowed::Any]),
        // `params => body`
        Arrow => Shape::Fixed(&[Allowed::OneOf(&[DMany]), Allowed::Any]),

        // variadic constructs: element/argument lists.
        LBracket => Shape::Variadic(Allowed::Any),
        LBrace => Shape::Variadic(Allowed::OneOf(&[Colon, Ellipsis])),
        Apply => Shape::Variadic(Allowed::Any),
        Backtick => Shape::Variadic(Allowed::Any),
        DBrack | DMany => Shape::Variadic(PATTERN_OR_REST),
        DBrace => Shape::Variadic(PAIR_OR_REST),
        Many => Shape::Variadic(Allowed::Any),

        // parser-internal / never appear as a built node's own tag in a
        // finished tree
        RParen | RBracket | RBrace | Comma | LParen | Newline | Eof | Unexpected => Shape::Leaf,
    }
}

#[derive(Debug)]
pub struct ShapeViolation {
    pub node_ty: TokenType,
    pub position: Option<usize>,
    pub actual_children: usize,
    pub child_ty: Option<TokenType>,
    /// The token of the node (for a count mismatch) or the offending child
    /// (for a wrong-position child), used to anchor the resulting
    /// diagnostic at a precise source location.
    pub token: Token,
}

/// Recursively check that every node matches its type's schema: the right
/// number of children, each in an allowed position. Returns the first
/// violation found, depth-first.
pub fn validate(node: &Node) -> Result<(), ShapeViolation> {
    let shape = shape_of(node.token.ty);
    match shape {
        Shape::Leaf => {
            if !node.children.is_empty() {
                return Err(ShapeViolation {
                    node_ty: node.token.ty,
                    position: None,
                    actual_children: node.children.len(),
                    child_ty: None,
                    token: node.token.clone(),
                });
            }
        }
        Shape::Fixed(positions) => {
            if node.children.len() != positions.len() {
                return Err(ShapeViolation {
                    node_ty: node.token.ty,
                    position: None,
                    actual_children: node.children.len(),
                    child_ty: None,
                    token: node.token.clone(),
                });
            }
            for (i, (child, allowed)) in node.children.iter().zip(positions.iter()).enumerate() {
                if !allowed.accepts(child.token.ty) {
                    return Err(ShapeViolation {
                        node_ty: node.token.ty,
                        position: Some(i),
                        actual_children: node.children.len(),
                        child_ty: Some(child.token.ty),
                        token: child.token.clone(),
                    });
                }
            }
        }
        Shape::Variadic(allowed) => {
            for child in &node.children {
                if !allowed.accepts(child.token.ty) {
                    return Err(ShapeViolation {
                        node_ty: node.token.ty,
                        position: None,
                        actual_children: node.children.len(),
                        child_ty: Some(child.token.ty),
                        token: child.token.clone(),
                    });
                }
            }
        }
    }
    for child in &node.children {
        validate(child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;
    use crate::token::Token;

    fn leaf(ty: TokenType, value: &str) -> Node {
        let source = Source::from_synthetic("");
        Node::leaf(Token::new(ty, value, source.id.clone(), 0, 1, 0))
    }

    fn d_name(value: &str) -> Node {
        leaf(TokenType::DName, value)
    }

    #[test]
    fn leaf_with_no_children_is_valid() {
        assert!(validate(&leaf(TokenType::Number, "1")).is_ok());
    }

    #[test]
    fn fixed_arity_mismatch_is_rejected() {
        let source = Source::from_synthetic("");
        let bad = Node::new(
            Token::new(TokenType::Const, "const", source.id.clone(), 0, 1, 0),
            vec![d_name("a"), leaf(TokenType::Number, "1")],
        );
        assert!(validate(&bad).is_err());
    }

    #[test]
    fn dot_requires_d_name_in_second_position() {
        let source = Source::from_synthetic("");
        let bad = Node::new(
            Token::new(TokenType::Dot, ".", source.id.clone(), 0, 1, 0),
            vec![leaf(TokenType::Name, "a"), leaf(TokenType::Name, "b")],
        );
        assert!(validate(&bad).is_err());

        let good = Node::new(
            Token::new(TokenType::Dot, ".", source.id.clone(), 0, 1, 0),
            vec![leaf(TokenType::Name, "a"), d_name("b")],
        );
        assert!(validate(&good).is_ok());
    }

    #[test]
    fn ternary_requires_three_children() {
        let source = Source::from_synthetic("");
        let node = Node::new(
            Token::new(TokenType::Question, "?", source.id.clone(), 0, 1, 0),
            vec![leaf(TokenType::Name, "a"), leaf(TokenType::Number, "1"), leaf(TokenType::Number, "2")],
        );
        assert!(validate(&node).is_ok());
    }

    #[test]
    fn variadic_accepts_any_count() {
        let source = Source::from_synthetic("");
        let arr = Node::new(
            Token::new(TokenType::LBracket, "[", source.id.clone(), 0, 1, 0),
            vec![leaf(TokenType::Number, "1"), leaf(TokenType::Number, "2"), leaf(TokenType::Number, "3")],
        );
        assert!(validate(&arr).is_ok());
    }

    #[test]
    fn object_literal_rejects_non_pair_children() {
        let source = Source::from_synthetic("");
        let bad = Node::new(
            Token::new(TokenType::LBrace, "{", source.id.clone(), 0, 1, 0),
            vec![leaf(TokenType::Number, "1")],
        );
        assert!(validate(&bad).is_err());
    }
}
