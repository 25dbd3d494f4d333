//! The Pratt parser: turns a flat `TokenStream` into a `Node` tree.
//!
//! Dispatch is a plain `match` on `token.ty` rather than a dynamic rule
//! table (spec.md §4.2's grammar table, read as a literal match arm per
//! row). Binding powers below are the left-binding powers used by the
//! core `parse_expr` loop; grouping/call/dot bind tightest, comma loosest.

use crate::ast::Node;
use crate::error::Diagnostic;
use crate::lexer::TokenStream;
use crate::schema::{self, ShapeViolation};
use crate::source::Source;
use crate::token::{Token, TokenType};

const LBP_DOT_CALL: u8 = 20;
const LBP_EQUALITY: u8 = 11;
const LBP_TERNARY: u8 = 11;
const LBP_TERMINATOR: u8 = 0;

fn lbp(ty: TokenType) -> u8 {
    use TokenType::*;
    match ty {
        Dot | LParen => LBP_DOT_CALL,
        EqEqEq => LBP_EQUALITY,
        Question => LBP_TERNARY,
        _ => LBP_TERMINATOR,
    }
}

pub struct Parser<'s> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'s Source,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s Source) -> Self {
        let tokens: Vec<Token> = TokenStream::new(source).collect();
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    pub fn source(&self) -> &Source {
        self.source
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, ty: TokenType) -> Result<Token, Diagnostic> {
        if self.peek().ty == ty {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(Diagnostic::new(
                format!("expected {:?}, found {:?} {:?}", ty, tok.ty, tok.value),
                tok,
            ))
        }
    }

    fn err(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(message, self.peek().clone())
    }

    /// Parse an entire module: a sequence of top-level statements, each
    /// required to start on a new source line from the previous one
    /// (spec.md's statement-boundary rule, enforced via line numbers
    /// instead of an explicit `Newline` token).
    pub fn parse_module(&mut self) -> Result<Vec<Node>, Diagnostic> {
        let mut statements = Vec::new();
        let mut last_line: Option<usize> = None;

        while self.peek().ty != TokenType::Eof {
            let first_line = self.peek().line_no;
            if let Some(prev) = last_line {
                if first_line == prev {
                    return Err(self.err("expected a new line between statements"));
                }
            }
            let node = self.parse_statement()?;
            schema::validate(&node).map_err(shape_violation_to_diagnostic)?;
            last_line = Some(node.max_line());
            statements.push(node);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Node, Diagnostic> {
        match self.peek().ty {
            TokenType::Const => self.parse_const(),
            TokenType::Import => self.parse_import(),
            TokenType::Export => self.parse_export(),
            _ => self.parse_expr(0),
        }
    }

    fn parse_const(&mut self) -> Result<Node, Diagnostic> {
        let kw = self.expect(TokenType::Const)?;
        let pattern = self.parse_binding_target()?;
        self.expect(TokenType::Eq)?;
        let value = self.parse_expr(0)?;
        let eq = Node::new(
            Token::new(TokenType::Eq, "=", kw.source.clone(), kw.byte_pos, kw.line_no, kw.col),
            vec![pattern, value],
        );
        Ok(Node::new(kw, vec![eq]))
    }

    fn parse_import(&mut self) -> Result<Node, Diagnostic> {
        let kw = self.expect(TokenType::Import)?;
        let pattern = self.parse_binding_target()?;
        let from_kw = self.expect(TokenType::From)?;
        let path = self.expect(TokenType::Str)?;
        let path_node = Node::leaf(path);
        let from_node = Node::new(from_kw, vec![pattern, path_node]);
        Ok(Node::new(kw, vec![from_node]))
    }

    fn parse_export(&mut self) -> Result<Node, Diagnostic> {
        let kw = self.expect(TokenType::Export)?;
        if self.peek().ty == TokenType::Default {
            let default_kw = self.advance();
            let value = self.parse_expr(0)?;
            let default_node = Node::new(default_kw, vec![value]);
            Ok(Node::new(kw, vec![default_node]))
        } else {
            let const_node = self.parse_const()?;
            Ok(Node::new(kw, vec![const_node]))
        }
    }

    /// Parse a binding target for `const`/`import`: a name or a
    /// destructuring pattern, retagged to its `d_*` form.
    fn parse_binding_target(&mut self) -> Result<Node, Diagnostic> {
        let node = match self.peek().ty {
            TokenType::Name => Node::leaf(self.advance()),
            TokenType::LBracket => {
                let open = self.advance();
                self.parse_array(open)?
            }
            TokenType::LBrace => {
                let open = self.advance();
                self.parse_destructure_brace(open)?
            }
            _ => return Err(self.err("expected a binding target")),
        };
        Ok(retag_as_pattern(node))
    }

    /// An object-destructuring pattern: `{a, b: renamed, ...rest}`. Unlike a
    /// general object literal (`parse_object`), a bare name needs no colon —
    /// `{a}` means "bind `a` from the key `a`" — matching both `const`
    /// destructuring (spec.md §8's `object_destructuring_supports_renaming`-
    /// style usage) and `import { base, form } from "..."`'s bare name list
    /// (grounded in the original implementation's `DictDestruct`).
    fn parse_destructure_brace(&mut self, open: Token) -> Result<Node, Diagnostic> {
        let mut children = Vec::new();
        while self.peek().ty != TokenType::RBrace {
            if self.peek().ty == TokenType::Ellipsis {
                let tok = self.advance();
                let expr = self.parse_expr(0)?;
                children.push(Node::new(tok, vec![expr]));
            } else {
                let key_tok = match self.peek().ty {
                    TokenType::Name | TokenType::Str => self.advance(),
                    _ => return Err(self.err("expected a binding name")),
                };
                if self.peek().ty == TokenType::Colon {
                    let colon = self.advance();
                    let key = retag_destructure_key(Node::leaf(key_tok));
                    let value = self.parse_expr(0)?;
                    children.push(Node::new(colon, vec![key, value]));
                } else {
                    // Shorthand: `{a}` is `{a: a}`. Only valid for a bare
                    // name — there is no value to bind a quoted key to.
                    if key_tok.ty != TokenType::Name {
                        return Err(self.err("expected ':' after a string key"));
                    }
                    let key = retag_name(Node::leaf(key_tok.clone()));
                    let value = Node::leaf(key_tok.clone());
                    let colon = Token::new(
                        TokenType::Colon,
                        ":",
                        key_tok.source.clone(),
                        key_tok.byte_pos,
                        key_tok.line_no,
                        key_tok.col,
                    );
                    children.push(Node::new(colon, vec![key, value]));
                }
            }
            if self.peek().ty == TokenType::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenType::RBrace)?;
        Ok(Node::new(open, children))
    }

    // ---- expression parsing -------------------------------------------

    pub fn parse_expr(&mut self, rbp: u8) -> Result<Node, Diagnostic> {
        let tok = self.advance();
        let mut left = self.nud(tok)?;
        loop {
            let next_lbp = lbp(self.peek().ty);
            if rbp >= next_lbp {
                break;
            }
            let op = self.advance();
            left = self.led(left, op)?;
        }
        Ok(left)
    }

    /// An expression parsed in "quoted" position: the body of `=>` and
    /// each arm of `?` (spec.md §4.2, "Quoting"). Structurally identical
    /// to a normal expression; only the `is_quoted` flag differs.
    fn parse_quoted_expr(&mut self, rbp: u8) -> Result<Node, Diagnostic> {
        Ok(self.parse_expr(rbp)?.quoted())
    }

    fn nud(&mut self, tok: Token) -> Result<Node, Diagnostic> {
        match tok.ty {
            TokenType::Name
            | TokenType::Str
            | TokenType::Number
            | TokenType::Literal => Ok(Node::leaf(tok)),

            TokenType::LBracket => self.parse_array(tok),
            TokenType::LBrace => self.parse_object(tok),
            TokenType::LParen => self.parse_group_or_arrow(tok),
            TokenType::Backtick => self.parse_template(tok),
            TokenType::Ellipsis => {
                let expr = self.parse_expr(0)?;
                Ok(Node::new(tok, vec![expr]))
            }
            other => Err(Diagnostic::new(
                format!("not sure how to deal with token: {:?}", other),
                tok,
            )),
        }
    }

    fn led(&mut self, left: Node, op: Token) -> Result<Node, Diagnostic> {
        match op.ty {
            TokenType::Dot => {
                let name_tok = self.expect(TokenType::Name)?;
                let name_node = retag_name(Node::leaf(name_tok));
                Ok(Node::new(op, vec![left, name_node]))
            }
            TokenType::LParen => self.parse_call(left, op),
            TokenType::EqEqEq => {
                let right = self.parse_expr(LBP_EQUALITY)?;
                Ok(Node::new(op, vec![left, right]))
            }
            TokenType::Question => {
                let then_branch = self.parse_quoted_expr(0)?;
                self.expect(TokenType::Colon)?;
                let else_branch = self.parse_quoted_expr(LBP_TERNARY - 1)?;
                Ok(Node::new(op, vec![left, then_branch, else_branch]))
            }
            other => Err(Diagnostic::new(
                format!("unexpected infix token: {:?}", other),
                op,
            )),
        }
    }

    fn parse_array(&mut self, open: Token) -> Result<Node, Diagnostic> {
        let mut children = Vec::new();
        while self.peek().ty != TokenType::RBracket {
            children.push(self.parse_expr(0)?);
            if self.peek().ty == TokenType::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenType::RBracket)?;
        Ok(Node::new(open, children))
    }

    fn parse_object(&mut self, open: Token) -> Result<Node, Diagnostic> {
        let mut children = Vec::new();
        while self.peek().ty != TokenType::RBrace {
            if self.peek().ty == TokenType::Ellipsis {
                let tok = self.advance();
                let expr = self.parse_expr(0)?;
                children.push(Node::new(tok, vec![expr]));
            } else {
                let key = self.parse_object_key()?;
                let colon = self.expect(TokenType::Colon)?;
                let value = self.parse_expr(0)?;
                children.push(Node::new(colon, vec![key, value]));
            }
            if self.peek().ty == TokenType::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenType::RBrace)?;
        Ok(Node::new(open, children))
    }

    /// Object keys are either a quoted string or a bare identifier, which
    /// is retagged to `d_name` (it names a literal property, not a scope
    /// lookup — the same role `d_name` plays for `.`-access and binding
    /// targets; spec.md §4.2's unification of these cases).
    fn parse_object_key(&mut self) -> Result<Node, Diagnostic> {
        match self.peek().ty {
            TokenType::Str => Ok(Node::leaf(self.advance())),
            TokenType::Name => {
                let tok = self.advance();
                Ok(retag_name(Node::leaf(tok)))
            }
            _ => Err(self.err("expected an object key")),
        }
    }

    /// `(` is dual-purpose: a grouped expression, or an arrow function's
    /// parameter list when followed by `=>`. Parameters are always
    /// parenthesized, including the zero- and one-argument cases, so this
    /// single lookahead (peek for `=>` after the closing paren) resolves
    /// the ambiguity without backtracking.
    fn parse_group_or_arrow(&mut self, open: Token) -> Result<Node, Diagnostic> {
        let mut elements = Vec::new();
        while self.peek().ty != TokenType::RParen {
            elements.push(self.parse_expr(0)?);
            if self.peek().ty == TokenType::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenType::RParen)?;

        if self.peek().ty == TokenType::Arrow {
            let arrow = self.advance();
            let many = Node::new(open, elements);
            let pattern = retag_as_pattern(many);
            let body = self.parse_quoted_expr(0)?;
            return Ok(Node::new(arrow, vec![pattern, body]));
        }

        match elements.len() {
            1 => Ok(elements.into_iter().next().unwrap()),
            0 => Err(self.err("empty parentheses are only valid as arrow-function parameters")),
            _ => Err(self.err("a parenthesized list is only valid as arrow-function parameters")),
        }
    }

    fn parse_call(&mut self, callee: Node, open: Token) -> Result<Node, Diagnostic> {
        let mut children = vec![callee];
        while self.peek().ty != TokenType::RParen {
            if self.peek().ty == TokenType::Ellipsis {
                let tok = self.advance();
                let expr = self.parse_expr(0)?;
                children.push(Node::new(tok, vec![expr]));
            } else {
                children.push(self.parse_expr(0)?);
            }
            if self.peek().ty == TokenType::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(TokenType::RParen)?;
        let apply_tok = Token::new(
            TokenType::Apply,
            "apply",
            open.source.clone(),
            open.byte_pos,
            open.line_no,
            open.col,
        );
        Ok(Node::new(apply_tok, children))
    }

    /// A backtick-delimited template: alternating literal text chunks and
    /// `${...}` interpolated expressions, possibly nested.
    fn parse_template(&mut self, open: Token) -> Result<Node, Diagnostic> {
        let mut children = Vec::new();
        loop {
            match self.peek().ty {
                TokenType::Backtick => {
                    self.advance();
                    break;
                }
                TokenType::Template => {
                    children.push(Node::leaf(self.advance()));
                }
                TokenType::LBrace => {
                    self.advance();
                    let expr = self.parse_expr(0)?;
                    self.expect(TokenType::RBrace)?;
                    children.push(expr);
                }
                TokenType::Eof => {
                    return Err(self.err("unterminated template"));
                }
                other => {
                    return Err(Diagnostic::new(
                        format!("unexpected token in template: {:?}", other),
                        self.peek().clone(),
                    ));
                }
            }
        }
        Ok(Node::new(open, children))
    }
}

/// Turn a schema violation into a diagnostic anchored at the offending
/// node/child, per spec.md §4.2: "a schema violation is traceable to a
/// specific construct independent of which nud/led function produced it."
fn shape_violation_to_diagnostic(v: ShapeViolation) -> Diagnostic {
    let message = match (v.position, v.child_ty) {
        (Some(pos), Some(child_ty)) => format!(
            "{:?} cannot have a {:?} in child position {} ({} children total)",
            v.node_ty, child_ty, pos, v.actual_children
        ),
        (None, Some(child_ty)) => format!(
            "{:?} cannot contain a {:?} child ({} children total)",
            v.node_ty, child_ty, v.actual_children
        ),
        _ => format!(
            "{:?} has the wrong number of children ({})",
            v.node_ty, v.actual_children
        ),
    };
    Diagnostic::new(message, v.token)
}

/// Retag a single binding-target node (`Name`/`[`/`{`) in place, and
/// recurse into its children. `...rest` (`Ellipsis`) children are left
/// untouched at the top but still need their inner name retagged.
fn retag_as_pattern(node: Node) -> Node {
    use TokenType::*;
    match node.token.ty {
        Name => retag_name(node),
        LBracket => retag_container(node, DBrack),
        LBrace => retag_brace(node),
        // the synthetic parameter-list produced by `(`
        TokenType::LParen => retag_container(node, DMany),
        _ => node,
    }
}

fn retag_name(mut node: Node) -> Node {
    node.token.ty = TokenType::DName;
    node
}

/// A destructure-pair key: a bare name is retagged to `d_name` (a literal
/// label, not a scope lookup); a quoted string key is left as `Str` (decoded
/// the same way an object-literal string key is, at bind time).
fn retag_destructure_key(node: Node) -> Node {
    if node.token.ty == TokenType::Name {
        retag_name(node)
    } else {
        node
    }
}

fn retag_container(mut node: Node, new_ty: TokenType) -> Node {
    node.token.ty = new_ty;
    node.children = node
        .children
        .into_iter()
        .map(retag_list_element)
        .collect();
    node
}

fn retag_list_element(node: Node) -> Node {
    if node.token.ty == TokenType::Ellipsis {
        let mut node = node;
        node.children = node.children.into_iter().map(retag_as_pattern).collect();
        node
    } else {
        retag_as_pattern(node)
    }
}

/// `{a, b: c}` as a binding target: each entry is a `Colon` pair whose key
/// stays a literal (already `d_name`-tagged by `parse_object_key`) and
/// whose value-position node is retagged recursively.
fn retag_brace(mut node: Node) -> Node {
    node.token.ty = TokenType::DBrace;
    node.children = node
        .children
        .into_iter()
        .map(|child| {
            if child.token.ty == TokenType::Ellipsis {
                retag_list_element(child)
            } else if child.token.ty == TokenType::Colon {
                let mut child = child;
                let value = child.children.pop().unwrap();
                let key = child.children.pop().unwrap();
                child.children = vec![key, retag_as_pattern(value)];
                child
            } else {
                child
            }
        })
        .collect();
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Node, Diagnostic> {
        let source = Source::from_synthetic(src);
        let mut parser = Parser::new(&source);
        parser.parse_expr(0)
    }

    fn parse_module(src: &str) -> Result<Vec<Node>, Diagnostic> {
        let source = Source::from_synthetic(src);
        let mut parser = Parser::new(&source);
        parser.parse_module()
    }

    #[test]
    fn parses_json_object() {
        let node = parse(r#"{"a": 1, "b": [1, 2, 3]}"#).unwrap();
        assert_eq!(node.token.ty, TokenType::LBrace);
        assert_eq!(node.children.len(), 2);
    }

    #[test]
    fn dot_access_retags_name() {
        let node = parse("a.b").unwrap();
        assert_eq!(node.token.ty, TokenType::Dot);
        assert_eq!(node.children[1].token.ty, TokenType::DName);
    }

    #[test]
    fn call_builds_apply_node() {
        let node = parse("f(1, 2)").unwrap();
        assert_eq!(node.token.ty, TokenType::Apply);
        assert_eq!(node.children.len(), 3);
    }

    #[test]
    fn grouped_expression_unwraps() {
        let node = parse("(1)").unwrap();
        assert_eq!(node.token.ty, TokenType::Number);
    }

    #[test]
    fn zero_arg_arrow() {
        let node = parse("() => 1").unwrap();
        assert_eq!(node.token.ty, TokenType::Arrow);
        assert_eq!(node.children[0].token.ty, TokenType::DMany);
        assert!(node.children[1].is_quoted);
    }

    #[test]
    fn single_param_arrow_retags_name() {
        let node = parse("(x) => x").unwrap();
        assert_eq!(node.children[0].children.len(), 1);
        assert_eq!(node.children[0].children[0].token.ty, TokenType::DName);
    }

    #[test]
    fn destructuring_param_arrow() {
        let node = parse("([a, b]) => a").unwrap();
        let params = &node.children[0];
        assert_eq!(params.token.ty, TokenType::DMany);
        assert_eq!(params.children[0].token.ty, TokenType::DBrack);
    }

    #[test]
    fn multi_element_group_without_arrow_errors() {
        assert!(parse("(1, 2)").is_err());
    }

    #[test]
    fn ternary_quotes_both_arms() {
        let node = parse("a ? 1 : 2").unwrap();
        assert_eq!(node.token.ty, TokenType::Question);
        assert!(node.children[1].is_quoted);
        assert!(node.children[2].is_quoted);
    }

    #[test]
    fn template_with_interpolation_parses() {
        let node = parse("`hi ${name}`").unwrap();
        assert_eq!(node.token.ty, TokenType::Backtick);
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[1].token.ty, TokenType::Name);
    }

    #[test]
    fn const_statement() {
        let stmts = parse_module("const x = 1").unwrap();
        assert_eq!(stmts[0].token.ty, TokenType::Const);
        assert_eq!(stmts[0].children[0].token.ty, TokenType::Eq);
    }

    #[test]
    fn import_statement() {
        let stmts = parse_module(r#"import {a, b} from "mod.dn.js""#).unwrap();
        assert_eq!(stmts[0].token.ty, TokenType::Import);
        let from_node = &stmts[0].children[0];
        assert_eq!(from_node.token.ty, TokenType::From);
        assert_eq!(from_node.children[0].token.ty, TokenType::DBrace);
    }

    #[test]
    fn export_default() {
        let stmts = parse_module("export default 1").unwrap();
        assert_eq!(stmts[0].token.ty, TokenType::Export);
        assert_eq!(stmts[0].children[0].token.ty, TokenType::Default);
    }

    #[test]
    fn two_statements_must_be_on_separate_lines() {
        assert!(parse_module("const x = 1 const y = 2").is_err());
    }

    #[test]
    fn spread_in_array() {
        let node = parse("[...rest, 1]").unwrap();
        assert_eq!(node.children[0].token.ty, TokenType::Ellipsis);
    }

    #[test]
    fn const_object_destructure_shorthand() {
        let stmts = parse_module("const {a, b: renamed} = x").unwrap();
        let pattern = &stmts[0].children[0].children[0];
        assert_eq!(pattern.token.ty, TokenType::DBrace);
        assert_eq!(pattern.children.len(), 2);
        let first = &pattern.children[0];
        assert_eq!(first.token.ty, TokenType::Colon);
        assert_eq!(first.children[0].token.ty, TokenType::DName);
        assert_eq!(first.children[1].token.ty, TokenType::DName);
        assert_eq!(&*first.children[1].token.value, "a");
    }

    #[test]
    fn const_object_destructure_with_rest() {
        let stmts = parse_module("const {a, ...rest} = x").unwrap();
        let pattern = &stmts[0].children[0].children[0];
        assert_eq!(pattern.children[1].token.ty, TokenType::Ellipsis);
        assert_eq!(pattern.children[1].children[0].token.ty, TokenType::DName);
    }

    #[test]
    fn object_literal_still_requires_a_colon() {
        assert!(parse(r#"{foo, "are"}"#).is_err());
    }
}
