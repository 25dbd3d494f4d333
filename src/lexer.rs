//! `TokenStream`: a streaming tokenizer producing one [`Token`] at a time.
//!
//! Ported from the punctuation-trie / template-depth scanning algorithm in
//! the original implementation's tokeniser module (spec.md §3, §6).

use crate::source::{Source, SourceId};
use crate::token::{Token, TokenType};
use std::rc::Rc;

/// Punctuation lexemes, longest-match first. Includes two "interim" forms
/// (`..`, `==`) that are valid prefixes of a longer token (`...`, `===`) but
/// are never themselves emitted — reaching one of these with no continuation
/// is always an `Unexpected` token.
const PUNCTUATION: &[(&str, TokenType)] = &[
    ("...", TokenType::Ellipsis),
    ("===", TokenType::EqEqEq),
    ("=>", TokenType::Arrow),
    ("..", TokenType::Unexpected),
    ("==", TokenType::Unexpected),
    ("=", TokenType::Eq),
    ("(", TokenType::LParen),
    (")", TokenType::RParen),
    ("{", TokenType::LBrace),
    ("}", TokenType::RBrace),
    ("[", TokenType::LBracket),
    ("]", TokenType::RBracket),
    (",", TokenType::Comma),
    (":", TokenType::Colon),
    (".", TokenType::Dot),
    ("?", TokenType::Question),
];

const KEYWORDS: &[(&str, TokenType)] = &[
    ("import", TokenType::Import),
    ("from", TokenType::From),
    ("export", TokenType::Export),
    ("default", TokenType::Default),
    ("const", TokenType::Const),
];

const LITERAL_KEYWORDS: &[&str] = &["true", "false", "null"];

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Tracks whether we are inside a backtick template, and at what `{`
/// nesting depth within it (a template string like `` `a${ `b${c}` }` `` can
/// nest arbitrarily; depth returns to template-scanning mode only when the
/// matching `}` closes the innermost interpolation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Inside a template's literal text, about to scan up to the next
    /// `${`/backtick boundary.
    TemplateText,
}

pub struct TokenStream<'s> {
    source: &'s Source,
    bytes: &'s [u8],
    pos: usize,
    line_no: usize,
    line_start: usize,
    mode_stack: Vec<Mode>,
    /// Interpolation-brace depth per open template, so a `}` inside a
    /// template's `${...}` expression is told apart from one that should
    /// close the interpolation back into template text.
    brace_depth: Vec<u32>,
    eof_emitted: bool,
}

impl<'s> TokenStream<'s> {
    pub fn new(source: &'s Source) -> Self {
        Self {
            source,
            bytes: source.text.as_bytes(),
            pos: 0,
            line_no: 1,
            line_start: 0,
            mode_stack: Vec::new(),
            brace_depth: Vec::new(),
            eof_emitted: false,
        }
    }

    fn source_id(&self) -> SourceId {
        self.source.id.clone()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line_no += 1;
            self.line_start = self.pos;
        }
        Some(b)
    }

    fn col(&self, byte_pos: usize) -> usize {
        byte_pos - self.line_start
    }

    fn make(&self, ty: TokenType, value: impl Into<Rc<str>>, start: usize, start_line: usize, start_col: usize) -> Token {
        Token::new(ty, value, self.source_id(), start, start_line, start_col)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Token {
        if let Some(Mode::TemplateText) = self.mode_stack.last() {
            return self.scan_template_text();
        }

        self.skip_trivia();

        let start = self.pos;
        let start_line = self.line_no;
        let start_col = self.col(start);

        let b = match self.peek() {
            None => return self.make(TokenType::Eof, "", start, start_line, start_col),
            Some(b) => b,
        };

        if b == b'"' || b == b'\'' {
            return self.scan_string(b, start, start_line, start_col);
        }
        if b == b'`' {
            self.advance();
            self.mode_stack.push(Mode::TemplateText);
            return self.make(TokenType::Backtick, "`", start, start_line, start_col);
        }
        if b.is_ascii_digit() {
            return self.scan_number(start, start_line, start_col);
        }
        // A leading `-` belongs to the number lexeme itself (spec.md §4.1;
        // the original's `_number_begin` includes `-`), not a unary operator
        // — this language has none. `-` not followed by a digit falls
        // through to ordinary punctuation scanning below.
        if b == b'-' && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
            return self.scan_number(start, start_line, start_col);
        }
        if is_ident_start(b as char) || b >= 0x80 {
            return self.scan_identifier(start, start_line, start_col);
        }

        // `}` needs special handling: it either closes an interpolation
        // brace (returning to TemplateText mode) or is ordinary punctuation.
        if b == b'}' {
            if let Some(depth) = self.brace_depth.last_mut() {
                if *depth == 0 {
                    self.advance();
                    self.brace_depth.pop();
                    self.mode_stack.push(Mode::TemplateText);
                    return self.make(TokenType::RBrace, "}", start, start_line, start_col);
                } else {
                    *depth -= 1;
                }
            }
            self.advance();
            return self.make(TokenType::RBrace, "}", start, start_line, start_col);
        }
        if b == b'{' {
            if let Some(depth) = self.brace_depth.last_mut() {
                *depth += 1;
            }
            self.advance();
            return self.make(TokenType::LBrace, "{", start, start_line, start_col);
        }

        self.scan_punctuation(start, start_line, start_col)
    }

    fn scan_punctuation(&mut self, start: usize, start_line: usize, start_col: usize) -> Token {
        let rest = &self.source.text[start..];
        for (lexeme, ty) in PUNCTUATION {
            if rest.starts_with(lexeme) {
                for _ in 0..lexeme.len() {
                    self.advance();
                }
                return self.make(*ty, *lexeme, start, start_line, start_col);
            }
        }
        // No registered lexeme matched: consume one byte as Unexpected.
        self.advance();
        let value = &self.source.text[start..self.pos];
        self.make(TokenType::Unexpected, value, start, start_line, start_col)
    }

    /// A `"..."` string never spans a raw newline and must be closed by a
    /// matching quote before end-of-input; either failure yields
    /// `Unexpected` rather than a truncated `Str` (spec.md §4.1).
    fn scan_string(&mut self, quote: u8, start: usize, start_line: usize, start_col: usize) -> Token {
        self.advance(); // opening quote
        let mut terminated = false;
        loop {
            match self.peek() {
                None => break,
                Some(b'\n') => break,
                Some(b'\\') => {
                    self.advance();
                    self.advance();
                }
                Some(b) if b == quote => {
                    self.advance();
                    terminated = true;
                    break;
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
        let value = &self.source.text[start..self.pos];
        let ty = if terminated { TokenType::Str } else { TokenType::Unexpected };
        self.make(ty, value, start, start_line, start_col)
    }

    /// Scan literal template text up to the next `` ` `` (closing the
    /// template) or `${` (opening an interpolation). The text chunk itself
    /// is emitted as a `Template` token; the boundary character(s) are
    /// emitted on the following call.
    fn scan_template_text(&mut self) -> Token {
        let start = self.pos;
        let start_line = self.line_no;
        let start_col = self.col(start);

        loop {
            match self.peek() {
                None => break,
                Some(b'`') => break,
                Some(b'\\') => {
                    self.advance();
                    self.advance();
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }

        if self.pos == start {
            // At a boundary: emit it and leave TemplateText mode accordingly.
            self.mode_stack.pop();
            match self.peek() {
                Some(b'`') => {
                    self.advance();
                    self.make(TokenType::Backtick, "`", start, start_line, start_col)
                }
                Some(b'$') => {
                    self.advance();
                    self.advance();
                    self.brace_depth.push(0);
                    self.make(TokenType::LBrace, "${", start, start_line, start_col)
                }
                _ => self.make(TokenType::Eof, "", start, start_line, start_col),
            }
        } else {
            let value = &self.source.text[start..self.pos];
            self.make(TokenType::Template, value, start, start_line, start_col)
        }
    }

    fn scan_number(&mut self, start: usize, start_line: usize, start_col: usize) -> Token {
        if self.peek() == Some(b'-') {
            self.advance();
        }
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.advance();
            } else if b == b'.' && !seen_dot && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit()) {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }
        let value = &self.source.text[start..self.pos];
        self.make(TokenType::Number, value, start, start_line, start_col)
    }

    fn scan_identifier(&mut self, start: usize, start_line: usize, start_col: usize) -> Token {
        while let Some(b) = self.peek() {
            let c = b as char;
            if b < 0x80 {
                if is_ident_continue(c) {
                    self.advance();
                } else {
                    break;
                }
            } else {
                self.advance();
            }
        }
        let value = &self.source.text[start..self.pos];

        if LITERAL_KEYWORDS.contains(&value) {
            return self.make(TokenType::Literal, value, start, start_line, start_col);
        }
        for (kw, ty) in KEYWORDS {
            if value == *kw {
                return self.make(*ty, *kw, start, start_line, start_col);
            }
        }
        self.make(TokenType::Name, value, start, start_line, start_col)
    }
}

impl<'s> Iterator for TokenStream<'s> {
    type Item = Token;

    /// Yields tokens up to and including one `Eof`, then stops.
    fn next(&mut self) -> Option<Token> {
        if self.eof_emitted {
            return None;
        }
        let tok = self.next_token();
        if tok.ty == TokenType::Eof {
            self.eof_emitted = true;
        }
        Some(tok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn tokenize(src: &str) -> Vec<Token> {
        let source = Source::from_synthetic(src);
        TokenStream::new(&source).collect()
    }

    fn types(src: &str) -> Vec<TokenType> {
        tokenize(src).into_iter().map(|t| t.ty).collect()
    }

    #[test]
    fn tokenizes_simple_object() {
        let toks = types(r#"{"a": 1, "b": true}"#);
        assert_eq!(
            toks,
            vec![
                TokenType::LBrace,
                TokenType::Str,
                TokenType::Colon,
                TokenType::Number,
                TokenType::Comma,
                TokenType::Str,
                TokenType::Colon,
                TokenType::Literal,
                TokenType::RBrace,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn spread_token_is_ellipsis() {
        let toks = types("[...rest]");
        assert_eq!(
            toks,
            vec![
                TokenType::LBracket,
                TokenType::Ellipsis,
                TokenType::Name,
                TokenType::RBracket,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lone_double_dot_is_unexpected() {
        let toks = types("..x");
        assert_eq!(toks[0], TokenType::Unexpected);
    }

    #[test]
    fn lone_double_eq_is_unexpected() {
        let toks = types("a == b");
        assert_eq!(toks[1], TokenType::Unexpected);
    }

    #[test]
    fn triple_eq_is_single_token() {
        let toks = tokenize("a === b");
        assert_eq!(toks[1].ty, TokenType::EqEqEq);
        assert_eq!(&*toks[1].value, "===");
    }

    #[test]
    fn keywords_recognized() {
        let toks = types("import x from y");
        assert_eq!(
            toks,
            vec![
                TokenType::Import,
                TokenType::Name,
                TokenType::From,
                TokenType::Name,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_still_a_name() {
        let toks = tokenize("importer");
        assert_eq!(toks[0].ty, TokenType::Name);
        assert_eq!(&*toks[0].value, "importer");
    }

    #[test]
    fn template_without_interpolation() {
        let toks = types("`hello world`");
        assert_eq!(
            toks,
            vec![
                TokenType::Backtick,
                TokenType::Template,
                TokenType::Backtick,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn template_with_interpolation() {
        let toks = types("`a${ b }c`");
        assert_eq!(
            toks,
            vec![
                TokenType::Backtick,
                TokenType::Template,
                TokenType::LBrace,
                TokenType::Name,
                TokenType::RBrace,
                TokenType::Template,
                TokenType::Backtick,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn nested_template_interpolation() {
        let toks = types("`a${ `b${c}` }d`");
        assert_eq!(
            toks,
            vec![
                TokenType::Backtick, // outer open
                TokenType::Template, // "a"
                TokenType::LBrace,   // ${
                TokenType::Backtick, // inner open
                TokenType::Template, // "b"
                TokenType::LBrace,   // ${
                TokenType::Name,     // c
                TokenType::RBrace,   // }
                TokenType::Backtick, // inner close
                TokenType::RBrace,   // } closing outer interpolation
                TokenType::Template, // "d"
                TokenType::Backtick, // outer close
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_unexpected() {
        let toks = tokenize(r#""abc"#);
        assert_eq!(toks[0].ty, TokenType::Unexpected);
    }

    #[test]
    fn newline_interrupted_string_is_unexpected() {
        let toks = tokenize("\"abc\ndef\"");
        assert_eq!(toks[0].ty, TokenType::Unexpected);
    }

    #[test]
    fn comments_skipped() {
        let toks = types("1 // a comment\n2");
        assert_eq!(toks, vec![TokenType::Number, TokenType::Number, TokenType::Eof]);
    }

    #[test]
    fn number_single_decimal_point() {
        let toks = tokenize("1.5");
        assert_eq!(toks.len(), 2); // Number, Eof
        assert_eq!(&*toks[0].value, "1.5");
    }

    #[test]
    fn negative_number_is_a_single_number_token() {
        let toks = tokenize("-5");
        assert_eq!(toks[0].ty, TokenType::Number);
        assert_eq!(&*toks[0].value, "-5");
    }

    #[test]
    fn negative_number_inside_a_list() {
        let toks = types("[1, -2, 3]");
        assert_eq!(
            toks,
            vec![
                TokenType::LBracket,
                TokenType::Number,
                TokenType::Comma,
                TokenType::Number,
                TokenType::Comma,
                TokenType::Number,
                TokenType::RBracket,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn lone_minus_not_followed_by_a_digit_is_unexpected() {
        let toks = types("a - b");
        assert_eq!(toks[1], TokenType::Unexpected);
    }

    #[test]
    fn line_tracking_across_newlines() {
        let toks = tokenize("a\nb\nc");
        assert_eq!(toks[0].line_no, 1);
        assert_eq!(toks[1].line_no, 2);
        assert_eq!(toks[2].line_no, 3);
    }
}
