//! Structured diagnostics: one error variant, carrying a message and the
//! offending token, rendered with the source line and a caret.
//!
//! Every scan/parse/import/runtime failure (spec.md §7) funnels through this
//! type. There is deliberately no machine-readable error code — callers
//! distinguish failures (if they need to) by matching on `message`. That is
//! an intentional API surface, not an oversight: this language's diagnostics
//! are for humans reading a terminal, not for programmatic recovery.

use crate::source::line_text_for;
use crate::token::Token;
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub token: Token,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, token: Token) -> Self {
        Self {
            message: message.into(),
            token,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let line = line_text_for(&self.token.source, self.token.line_no);
        writeln!(f, "<ParserError {}:{}>", self.token.source, self.token.line_no)?;
        writeln!(f, "{}", self.message)?;
        writeln!(f, "{}", line)?;
        write!(f, "{}^", " ".repeat(self.token.col))
    }
}

impl std::error::Error for Diagnostic {}
