//! Module evaluation results: the scope built while running a file's
//! top-level statements, plus its named/default exports.

use crate::value::{Scope, Value};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Module {
    /// `None` for modules built from in-memory source via
    /// `interpret_source`.
    pub path: Option<PathBuf>,
    pub scope: Scope,
    pub exports: Scope,
    pub default_export: Option<Value>,
    /// The value of the last bare (non-binding) top-level expression
    /// statement, if any (spec.md §4.3, "last bare expression wins").
    pub value: Option<Value>,
}

impl Module {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            scope: Scope::new(),
            exports: Scope::new(),
            default_export: None,
            value: None,
        }
    }

    pub fn get_named_export(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }
}
