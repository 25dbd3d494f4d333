//! A JSON-superset expression language: tokenizer, Pratt parser and
//! tree-walking evaluator.
//!
//! # Overview
//!
//! Source text is scanned into a flat token stream ([`lexer::TokenStream`]),
//! parsed into a uniform [`ast::Node`] tree by a Pratt parser
//! ([`parser::Parser`]), and evaluated by a tree-walking interpreter
//! (`interpreter::eval`) into runtime [`value::Value`]s. The language itself
//! is JSON plus: `const`/`import`/`export` module statements, arrow-function
//! closures, a ternary operator, backtick template strings, spread/rest
//! destructuring, and a small builtin surface (`Object.entries`,
//! `Object.fromEntries`, `dedent`, `m()`/`m.trust`).
//!
//! # Example
//!
//! ```
//! use jsuper::interpret_source;
//!
//! let module = interpret_source("<example>", r#"
//!     const greeting = (name) => `hello ${name}`
//!     export default greeting("world")
//! "#).unwrap();
//!
//! assert_eq!(module.default_export.unwrap().to_string(), "hello world");
//! ```
//!
//! Parse failures and runtime errors both surface as a [`error::Diagnostic`],
//! which renders with a caret under the offending token:
//!
//! ```
//! use jsuper::interpret_source;
//!
//! let err = interpret_source("<example>", "bar").unwrap_err();
//! assert!(err.to_string().contains("is not in scope"));
//! ```

pub mod ast;
pub mod builtins;
pub mod error;
mod interpreter;
pub mod lexer;
pub mod logger;
pub mod module;
pub mod parser;
pub mod schema;
pub mod source;
pub mod token;
pub mod value;

pub use error::Diagnostic;
pub use logger::Log;
pub use module::Module;
pub use value::Value;

/// Set the process-wide interpreter log level (debug builds only print; see
/// [`logger::Log`]).
pub fn set_log_level(level: Log<&'static str>) {
    interpreter::set_log_level(level);
}

/// Parse and evaluate the module at `path`, resolving any `import`
/// statements relative to its containing directory.
pub fn interpret(path: impl AsRef<std::path::Path>) -> Result<Module, Diagnostic> {
    interpreter::interpret(path)
}

/// Parse and evaluate `text` as an in-memory module. `name` is used only
/// for diagnostics that would otherwise need a file path; such a module
/// cannot contain `import` statements, since there is no directory to
/// resolve them against.
pub fn interpret_source(name: &str, text: &str) -> Result<Module, Diagnostic> {
    interpreter::interpret_source(name, text)
}

/// Evaluate the module at `path` and return its `export default` value.
pub fn get_default_export(path: impl AsRef<std::path::Path>) -> Result<Value, Diagnostic> {
    interpreter::get_default_export(path)
}

/// Evaluate the module at `path` and return the value bound to one of its
/// named exports.
pub fn get_named_export(path: impl AsRef<std::path::Path>, name: &str) -> Result<Value, Diagnostic> {
    interpreter::get_named_export(path, name)
}
