//! Runtime values.
//!
//! Heavier variants are `Rc`-wrapped so that [`Scope`] clones (spec.md §5:
//! every function call clones its captured scope) stay shallow.

use crate::ast::Node;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type Scope = HashMap<String, Value>;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    List(Rc<Vec<Value>>),
    Map(Rc<indexmap::IndexMap<String, Value>>),
    Closure(Rc<ClosureData>),
    Builtin(Builtin),
    /// A built-in list method bound to its receiver, produced by `.`-access
    /// (e.g. `list.map` before it is called with `(fn)`).
    Bound(Rc<Builtin>, Rc<Value>),
    /// A vnode built by `m(...)`, or the `TrustedHtml` wrapper produced by
    /// `m.trust`. Both are opaque to this evaluator: it can construct and
    /// pass them around but has no serializer (HTML/CSS rendering is an
    /// external collaborator, spec.md §6 "External Interfaces").
    Node(Rc<VNode>),
    TrustedHtml(Rc<str>),
    /// Yielded by an object/member lookup on a key that isn't present.
    /// Distinct from the interpreter-internal `missing` sentinel (module
    /// has no default export / bare value), which never reaches user code
    /// (spec.md §9, "Undefined vs missing").
    Undefined,
}

#[derive(Debug, Clone)]
pub struct VNode {
    pub tag: String,
    pub attrs: indexmap::IndexMap<String, Value>,
    pub children: Vec<Value>,
}

#[derive(Debug)]
pub struct ClosureData {
    pub captured: Scope,
    /// A (possibly destructuring) parameter pattern: `d_many` wrapping zero
    /// or more `d_name`/`d_brack`/`d_brace` children.
    pub params: Node,
    /// The quoted body; evaluated fresh on every call against the
    /// parameter-bound scope.
    pub body: Node,
}

/// Identifies a built-in function or method by name, so `Value::Builtin`
/// stays a plain enum rather than a boxed closure (keeps `Value: Clone`
/// trivial and comparable-enough for diagnostics/debug printing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    ObjectEntries,
    ObjectFromEntries,
    Dedent,
    ListLength,
    ListMap,
    ListFilter,
    ListReduce,
    ListIncludes,
    M,
    MTrust,
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Closure(_) => write!(f, "<closure>"),
            Value::Builtin(b) => write!(f, "<builtin {:?}>", b),
            Value::Bound(b, _) => write!(f, "<bound {:?}>", b),
            Value::Node(n) => write!(f, "<node {}>", n.tag),
            Value::TrustedHtml(s) => write!(f, "{}", s),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "object",
            Value::Closure(_) => "function",
            Value::Builtin(_) => "function",
            Value::Bound(_, _) => "function",
            Value::Node(_) => "node",
            Value::TrustedHtml(_) => "trusted_html",
            Value::Undefined => "undefined",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            _ => true,
        }
    }

    /// Structural equality with float tolerance, per spec.md §4.6: numbers
    /// compare equal if `math.isclose`-equivalent (relative tolerance
    /// 1e-9, absolute tolerance 0), everything else by deep structural
    /// equality.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => is_close(*a, *b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).map_or(false, |v2| v.equals(v2)))
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// `math.isclose(a, b, rel_tol=1e-9, abs_tol=0.0)`.
fn is_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let diff = (a - b).abs();
    diff <= 1e-9 * a.abs().max(b.abs())
}
