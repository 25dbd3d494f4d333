//! Built-in functions: `Object.entries`/`Object.fromEntries`, `dedent`, and
//! the `m()`/`m.trust` vnode constructors.
//!
//! Grounded directly on the original implementation's builtins module: the
//! selector regex, the attrs/class folding rules and the children-flattening
//! rules below are ports of that logic, not independent designs.

use crate::error::Diagnostic;
use crate::token::Token;
use crate::value::{Builtin, VNode, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::rc::Rc;

/// Matches a leading `tag`, then any number of `.class` or `#id` suffixes,
/// e.g. `div.card.highlighted#main`.
static SELECTOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^|\.|#)([\w\d\-_]+)").unwrap());

pub fn object_entries(token: &Token, obj: &Value) -> Result<Value, Diagnostic> {
    match obj {
        Value::Map(m) => {
            let pairs = m
                .iter()
                .map(|(k, v)| Value::List(Rc::new(vec![Value::Str(Rc::from(k.as_str())), v.clone()])))
                .collect();
            Ok(Value::List(Rc::new(pairs)))
        }
        other => Err(Diagnostic::new(
            format!("Object.entries expects an object, got {}", other.type_name()),
            token.clone(),
        )),
    }
}

pub fn object_from_entries(token: &Token, pairs: &Value) -> Result<Value, Diagnostic> {
    match pairs {
        Value::List(items) => {
            let mut map = indexmap::IndexMap::new();
            for item in items.iter() {
                match item {
                    Value::List(pair) if pair.len() == 2 => {
                        let key = match &pair[0] {
                            Value::Str(s) => s.to_string(),
                            other => {
                                return Err(Diagnostic::new(
                                    format!("Object.fromEntries key must be a string, got {}", other.type_name()),
                                    token.clone(),
                                ))
                            }
                        };
                        map.insert(key, pair[1].clone());
                    }
                    _ => {
                        return Err(Diagnostic::new(
                            "Object.fromEntries expects a list of [key, value] pairs".to_string(),
                            token.clone(),
                        ))
                    }
                }
            }
            Ok(Value::Map(Rc::new(map)))
        }
        other => Err(Diagnostic::new(
            format!("Object.fromEntries expects a list, got {}", other.type_name()),
            token.clone(),
        )),
    }
}

/// Remove the common leading whitespace shared by every non-blank line, then
/// trim leading/trailing whitespace (which drops any blank lines left at
/// either end). Ported from the original implementation's
/// `textwrap.dedent(value).strip()`.
pub fn dedent(token: &Token, s: &Value) -> Result<Value, Diagnostic> {
    let text = match s {
        Value::Str(s) => s.as_ref(),
        other => {
            return Err(Diagnostic::new(
                format!("dedent expects a string, got {}", other.type_name()),
                token.clone(),
            ))
        }
    };

    let common_indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let result: Vec<&str> = text
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                &line[common_indent.min(line.len())..]
            }
        })
        .collect();
    Ok(Value::Str(Rc::from(result.join("\n").trim())))
}

/// `m(selector, attrsOrChild?, ...children)`: builds a vnode from a CSS-like
/// selector string (`tag.class1.class2#id`), an optional attrs object, and
/// any number of children. Children lists are flattened one level; `null`
/// children are dropped; every other child is kept (strings, numbers,
/// nested nodes, trusted html).
pub fn m(token: &Token, args: &[Value]) -> Result<Value, Diagnostic> {
    let selector = match args.first() {
        Some(Value::Str(s)) => s.as_ref(),
        _ => {
            return Err(Diagnostic::new(
                "m() expects a selector string as its first argument".to_string(),
                token.clone(),
            ))
        }
    };

    // The original always carries a `className` attr, built up with a
    // leading-space-per-class join and stripped once at the end
    // (builtins.py:70-94), rather than only appearing when classes exist.
    let mut tag = String::from("div");
    let mut class_name = String::new();
    let mut attrs: indexmap::IndexMap<String, Value> = indexmap::IndexMap::new();

    for cap in SELECTOR_RE.captures_iter(selector) {
        let marker = &cap[1];
        let name = &cap[2];
        match marker {
            "" => tag = name.to_string(),
            "#" => {
                attrs.insert("id".to_string(), Value::Str(Rc::from(name.as_str())));
            }
            "." => {
                class_name.push(' ');
                class_name.push_str(name);
            }
            _ => {}
        }
    }

    let mut rest = &args[1..];
    let mut user_attrs: Option<indexmap::IndexMap<String, Value>> = None;

    if let Some(Value::Map(attr_map)) = rest.first() {
        let mut owned = (**attr_map).clone();
        if let Some(Value::List(classes)) = owned.shift_remove("class") {
            for c in classes.iter() {
                if let Value::Str(s) = c {
                    class_name.push(' ');
                    class_name.push_str(s.trim());
                }
            }
        }
        user_attrs = Some(owned);
        rest = &rest[1..];
    }

    attrs.insert("className".to_string(), Value::Str(Rc::from(class_name.trim())));

    // User attrs are merged in last, so an explicit `className` (as opposed
    // to the folded `class` list) still wins, matching builtins.py's
    // `for k, v in attrs.items(): out["attrs"][k] = v`.
    if let Some(user_attrs) = user_attrs {
        for (k, v) in user_attrs.into_iter() {
            attrs.insert(k, v);
        }
    }

    let mut children = Vec::new();
    add_children(rest, &mut children);

    Ok(Value::Node(Rc::new(VNode {
        tag,
        attrs,
        children,
    })))
}

fn add_children(values: &[Value], out: &mut Vec<Value>) {
    for v in values {
        match v {
            Value::Null => {}
            Value::List(items) => add_children(items, out),
            other => out.push(other.clone()),
        }
    }
}

pub fn m_trust(token: &Token, s: &Value) -> Result<Value, Diagnostic> {
    match s {
        Value::Str(s) => Ok(Value::TrustedHtml(s.clone())),
        other => Err(Diagnostic::new(
            format!("m.trust expects a string, got {}", other.type_name()),
            token.clone(),
        )),
    }
}

/// Resolve a method name accessed off a list value (`.map`, `.filter`, ...).
pub fn lookup_list_method(name: &str) -> Option<Builtin> {
    match name {
        "length" => Some(Builtin::ListLength),
        "map" => Some(Builtin::ListMap),
        "filter" => Some(Builtin::ListFilter),
        "reduce" => Some(Builtin::ListReduce),
        "includes" => Some(Builtin::ListIncludes),
        _ => None,
    }
}
