//! Leveled debug logging, ported from the teacher crate's `Log<T>`.
//!
//! Printing only happens in debug builds (`cfg(debug_assertions)`); release
//! builds pay no cost beyond the `order()` comparison.

use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}

impl<T> Log<T> {
    pub fn order(&self) -> u8 {
        match self {
            Log::None => 0,
            Log::Default(_) => 1,
            Log::Success(_) => 2,
            Log::Result(_) => 3,
            Log::Verbose(_) => 4,
        }
    }
}

impl<T: Display> Display for Log<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default(s) | Log::Success(s) | Log::Result(s) | Log::Verbose(s) => {
                write!(f, "{}", s)
            }
        }
    }
}

impl<TL: Display> Log<TL> {
    /// Report a successfully parsed node, at `Success` verbosity or above.
    pub fn log_parse_success<T: Debug>(&self, description: &str, node: &T) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Success(()).order() {
            println!("[{}; ParseSuccess]: {}: {:?}", self, description, node);
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = (description, node);
        }
    }

    /// Report a scope lookup or a builtin dispatch, at `Verbose`.
    pub fn log_eval(&self, description: &str) {
        #[cfg(debug_assertions)]
        if self.order() >= Log::Verbose(()).order() {
            println!("[{}; Eval]: {}", self, description);
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = description;
        }
    }
}
