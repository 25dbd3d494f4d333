//! Source identity and byte-position -> line/column resolution.
//!
//! Mirrors the teacher crate's `Code`/`Position` split: a source buffer is
//! scanned once for line-break offsets (memoized in a `OnceCell`), and every
//! subsequent position lookup is a binary search over that table.

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Process-wide table from synthetic source handle to its text.
///
/// Entries live for the process lifetime; there is no eviction. This is the
/// "acceptable leak" described in spec.md §5 — diagnostics for in-memory
/// sources need to be able to quote the offending line long after the
/// `TokenStream`/`Parser` that created the handle have gone away.
static SYNTHETIC_SOURCES: Lazy<Mutex<HashMap<u64, Rc<str>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_SYNTHETIC_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies where a [`Token`](crate::token::Token) came from: a real file
/// on disk, or an in-memory buffer registered under a synthetic handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    Path(Rc<PathBuf>),
    Synthetic(u64),
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceId::Path(p) => write!(f, "{}", p.display()),
            SourceId::Synthetic(_) => write!(f, "line"),
        }
    }
}

/// Register in-memory source text under a fresh synthetic handle.
pub fn register_synthetic(text: &str) -> SourceId {
    let id = NEXT_SYNTHETIC_ID.fetch_add(1, Ordering::SeqCst);
    SYNTHETIC_SOURCES
        .lock()
        .unwrap()
        .insert(id, Rc::from(text));
    SourceId::Synthetic(id)
}

fn synthetic_text(id: u64) -> Rc<str> {
    SYNTHETIC_SOURCES
        .lock()
        .unwrap()
        .get(&id)
        .cloned()
        .unwrap_or_else(|| Rc::from(""))
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A source buffer with a memoized line-break index.
///
/// Owns its text (unlike the teacher's borrowed `Code<'c>`) because module
/// sources are read from disk and outlive the borrow that produced them.
pub struct Source {
    pub id: SourceId,
    pub text: Rc<str>,
    line_breaks: OnceCell<Vec<usize>>,
}

impl Source {
    pub fn from_path(path: PathBuf, text: String) -> Self {
        Self {
            id: SourceId::Path(Rc::new(path)),
            text: Rc::from(text.as_str()),
            line_breaks: OnceCell::new(),
        }
    }

    pub fn from_synthetic(text: &str) -> Self {
        let id = register_synthetic(text);
        Self {
            id,
            text: Rc::from(text),
            line_breaks: OnceCell::new(),
        }
    }

    fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| if b == b'\n' { Some(i) } else { None })
                .collect()
        })
    }

    /// Resolve a byte offset into a 1-indexed line and 0-indexed column.
    pub fn obtain_position(&self, byte_pos: usize) -> Position {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&byte_pos) {
            Ok(i) | Err(i) => i,
        };
        if index == 0 {
            Position::new(1, byte_pos)
        } else {
            let line_start = line_breaks[index - 1] + 1;
            Position::new(index + 1, byte_pos - line_start)
        }
    }

    /// The text of a 1-indexed line, with trailing whitespace trimmed.
    pub fn line_text(&self, line_no: usize) -> &str {
        self.text
            .lines()
            .nth(line_no - 1)
            .unwrap_or("")
            .trim_end()
    }
}

/// Look up the text of a single line for a [`SourceId`], for diagnostics
/// rendering. File sources are re-read; this is a batch tool, not a server,
/// so no caching is attempted here (the embedder may cache, per spec.md §5).
pub fn line_text_for(source: &SourceId, line_no: usize) -> String {
    match source {
        SourceId::Path(path) => std::fs::read_to_string(path.as_path())
            .ok()
            .and_then(|text| text.lines().nth(line_no - 1).map(|l| l.trim_end().to_string()))
            .unwrap_or_default(),
        SourceId::Synthetic(id) => synthetic_text(*id)
            .lines()
            .nth(line_no - 1)
            .unwrap_or("")
            .trim_end()
            .to_string(),
    }
}
