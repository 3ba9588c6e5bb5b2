// src/context.rs
//! Source attribution threaded through every check.
//!
//! A `Context` names the file and byte range a value came from. The checker
//! never inspects it; it only copies it onto the errors it produces so the
//! caller can render them against the right source.

use std::fmt;
use std::sync::Arc;

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize, // Byte offset
    pub end: usize,   // Byte offset (exclusive)
    pub line: u32,    // Start line (1-indexed, 0 when unknown)
    pub column: u32,  // Start column (1-indexed, 0 when unknown)
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Span covering a byte range on an unknown line
    pub fn bytes(start: usize, end: usize) -> Self {
        Self::new(start, end, 0, 0)
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        // miette uses (offset, length)
        (span.start, span.len()).into()
    }
}

impl From<&Span> for miette::SourceSpan {
    fn from(span: &Span) -> Self {
        (*span).into()
    }
}

/// Where a value was written. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Context {
    path: Option<Arc<str>>,
    span: Span,
}

impl Context {
    pub fn new(path: impl Into<Arc<str>>, span: Span) -> Self {
        Self {
            path: Some(path.into()),
            span,
        }
    }

    /// Context for values synthesized by the checker itself (built-in
    /// catalogs, inferred return types).
    pub fn dummy() -> Self {
        Self::default()
    }

    pub fn is_dummy(&self) -> bool {
        self.path.is_none() && self.span == Span::default()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Same file, different range.
    pub fn with_span(&self, span: Span) -> Self {
        Self {
            path: self.path.clone(),
            span,
        }
    }

    /// Smallest context covering both; the path of `self` wins.
    pub fn merge(&self, other: &Context) -> Self {
        if self.is_dummy() {
            return other.clone();
        }
        if other.is_dummy() {
            return self.clone();
        }
        Self {
            path: self.path.clone(),
            span: self.span.merge(other.span),
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.as_deref().unwrap_or("<builtin>");
        if self.span.line > 0 {
            write!(f, "{}:{}:{}", path, self.span.line, self.span.column)
        } else {
            write!(f, "{}", path)
        }
    }
}
