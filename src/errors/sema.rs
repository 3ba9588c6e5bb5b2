// src/errors/sema.rs
//! Type-checking errors (T1xxx - T5xxx).
//!
//! Every failure of the checking engine is a `TypeError`: a `CheckError`
//! describing what went wrong plus the `Context` of the value that caused it.
//! There is no warning severity; the first error stops compilation.
//!
//! Code ranges:
//! - T1xxx: structural mismatch
//! - T2xxx: arity and overload resolution
//! - T3xxx: literal mismatch
//! - T4xxx: boundary crossing (universality, RPC)
//! - T5xxx: construction and member access

#![allow(unused_assignments)] // False positives from thiserror derive

use std::fmt;

use miette::{Diagnostic, LabeledSpan};
use thiserror::Error;

use crate::context::Context;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("expected {expected}, got {found}")]
    #[diagnostic(code(T1001))]
    Mismatch { expected: String, found: String },

    #[error("{owner}.{member} not found")]
    #[diagnostic(code(T1002))]
    MissingMember { owner: String, member: String },

    #[error("{owner}.{member} has incompatible type (expected {expected}, got {found})")]
    #[diagnostic(code(T1003))]
    MemberMismatch {
        owner: String,
        member: String,
        expected: String,
        found: String,
    },

    #[error("unrecognized option {option}")]
    #[diagnostic(code(T1004), help("expected one of: {allowed}"))]
    UnrecognizedOption { option: String, allowed: String },

    #[error("parent chain of {type_name} exceeds {depth} links")]
    #[diagnostic(
        code(T1005),
        help("the prototype hierarchy is probably cyclic; raise max_parent_depth if it is not")
    )]
    ParentChainTooDeep { type_name: String, depth: usize },

    #[error("expected {expected} arguments, got {found}")]
    #[diagnostic(code(T2001))]
    ArgumentCount { expected: usize, found: usize },

    #[error("tuples have different lengths (expected {expected}, got {found})")]
    #[diagnostic(code(T2002))]
    TupleLength { expected: usize, found: usize },

    #[error("no overload of {callee} accepts {arguments} (candidates: {candidates})")]
    #[diagnostic(code(T2003))]
    NoMatchingOverload {
        callee: String,
        arguments: String,
        candidates: String,
    },

    #[error("function overload {index} not found")]
    #[diagnostic(code(T2004))]
    MissingOverload { index: usize },

    #[error("missing function overloads (expected {expected}, got {found})")]
    #[diagnostic(code(T2008))]
    MissingOverloads { expected: usize, found: usize },

    #[error("expected void return value, got {found}")]
    #[diagnostic(code(T2005))]
    ExpectedVoid { found: String },

    #[error("unexpected void return value (expected {expected})")]
    #[diagnostic(code(T2006))]
    UnexpectedVoid { expected: String },

    #[error("index {index} out of tuple range (length {len})")]
    #[diagnostic(code(T2007))]
    OutOfRange { index: i64, len: usize },

    #[error("expected literal {expected}, got {found}")]
    #[diagnostic(code(T3001))]
    LiteralMismatch { expected: String, found: String },

    #[error("{type_name} can't cross a {boundary} boundary")]
    #[diagnostic(
        code(T4001),
        help("only universal types (primitives, and containers/objects of them) are serializable")
    )]
    NotUniversal { type_name: String, boundary: String },

    #[error("universal class {owner} holds non-universal {part}")]
    #[diagnostic(code(T4003), help("fields and the parent of a universal class must be universal"))]
    UniversalMember { owner: String, part: String },

    #[error("{type_name} is neither rpc nor universal")]
    #[diagnostic(code(T4002))]
    NotRpc { type_name: String },

    #[error("{type_name} doesn't have a constructor")]
    #[diagnostic(code(T5001))]
    NotConstructable { type_name: String },

    #[error("can't construct abstract {type_name}")]
    #[diagnostic(code(T5002))]
    AbstractConstruction { type_name: String },

    #[error("can't call {type_name}")]
    #[diagnostic(code(T5003))]
    NotCallable { type_name: String },

    #[error("{owner}.{member} not setable")]
    #[diagnostic(code(T5004))]
    NotSettable { owner: String, member: String },

    #[error("{owner}.{member} is a setter only")]
    #[diagnostic(code(T5005))]
    SetterOnly { owner: String, member: String },

    #[error("can't extend final {type_name}")]
    #[diagnostic(code(T5006))]
    FinalParent { type_name: String },

    #[error("{owner}.{member} is not supported")]
    #[diagnostic(code(T5007), help("{hint}"))]
    Unsupported {
        owner: String,
        member: String,
        hint: String,
    },

    #[error("{name} is already declared")]
    #[diagnostic(code(T5008))]
    DuplicateType { name: String },
}

impl CheckError {
    /// Short text for the source label.
    fn label(&self) -> &'static str {
        match self {
            CheckError::Mismatch { .. } | CheckError::MemberMismatch { .. } => "type mismatch",
            CheckError::MissingMember { .. } => "member not found",
            CheckError::UnrecognizedOption { .. } => "unknown option",
            CheckError::ParentChainTooDeep { .. } => "while checking this value",
            CheckError::ArgumentCount { .. } | CheckError::TupleLength { .. } => {
                "wrong number of elements"
            }
            CheckError::NoMatchingOverload { .. }
            | CheckError::MissingOverload { .. }
            | CheckError::MissingOverloads { .. } => "no matching signature",
            CheckError::ExpectedVoid { .. } | CheckError::UnexpectedVoid { .. } => {
                "return type mismatch"
            }
            CheckError::OutOfRange { .. } => "index out of range",
            CheckError::LiteralMismatch { .. } => "literal mismatch",
            CheckError::NotUniversal { .. }
            | CheckError::NotRpc { .. }
            | CheckError::UniversalMember { .. } => "not serializable",
            CheckError::NotConstructable { .. } | CheckError::AbstractConstruction { .. } => {
                "not constructable"
            }
            CheckError::NotCallable { .. } => "not callable",
            CheckError::NotSettable { .. } | CheckError::SetterOnly { .. } => "invalid access",
            CheckError::FinalParent { .. } => "final class",
            CheckError::Unsupported { .. } => "unsupported",
            CheckError::DuplicateType { .. } => "duplicate declaration",
        }
    }
}

/// A check failure attributed to the value that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub error: CheckError,
    ctx: Context,
    notes: Vec<String>,
}

impl TypeError {
    pub fn new(error: CheckError, ctx: &Context) -> Self {
        tracing::trace!(%error, at = %ctx, "TypeError::new");
        Self {
            error,
            ctx: ctx.clone(),
            notes: Vec::new(),
        }
    }

    /// The common case: `expected <A>, got <B>`.
    pub fn mismatch(expected: impl Into<String>, found: impl Into<String>, ctx: &Context) -> Self {
        Self::new(
            CheckError::Mismatch {
                expected: expected.into(),
                found: found.into(),
            },
            ctx,
        )
    }

    /// Append an explanatory note (shown as help).
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Attribute to a different location, keeping the message.
    pub fn relocate(mut self, ctx: &Context) -> Self {
        self.ctx = ctx.clone();
        self
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for TypeError {}

impl Diagnostic for TypeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.error.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.notes.is_empty() {
            return self.error.help();
        }
        let mut text = String::new();
        if let Some(help) = self.error.help() {
            text.push_str(&help.to_string());
            text.push('\n');
        }
        text.push_str(&self.notes.join("\n"));
        Some(Box::new(text))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.ctx.is_dummy() {
            return None;
        }
        let label = LabeledSpan::new_with_span(Some(self.error.label().to_string()), self.ctx.span());
        Some(Box::new(std::iter::once(label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Span;

    #[test]
    fn mismatch_message_names_both_types() {
        let err = TypeError::mismatch("String", "Int", &Context::dummy());
        assert_eq!(err.to_string(), "expected String, got Int");
    }

    #[test]
    fn codes_are_stable() {
        let err = TypeError::new(
            CheckError::ArgumentCount {
                expected: 2,
                found: 3,
            },
            &Context::dummy(),
        );
        assert_eq!(err.code().unwrap().to_string(), "T2001");
    }

    #[test]
    fn notes_show_up_as_help() {
        let err = TypeError::mismatch("A", "B", &Context::dummy()).with_note("candidates: f(Int)");
        let help = err.help().unwrap().to_string();
        assert!(help.contains("candidates: f(Int)"));
    }

    #[test]
    fn dummy_context_has_no_label() {
        let err = TypeError::mismatch("A", "B", &Context::dummy());
        assert!(err.labels().is_none());

        let ctx = Context::new("a.wts", Span::bytes(2, 5));
        let err = err.relocate(&ctx);
        let labels: Vec<_> = err.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 2);
        assert_eq!(labels[0].len(), 3);
    }
}
