// src/errors/notation.rs
//! Type-notation errors (N0xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("unexpected character '{ch}'")]
    #[diagnostic(code(N0001))]
    UnexpectedCharacter {
        ch: char,
        #[label("unexpected character")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(code(N0002), help("add a closing '\"' to terminate the string"))]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },

    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(N0003))]
    Expected {
        expected: String,
        found: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unknown type '{name}'")]
    #[diagnostic(code(N0004), help("built-in names are case sensitive, e.g. 'String', 'Int', 'HTMLElement'"))]
    UnknownType {
        name: String,
        #[label("not a known type")]
        span: SourceSpan,
    },

    #[error("{name} takes {expected} type arguments, found {found}")]
    #[diagnostic(code(N0005))]
    TypeArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        #[label("wrong number of type arguments")]
        span: SourceSpan,
    },

    #[error("invalid number literal")]
    #[diagnostic(code(N0006))]
    InvalidNumber {
        #[label("invalid number")]
        span: SourceSpan,
    },
}
